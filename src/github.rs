// Minimal GitHub REST client for pushing solution files through the
// contents API. Files are created or updated one commit per file.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::api::Problem;
use crate::error::ApiError;

pub const DEFAULT_API: &str = "https://api.github.com";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

pub struct GitHubClient {
    client: Client,
    api: String,
    token: String,
}

#[derive(Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

#[derive(Deserialize)]
struct ExistingContents {
    sha: String,
}

/// The account a token belongs to.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GitHubUser {
    pub login: String,
}

#[derive(Serialize)]
struct NewRepo<'a> {
    name: &'a str,
    description: &'a str,
    auto_init: bool,
}

#[derive(Deserialize)]
struct GhError {
    message: String,
}

/// `owner/repo` split into its halves.
pub fn split_repo(repo: &str) -> Option<(&str, &str)> {
    let (owner, name) = repo.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((owner, name))
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self, ApiError> {
        Self::with_api(token, DEFAULT_API)
    }

    pub fn with_api(token: &str, api: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("elitecode-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(GitHubClient {
            client,
            api: api.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn request(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
    }

    fn check(res: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, ApiError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().unwrap_or_default();
        let message = serde_json::from_str::<GhError>(&body)
            .map(|e| e.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("GitHub request failed").to_string());
        Err(ApiError::Status { status: status.as_u16(), message })
    }

    /// Resolve the token's account; fails with 401 for a bad token.
    pub fn current_user(&self) -> Result<GitHubUser, ApiError> {
        let res = self.request(self.client.get(format!("{}/user", self.api))).send()?;
        let body = Self::check(res)?.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Create `name` under the authenticated user.
    pub fn create_repository(&self, name: &str) -> Result<(), ApiError> {
        let body = NewRepo {
            name,
            description: "Solutions to Elitecode problems",
            auto_init: true,
        };
        let res = self
            .request(self.client.post(format!("{}/user/repos", self.api)))
            .json(&body)
            .send()?;
        // 422 means the repository already exists, which is fine here.
        if res.status() == StatusCode::UNPROCESSABLE_ENTITY {
            debug!("repository {name} already exists");
            return Ok(());
        }
        Self::check(res)?;
        Ok(())
    }

    fn existing_sha(&self, repo: &str, path: &str, branch: &str) -> Result<Option<String>, ApiError> {
        let res = self
            .request(self.client.get(format!("{}/repos/{}/contents/{}", self.api, repo, path)))
            .query(&[("ref", branch)])
            .send()?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = Self::check(res)?.text()?;
        let existing: ExistingContents = serde_json::from_str(&body)?;
        Ok(Some(existing.sha))
    }

    /// Create or update one file on `branch`.
    pub fn push_file(&self, repo: &str, path: &str, content: &[u8], message: &str, branch: &str) -> Result<(), ApiError> {
        let sha = self.existing_sha(repo, path, branch)?;
        debug!("pushing {repo}/{path} (update: {})", sha.is_some());
        let body = PutContents {
            message,
            content: STANDARD.encode(content),
            branch,
            sha,
        };
        let res = self
            .request(self.client.put(format!("{}/repos/{}/contents/{}", self.api, repo, path)))
            .json(&body)
            .send()?;
        Self::check(res)?;
        Ok(())
    }
}

/// README pushed next to each solution.
pub fn readme(problem: &Problem) -> String {
    let mut out = format!("# {}. {}\n\n", problem.id, problem.title);
    out.push_str(&format!("**Difficulty:** {}\n\n", problem.difficulty));
    if !problem.category.is_empty() {
        out.push_str(&format!("**Category:** {}\n\n", problem.category));
    }
    if !problem.tags.is_empty() {
        out.push_str(&format!("**Tags:** {}\n\n", problem.tags.join(", ")));
    }
    if !problem.description.is_empty() {
        out.push_str("## Description\n\n");
        out.push_str(&problem.description);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_names() {
        assert_eq!(split_repo("ada/solutions"), Some(("ada", "solutions")));
        assert_eq!(split_repo("solutions"), None);
        assert_eq!(split_repo("/solutions"), None);
        assert_eq!(split_repo("a/b/c"), None);
    }

    #[test]
    fn readme_lists_metadata() {
        let problem = Problem {
            id: 1,
            title: "Two Sum".into(),
            difficulty: "easy".into(),
            tags: vec!["array".into(), "hash".into()],
            ..Default::default()
        };
        let text = readme(&problem);
        assert!(text.starts_with("# 1. Two Sum"));
        assert!(text.contains("**Tags:** array, hash"));
        assert!(!text.contains("Category"));
    }

    #[test]
    fn contents_body_is_base64() {
        let body = PutContents { message: "m", content: STANDARD.encode(b"hi"), branch: "main", sha: None };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["content"], "aGk=");
        assert!(json.get("sha").is_none());
    }
}
