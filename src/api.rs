// API client module: a small blocking HTTP client that talks to the
// Elitecode backend. Requests and responses are JSON; authenticated calls
// carry the session token saved by `auth login` / `auth signup`.

use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::collector::AnswerRecord;
use crate::config::Config;
use crate::error::ApiError;

const TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for the backend: base URL plus an optional session token.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// Account as returned by the backend and cached in the config file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub created_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SignupRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl From<AnswerRecord> for SignupRequest {
    fn from(answers: AnswerRecord) -> Self {
        let field = |name: &str| answers.get(name).unwrap_or_default().trim().to_string();
        SignupRequest {
            name: field("name"),
            username: field("username"),
            email: field("email"),
            // Passwords are sent exactly as typed.
            password: answers.get("password").unwrap_or_default().to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProblemSummary {
    pub id: u64,
    pub title: String,
    pub difficulty: String,
    pub category: String,
    pub solved: bool,
    pub attempted: bool,
    pub last_attempt: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Problem {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub category: String,
    pub tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TestCase {
    pub input: String,
    #[serde(alias = "expected")]
    pub expected_output: String,
    pub hidden: bool,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_id: Option<u64>,
    pub language: &'a str,
    pub code: &'a str,
    pub input: &'a str,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RunResponse {
    pub output: String,
    pub error: String,
    /// Seconds spent on the server.
    pub time: f64,
    pub status: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest<'a> {
    pub problem_id: u64,
    pub language: &'a str,
    pub code: &'a str,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Submission {
    pub id: String,
    pub accepted: bool,
    pub status: String,
    pub execution_time: String,
    pub memory_usage: String,
    pub error_message: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Breakdown {
    pub solved: u32,
    pub total: u32,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub problems_solved: u32,
    pub total_submissions: u32,
    pub accuracy: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity: Option<String>,
    pub difficulty_breakdown: BTreeMap<String, Breakdown>,
    pub category_breakdown: BTreeMap<String, u32>,
}

/// One leaderboard row. Times are milliseconds, memory is kilobytes.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Ranking {
    pub user_id: String,
    pub username: String,
    pub score: f64,
    pub problems_solved: u32,
    pub total_time: u64,
    pub total_memory: u64,
}

impl Ranking {
    pub fn avg_time_ms(&self) -> f64 {
        self.per_problem(self.total_time)
    }

    pub fn avg_memory_mb(&self) -> f64 {
        self.per_problem(self.total_memory) / 1024.0
    }

    fn per_problem(&self, total: u64) -> f64 {
        if self.problems_solved == 0 {
            0.0
        } else {
            total as f64 / f64::from(self.problems_solved)
        }
    }
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: String,
}

#[derive(Deserialize, Debug)]
struct DiscussionLink {
    url: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct BookmarkRequest {
    problem_id: u64,
}

/// The account collaborator used by the auth commands.
pub trait AuthService {
    fn signup(&self, req: &SignupRequest) -> Result<AuthResponse, ApiError>;
    fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError>;
    fn logout(&self) -> Result<(), ApiError>;
}

/// Optional filters shared by `problems list`, `problems search` and
/// `user my-problems`.
#[derive(Debug, Clone, Default)]
pub struct ProblemFilter {
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub limit: u32,
}

impl ProblemFilter {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut q = vec![("limit", self.limit.to_string())];
        if let Some(d) = &self.difficulty {
            q.push(("difficulty", d.clone()));
        }
        if let Some(c) = &self.category {
            q.push(("category", c.clone()));
        }
        if let Some(s) = &self.status {
            q.push(("status", s.clone()));
        }
        q
    }
}

impl ApiClient {
    /// Build a client from the loaded config (base URL and stored token).
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!("elitecode-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(ApiClient {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.auth_token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// Store a token for subsequent authenticated requests.
    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token when one is present.
    fn with_auth(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    /// Like `with_auth`, but the call is refused up front without a session.
    fn authed(&self, req: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        match &self.token {
            Some(t) => Ok(req.bearer_auth(t)),
            None => Err(ApiError::NotLoggedIn),
        }
    }

    fn send(req: RequestBuilder) -> Result<Response, ApiError> {
        let res = req.send()?;
        let status = res.status();
        debug!("{} {}", status.as_u16(), res.url());
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(&body, status.canonical_reason().unwrap_or("request failed")),
        })
    }

    fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ApiError> {
        let body = res.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    pub fn list_problems(&self, filter: &ProblemFilter) -> Result<Vec<ProblemSummary>, ApiError> {
        let req = self.client.get(self.url("/problems")).query(&filter.query());
        Self::decode(Self::send(self.with_auth(req))?)
    }

    pub fn search_problems(&self, keyword: &str, filter: &ProblemFilter) -> Result<Vec<ProblemSummary>, ApiError> {
        let mut query = filter.query();
        query.push(("q", keyword.to_string()));
        let req = self.client.get(self.url("/problems/search")).query(&query);
        Self::decode(Self::send(self.with_auth(req))?)
    }

    pub fn get_problem(&self, id: u64) -> Result<Problem, ApiError> {
        let req = self.client.get(self.url(&format!("/problems/{id}")));
        Self::decode(Self::send(self.with_auth(req))?)
    }

    pub fn test_cases(&self, id: u64) -> Result<Vec<TestCase>, ApiError> {
        let req = self.client.get(self.url(&format!("/problems/{id}/testcases")));
        Self::decode(Self::send(self.with_auth(req))?)
    }

    pub fn run_code(&self, req: &RunRequest<'_>) -> Result<RunResponse, ApiError> {
        let http = self.client.post(self.url("/problems/run")).json(req);
        Self::decode(Self::send(self.with_auth(http))?)
    }

    pub fn submit(&self, req: &SubmitRequest<'_>) -> Result<Submission, ApiError> {
        let http = self.authed(self.client.post(self.url("/problems/submit")).json(req))?;
        Self::decode(Self::send(http)?)
    }

    pub fn bookmark(&self, id: u64) -> Result<(), ApiError> {
        let http = self.client.post(self.url("/users/bookmarks")).json(&BookmarkRequest { problem_id: id });
        Self::send(self.authed(http)?)?;
        Ok(())
    }

    pub fn unbookmark(&self, id: u64) -> Result<(), ApiError> {
        let http = self.client.delete(self.url(&format!("/users/bookmarks/{id}")));
        Self::send(self.authed(http)?)?;
        Ok(())
    }

    pub fn discussion_url(&self, id: u64) -> Result<String, ApiError> {
        let req = self.client.get(self.url(&format!("/problems/{id}/discussion")));
        let link: DiscussionLink = Self::decode(Self::send(self.with_auth(req))?)?;
        Ok(link.url)
    }

    pub fn user_stats(&self) -> Result<UserStats, ApiError> {
        let req = self.authed(self.client.get(self.url("/users/stats")))?;
        Self::decode(Self::send(req)?)
    }

    pub fn user_problems(&self, filter: &ProblemFilter) -> Result<Vec<ProblemSummary>, ApiError> {
        let req = self.client.get(self.url("/users/problems")).query(&filter.query());
        Self::decode(Self::send(self.authed(req)?)?)
    }

    /// Rankings over `range` (`all`, `year`, `month`, `week`), optionally for one problem.
    pub fn leaderboard(&self, range: &str, problem: Option<u64>) -> Result<Vec<Ranking>, ApiError> {
        let mut query = vec![("range", range.to_string())];
        if let Some(id) = problem {
            query.push(("problemId", id.to_string()));
        }
        let req = self.client.get(self.url("/leaderboard")).query(&query);
        Self::decode(Self::send(self.with_auth(req))?)
    }
}

impl AuthService for ApiClient {
    fn signup(&self, req: &SignupRequest) -> Result<AuthResponse, ApiError> {
        let http = self.client.post(self.url("/auth/signup")).json(req);
        Self::decode(Self::send(http)?)
    }

    fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let http = self.client.post(self.url("/auth/login")).json(req);
        Self::decode(Self::send(http)?)
    }

    fn logout(&self) -> Result<(), ApiError> {
        let http = self.authed(self.client.post(self.url("/auth/logout")))?;
        Self::send(http)?;
        Ok(())
    }
}

/// Pull a human-readable message out of an error response body.
fn error_message(body: &str, fallback: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(e) if !e.message.is_empty() => e.message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => fallback.to_string(),
    }
}
