// `github login` stores a personal access token; `github push` publishes the
// solution in the current problem directory to a repository.

use anyhow::{anyhow, bail, Context, Result};
use clap::Subcommand;
use log::debug;

use super::{decode, group_command};
use crate::api::Problem;
use crate::app::App;
use crate::collector::{collect, PromptSpec};
use crate::config::Config;
use crate::github::{readme, split_repo, GitHubClient, DEFAULT_API, TOKEN_ENV};
use crate::router::CommandDescriptor;
use crate::validators::min_len;
use crate::workspace;

pub const DEFAULT_REPO_NAME: &str = "elitecode-solutions";

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum GitHubCommand {
    /// Save a GitHub personal access token (needs the repo scope)
    Login,
    /// Push the current solution to GitHub
    Push {
        /// Target repository as owner/name
        #[arg(short, long)]
        repo: Option<String>,
        #[arg(short, long, default_value = "main")]
        branch: String,
        /// Commit message
        #[arg(short, long)]
        message: Option<String>,
        /// Create the repository first if it does not exist
        #[arg(short, long)]
        create_repo: bool,
    },
}

pub fn group() -> CommandDescriptor<App> {
    CommandDescriptor::new(
        group_command::<GitHubCommand>("github", "GitHub integration commands"),
        |matches, app| run(decode(matches)?, app),
    )
}

pub fn run(cmd: GitHubCommand, app: &mut App) -> Result<()> {
    match cmd {
        GitHubCommand::Login => login(app, DEFAULT_API),
        GitHubCommand::Push { repo, branch, message, create_repo } => {
            push(app, repo, &branch, message, create_repo)
        }
    }
}

pub fn token_prompts() -> Vec<PromptSpec> {
    vec![PromptSpec::masked("token", "GitHub Token:").validate(min_len("Token", 10))]
}

/// Ask for a token, check it against `api` and store it with the account name.
pub fn login(app: &mut App, api: &str) -> Result<()> {
    let answers = collect(&token_prompts(), app.input.as_mut())?;
    let token = answers.get("token").unwrap_or_default().trim().to_string();
    let client = GitHubClient::with_api(&token, api)?;

    let spinner = app.out.spinner("Validating token...");
    let result = client.current_user();
    spinner.finish();
    let user = result.context("error validating token")?;

    let mut config = app.store().load();
    config.github.token = Some(token);
    config.github.username = Some(user.login.clone());
    app.store().save(&config)?;
    app.reload();

    app.out.success(&format!("Successfully logged in to GitHub as {}", user.login));
    Ok(())
}

/// Token from `GITHUB_TOKEN`, else the config file.
fn token(config: &Config) -> Result<String> {
    std::env::var(TOKEN_ENV)
        .ok()
        .filter(|t| !t.is_empty())
        .or_else(|| config.github.token.clone().filter(|t| !t.is_empty()))
        .ok_or_else(|| anyhow!("no GitHub token; set {TOKEN_ENV} or github.token in the config file"))
}

/// `--repo`, then the configured repository, then `<username>/elitecode-solutions`.
pub fn resolve_repo(flag: Option<String>, config: &Config) -> Result<String> {
    let repo = match flag.or_else(|| config.github.repository.clone()) {
        Some(repo) => repo,
        None => {
            let owner = config
                .github
                .username
                .clone()
                .ok_or_else(|| anyhow!("no repository given; use --repo owner/name or set github.username"))?;
            format!("{owner}/{DEFAULT_REPO_NAME}")
        }
    };
    if split_repo(&repo).is_none() {
        bail!("invalid repository '{repo}', expected owner/name");
    }
    Ok(repo)
}

fn load_problem(app: &App, id: u64) -> Result<Problem> {
    match app.cache().problem(id) {
        Ok(problem) => Ok(problem),
        Err(e) => {
            debug!("{e:#}; fetching problem {id} from the server");
            Ok(app.api()?.get_problem(id)?)
        }
    }
}

fn push(app: &mut App, repo: Option<String>, branch: &str, message: Option<String>, create_repo: bool) -> Result<()> {
    let id = workspace::problem_id_from_dir(app.cwd())?;
    let files = workspace::source_files(app.cwd())?;
    if files.is_empty() {
        bail!("no source files found in {}", app.cwd().display());
    }
    let problem = load_problem(app, id).with_context(|| format!("failed to load problem {id}"))?;
    let repo = resolve_repo(repo, app.config())?;
    let client = GitHubClient::new(&token(app.config())?)?;

    if create_repo {
        let name = split_repo(&repo).map(|(_, name)| name).unwrap_or(DEFAULT_REPO_NAME);
        client.create_repository(name).context("failed to create repository")?;
    }

    let folder = format!("problems/{}", workspace::problem_dir_name(&problem));
    let message = message.unwrap_or_else(|| format!("Add solution for {}. {}", problem.id, problem.title));

    let spinner = app.out.spinner(&format!("Pushing to {repo}..."));
    for file in &files {
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("invalid file name {}", file.display()))?;
        spinner.set_message(&format!("Pushing {name}..."));
        let content = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
        client
            .push_file(&repo, &format!("{folder}/{name}"), &content, &message, branch)
            .with_context(|| format!("failed to push {name}"))?;
    }
    let readme_result = client.push_file(
        &repo,
        &format!("{folder}/README.md"),
        readme(&problem).as_bytes(),
        &message,
        branch,
    );
    spinner.finish();

    if let Err(e) = readme_result {
        app.out.warn(&format!("Could not push README: {e}"));
    }
    app.out.success(&format!("Pushed {} file(s) to https://github.com/{repo}/tree/{branch}/{folder}", files.len()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_flag_wins() {
        let mut config = Config::default();
        config.github.repository = Some("me/configured".into());
        assert_eq!(resolve_repo(Some("me/flag".into()), &config).unwrap(), "me/flag");
        assert_eq!(resolve_repo(None, &config).unwrap(), "me/configured");
    }

    #[test]
    fn repo_defaults_to_username() {
        let mut config = Config::default();
        config.github.username = Some("ada".into());
        assert_eq!(resolve_repo(None, &config).unwrap(), "ada/elitecode-solutions");
    }

    #[test]
    fn short_tokens_are_asked_again() {
        use crate::collector::ScriptedInput;

        let mut input = ScriptedInput::new(["abc", "ghp_0123456789"]);
        let answers = collect(&token_prompts(), &mut input).unwrap();
        assert_eq!(answers.get("token"), Some("ghp_0123456789"));
        assert_eq!(input.rejections().len(), 1);
        assert!(input.rejections()[0].1.contains("at least 10"));
    }

    #[test]
    fn repo_requires_owner() {
        assert!(resolve_repo(None, &Config::default()).is_err());
        assert!(resolve_repo(Some("just-a-name".into()), &Config::default()).is_err());
    }
}
