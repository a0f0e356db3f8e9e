// Per-invocation state handed to every command handler: terminal I/O,
// the loaded config and the backend client built from it.

use anyhow::{anyhow, Result};
use clap::Command;
use std::path::{Path, PathBuf};

use crate::api::{ApiClient, AuthService};
use crate::cache::ProblemCache;
use crate::config::{Config, ConfigStore};
use crate::ui::{Output, Prompter, TerminalInput};

pub struct App {
    pub out: Output,
    pub input: Box<dyn Prompter>,
    store: ConfigStore,
    config: Config,
    api: Option<ApiClient>,
    auth_override: Option<Box<dyn AuthService>>,
    cwd: PathBuf,
    command_tree: Option<Command>,
}

impl App {
    pub fn new(out: Output, input: Box<dyn Prompter>) -> Self {
        App {
            out,
            input,
            store: ConfigStore::locate(None),
            config: Config::default(),
            api: None,
            auth_override: None,
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            command_tree: None,
        }
    }

    /// Real terminal in, real terminal out.
    pub fn terminal() -> Self {
        Self::new(Output::terminal(), Box::new(TerminalInput::new()))
    }

    /// Route account calls to `auth` instead of the backend client.
    pub fn with_auth(mut self, auth: Box<dyn AuthService>) -> Self {
        self.auth_override = Some(auth);
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Load config from `path` (or the default location) and build the client.
    pub fn configure(&mut self, path: Option<&Path>) -> Result<()> {
        self.store = ConfigStore::locate(path);
        self.config = self.store.load().with_env_overrides();
        self.api = Some(ApiClient::from_config(&self.config)?);
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Directory holding the config file, cache and templates.
    pub fn data_dir(&self) -> PathBuf {
        self.store
            .path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn cache(&self) -> ProblemCache {
        ProblemCache::new(self.data_dir().join("cache"))
    }

    pub fn api(&self) -> Result<&ApiClient> {
        self.api
            .as_ref()
            .ok_or_else(|| anyhow!("backend client is not configured"))
    }

    pub fn auth(&self) -> Result<&dyn AuthService> {
        match &self.auth_override {
            Some(auth) => Ok(&**auth),
            None => Ok(self.api()?),
        }
    }

    /// Remember the full command tree (used for shell completions).
    pub fn set_command_tree(&mut self, cmd: Command) {
        self.command_tree = Some(cmd);
    }

    pub fn command_tree(&self) -> Result<Command> {
        self.command_tree
            .clone()
            .ok_or_else(|| anyhow!("command tree is not available"))
    }

    /// Refresh the in-memory config after a handler saved changes.
    pub fn reload(&mut self) {
        self.config = self.store.load().with_env_overrides();
        if let Some(api) = self.api.as_mut() {
            match self.config.auth_token.as_deref() {
                Some(token) if !token.is_empty() => api.set_token(token),
                _ => api.clear_token(),
            }
        }
    }
}

/// Set up env_logger: `warn` by default, `debug` with `--verbose`,
/// `RUST_LOG` overrides both. Safe to call more than once.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}
