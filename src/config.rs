// On-disk configuration and session state.
//
// Everything lives in one JSON file under `~/.elitecode/` (or
// `$ELITECODE_HOME`). Login stores the auth token and user profile here so
// later invocations can make authenticated calls.

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::User;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const HOME_ENV: &str = "ELITECODE_HOME";
pub const API_URL_ENV: &str = "ELITECODE_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub api_base_url: String,
    pub auth_token: Option<String>,
    pub user: Option<User>,
    pub github: GitHubSettings,
    /// Command used to open a freshly set-up problem directory.
    pub editor: String,
    /// Language used by `problems set` when `--language` is not given.
    pub language: String,
    pub debug: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GitHubSettings {
    pub token: Option<String>,
    pub username: Option<String>,
    /// `owner/repo` used when `github push` is run without `--repo`.
    pub repository: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            user: None,
            github: GitHubSettings::default(),
            editor: "code".to_string(),
            language: "c".to_string(),
            debug: false,
        }
    }
}

impl Config {
    pub fn is_logged_in(&self) -> bool {
        self.auth_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Point the client at `url` for this run only; blank values are ignored.
    pub fn with_api_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            debug!("using API URL {url} from the environment");
            self.api_base_url = url;
        }
        self
    }

    /// Apply `ELITECODE_API_URL`. Never saved back to disk.
    pub fn with_env_overrides(self) -> Self {
        self.with_api_url_override(std::env::var(API_URL_ENV).ok())
    }
}

/// Root of the per-user Elitecode directory.
pub fn elitecode_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(HOME_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".elitecode")
}

/// Reads and writes the config file at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigStore { path: path.into() }
    }

    /// Use `path` if given, else `config.json` in [`elitecode_dir`].
    pub fn locate(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::new(p),
            None => Self::new(elitecode_dir().join("config.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config as stored on disk, falling back to defaults when the
    /// file is missing or unreadable. Environment overrides are not applied.
    pub fn load(&self) -> Config {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => match serde_json::from_str::<Config>(&data) {
                Ok(cfg) => {
                    debug!("loaded config from {}", self.path.display());
                    cfg
                }
                Err(e) => {
                    warn!("ignoring unreadable config {}: {}", self.path.display(), e);
                    Config::default()
                }
            },
            Err(_) => {
                debug!("no config at {}, using defaults", self.path.display());
                Config::default()
            }
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let data = serde_json::to_string_pretty(config)?;
        write_private(&self.path, data.as_bytes())
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        debug!("saved config to {}", self.path.display());
        Ok(())
    }

    /// Persist a fresh session after signup or login.
    pub fn store_session(&self, token: &str, user: &User) -> Result<()> {
        let mut config = self.load();
        config.auth_token = Some(token.to_string());
        config.user = Some(user.clone());
        self.save(&config)
    }

    pub fn clear_session(&self) -> Result<()> {
        let mut config = self.load();
        config.auth_token = None;
        config.user = None;
        self.save(&config)
    }
}

/// Write `data` readable by the owner only; the file holds tokens.
#[cfg(unix)]
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(data)
}

#[cfg(not(unix))]
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, data)
}
