// Typed errors for the pieces of the CLI that callers need to match on.
// Command handlers themselves return `anyhow::Result` and only the router
// looks inside them (to tell an operator abort apart from a real failure).

use thiserror::Error;

/// Failures raised by the command registry and dispatcher.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    /// Two command groups tried to claim the same top-level name.
    #[error("command '{0}' is already registered")]
    DuplicateCommand(String),

    /// argv named a command nobody registered.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// A known command was given options or arguments it does not accept.
    #[error("{0}")]
    InvalidArguments(String),
}

/// Failures raised while collecting interactive answers.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The operator interrupted a prompt (Ctrl-C, closed stdin).
    #[error("input aborted")]
    Aborted,

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}

impl CollectError {
    /// Map a terminal I/O error to an abort when it was caused by the operator.
    pub fn from_terminal(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::Interrupted | std::io::ErrorKind::UnexpectedEof => CollectError::Aborted,
            _ => CollectError::Io(err),
        }
    }
}

/// Failures talking to the Elitecode backend or GitHub.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("not logged in; run 'elitecode auth login' first")]
    NotLoggedIn,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn interrupted_terminal_maps_to_abort() {
        let err = CollectError::from_terminal(io::Error::new(io::ErrorKind::Interrupted, "ctrl-c"));
        assert!(matches!(err, CollectError::Aborted));

        let err = CollectError::from_terminal(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert!(matches!(err, CollectError::Aborted));
    }

    #[test]
    fn other_terminal_errors_stay_io() {
        let err = CollectError::from_terminal(io::Error::new(io::ErrorKind::BrokenPipe, "pipe"));
        assert!(matches!(err, CollectError::Io(_)));
    }

    #[test]
    fn router_errors_name_the_command() {
        assert_eq!(
            RouterError::UnknownCommand("bogus".into()).to_string(),
            "unknown command 'bogus'"
        );
        assert_eq!(
            RouterError::DuplicateCommand("auth".into()).to_string(),
            "command 'auth' is already registered"
        );
    }
}
