//! The `elitecode` command tree.
//!
//! Each module defines one top-level group with clap derive and exposes it
//! as a [`CommandDescriptor`]; [`registry`] wires them all into a
//! [`CommandRegistry`] with the global options and the per-run setup hook.

pub mod auth;
pub mod github;
pub mod leaderboard;
pub mod problems;
pub mod system;
pub mod user;

use clap::{ArgMatches, Args, Command, FromArgMatches, Subcommand};
use std::path::PathBuf;

use crate::app::{init_logging, App};
use crate::error::RouterError;
use crate::router::{CommandDescriptor, CommandRegistry};

pub const PROGRAM: &str = "elitecode";

// Options accepted by every command. (Plain comment: a doc comment here would
// be applied by clap derive as the root about text in `augment_args`.)
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Config file (default is $HOME/.elitecode/config.json)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

pub fn root_command() -> Command {
    let root = Command::new(PROGRAM)
        .version(env!("CARGO_PKG_VERSION"))
        .about("CLI tool for competitive programming and coding challenges")
        .long_about(
            "Elitecode CLI helps you practice coding problems, track your progress, \
             improve your skills and prepare for interviews.",
        );
    GlobalOpts::augment_args(root)
}

/// Build a group command from a derived subcommand enum.
pub(crate) fn group_command<S: Subcommand>(name: &'static str, about: &'static str) -> Command {
    S::augment_subcommands(
        Command::new(name)
            .about(about)
            .subcommand_required(true)
            .arg_required_else_help(true),
    )
}

/// Decode a group's matches back into its derived enum.
pub(crate) fn decode<S: FromArgMatches>(matches: &ArgMatches) -> anyhow::Result<S> {
    Ok(S::from_arg_matches(matches)?)
}

/// Every top-level command, in help order.
pub fn groups() -> Vec<CommandDescriptor<App>> {
    let mut all = vec![
        auth::group(),
        problems::group(),
        user::group(),
        system::group(),
        github::group(),
        leaderboard::command(),
    ];
    all.extend(auth::shortcuts());
    all
}

/// The fully wired registry used by the binary.
pub fn registry() -> Result<CommandRegistry<App>, RouterError> {
    let mut registry = CommandRegistry::new(root_command());
    registry.register_all(groups())?;
    registry.before(|root, app: &mut App| {
        let opts = GlobalOpts::from_arg_matches(root)?;
        init_logging(opts.verbose);
        app.configure(opts.config.as_deref())
    });
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_groups_register_without_conflict() {
        let reg = registry().unwrap();
        let names: Vec<&str> = reg.names().collect();
        for group in ["auth", "problems", "user", "system", "github", "leaderboard"] {
            assert!(names.contains(&group), "{group}");
        }
        reg.command().debug_assert();
    }

    #[test]
    fn every_group_has_a_description() {
        let reg = registry().unwrap();
        for d in reg.descriptors() {
            assert!(!d.description().is_empty(), "{}", d.name());
        }
    }

    #[test]
    fn registering_twice_fails() {
        let mut reg = registry().unwrap();
        assert_eq!(
            reg.register(auth::group()).unwrap_err(),
            RouterError::DuplicateCommand("auth".into())
        );
    }
}
