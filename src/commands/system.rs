// Local setup and housekeeping: data directory, self-update, shell
// completions and build info.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use clap_complete::Shell;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Command as Process;

use super::{decode, group_command, PROGRAM};
use crate::app::App;
use crate::config::Config;
use crate::router::CommandDescriptor;

/// Subdirectories created by `system init`.
pub const DATA_DIRS: [&str; 4] = ["cache", "problems", "templates", "logs"];

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SystemCommand {
    /// Create the Elitecode data directory and default config
    Init,
    /// Update the CLI to the latest release
    Update,
    /// Print a shell completion script
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Show version information
    Version,
}

pub fn group() -> CommandDescriptor<App> {
    CommandDescriptor::new(
        group_command::<SystemCommand>("system", "System and maintenance commands"),
        |matches, app| run(decode(matches)?, app),
    )
}

pub fn run(cmd: SystemCommand, app: &mut App) -> Result<()> {
    match cmd {
        SystemCommand::Init => init(app),
        SystemCommand::Update => update(app),
        SystemCommand::Completion { shell } => completion(app, shell),
        SystemCommand::Version => version(app),
    }
}

fn init(app: &mut App) -> Result<()> {
    let root = app.data_dir();
    for name in DATA_DIRS {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    if app.store().path().exists() {
        app.out.info(&format!("Config already exists at {}", app.store().path().display()));
    } else {
        app.store().save(&Config::default())?;
        app.reload();
        app.out.info(&format!("Wrote default config to {}", app.store().path().display()));
    }
    app.out.success(&format!("Elitecode initialized in {}", root.display()));
    Ok(())
}

/// Executable `brew` on `search_path`, if any.
fn locate_brew<T: AsRef<OsStr>>(search_path: Option<T>) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    which::which_in("brew", search_path, cwd).ok()
}

fn update(app: &mut App) -> Result<()> {
    let Some(brew) = locate_brew(std::env::var_os("PATH")) else {
        app.out.warn("Homebrew not found; download the latest release manually to update.");
        return Ok(());
    };
    app.out.info("Updating elitecode with Homebrew...");
    let status = Process::new(brew)
        .args(["upgrade", PROGRAM])
        .status()
        .context("failed to run brew")?;
    if !status.success() {
        bail!("brew upgrade exited with {status}");
    }
    app.out.success("Elitecode is up to date");
    Ok(())
}

fn completion(app: &mut App, shell: Shell) -> Result<()> {
    let mut cmd = app.command_tree()?;
    clap_complete::generate(shell, &mut cmd, PROGRAM, app.out.raw());
    Ok(())
}

fn version(app: &mut App) -> Result<()> {
    app.out.line(&format!("{PROGRAM} {}", env!("CARGO_PKG_VERSION")));
    app.out.line(&format!("OS/Arch: {}/{}", std::env::consts::OS, std::env::consts::ARCH));
    Ok(())
}
