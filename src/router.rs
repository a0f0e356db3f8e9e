//! Command registry and dispatcher.
//!
//! Command groups are registered once at startup, each as a `clap::Command`
//! plus the action that runs it. [`CommandRegistry::dispatch`] parses argv
//! against everything registered, runs the matching action and turns the
//! outcome into a process exit status. It is the only place that prints
//! failures.

use anyhow::Result;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{ArgMatches, Command};
use crossterm::style::{Color, Stylize};
use log::debug;
use std::collections::HashMap;
use std::ffi::OsString;
use std::io::Write;

use crate::error::{CollectError, RouterError};

/// Action run for a matched group. It receives the group's own matches.
pub type Action<C> = Box<dyn Fn(&ArgMatches, &mut C) -> Result<()>>;

/// Hook run after a successful parse and before the action, with the root matches.
pub type BeforeHook<C> = Box<dyn Fn(&ArgMatches, &mut C) -> Result<()>>;

/// A top-level command: its clap definition and the action behind it.
pub struct CommandDescriptor<C> {
    name: String,
    command: Command,
    action: Action<C>,
}

impl<C> CommandDescriptor<C> {
    pub fn new<F>(command: Command, action: F) -> Self
    where
        F: Fn(&ArgMatches, &mut C) -> Result<()> + 'static,
    {
        CommandDescriptor {
            name: command.get_name().to_string(),
            command,
            action: Box::new(action),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> String {
        self.command.get_about().map(|a| a.to_string()).unwrap_or_default()
    }
}

/// Process exit status produced by a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    /// A handler failed.
    Failure,
    /// argv did not parse.
    Usage,
    /// The operator interrupted a prompt.
    Aborted,
}

impl ExitStatus {
    pub const fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
            ExitStatus::Usage => 2,
            ExitStatus::Aborted => 130,
        }
    }
}

/// Result of parsing argv, before any action runs.
#[derive(Debug)]
pub enum Parsed {
    /// Help or version text to print; nothing else happens.
    Info(String),
    Command {
        name: String,
        root: ArgMatches,
        matches: ArgMatches,
    },
}

pub struct CommandRegistry<C> {
    root: Command,
    groups: Vec<CommandDescriptor<C>>,
    index: HashMap<String, usize>,
    before: Option<BeforeHook<C>>,
    color: bool,
}

impl<C> CommandRegistry<C> {
    /// `root` carries the program name, version, about text and global args.
    pub fn new(root: Command) -> Self {
        CommandRegistry {
            root,
            groups: Vec::new(),
            index: HashMap::new(),
            before: None,
            color: false,
        }
    }

    /// Paint failure lines red.
    pub fn color(&mut self, enabled: bool) {
        self.color = enabled;
    }

    pub fn register(&mut self, group: CommandDescriptor<C>) -> Result<(), RouterError> {
        // clap owns `help` at every level.
        if group.name == "help" || self.index.contains_key(&group.name) {
            return Err(RouterError::DuplicateCommand(group.name));
        }
        self.index.insert(group.name.clone(), self.groups.len());
        self.groups.push(group);
        Ok(())
    }

    pub fn register_all(&mut self, groups: impl IntoIterator<Item = CommandDescriptor<C>>) -> Result<(), RouterError> {
        groups.into_iter().try_for_each(|g| self.register(g))
    }

    /// Run `hook` before every matched action (config loading, logging setup).
    pub fn before<F>(&mut self, hook: F)
    where
        F: Fn(&ArgMatches, &mut C) -> Result<()> + 'static,
    {
        self.before = Some(Box::new(hook));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn descriptors(&self) -> &[CommandDescriptor<C>] {
        &self.groups
    }

    /// The complete clap tree: root plus every registered group.
    pub fn command(&self) -> Command {
        self.root
            .clone()
            .subcommands(self.groups.iter().map(|g| g.command.clone()))
    }

    pub fn help(&self) -> String {
        self.command().render_help().to_string()
    }

    /// Parse argv (without the program name) against the registered groups.
    pub fn parse<I, T>(&self, argv: I) -> Result<Parsed, RouterError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        if args.is_empty() {
            return Ok(Parsed::Info(self.help()));
        }

        let mut cmd = self.command();
        let full = std::iter::once(OsString::from(cmd.get_name().to_string())).chain(args.iter().cloned());
        match cmd.try_get_matches_from_mut(full) {
            Ok(root) => match root.subcommand() {
                Some((name, matches)) => Ok(Parsed::Command {
                    name: name.to_string(),
                    matches: matches.clone(),
                    root: root.clone(),
                }),
                // Only global flags were given.
                None => Ok(Parsed::Info(cmd.render_help().to_string())),
            },
            Err(e) => match e.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => Ok(Parsed::Info(e.to_string())),
                ErrorKind::InvalidSubcommand => {
                    let name = match e.get(ContextKind::InvalidSubcommand) {
                        Some(ContextValue::String(s)) => s.clone(),
                        _ => first_positional(&args),
                    };
                    Err(RouterError::UnknownCommand(name))
                }
                _ => Err(RouterError::InvalidArguments(clap_message(&e))),
            },
        }
    }

    fn report(&self, err: &mut dyn Write, message: &str) {
        let line = format!("Error: {message}");
        if self.color {
            let _ = writeln!(err, "{}", line.with(Color::Red));
        } else {
            let _ = writeln!(err, "{line}");
        }
    }

    /// Parse, run and report. Help goes to `out`, failures to `err`.
    pub fn dispatch<I, T>(&self, argv: I, ctx: &mut C, out: &mut dyn Write, err: &mut dyn Write) -> ExitStatus
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let (name, root, matches) = match self.parse(argv) {
            Ok(Parsed::Info(text)) => {
                let _ = write!(out, "{text}");
                return ExitStatus::Success;
            }
            Ok(Parsed::Command { name, root, matches }) => (name, root, matches),
            Err(e) => {
                self.report(err, &e.to_string());
                return ExitStatus::Usage;
            }
        };

        let Some(group) = self.index.get(&name).map(|&i| &self.groups[i]) else {
            self.report(err, &RouterError::UnknownCommand(name).to_string());
            return ExitStatus::Usage;
        };

        // Logging is set up by the before-hook.
        let result = self
            .before
            .as_ref()
            .map_or(Ok(()), |hook| hook(&root, ctx))
            .and_then(|()| {
                debug!("dispatching '{}'", group.name);
                (group.action)(&matches, ctx)
            });

        match result {
            Ok(()) => ExitStatus::Success,
            Err(e) if is_abort(&e) => {
                debug!("'{}' aborted by operator", group.name);
                ExitStatus::Aborted
            }
            Err(e) => {
                self.report(err, &format!("{e:#}"));
                ExitStatus::Failure
            }
        }
    }
}

fn is_abort(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<CollectError>(), Some(CollectError::Aborted)))
}

/// clap's rendered error minus its own `error: ` prefix and usage footer.
fn clap_message(e: &clap::Error) -> String {
    let rendered = e.to_string();
    let first = rendered.lines().find(|l| !l.trim().is_empty()).unwrap_or("invalid arguments");
    first.trim_start_matches("error: ").trim().to_string()
}

fn first_positional(args: &[OsString]) -> String {
    args.iter()
        .map(|a| a.to_string_lossy().into_owned())
        .find(|a| !a.starts_with('-'))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::SharedBuffer;
    use anyhow::bail;
    use clap::Arg;

    #[derive(Default)]
    struct Calls {
        hits: Vec<String>,
        prepared: bool,
    }

    fn registry() -> CommandRegistry<Calls> {
        let mut reg = CommandRegistry::new(Command::new("elitecode").version("1.2.3").about("test"));
        reg.register(CommandDescriptor::new(
            Command::new("auth")
                .about("Authentication commands")
                .subcommand(Command::new("signup")),
            |m, c: &mut Calls| {
                c.hits.push(format!("auth:{}", m.subcommand_name().unwrap_or("")));
                Ok(())
            },
        ))
        .unwrap();
        reg.register(CommandDescriptor::new(
            Command::new("problems").arg(Arg::new("limit").long("limit").value_parser(clap::value_parser!(u32))),
            |_, c: &mut Calls| {
                c.hits.push("problems".into());
                Ok(())
            },
        ))
        .unwrap();
        reg.register(CommandDescriptor::new(Command::new("fail"), |_, _: &mut Calls| bail!("backend down")))
            .unwrap();
        reg.register(CommandDescriptor::new(Command::new("quit"), |_, _: &mut Calls| {
            Err(anyhow::Error::new(CollectError::Aborted).context("signup"))
        }))
        .unwrap();
        reg
    }

    fn run(reg: &CommandRegistry<Calls>, argv: &[&str]) -> (ExitStatus, Calls, String, String) {
        let mut calls = Calls::default();
        let out = SharedBuffer::new();
        let err = SharedBuffer::new();
        let status = reg.dispatch(argv.iter().copied(), &mut calls, &mut out.clone(), &mut err.clone());
        (status, calls, out.contents(), err.contents())
    }

    #[test]
    fn duplicate_names_are_refused() {
        let mut reg = registry();
        let err = reg
            .register(CommandDescriptor::new(Command::new("auth"), |_, _: &mut Calls| Ok(())))
            .unwrap_err();
        assert_eq!(err, RouterError::DuplicateCommand("auth".into()));
        assert!(reg
            .register(CommandDescriptor::new(Command::new("help"), |_, _: &mut Calls| Ok(())))
            .is_err());
    }

    #[test]
    fn each_name_runs_exactly_its_handler() {
        let reg = registry();
        let (status, calls, _, _) = run(&reg, &["auth", "signup"]);
        assert_eq!(status, ExitStatus::Success);
        assert_eq!(calls.hits, vec!["auth:signup"]);

        let (status, calls, _, _) = run(&reg, &["problems", "--limit", "5"]);
        assert_eq!(status, ExitStatus::Success);
        assert_eq!(calls.hits, vec!["problems"]);
    }

    #[test]
    fn empty_argv_prints_help() {
        let reg = registry();
        let (status, calls, out, _) = run(&reg, &[]);
        assert_eq!(status, ExitStatus::Success);
        assert!(calls.hits.is_empty());
        assert!(out.contains("elitecode"));
        assert!(out.contains("auth"));
        assert!(out.contains("problems"));
    }

    #[test]
    fn version_flag() {
        let (status, _, out, _) = run(&registry(), &["--version"]);
        assert_eq!(status, ExitStatus::Success);
        assert!(out.contains("1.2.3"));
    }

    #[test]
    fn unknown_command_is_named() {
        let reg = registry();
        match reg.parse(["bogus"]) {
            Err(RouterError::UnknownCommand(name)) => assert_eq!(name, "bogus"),
            other => panic!("unexpected {other:?}"),
        }
        let (status, calls, _, err) = run(&reg, &["bogus"]);
        assert_eq!(status.code(), 2);
        assert!(calls.hits.is_empty());
        assert!(err.contains("Error: unknown command 'bogus'"));
    }

    #[test]
    fn bad_arguments_are_usage_errors() {
        let reg = registry();
        assert!(matches!(reg.parse(["problems", "--limit", "many"]), Err(RouterError::InvalidArguments(_))));
        let (status, calls, _, err) = run(&reg, &["problems", "--limit", "many"]);
        assert_eq!(status, ExitStatus::Usage);
        assert!(calls.hits.is_empty());
        assert!(err.starts_with("Error: "));
        assert!(err.contains("many"));
    }

    #[test]
    fn handler_failure_is_rendered_once() {
        let (status, _, out, err) = run(&registry(), &["fail"]);
        assert_eq!(status.code(), 1);
        assert!(out.is_empty());
        assert!(err.contains("Error: backend down"));
    }

    #[test]
    fn abort_exits_quietly() {
        let (status, _, _, err) = run(&registry(), &["quit"]);
        assert_eq!(status, ExitStatus::Aborted);
        assert_ne!(status.code(), 0);
        assert!(err.is_empty());
    }

    #[test]
    fn before_hook_runs_ahead_of_action() {
        let mut reg = registry();
        reg.before(|_, c: &mut Calls| {
            c.prepared = true;
            Ok(())
        });
        let (_, calls, _, _) = run(&reg, &["problems"]);
        assert!(calls.prepared);

        let (_, calls, _, _) = run(&reg, &["--help"]);
        assert!(!calls.prepared);
    }

    #[test]
    fn failing_before_hook_skips_action() {
        let mut reg = registry();
        reg.before(|_, _: &mut Calls| bail!("bad config"));
        let (status, calls, _, err) = run(&reg, &["problems"]);
        assert_eq!(status, ExitStatus::Failure);
        assert!(calls.hits.is_empty());
        assert_eq!(err, "Error: bad config\n");
    }
}
