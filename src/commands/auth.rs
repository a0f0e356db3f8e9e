// Account commands: signup, login, logout, whoami.

use anyhow::{bail, Context, Result};
use clap::{Command, Subcommand};

use super::{decode, group_command};
use crate::api::{LoginRequest, SignupRequest};
use crate::app::App;
use crate::collector::{collect, PromptSpec};
use crate::router::CommandDescriptor;
use crate::validators::{email, matches_field, min_len, password_strength, required};

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthCommand {
    /// Create a new Elitecode account
    Signup,
    /// Login to your Elitecode account
    Login,
    /// Logout from your Elitecode account
    Logout,
    /// Show current user information
    Whoami,
}

pub fn group() -> CommandDescriptor<App> {
    CommandDescriptor::new(
        group_command::<AuthCommand>("auth", "Authentication commands"),
        |matches, app| run(decode(matches)?, app),
    )
}

/// `elitecode signup` and friends, same handlers as under `auth`.
pub fn shortcuts() -> Vec<CommandDescriptor<App>> {
    [
        (AuthCommand::Signup, "signup"),
        (AuthCommand::Login, "login"),
        (AuthCommand::Logout, "logout"),
        (AuthCommand::Whoami, "whoami"),
    ]
    .into_iter()
    .map(|(cmd, name)| {
        CommandDescriptor::new(
            Command::new(name).about(format!("Shortcut for 'auth {name}'")),
            move |_, app| run(cmd, app),
        )
    })
    .collect()
}

pub fn run(cmd: AuthCommand, app: &mut App) -> Result<()> {
    match cmd {
        AuthCommand::Signup => signup(app),
        AuthCommand::Login => login(app),
        AuthCommand::Logout => logout(app),
        AuthCommand::Whoami => whoami(app),
    }
}

/// Questions asked by `signup`, in order.
pub fn signup_prompts() -> Vec<PromptSpec> {
    vec![
        PromptSpec::plain("name", "Name:").validate(required("Name")),
        PromptSpec::plain("username", "Username:").validate(min_len("Username", 3)),
        PromptSpec::plain("email", "Email:").validate(email()),
        PromptSpec::masked("password", "Password:").validate(password_strength()),
        PromptSpec::masked("confirmPassword", "Confirm Password:")
            .validate(matches_field("password", "Passwords do not match")),
    ]
}

pub fn login_prompts() -> Vec<PromptSpec> {
    vec![
        PromptSpec::plain("usernameOrEmail", "Username or Email:").validate(required("Username or email")),
        PromptSpec::masked("password", "Password:").validate(required("Password")),
    ]
}

fn signup(app: &mut App) -> Result<()> {
    let answers = collect(&signup_prompts(), app.input.as_mut())?;
    let request = SignupRequest::from(answers);

    let spinner = app.out.spinner("Creating your account...");
    let result = app.auth()?.signup(&request);
    spinner.finish();
    let response = result.context("signup failed")?;

    app.store()
        .store_session(&response.token, &response.user)
        .context("failed to store auth token")?;
    app.reload();

    app.out.success("Account created successfully!");
    app.out.info(&format!("Welcome to Elitecode, {}!", response.user.name));
    Ok(())
}

fn login(app: &mut App) -> Result<()> {
    let answers = collect(&login_prompts(), app.input.as_mut())?;
    let request = LoginRequest {
        username_or_email: answers.get("usernameOrEmail").unwrap_or_default().trim().to_string(),
        password: answers.get("password").unwrap_or_default().to_string(),
    };

    let spinner = app.out.spinner("Logging in...");
    let result = app.auth()?.login(&request);
    spinner.finish();
    let response = result.context("login failed")?;

    app.store()
        .store_session(&response.token, &response.user)
        .context("failed to store auth token")?;
    app.reload();

    app.out.success("Login successful!");
    app.out.info(&format!("Welcome back, {}!", response.user.name));
    Ok(())
}

fn logout(app: &mut App) -> Result<()> {
    if !app.config().is_logged_in() {
        app.out.warn("You are not logged in");
        return Ok(());
    }
    // The local session is cleared even when the server cannot be reached.
    let ended = app.auth()?.logout();
    if let Err(e) = ended {
        app.out.warn(&format!("Could not end the server session: {e}"));
    }
    app.store().clear_session()?;
    app.reload();
    app.out.success("Logged out successfully!");
    Ok(())
}

fn whoami(app: &mut App) -> Result<()> {
    let user = match &app.config().user {
        Some(user) if app.config().is_logged_in() => user.clone(),
        _ => bail!("not logged in; please login first using 'elitecode auth login'"),
    };

    app.out.heading("👤 User Information");
    app.out.line(&format!("Name: {}", user.name));
    app.out.line(&format!("Username: {}", user.username));
    app.out.line(&format!("Email: {}", user.email));
    if let Some(joined) = &user.created_at {
        app.out.line(&format!("Joined: {joined}"));
    }

    let stats = app.api()?.user_stats();
    match stats {
        Ok(stats) => {
            app.out.line("");
            app.out.heading("📊 Statistics");
            app.out.line(&format!("Problems Solved: {}", stats.problems_solved));
            app.out.line(&format!("Accuracy: {:.1}%", stats.accuracy));
            app.out.line(&format!("Current Streak: {} days", stats.current_streak));
        }
        Err(e) => app.out.warn(&format!("Could not fetch latest stats: {e}")),
    }
    Ok(())
}
