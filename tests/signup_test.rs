use elitecode::api::{AuthResponse, AuthService, LoginRequest, SignupRequest, User};
use elitecode::app::App;
use elitecode::collector::{InputSource, PromptSpec, ScriptedInput};
use elitecode::commands;
use elitecode::config::ConfigStore;
use elitecode::error::{ApiError, CollectError};
use elitecode::router::ExitStatus;
use elitecode::ui::{Confirmer, Output, SharedBuffer};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use tempfile::TempDir;

/// Backend stand-in that records signup requests.
struct FakeAuth {
    seen: Rc<RefCell<Vec<SignupRequest>>>,
    reject_with: Option<String>,
}

impl AuthService for FakeAuth {
    fn signup(&self, req: &SignupRequest) -> Result<AuthResponse, ApiError> {
        self.seen.borrow_mut().push(req.clone());
        if let Some(message) = &self.reject_with {
            return Err(ApiError::Status { status: 409, message: message.clone() });
        }
        Ok(AuthResponse {
            token: "tok-123".into(),
            user: User {
                id: "u1".into(),
                name: req.name.clone(),
                username: req.username.clone(),
                email: req.email.clone(),
                created_at: None,
            },
        })
    }

    fn login(&self, _req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        Err(ApiError::NotLoggedIn)
    }

    fn logout(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Scripted answers that also share the list of prompted fields.
struct Recorded {
    inner: ScriptedInput,
    asked: Rc<RefCell<Vec<String>>>,
}

impl InputSource for Recorded {
    fn read(&mut self, spec: &PromptSpec) -> Result<String, CollectError> {
        self.asked.borrow_mut().push(spec.field().to_string());
        self.inner.read(spec)
    }

    fn reject(&mut self, spec: &PromptSpec, reason: &str) {
        self.inner.reject(spec, reason);
    }
}

impl Confirmer for Recorded {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, CollectError> {
        self.inner.confirm(message, default)
    }
}

struct Run {
    status: ExitStatus,
    out: String,
    err: String,
    seen: Vec<SignupRequest>,
    asked: Vec<String>,
}

fn signup(config: &Path, answers: &[&str], reject_with: Option<&str>) -> Run {
    dispatch(config, &["auth", "signup"], answers, reject_with)
}

fn dispatch(config: &Path, command: &[&str], answers: &[&str], reject_with: Option<&str>) -> Run {
    let registry = commands::registry().unwrap();
    let out = SharedBuffer::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let asked = Rc::new(RefCell::new(Vec::new()));
    let mut app = App::new(
        Output::plain(out.clone(), out.clone()),
        Box::new(Recorded {
            inner: ScriptedInput::new(answers.iter().copied()),
            asked: asked.clone(),
        }),
    )
    .with_auth(Box::new(FakeAuth {
        seen: seen.clone(),
        reject_with: reject_with.map(String::from),
    }));

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut argv = vec!["--config", config.to_str().unwrap()];
    argv.extend_from_slice(command);
    let status = registry.dispatch(
        argv,
        &mut app,
        &mut stdout,
        &mut stderr,
    );
    let seen = seen.borrow().clone();
    let asked = asked.borrow().clone();
    let mut text = out.contents();
    text.push_str(&String::from_utf8_lossy(&stdout));
    Run {
        status,
        out: text,
        err: String::from_utf8_lossy(&stderr).into_owned(),
        seen,
        asked,
    }
}

const GOOD: [&str; 5] = ["Ada", "ada123", "ada@example.com", "Str0ngP@ss", "Str0ngP@ss"];

#[test]
fn successful_signup_stores_session() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("config.json");

    let run = signup(&config, &GOOD, None);

    assert_eq!(run.status, ExitStatus::Success);
    assert!(run.out.contains("Account created successfully!"));
    assert!(run.out.contains("Welcome to Elitecode, Ada!"));
    assert_eq!(
        run.seen,
        vec![SignupRequest {
            name: "Ada".into(),
            username: "ada123".into(),
            email: "ada@example.com".into(),
            password: "Str0ngP@ss".into(),
        }]
    );

    let stored = ConfigStore::new(&config).load();
    assert_eq!(stored.auth_token.as_deref(), Some("tok-123"));
    assert_eq!(stored.user.map(|u| u.username), Some("ada123".to_string()));
}

#[test]
fn short_username_is_asked_again() {
    let tmp = TempDir::new().unwrap();
    let answers = ["Ada", "ab", "ada123", "ada@example.com", "Str0ngP@ss", "Str0ngP@ss"];

    let run = signup(&tmp.path().join("config.json"), &answers, None);

    assert_eq!(run.status, ExitStatus::Success);
    assert_eq!(run.seen.len(), 1);
    assert_eq!(run.seen[0].username, "ada123");
}

#[test]
fn mismatched_confirmation_never_reaches_backend() {
    let tmp = TempDir::new().unwrap();
    let answers = ["Ada", "ada123", "ada@example.com", "Str0ngP@ss", "Str0ngP@sz"];

    let run = signup(&tmp.path().join("config.json"), &answers, None);

    assert_eq!(run.status, ExitStatus::Aborted);
    assert!(run.seen.is_empty());
}

#[test]
fn interrupted_signup_exits_quietly() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("config.json");

    let run = signup(&config, &["Ada"], None);

    assert_eq!(run.status, ExitStatus::Aborted);
    assert_eq!(run.status.code(), 130);
    assert!(run.err.is_empty(), "{}", run.err);
    assert!(!run.out.contains("Account created"));
    assert!(!config.exists());
}

#[test]
fn backend_rejection_is_reported() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("config.json");

    let run = signup(&config, &GOOD, Some("username already taken"));

    assert_eq!(run.status, ExitStatus::Failure);
    assert_eq!(
        run.err,
        "Error: signup failed: username already taken (HTTP 409)\n"
    );
    assert_eq!(ConfigStore::new(&config).load().auth_token, None);
}

#[test]
fn root_signup_runs_the_same_flow() {
    let tmp = TempDir::new().unwrap();

    let run = dispatch(&tmp.path().join("config.json"), &["signup"], &GOOD, None);

    assert_eq!(run.status, ExitStatus::Success);
    assert!(run.out.contains("✅ Account created successfully!"));
    assert!(run.out.contains("Ada"));
    assert_eq!(run.asked, ["name", "username", "email", "password", "confirmPassword"]);
    assert_eq!(run.seen.len(), 1);
}

#[test]
fn root_signup_stops_at_short_username() {
    let tmp = TempDir::new().unwrap();

    let run = dispatch(&tmp.path().join("config.json"), &["signup"], &["Ada", "ab"], None);

    assert_eq!(run.status, ExitStatus::Aborted);
    assert_eq!(run.asked, ["name", "username", "username"]);
    assert!(!run.asked.iter().any(|f| f == "email"));
    assert!(run.seen.is_empty());
}
