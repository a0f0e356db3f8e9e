use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn elitecode(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("elitecode").unwrap();
    cmd.env("ELITECODE_HOME", home.path())
        .env_remove("ELITECODE_API_URL")
        .env_remove("GITHUB_TOKEN");
    cmd
}

#[test]
fn no_arguments_prints_help() {
    let home = TempDir::new().unwrap();
    elitecode(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: elitecode"))
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("problems"))
        .stdout(predicate::str::contains("user"))
        .stdout(predicate::str::contains("system"))
        .stdout(predicate::str::contains("github"));
}

#[test]
fn help_flag_exits_zero() {
    let home = TempDir::new().unwrap();
    elitecode(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Elitecode CLI"));
}

#[test]
fn version_flag_prints_version() {
    let home = TempDir::new().unwrap();
    elitecode(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_command_is_named() {
    let home = TempDir::new().unwrap();
    elitecode(&home)
        .arg("bogus")
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("Error: "))
        .stderr(predicate::str::contains("bogus"));
}

#[test]
fn bad_flag_is_invalid_arguments() {
    let home = TempDir::new().unwrap();
    elitecode(&home)
        .args(["problems", "list", "--limit", "many"])
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("Error: "));
}

#[test]
fn group_without_subcommand_shows_its_help() {
    let home = TempDir::new().unwrap();
    elitecode(&home)
        .arg("problems")
        .assert()
        .success()
        .stdout(predicate::str::contains("submit"));
}

#[test]
fn whoami_requires_login() {
    let home = TempDir::new().unwrap();
    elitecode(&home)
        .arg("whoami")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: not logged in"));
}

#[test]
fn system_init_then_version() {
    let home = TempDir::new().unwrap();
    elitecode(&home)
        .args(["system", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Elitecode initialized"));
    assert!(home.path().join("config.json").is_file());
    assert!(home.path().join("cache").is_dir());

    elitecode(&home)
        .args(["system", "version"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!("elitecode {}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn completion_script_for_bash() {
    let home = TempDir::new().unwrap();
    elitecode(&home)
        .args(["system", "completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_elitecode"));
}

#[test]
fn root_signup_shortcut_is_registered() {
    let home = TempDir::new().unwrap();
    elitecode(&home)
        .args(["signup", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Shortcut for 'auth signup'"));
}

#[test]
fn leaderboard_rejects_unknown_range() {
    let home = TempDir::new().unwrap();
    elitecode(&home)
        .args(["leaderboard", "--time", "decade"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("decade"));
}

#[cfg(unix)]
#[test]
fn ctrl_c_exits_with_abort_status() {
    use std::net::TcpListener;
    use std::process::Stdio;
    use std::time::{Duration, Instant};

    // Accepts the connection but never answers, so the command blocks.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let home = TempDir::new().unwrap();

    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("elitecode"))
        .args(["problems", "list"])
        .env("ELITECODE_HOME", home.path())
        .env("ELITECODE_API_URL", format!("http://{}", listener.local_addr().unwrap()))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(20);
    let _conn = loop {
        match listener.accept() {
            Ok((conn, _)) => break conn,
            Err(_) if Instant::now() < deadline => std::thread::sleep(Duration::from_millis(20)),
            Err(e) => {
                let _ = child.kill();
                panic!("client never connected: {e}");
            }
        }
    };

    unsafe {
        libc::kill(child.id() as libc::pid_t, libc::SIGINT);
    }
    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(130));
}
