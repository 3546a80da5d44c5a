#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::fixture_path;
use std::process::Command;

fn mvigen() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mvigen"));
    cmd.env_remove("MVIGEN_CONFIG").env("MVIGEN_LOG_LEVEL", "error");
    cmd
}

#[test]
fn test_cli_generate_writes_dispatchers() {
    let dir = tempfile::tempdir().unwrap();
    let status = mvigen()
        .arg("generate")
        .arg("--graph")
        .arg(fixture_path("login.yaml"))
        .arg("--output")
        .arg(dir.path())
        .status()
        .expect("run cli");
    assert!(status.success());

    let generated = dir.path().join("app").join("login").join("generated");
    assert!(generated.join("login_intent_processor_executor.rs").exists());
    assert!(generated.join("mod.rs").exists());
    assert!(dir.path().join("mvigen-deps.json").exists());
}

#[test]
fn test_cli_generate_fails_on_errors_but_keeps_valid_features() {
    let dir = tempfile::tempdir().unwrap();
    let output = mvigen()
        .arg("generate")
        .arg("--graph")
        .arg(fixture_path("mixed.yaml"))
        .arg("--output")
        .arg(dir.path())
        .output()
        .expect("run cli");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("handler_contract_not_found"));
    assert!(stderr.contains("intent_type_not_concrete"));
    assert!(dir
        .path()
        .join("app/profile/generated/profile_intent_processor_executor.rs")
        .exists());
}

#[test]
fn test_cli_check_fail_on_error() {
    let status = mvigen()
        .arg("check")
        .arg("--graph")
        .arg(fixture_path("duplicate_init.yaml"))
        .arg("--fail-on-error")
        .status()
        .expect("run cli");
    assert_eq!(status.code(), Some(1));

    let status = mvigen()
        .arg("check")
        .arg("--graph")
        .arg(fixture_path("duplicate_init.yaml"))
        .status()
        .expect("run cli");
    assert!(status.success());
}

#[test]
fn test_cli_inspect_lists_features() {
    let output = mvigen()
        .arg("inspect")
        .arg("--graph")
        .arg(fixture_path("login.yaml"))
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("app.login.LoginIntent -> LoginIntentProcessorExecutor"));
    assert!(stdout.contains("app.login.SubmitProcessor"));
}

#[test]
fn test_cli_rejects_malformed_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let graph = dir.path().join("graph.yaml");
    std::fs::write(&graph, "declarations:\n  - name: a.B\n    kind: spaceship\n").unwrap();
    let status = mvigen()
        .arg("check")
        .arg("--graph")
        .arg(&graph)
        .status()
        .expect("run cli");
    assert!(!status.success());
}
