//! Integration tests for the `postdesk` binary.
//!
//! Argument parsing, help, completions and the error paths run without a
//! server; the portal test points the binary at a wiremock instance.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// The binary with every `POSTDESK_*` variable cleared and all config and
/// data directories under `home`.
fn postdesk_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("postdesk");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("POSTDESK_PROFILE")
        .env_remove("POSTDESK_API_BASE_URL")
        .env_remove("POSTDESK_OUTPUT")
        .env_remove("POSTDESK_INSECURE")
        .env_remove("POSTDESK_TIMEOUT")
        .env_remove("POSTDESK_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = postdesk_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    postdesk_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("posts")
            .and(predicate::str::contains("login"))
            .and(predicate::str::contains("portal")),
    );
}

#[test]
fn version_flag() {
    let home = tempfile::tempdir().unwrap();
    postdesk_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("postdesk"));
}

#[test]
fn invalid_subcommand_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    let output = postdesk_cmd(home.path()).arg("frobnicate").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("frobnicate"));
}

#[test]
fn update_flags_conflict() {
    let home = tempfile::tempdir().unwrap();
    postdesk_cmd(home.path())
        .args(["posts", "update", "1", "--publish", "--draft"])
        .assert()
        .code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn completions_bash() {
    let home = tempfile::tempdir().unwrap();
    postdesk_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("postdesk"));
}

#[test]
fn completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    postdesk_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef postdesk"));
}

// ── Session-bound commands ──────────────────────────────────────────

#[test]
fn posts_list_requires_login() {
    let home = tempfile::tempdir().unwrap();
    postdesk_cmd(home.path())
        .args(["--api-url", "http://127.0.0.1:9", "posts", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn new_post_and_comment_commands_require_login() {
    let home = tempfile::tempdir().unwrap();
    postdesk_cmd(home.path())
        .args(["--api-url", "http://127.0.0.1:9", "comments", "get", "3"])
        .assert()
        .code(3);
    postdesk_cmd(home.path())
        .args([
            "--api-url",
            "http://127.0.0.1:9",
            "posts",
            "replace",
            "3",
            "--title",
            "T",
            "--content",
            "C",
        ])
        .assert()
        .code(3);
}

#[test]
fn unknown_profile_exits_not_found() {
    let home = tempfile::tempdir().unwrap();
    postdesk_cmd(home.path())
        .args(["--profile", "prod", "whoami"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("prod"));
}

#[test]
fn logout_without_session_succeeds() {
    let home = tempfile::tempdir().unwrap();
    postdesk_cmd(home.path())
        .args(["--api-url", "http://127.0.0.1:9", "logout"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Not logged in"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn config_set_then_show() {
    let home = tempfile::tempdir().unwrap();
    postdesk_cmd(home.path())
        .args(["config", "set", "email", "a@b.com"])
        .assert()
        .success();
    postdesk_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("email = \"a@b.com\""));
}

#[test]
fn config_use_unknown_profile() {
    let home = tempfile::tempdir().unwrap();
    postdesk_cmd(home.path())
        .args(["config", "use", "nope"])
        .assert()
        .code(4);
}

// ── Portal (no session) ─────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn portal_list_renders_public_posts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/portal/posts/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{
                "id": 7,
                "title": "Hello portal",
                "author": { "id": 1, "username": "alice" },
                "comment_count": 2,
                "created_at": "2024-03-01T10:00:00Z"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let mut cmd = postdesk_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "-o", "plain", "portal", "list"]);

    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "7");
}

#[tokio::test(flavor = "multi_thread")]
async fn defaults_section_picks_output_format() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/portal/posts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{
                "id": 42,
                "title": "From defaults",
                "author": { "id": 1, "username": "alice" },
                "comment_count": 0,
                "created_at": "2024-03-01T10:00:00Z"
            }]
        })))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join("config").join("postdesk");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "[defaults]\noutput = \"plain\"\ncolor = \"never\"\n",
    )
    .unwrap();

    let mut cmd = postdesk_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "portal", "list"]);

    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "42");
}
