use std::{
    io::{Read, Write},
    net::TcpListener,
    thread,
};

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper function to create a Command with --no-color flag for testing
fn pw_cmd() -> Command {
    let mut cmd = Command::cargo_bin("pw").expect("Failed to find pw binary");
    cmd.arg("--no-color").env_remove("PLANWATCH_URL");
    cmd
}

/// Serves a single HTTP response on a random port and returns the API base
/// URL pointing at it.
fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read local address");

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("Failed to accept");
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).expect("Failed to read request");
            if n == 0 {
                return;
            }
            head.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream
            .write_all(response.as_bytes())
            .expect("Failed to write response");
    });

    format!("http://{addr}/api")
}

#[test]
fn test_cli_help_lists_commands() {
    pw_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("snapshot"))
        .stdout(predicate::str::contains("--base-url"));
}

#[test]
fn test_cli_snapshot_prints_plans() {
    let base_url = serve_once(
        "200 OK",
        r#"[{
            "id": "p1",
            "parent_id": null,
            "title": "Release 2.0",
            "description": "Ship the thing",
            "status": "in_progress",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z",
            "steps": [
                {"id": "s2", "plan_id": "p1", "title": "Tag", "description": null,
                 "status": "pending", "step_order": 2, "progress": 0,
                 "created_at": "2024-05-01T10:00:00Z", "updated_at": "2024-05-01T10:00:00Z"},
                {"id": "s1", "plan_id": "p1", "title": "Build", "description": null,
                 "status": "in_progress", "step_order": 1, "progress": 60,
                 "created_at": "2024-05-01T10:00:00Z", "updated_at": "2024-05-01T10:00:00Z"}
            ]
        }]"#,
    );

    let assert = pw_cmd()
        .args(["--base-url", &base_url, "snapshot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Release 2.0 (➤ In Progress) 0/2"))
        .stdout(predicate::str::contains("Ship the thing"))
        .stdout(predicate::str::contains("- ➤ In Progress Build (60%)"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.find("Build") < stdout.find("Tag"));
}

#[test]
fn test_cli_snapshot_empty() {
    let base_url = serve_once("200 OK", "[]");

    pw_cmd()
        .args(["snapshot", "--base-url", &base_url])
        .assert()
        .success()
        .stdout(predicate::str::contains("No plans yet."));
}

#[test]
fn test_cli_snapshot_reads_url_from_env() {
    let base_url = serve_once("200 OK", "[]");

    let mut cmd = Command::cargo_bin("pw").expect("Failed to find pw binary");
    cmd.args(["--no-color", "snapshot"])
        .env("PLANWATCH_URL", &base_url)
        .assert()
        .success()
        .stdout(predicate::str::contains("No plans yet."));
}

#[test]
fn test_cli_snapshot_server_error() {
    let base_url = serve_once("500 Internal Server Error", "{}");

    pw_cmd()
        .args(["--base-url", &base_url, "snapshot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to fetch snapshot"))
        .stderr(predicate::str::contains("HTTP 500"));
}

#[test]
fn test_cli_rejects_invalid_base_url() {
    pw_cmd()
        .args(["--base-url", "ftp://example.com", "snapshot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid URL"));
}

#[test]
fn test_cli_rejects_unknown_transport() {
    pw_cmd()
        .args(["--transport", "carrier-pigeon", "snapshot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid transport"));
}
