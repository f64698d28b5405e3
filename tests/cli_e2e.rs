//! End-to-end CLI tests for chatsync.
//!
//! These tests run the actual binary against temporary chat directories.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

// ============================================================================
// Test Fixtures
// ============================================================================

const RECORDS: &str = r#"[
  {"formattedName": "You", "messageTime": "2025-01-01 12:00:00", "messageType": "chat", "messageBody": "Hello from JSON!"},
  {"formattedName": "Alice", "messageTime": "2025-01-01 12:01:00", "messageType": "chat", "messageBody": "Hi there!"}
]"#;

const TRANSCRIPT: &str = "1/1/25, 12:00 - Mike: Hello from JSON!
1/1/25, 12:01 - Alice: Hi there!
1/1/25, 12:02 - Alice: New message from native
";

fn transcript_path(dir: &Path) -> std::path::PathBuf {
    dir.join("transcript").join("Chat with +1 555 010 0000.txt")
}

/// Creates a chat directory holding both exports and a self-identity list.
fn setup_chat() -> TempDir {
    let dir = tempdir().expect("Failed to create temp dir");
    fs::write(dir.path().join("messages.json"), RECORDS).unwrap();
    fs::create_dir_all(dir.path().join("transcript")).unwrap();
    fs::write(transcript_path(dir.path()), TRANSCRIPT).unwrap();
    fs::write(dir.path().join("self_identity.json"), r#"["Mike"]"#).unwrap();
    dir
}

fn chatsync() -> Command {
    Command::cargo_bin("chatsync").unwrap()
}

// ============================================================================
// Basic functionality
// ============================================================================

#[test]
fn test_help() {
    chatsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("CHAT_DIR"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_version() {
    chatsync()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_sync_example_chat() {
    let dir = setup_chat();

    chatsync()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged:     3 messages"))
        .stdout(predicate::str::contains("2 duplicates removed"));

    let transcript = fs::read_to_string(transcript_path(dir.path())).unwrap();
    assert_eq!(transcript.lines().count(), 3);
}

#[test]
fn test_second_run_reports_in_sync() {
    let dir = setup_chat();
    chatsync().arg(dir.path()).assert().success();

    chatsync()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Already in sync"));
}

#[test]
fn test_dry_run_leaves_files() {
    let dir = setup_chat();

    chatsync()
        .arg(dir.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert_eq!(
        fs::read_to_string(dir.path().join("messages.json")).unwrap(),
        RECORDS
    );
}

#[test]
fn test_self_config_flag() {
    let dir = setup_chat();
    fs::remove_file(dir.path().join("self_identity.json")).unwrap();
    let config_dir = tempdir().unwrap();
    let config = config_dir.path().join("me.json");
    fs::write(&config, r#"{"self": ["Mike"]}"#).unwrap();

    chatsync()
        .arg(dir.path())
        .arg("--self-config")
        .arg(&config)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged:     3 messages"));
}

#[test]
fn test_missing_media_is_a_warning() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("transcript")).unwrap();
    fs::write(
        dir.path().join("transcript/Chat.txt"),
        "1/1/25, 12:00 - Alice: photo.jpg (file attached)\n",
    )
    .unwrap();

    chatsync()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 missing"))
        .stderr(predicate::str::contains("photo.jpg"));
}

#[test]
fn test_quiet_hides_info_logs() {
    let dir = setup_chat();

    chatsync()
        .arg(dir.path())
        .arg("-q")
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("Merged exports").not());
}

// ============================================================================
// Error handling
// ============================================================================

#[test]
fn test_no_arguments() {
    chatsync().assert().failure();
}

#[test]
fn test_empty_directory_fails() {
    let dir = tempdir().unwrap();

    chatsync()
        .arg(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("❌ Error"))
        .stderr(predicate::str::contains("No chat sources found"));
}

#[test]
fn test_malformed_records_fail() {
    let dir = setup_chat();
    fs::write(dir.path().join("messages.json"), r#"{"oops": true}"#).unwrap();

    chatsync()
        .arg(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid record JSON format"));

    assert_eq!(
        fs::read_to_string(transcript_path(dir.path())).unwrap(),
        TRANSCRIPT
    );
}
