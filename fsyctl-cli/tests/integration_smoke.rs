//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

fn fsyctl() -> Command {
    let mut cmd = Command::cargo_bin("fsyctl").unwrap();
    // Keep developer .env files and config out of the picture.
    cmd.env_remove("DATABASE_URL")
        .env("HOME", std::env::temp_dir());
    cmd
}

#[test]
fn test_help_lists_commands() {
    fsyctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn test_version() {
    fsyctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_serve_help() {
    fsyctl()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Address to bind to"))
        .stdout(predicate::str::contains("--cors-permissive"));
}

#[test]
fn test_user_add_help() {
    fsyctl()
        .args(["user", "add", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--full-name"))
        .stdout(predicate::str::contains("Coordinator"));
}

#[test]
fn test_user_add_rejects_unknown_type() {
    fsyctl()
        .args([
            "user", "add", "--full-name", "A", "--email", "a@example.com", "--password", "pw",
            "--user-type", "Admin",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Admin"));
}

#[test]
fn test_export_members_help() {
    fsyctl()
        .args(["export", "members", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("company-members"));
}

#[test]
fn test_migrate_without_database_url_fails() {
    let dir = tempfile::tempdir().unwrap();
    fsyctl()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("migrate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL not set"));
}

#[test]
fn test_unknown_subcommand_fails() {
    fsyctl().arg("frobnicate").assert().failure();
}
