//! Binary-level CLI tests
//!
//! Exercise the `dh` binary end to end in a temporary project directory.
//! Nothing here talks to a real container engine.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn dh(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dh").expect("binary built");
    cmd.current_dir(dir.path());
    cmd
}

#[test]
fn test_generate_writes_build_and_ignore_files() {
    let dir = TempDir::new().expect("temp dir");

    dh(&dir)
        .args(["generate", "--framework", "react", "--port", "8080"])
        .assert()
        .success();

    let build_file = std::fs::read_to_string(dir.path().join("Dockerfile")).expect("build file written");
    assert!(build_file.contains("FROM node:18"));
    assert!(build_file.contains("EXPOSE 8080"));
    assert!(dir.path().join(".dockerignore").exists());
}

#[test]
fn test_generate_preview_writes_nothing() {
    let dir = TempDir::new().expect("temp dir");

    dh(&dir)
        .args(["generate", "--framework", "node", "--preview"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FROM node:18"));

    assert!(!dir.path().join("Dockerfile").exists());
    assert!(!dir.path().join(".dockerignore").exists());
}

#[test]
fn test_generate_without_framework_needs_manifest() {
    let dir = TempDir::new().expect("temp dir");

    dh(&dir).arg("generate").assert().failure();
}

#[test]
fn test_backup_and_undo_round_trip() {
    let dir = TempDir::new().expect("temp dir");

    dh(&dir).args(["generate", "--framework", "node"]).assert().success();
    dh(&dir).arg("backup").assert().success();

    // Clobber the build file, then restore the snapshot
    std::fs::write(dir.path().join("Dockerfile"), "scribbled\n").expect("clobber");
    dh(&dir).arg("undo").assert().success();

    let restored = std::fs::read_to_string(dir.path().join("Dockerfile")).expect("read");
    assert!(restored.contains("FROM node:18"));
}

#[test]
fn test_undo_unknown_backup_fails() {
    let dir = TempDir::new().expect("temp dir");

    dh(&dir).args(["generate", "--framework", "node"]).assert().success();
    dh(&dir).arg("backup").assert().success();

    dh(&dir).args(["undo", "no-such-backup.bak"]).assert().failure();
}

#[test]
fn test_undo_and_delete_on_empty_store_succeed() {
    let dir = TempDir::new().expect("temp dir");

    dh(&dir).arg("undo").assert().success();
    dh(&dir).arg("delete-backups").assert().success();
}

#[test]
fn test_generate_auto_backup_after_opt_in() {
    let dir = TempDir::new().expect("temp dir");

    // First generation with --backup opts the project in (build file does
    // not exist yet, so the store is created but stays empty)
    dh(&dir)
        .args(["generate", "--framework", "node", "--backup"])
        .assert()
        .success();
    let backups = dir.path().join(".dockhand/backups");
    assert!(backups.is_dir());
    assert_eq!(std::fs::read_dir(&backups).expect("read dir").count(), 0);

    // A later plain generation snapshots automatically because the store exists
    dh(&dir).args(["generate", "--framework", "node"]).assert().success();
    assert_eq!(std::fs::read_dir(&backups).expect("read dir").count(), 1);
}
