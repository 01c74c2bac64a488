//! CLI smoke tests for the `git-drift` binary.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

use crate::common::TestRepo;

fn git_drift(repo: &TestRepo) -> Command {
    let mut cmd = Command::cargo_bin("git-drift").unwrap();
    // Point config and git lookups at the sandbox so the host environment
    // cannot leak into the run.
    cmd.env("HOME", repo.scan_root())
        .env("XDG_CONFIG_HOME", repo.scan_root().join("xdg"))
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
        .env("GIT_CONFIG_SYSTEM", "/dev/null");
    cmd
}

#[test]
fn test_dirty_repo_is_reported() {
    let repo = TestRepo::new();
    repo.commit("one");
    fs::write(repo.path().join("file.txt"), "edited").unwrap();
    fs::write(repo.path().join("new.txt"), "untracked").unwrap();

    git_drift(&repo)
        .arg(repo.scan_root())
        .arg("--no-fetch")
        .assert()
        .success()
        .stdout(predicate::str::contains("[work]"))
        .stdout(predicate::str::contains("dirty:"))
        .stdout(predicate::str::contains("1 modified"))
        .stdout(predicate::str::contains("1 untracked"));
}

#[test]
fn test_out_of_sync_branch_is_reported() {
    let repo = TestRepo::new();
    repo.commit("one");
    repo.add_origin();
    repo.commit("two");
    repo.push();
    repo.reset_back(1);

    git_drift(&repo)
        .arg(repo.scan_root())
        .arg("--no-fetch")
        .assert()
        .success()
        .stdout(predicate::str::contains("out of sync:"))
        .stdout(predicate::str::contains("main is behind"));
}

#[test]
fn test_clean_repo_prints_nothing() {
    let repo = TestRepo::new();
    repo.commit("one");

    git_drift(&repo)
        .arg(repo.scan_root())
        .arg("--no-fetch")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_missing_root_fails() {
    let repo = TestRepo::new();

    git_drift(&repo)
        .arg("/definitely/not/a/real/path")
        .assert()
        .failure()
        .stderr(predicate::str::contains("path not found"));
}

#[test]
fn test_root_from_config_file() {
    let repo = TestRepo::new();
    repo.commit("one");
    fs::write(repo.path().join("new.txt"), "untracked").unwrap();

    let config_dir = repo.scan_root().join("xdg/git-drift");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!("root = {:?}\n", repo.scan_root()),
    )
    .unwrap();

    git_drift(&repo)
        .arg("--no-fetch")
        .assert()
        .success()
        .stdout(predicate::str::contains("[work]"))
        .stdout(predicate::str::contains("1 untracked"));
}
