use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn ctxcopy() -> Command {
    let mut cmd = Command::cargo_bin("ctxcopy").expect("binary exists");
    cmd.env_remove("CTXCOPY_OUTPUT")
        .env_remove("CTXCOPY_CLIPBOARD")
        .env_remove("CTXCOPY_LOG");
    cmd
}

#[test]
fn help_displays_usage() {
    ctxcopy()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn headless_all_prints_sections() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("a.txt"), "alpha").unwrap();
    fs::create_dir_all(temp.path().join("node_modules/x")).unwrap();
    fs::write(temp.path().join("node_modules/x/index.js"), "skip").unwrap();

    ctxcopy()
        .arg(temp.path())
        .args(["--all", "--stdout", "--no-clipboard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## File: a.txt\n```\nalpha\n```\n"))
        .stdout(predicate::str::contains("skip").not())
        .stderr(predicate::str::contains("Extracted 1 files"));
}

#[test]
fn headless_select_writes_output_file() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("proj");
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("src/lib.rs"), "pub fn lib() {}").unwrap();
    fs::write(root.join("README.md"), "readme").unwrap();
    let output = temp.path().join("out/context.md");

    ctxcopy()
        .arg(&root)
        .args(["--select", "src", "--no-clipboard", "--output"])
        .arg(&output)
        .assert()
        .success();

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("pub fn lib() {}"));
    assert!(!written.contains("readme"));
}

#[test]
fn selecting_the_root_extracts_everything() {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src/lib.rs"), "pub fn lib() {}").unwrap();
    fs::write(temp.path().join("README.md"), "readme").unwrap();

    ctxcopy()
        .arg(temp.path())
        .args(["--select", ".", "--stdout", "--no-clipboard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pub fn lib() {}"))
        .stdout(predicate::str::contains("readme"))
        .stderr(predicate::str::contains("Extracted 2 files"));
}

#[test]
fn selecting_missing_path_fails() {
    let temp = tempfile::tempdir().unwrap();

    ctxcopy()
        .arg(temp.path())
        .args(["--select", "nope.txt", "--no-clipboard"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.txt"));
}

#[test]
fn workspace_config_extends_ignore_lists() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join(".ctxcopy")).unwrap();
    fs::write(
        root.join(".ctxcopy/config.toml"),
        "[ignore]\nextensions = [\".lock\"]\ndirectories = [\"generated\"]\n",
    )
    .unwrap();
    fs::create_dir_all(root.join("generated")).unwrap();
    fs::write(root.join("generated/out.rs"), "gen").unwrap();
    fs::write(root.join("Cargo.lock"), "lock").unwrap();
    fs::write(root.join("main.rs"), "fn main() {}").unwrap();

    ctxcopy()
        .arg(root)
        .args(["--all", "--stdout", "--no-clipboard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fn main() {}"))
        .stdout(predicate::str::contains("gen").not())
        .stdout(predicate::str::contains("lock").not());
}

#[test]
fn completions_are_generated() {
    ctxcopy()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ctxcopy"));
}
