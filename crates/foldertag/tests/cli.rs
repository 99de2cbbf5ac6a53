#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use foldertagapp::test_utils::TestEnv;
use foldertagapp::vault::frontmatter;
use predicates::prelude::*;
use std::fs;

fn foldertag(env: &TestEnv) -> Command {
    let mut cmd = Command::new(cargo_bin("foldertag"));
    cmd.arg("--vault")
        .arg(&env.root)
        .env("XDG_CONFIG_HOME", env.path(".config"))
        .env_remove("FOLDERTAG_VAULT")
        .env_remove("FOLDERTAG_STATE_FILE")
        .env_remove("FOLDERTAG_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn tags(env: &TestEnv, path: &str) -> Vec<String> {
    frontmatter::read_tags(&env.read_note(path)).unwrap()
}

#[test]
fn test_rule_apply_undo_workflow() {
    let env = TestEnv::new();
    env.write_note("Projects/Garden/plan.md", "---\ntags: [spring]\n---\nDig.\n");

    foldertag(&env)
        .args(["rule", "set", "Projects", "-t", "project", "--levels", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added rule for Projects"));

    foldertag(&env)
        .args(["resolve", "Projects/Garden/plan.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#projects #project"));

    foldertag(&env)
        .args(["apply", "Projects"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+projects +project"));
    assert_eq!(
        tags(&env, "Projects/Garden/plan.md"),
        vec!["spring", "projects", "project"]
    );

    foldertag(&env)
        .args(["history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bulk"));

    foldertag(&env).args(["undo"]).assert().success();
    assert_eq!(tags(&env, "Projects/Garden/plan.md"), vec!["spring"]);
    assert!(env.read_note("Projects/Garden/plan.md").ends_with("Dig.\n"));
}

#[test]
fn test_preview_json() {
    let env = TestEnv::new();
    env.write_note("Work/a.md", "");

    foldertag(&env)
        .args(["rule", "set", "Work", "-t", "work"])
        .assert()
        .success();
    let output = foldertag(&env)
        .args(["preview", "Work/a.md", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let previews: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(previews[0]["path"], "Work/a.md");
    assert_eq!(previews[0]["to_add"][0], "work");
    // Preview never writes.
    assert_eq!(env.read_note("Work/a.md"), "");
}

#[test]
fn test_moved_with_continue_retags() {
    let env = TestEnv::new();
    env.write_note("Work/x.md", "");
    env.mkdir("Home");

    foldertag(&env)
        .args(["rule", "set", "Work", "-t", "work"])
        .assert()
        .success();
    foldertag(&env)
        .args(["rule", "set", "Home", "-t", "home"])
        .assert()
        .success();
    foldertag(&env).args(["apply", "Work/x.md"]).assert().success();

    fs::rename(env.path("Work/x.md"), env.path("Home/x.md")).unwrap();
    foldertag(&env)
        .args(["moved", "Work/x.md", "Home/x.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("needs a decision"));

    foldertag(&env)
        .args(["moved", "Work/x.md", "Home/x.md", "--action", "continue"])
        .assert()
        .success();
    assert_eq!(tags(&env, "Home/x.md"), vec!["home"]);
}

#[test]
fn test_orphans_are_listed_then_purged() {
    let env = TestEnv::new();
    env.write_note("Work/gone.md", "");
    foldertag(&env)
        .args(["rule", "set", "Work", "-t", "work"])
        .assert()
        .success();
    foldertag(&env).args(["apply", "Work"]).assert().success();
    fs::remove_file(env.path("Work/gone.md")).unwrap();

    foldertag(&env)
        .args(["orphans"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Work/gone.md"));
    foldertag(&env)
        .args(["orphans", "--purge"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Purged 1 orphaned tracking entry"));
    foldertag(&env)
        .args(["orphans"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No orphaned tracking entries"));
}

#[test]
fn test_invalid_rule_fails() {
    let env = TestEnv::new();
    foldertag(&env)
        .args(["rule", "set", "Work", "-t", "work", "--levels", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
    assert!(env.api().list_rules().rules.is_empty());
}

#[test]
fn test_undo_with_empty_history_fails() {
    let env = TestEnv::new();
    foldertag(&env).args(["undo"]).assert().failure();
}
