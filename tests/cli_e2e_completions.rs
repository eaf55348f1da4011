//! End-to-end tests for the `applier completions` command.

#[allow(dead_code)]
mod common;
#[allow(unused_imports)]
use common::prelude::*;

#[test]
fn test_completions_help() {
    let mut cmd = cargo_bin_cmd!("applier");
    cmd.arg("completions")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Generate shell completion scripts",
        ))
        .stdout(predicate::str::contains("bash"))
        .stdout(predicate::str::contains("zsh"))
        .stdout(predicate::str::contains("fish"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = cargo_bin_cmd!("applier");
    cmd.arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("_applier()"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("custom-resources"));
}

#[test]
fn test_completions_fish() {
    let mut cmd = cargo_bin_cmd!("applier");
    cmd.arg("completions")
        .arg("fish")
        .assert()
        .success()
        .stdout(predicate::str::contains("complete -c applier"));
}

#[test]
fn test_completions_invalid_shell() {
    let mut cmd = cargo_bin_cmd!("applier");
    cmd.arg("completions")
        .arg("tcsh")
        .assert()
        .failure()
        .code(2);
}
