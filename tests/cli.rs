use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn eval_prints_each_top_level_result() {
    let mut cmd = Command::cargo_bin("qbscript").expect("binary exists");
    cmd.arg("eval").arg("(let x 7) (add x x)");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("7").and(predicate::str::contains("14")));
}

#[test]
fn run_evaluates_a_script_file() {
    let dir = tempdir().expect("create temp dir");
    let script = dir.path().join("triangle.qb");
    fs::write(
        &script,
        "(let tri (fun [n] (if (gt n 0) (add n (tri (add n -1))) 0)))\n(tri 10)\n",
    )
    .expect("write script");

    let mut cmd = Command::cargo_bin("qbscript").expect("binary exists");
    cmd.arg("run").arg(&script);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("55"));
}

#[test]
fn failed_forms_are_reported_and_set_the_exit_status() {
    let mut cmd = Command::cargo_bin("qbscript").expect("binary exists");
    cmd.arg("eval").arg("(let x 1) nope x");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unbound name `nope`"));
}

#[test]
fn syntax_errors_fail_before_evaluation() {
    let mut cmd = Command::cargo_bin("qbscript").expect("binary exists");
    cmd.arg("eval").arg("(add 1 2");
    cmd.assert().failure();
}
