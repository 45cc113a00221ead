//! Command-line tests for the chart-lint binary.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// A command run from an empty directory, so no local config is picked up.
fn command(cwd: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("chart-lint").expect("Binary not found");
    cmd.current_dir(cwd.path()).env("NO_COLOR", "1");
    cmd
}

#[test]
fn clean_chart_exits_zero() {
    let cwd = TempDir::new().unwrap();
    command(&cwd)
        .arg(fixture("clean"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn syntax_error_exits_one() {
    let cwd = TempDir::new().unwrap();
    command(&cwd)
        .arg(fixture("albatross"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("deliberateSyntaxError"))
        .stdout(predicate::str::contains("HL3004"));
}

#[test]
fn warnings_only_fail_in_strict_mode() {
    let cwd = TempDir::new().unwrap();
    command(&cwd)
        .arg(fixture("unquoted"))
        .assert()
        .success()
        .stdout(predicate::str::contains("HL3006"));

    command(&cwd)
        .arg("--strict")
        .arg(fixture("unquoted"))
        .assert()
        .code(1);

    command(&cwd)
        .args(["--strict", "--no-fail"])
        .arg(fixture("unquoted"))
        .assert()
        .success();
}

#[test]
fn ignore_flag_removes_messages() {
    let cwd = TempDir::new().unwrap();
    command(&cwd)
        .args(["--ignore", "HL3006,HL3007", "-f", "compact"])
        .arg(fixture("unquoted"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn json_output_lists_every_chart() {
    let cwd = TempDir::new().unwrap();
    let output = command(&cwd)
        .args(["-f", "json"])
        .arg(fixture("clean"))
        .arg(fixture("unquoted"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = value.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["messages"].as_array().unwrap().len(), 0);
    assert_eq!(results[1]["warning_count"], 2);
    assert_eq!(results[1]["messages"][1]["code"], "HL3007");
}

#[test]
fn github_output_annotates_lines() {
    let cwd = TempDir::new().unwrap();
    command(&cwd)
        .args(["-f", "github"])
        .arg(fixture("unquoted"))
        .assert()
        .success()
        .stdout(predicate::str::contains("templates/deployment.yaml,line=4,title=HL3006::"));
}

#[test]
fn local_config_file_is_loaded() {
    let cwd = TempDir::new().unwrap();
    std::fs::write(
        cwd.path().join(".chartlint.yaml"),
        "failure-threshold: warning\n",
    )
    .unwrap();

    command(&cwd).arg(fixture("unquoted")).assert().code(1);
}

#[test]
fn missing_chart_fails() {
    let cwd = TempDir::new().unwrap();
    command(&cwd)
        .arg(cwd.path().join("no-such-chart"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("does not exist"));
}

#[test]
fn bad_config_exits_two() {
    let cwd = TempDir::new().unwrap();
    let config = cwd.path().join("broken.yaml");
    std::fs::write(&config, "failure-threshold: loud\n").unwrap();

    command(&cwd)
        .arg("-c")
        .arg(&config)
        .arg(fixture("clean"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown severity"));
}

#[test]
fn list_rules_prints_every_code() {
    let cwd = TempDir::new().unwrap();
    let mut assert = command(&cwd).arg("--list-rules").assert().success();
    for code in ["HL1001", "HL1002", "HL3001", "HL3004", "HL3006", "HL3007"] {
        assert = assert.stdout(predicate::str::contains(code));
    }
}

#[test]
fn commented_usage_in_helpers_is_not_linted() {
    let cwd = TempDir::new().unwrap();
    let chart = cwd.path().join("chart");
    std::fs::create_dir_all(chart.join("templates")).unwrap();
    std::fs::write(
        chart.join("templates/_helpers.tpl"),
        "{{/*\nUsage:\n  name: {{ include \"x.name\" . }}\n{{ end }}\n*/}}\n",
    )
    .unwrap();

    command(&cwd)
        .args(["--failure-threshold", "warning", "-f", "compact"])
        .arg(&chart)
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn unknown_format_is_a_usage_error() {
    let cwd = TempDir::new().unwrap();
    command(&cwd).args(["-f", "xml"]).assert().code(2);
}
