//! CLI behaviour tests: exit codes, output modes, config discovery

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn hamlet_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_hamlet"))
}

const UNITTEST_SRC: &str = "import unittest\n\n\nclass TestMath(unittest.TestCase):\n    def test_add(self):\n        self.assertEqual(1 + 1, 2)\n";

const PYTEST_SRC: &str = "import pytest\n\n@pytest.mark.parametrize(\"x\", [1, 2])\ndef test_positive(x):\n    assert x > 0\n";

fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn no_args_is_a_usage_error() {
    hamlet_cmd().assert().failure().code(2);
}

#[test]
fn missing_direction_is_an_error() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "test_math.py", UNITTEST_SRC);
    hamlet_cmd()
        .arg(&file)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("direction"));
}

#[test]
fn single_file_prints_transformed_source() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "test_math.py", UNITTEST_SRC);
    hamlet_cmd()
        .arg(&file)
        .arg("--direction")
        .arg("unittest-to-pytest")
        .assert()
        .success()
        .stdout(predicate::str::contains("def test_add():"))
        .stdout(predicate::str::contains("assert 1 + 1 == 2"));
}

#[test]
fn syntax_error_exits_1() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "test_bad.py", "def broken(:\n");
    hamlet_cmd()
        .arg(&file)
        .arg("--direction")
        .arg("fixture-to-xunit")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("PARSE-ERROR"));
}

#[test]
fn unknown_direction_exits_2() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "test_math.py", UNITTEST_SRC);
    hamlet_cmd()
        .arg(&file)
        .arg("--direction")
        .arg("sideways")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn write_mode_rewrites_in_place() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "test_math.py", UNITTEST_SRC);
    hamlet_cmd()
        .arg(dir.path())
        .arg("--direction")
        .arg("xunit-to-fixture")
        .arg("--write")
        .assert()
        .success();
    let rewritten = fs::read_to_string(&file).unwrap();
    assert!(rewritten.contains("def test_add():"));
    assert!(!rewritten.contains("unittest"));
}

#[test]
fn directory_without_mode_flag_is_an_error() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "test_a.py", UNITTEST_SRC);
    write_file(&dir, "test_b.py", UNITTEST_SRC);
    hamlet_cmd()
        .arg(dir.path())
        .arg("--direction")
        .arg("xunit-to-fixture")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--write"));
}

#[test]
fn check_mode_reports_pending_changes() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "test_math.py", UNITTEST_SRC);
    hamlet_cmd()
        .arg(&file)
        .arg("--direction")
        .arg("xunit-to-fixture")
        .arg("--check")
        .assert()
        .failure()
        .code(1);
    // file untouched by check
    assert_eq!(fs::read_to_string(&file).unwrap(), UNITTEST_SRC);

    // already in the target dialect: nothing to change
    hamlet_cmd()
        .arg(&file)
        .arg("--direction")
        .arg("pytest-to-unittest")
        .arg("--check")
        .assert()
        .success();
}

#[test]
fn json_report_lists_diagnostics() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "test_param.py", PYTEST_SRC);
    let output = hamlet_cmd()
        .arg(&file)
        .arg("--direction")
        .arg("pytest-to-unittest")
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(stdout.trim()).expect("valid JSON");
    let diagnostics = parsed[0]["diagnostics"].as_array().unwrap();
    assert!(!diagnostics.is_empty());
    assert_eq!(diagnostics[0]["category"], "UNCONVERTIBLE-PARAMETRIZE");
}

#[test]
fn direction_can_come_from_config() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "test_math.py", UNITTEST_SRC);
    write_file(&dir, ".hamletrc.json", r#"{"direction": "unittest-to-pytest"}"#);
    hamlet_cmd()
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("def test_add():"));
}

#[test]
fn quiet_mode_still_reports_diagnostics() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "test_param.py", PYTEST_SRC);
    hamlet_cmd()
        .arg(&file)
        .arg("--direction")
        .arg("pytest-to-unittest")
        .arg("--quiet")
        .assert()
        .success()
        .stderr(predicate::str::contains("UNCONVERTIBLE-PARAMETRIZE"));
}
