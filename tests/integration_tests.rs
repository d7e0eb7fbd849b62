//! End-to-end tests for the calctest binary
//!
//! Each test builds a scratch project (`bin/calc`, `tests/`) in a temp directory and runs the
//! real `calctest` executable inside it. The calculator is a small shell script, so these tests
//! only run on unix.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const CALC: &str = r#"#!/bin/sh
case "$1" in
  "2 + 2") echo 4 ;;
  "3 * 3") printf '  9  \n\n' ;;
  "10 / 4") echo 2.5 ;;
  "hang") exec sleep 30 ;;
  *) echo "args=$# first=$1" ;;
esac
"#;

struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let project = Self { dir };
        fs::create_dir_all(project.path().join("bin")).unwrap();
        fs::create_dir_all(project.path().join("tests")).unwrap();
        project.calc(CALC);
        project
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn calc(&self, script: &str) {
        self.executable(&Path::new("bin").join("calc"), script);
    }

    fn executable(&self, relative: &Path, script: &str) {
        let path = self.path().join(relative);
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn fixture(&self, nn: &str, input: &str, expected: Option<&str>) {
        let tests = self.path().join("tests");
        fs::write(tests.join(format!("operations_in_{nn}")), input).unwrap();
        if let Some(expected) = expected {
            fs::write(tests.join(format!("operations_out_{nn}")), expected).unwrap();
        }
    }

    fn result(&self, nn: &str) -> PathBuf {
        self.path().join("test_results").join(format!("operations_{nn}"))
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_calctest"))
            .args(["--no-color"])
            .args(args)
            .current_dir(self.path())
            .env_remove("RUST_LOG")
            .output()
            .unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_all_passing_exits_zero() {
    let project = Project::new();
    project.fixture("01", "2 + 2\n", Some("4\n"));
    project.fixture("02", "3 * 3", Some("9"));

    let output = project.run(&[]);
    let out = stdout(&output);
    assert_eq!(output.status.code(), Some(0), "{out}");
    assert!(out.contains("Total Tests: 2"));
    assert!(out.contains("Passed: 2"));
    assert!(!out.contains("Failed:"));
    assert!(out.contains("🎉 All tests passed!"));
}

#[test]
fn test_mismatch_writes_artifact() {
    let project = Project::new();
    project.fixture("01", "2 + 2", Some("5"));

    let output = project.run(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        fs::read_to_string(project.result("01")).unwrap(),
        "Input: 2 + 2\nExpected: 5\nGot: 4\n"
    );
    let out = stdout(&output);
    assert!(out.contains("Failed: 1"));
    assert!(out.contains("Check test_results/ directory for failed test details"));
}

#[test]
fn test_input_is_one_argument() {
    let project = Project::new();
    project.fixture("01", "1 + \"two\" ; echo $HOME", Some("args=1 first=1 + \"two\" ; echo $HOME"));

    let output = project.run(&[]);
    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));
}

#[test]
fn test_indices_run_in_ascending_order() {
    let project = Project::new();
    project.fixture("10", "2 + 2", Some("4"));
    project.fixture("02", "2 + 2", Some("4"));
    project.fixture("150", "10 / 4", Some("2.5"));

    let output = project.run(&[]);
    let out = stdout(&output);
    assert_eq!(output.status.code(), Some(0), "{out}");

    let order: Vec<&str> = out
        .lines()
        .filter_map(|l| l.strip_prefix("🔍 Running Test "))
        .collect();
    assert_eq!(order, vec!["02:", "10:", "150:"]);
}

#[test]
fn test_unpadded_fixture_names_resolve_to_padded_paths() {
    let project = Project::new();
    project.fixture("2", "2 + 2", Some("4"));

    let output = project.run(&[]);
    let out = stdout(&output);
    assert_eq!(output.status.code(), Some(1));
    assert!(out.contains("❌ Test 02: Input file tests/operations_in_02 not found"));
}

#[test]
fn test_bare_bin_name_runs_the_local_file() {
    let project = Project::new();
    project.executable(Path::new("calc"), "#!/bin/sh\necho local\n");
    project.fixture("01", "anything", Some("local"));

    let output = project.run(&["--bin", "calc"]);
    let out = stdout(&output);
    assert_eq!(output.status.code(), Some(0), "{out}");
    assert!(out.contains("✅ Test 01 PASSED"));
}

#[test]
fn test_missing_expected_is_reported_and_run_continues() {
    let project = Project::new();
    project.fixture("01", "2 + 2", Some("4"));
    project.fixture("03", "3 * 3", None);
    project.fixture("04", "10 / 4", Some("2.5"));

    let output = project.run(&["--format", "json"]);
    assert_eq!(output.status.code(), Some(1));

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["summary"]["total"], 3);
    assert_eq!(doc["summary"]["passed"], 2);
    assert_eq!(doc["summary"]["failed"], 1);
    assert_eq!(doc["cases"][1]["name"], "03");
    assert_eq!(doc["cases"][1]["reason"], "missing expected output");
    assert_eq!(doc["cases"][2]["passed"], true);
}

#[test]
fn test_timeout_is_a_failure() {
    let project = Project::new();
    project.fixture("01", "hang", Some("never"));
    project.fixture("02", "2 + 2", Some("4"));

    let output = project.run(&["--timeout", "1"]);
    let out = stdout(&output);
    assert_eq!(output.status.code(), Some(1));
    assert!(out.contains("❌ Test 01 FAILED - Program timed out"));
    assert!(out.contains("✅ Test 02 PASSED"));
    assert!(!project.result("01").exists());
}

#[test]
fn test_missing_executable_aborts() {
    let project = Project::new();
    project.fixture("01", "2 + 2", Some("4"));
    fs::remove_file(project.path().join("bin").join("calc")).unwrap();

    let output = project.run(&[]);
    let out = stdout(&output);
    assert_eq!(output.status.code(), Some(1));
    assert!(out.contains("❌ Error: program bin/calc not found"));
    assert!(!out.contains("Running Test"));
    assert!(!project.path().join("test_results").exists());
}

#[test]
fn test_missing_fixtures_dir_aborts() {
    let project = Project::new();
    fs::remove_dir_all(project.path().join("tests")).unwrap();

    let output = project.run(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("❌ Error: tests directory not found"));
}

#[test]
fn test_no_fixtures_exits_one() {
    let project = Project::new();

    let output = project.run(&[]);
    let out = stdout(&output);
    assert_eq!(output.status.code(), Some(1));
    assert!(out.contains("No tests found in tests/ directory"));
    assert!(!out.contains("Running Test"));
    assert!(!out.contains("TEST SUMMARY"));
}

#[test]
fn test_reruns_are_idempotent() {
    let project = Project::new();
    project.fixture("01", "2 + 2", Some("5"));
    project.fixture("02", "3 * 3", Some("9"));

    let first = project.run(&[]);
    let first_artifact = fs::read_to_string(project.result("01")).unwrap();
    let second = project.run(&[]);
    let second_artifact = fs::read_to_string(project.result("01")).unwrap();

    assert_eq!(first.status.code(), second.status.code());
    assert_eq!(stdout(&first), stdout(&second));
    assert_eq!(first_artifact, second_artifact);
    assert_eq!(second_artifact.lines().count(), 3);
}
