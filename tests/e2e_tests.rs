//! End-to-end tests for the reqlint CLI
//!
//! These tests verify:
//! - Exit codes for clean, failing and fatal runs
//! - Text and JSON output
//! - Environment, policy and config-file options

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Command for the compiled binary with colors off
fn reqlint() -> Command {
    let mut cmd = Command::cargo_bin("reqlint").expect("binary should be built");
    cmd.arg("--no-color");
    cmd
}

/// Create a project directory holding one requirements.txt
fn create_test_project(content: &str) -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    fs::write(temp_dir.path().join("requirements.txt"), content).unwrap();
    temp_dir
}

fn manifest(dir: &TempDir) -> String {
    dir.path()
        .join("requirements.txt")
        .to_string_lossy()
        .into_owned()
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

const CLEAN: &str = "\
# Testing
pytest==7.2.0
black==22.10.0

# Documentation
mkdocs==1.4.2
";

mod exit_code_tests {
    use super::*;

    #[test]
    fn test_clean_manifest_exits_zero() {
        let dir = create_test_project(CLEAN);
        reqlint()
            .arg(manifest(&dir))
            .assert()
            .code(0)
            .stdout(predicate::str::contains(
                "Checked 1 file, 3 entries (3 active, 3 pinned): 0 errors, 0 warnings, 0 info",
            ));
    }

    #[test]
    fn test_errors_exit_one() {
        let dir = create_test_project("black==22.10.0\nblack==22.12.0\n");
        reqlint()
            .arg(manifest(&dir))
            .assert()
            .code(1)
            .stdout(predicate::str::contains("error[RL005 conflicting-pins]"))
            .stdout(predicate::str::contains("warning[RL004 duplicate-entry]"));
    }

    #[test]
    fn test_warnings_alone_exit_zero() {
        let dir = create_test_project("twine\n");
        reqlint()
            .arg(manifest(&dir))
            .assert()
            .code(0)
            .stdout(predicate::str::contains(":1: warning[RL003 unpinned]"));
    }

    #[test]
    fn test_deny_warnings_exits_one() {
        let dir = create_test_project("twine\n");
        reqlint()
            .args([manifest(&dir).as_str(), "--deny-warnings"])
            .assert()
            .code(1);
    }

    #[test]
    fn test_missing_manifest_exits_two() {
        let dir = tempfile::tempdir().unwrap();
        reqlint()
            .arg(dir.path().join("requirements.txt"))
            .assert()
            .code(2)
            .stderr(predicate::str::contains("error:"));
    }

    #[test]
    fn test_conflicting_flags_exit_two() {
        let dir = create_test_project(CLEAN);
        reqlint()
            .args([manifest(&dir).as_str(), "--strict", "--allow-unpinned"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("cannot be used together"));
    }

    #[test]
    fn test_help_and_version() {
        reqlint()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("requirements"));
        reqlint()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("reqlint"));
    }
}

mod json_output_tests {
    use super::*;

    fn run_json(dir: &TempDir, extra: &[&str]) -> serde_json::Value {
        let path = manifest(dir);
        let mut args = vec![path.as_str(), "--json"];
        args.extend_from_slice(extra);
        let output = reqlint().args(&args).output().unwrap();
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
    }

    #[test]
    fn test_json_schema() {
        let dir = create_test_project(
            "# Testing\ndatabases[sqlite]==0.6.2\ntrio==0.22.0rc1; python_version >= '3.11'\n",
        );
        let json = run_json(&dir, &["--python-version", "3.10"]);

        assert!(json["files"].is_array());
        assert_eq!(json["summary"]["entries"], 2);
        assert_eq!(json["summary"]["active_entries"], 1);

        let codes: Vec<&str> = json["diagnostics"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["RL009", "RL012"]);

        let trio = &json["entries"][1];
        assert_eq!(trio["name"], "trio");
        assert_eq!(trio["marker"], "python_version >= '3.11'");
        assert_eq!(trio["active"], false);
        assert_eq!(trio["section"], "Testing");
        assert_eq!(json["entries"][0]["extras"][0], "sqlite");
    }

    #[test]
    fn test_json_has_no_summary_text() {
        let dir = create_test_project(CLEAN);
        reqlint()
            .args([manifest(&dir).as_str(), "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Checked").not())
            .stdout(predicate::str::starts_with("{"));
    }
}

mod cli_options_tests {
    use super::*;

    #[test]
    fn test_python_version_activates_entry() {
        let dir = create_test_project("importlib-metadata==5.1.0; python_version < '3.8'\n");
        reqlint()
            .arg(manifest(&dir))
            .assert()
            .success()
            .stdout(predicate::str::contains("RL012"));
        reqlint()
            .args([manifest(&dir).as_str(), "--python-version", "3.7"])
            .assert()
            .success()
            .stdout(predicate::str::contains("RL012").not());
    }

    #[test]
    fn test_ignore_by_code_and_name() {
        let dir = create_test_project("twine\n--frobnicate\n");
        reqlint()
            .args([
                manifest(&dir).as_str(),
                "--ignore",
                "RL003",
                "--ignore",
                "unknown-option",
                "--deny-warnings",
            ])
            .assert()
            .code(0)
            .stdout(predicate::str::contains("0 warnings"));
    }

    #[test]
    fn test_unknown_rule_is_fatal() {
        let dir = create_test_project(CLEAN);
        reqlint()
            .args([manifest(&dir).as_str(), "--ignore", "RL999"])
            .assert()
            .code(2);
    }

    #[test]
    fn test_quiet_shows_errors_only() {
        let dir = create_test_project("twine\nbad name==1.0\n");
        reqlint()
            .args([manifest(&dir).as_str(), "--quiet"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("RL011"))
            .stdout(predicate::str::contains("RL003").not());
    }

    #[test]
    fn test_verbose_lists_entries() {
        let dir = create_test_project(CLEAN);
        reqlint()
            .args([manifest(&dir).as_str(), "--verbose"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[Documentation]"))
            .stdout(predicate::str::contains("mkdocs==1.4.2"));
    }

    #[test]
    fn test_verbose_lists_editables() {
        let dir = create_test_project("-e .[full]\nhttpx==0.23.3\n");
        reqlint()
            .args([manifest(&dir).as_str(), "--verbose"])
            .assert()
            .success()
            .stdout(predicate::str::is_match(r"-e \.\[full\]\s+editable").unwrap());
    }

    #[test]
    fn test_config_file_discovered() {
        let dir = create_test_project("twine\n");
        write(dir.path(), "reqlint.toml", "deny_warnings = true\n");
        reqlint().arg(manifest(&dir)).assert().code(1);

        write(
            dir.path(),
            "reqlint.toml",
            "deny_warnings = true\nallow_unpinned = [\"twine\"]\n",
        );
        reqlint().arg(manifest(&dir)).assert().code(0);
    }

    #[test]
    fn test_bad_config_is_fatal() {
        let dir = create_test_project(CLEAN);
        write(dir.path(), "reqlint.toml", "no_such_key = 1\n");
        reqlint().arg(manifest(&dir)).assert().code(2);
    }

    #[test]
    fn test_directory_argument() {
        let dir = create_test_project(CLEAN);
        write(dir.path(), "requirements-dev.txt", "-r requirements.txt\nruff==0.0.254\n");
        reqlint()
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Checked 2 files, 4 entries"));
    }
}
