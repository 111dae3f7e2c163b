use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const VALID: &str = r#"
run_id: "cli_check"
deals:
  seed: 1
  games: 1
agents:
  - name: "greedy"
    kind: "greedy"
outputs:
  jsonl: "out/{run_id}/games.jsonl"
  summary_md: "out/{run_id}/summary.md"
"#;

#[test]
fn validate_only_accepts_a_good_config() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("bench.yaml");
    fs::write(&path, VALID).expect("write config");

    Command::cargo_bin("klondike-bench")
        .expect("binary built")
        .current_dir(dir.path())
        .arg("--config")
        .arg(&path)
        .arg("--validate-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation-only mode"));

    assert!(!dir.path().join("out").exists(), "validation must not write outputs");
}

#[test]
fn validate_only_rejects_unknown_strategy() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("bench.yaml");
    fs::write(&path, VALID.replace("kind: \"greedy\"", "kind: \"minimax\"")).expect("write config");

    Command::cargo_bin("klondike-bench")
        .expect("binary built")
        .arg("--config")
        .arg(&path)
        .arg("--validate-only")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config"));
}

#[test]
fn cli_override_is_validated() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("bench.yaml");
    fs::write(&path, VALID).expect("write config");

    Command::cargo_bin("klondike-bench")
        .expect("binary built")
        .arg("--config")
        .arg(&path)
        .args(["--games", "0", "--validate-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("deals.games"));
}
