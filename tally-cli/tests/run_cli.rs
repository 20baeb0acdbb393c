//! Binary-level tests for `tally run` and `tally users`.
//!
//! Every scenario here is network-free: weekend no-ops, date validation, and
//! registry listing never reach the HTTP adapters. The configured endpoints
//! point at closed local ports so an accidental adapter call fails fast
//! instead of leaving the sandbox.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CONFIG: &str = "\
tms:
  server: http://127.0.0.1:1
  database: tms_test
  username: bot@example.com
  password: hunter2
mailgun:
  domain: http://127.0.0.1:1/mailgun
  api_key: key-test
  from_email: noreply@example.com
operator_email: ops@example.com
";

const SEED: &str = "\
name,email,notify_email,phone
Alice,alice@example.com,,
Bob,bob@example.com,bob.alt@example.com,555-0001
";

fn home_with_config() -> TempDir {
    let home = TempDir::new().expect("tempdir");
    let dir = home.path().join(".tally");
    std::fs::create_dir_all(&dir).expect("mkdir");
    std::fs::write(dir.join("config.yaml"), CONFIG).expect("write config");
    home
}

fn tally(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tally").expect("binary");
    cmd.env("HOME", home.path());
    cmd
}

#[test]
fn malformed_date_fails_before_any_side_effect() {
    let home = home_with_config();

    tally(&home)
        .args(["run", "--date", "04-03-2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("wrong format for check date"));

    assert!(
        !home.path().join(".tally").join("ledger.json").exists(),
        "no ledger may be created for an invalid date"
    );
    assert!(!home.path().join(".tally").join("users.yaml").exists());
}

#[test]
fn weekend_run_succeeds_and_writes_nothing() {
    let home = home_with_config();
    std::fs::write(home.path().join(".tally").join("users.csv"), SEED).expect("write seed");

    // 2024-03-02 is a Saturday.
    tally(&home)
        .args(["run", "--date", "2024-03-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("weekend"));

    assert!(!home.path().join(".tally").join("ledger.json").exists());
    assert!(
        !home.path().join(".tally").join("users.yaml").exists(),
        "weekend run must not even seed the registry"
    );
}

#[test]
fn missing_config_is_a_clear_error() {
    let home = TempDir::new().expect("tempdir");

    tally(&home)
        .args(["run", "--date", "2024-03-04"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn explicit_config_path_is_honoured() {
    let home = TempDir::new().expect("tempdir");
    let config_path = home.path().join("elsewhere.yaml");
    std::fs::write(&config_path, CONFIG).expect("write config");

    // Weekend date: success without any ~/.tally/config.yaml present.
    tally(&home)
        .args(["run", "--date", "2024-03-03", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("weekend"));
}

#[test]
fn run_without_seed_fails_and_reports_the_missing_csv() {
    let home = home_with_config();

    // Weekday with an empty registry and no users.csv: the run fails, and
    // the best-effort operator alert (closed port) must not mask the error.
    tally(&home)
        .args(["run", "--date", "2024-03-04"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no seed file"));
}

#[test]
fn users_lists_the_seeded_registry() {
    let home = home_with_config();
    std::fs::write(home.path().join(".tally").join("users.csv"), SEED).expect("write seed");

    tally(&home)
        .arg("users")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("alice@example.com")
                .and(predicate::str::contains("bob.alt@example.com"))
                .and(predicate::str::contains("2 user(s)")),
        );

    assert!(
        home.path().join(".tally").join("users.yaml").exists(),
        "listing an empty registry seeds it"
    );
}

#[test]
fn users_json_is_machine_readable() {
    let home = home_with_config();
    std::fs::write(home.path().join(".tally").join("users.csv"), SEED).expect("write seed");

    let output = tally(&home)
        .args(["users", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let users: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(users.as_array().map(Vec::len), Some(2));
    assert_eq!(users[0]["name"], "Alice");
    assert_eq!(users[1]["notify_email"], "bob.alt@example.com");
}
