use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn pancakes() -> PathBuf {
    fixture_path("recipes/pancakes.cook")
}

#[test]
fn parse_prints_text_by_default() {
    let mut cmd = cargo_bin_cmd!("cook");
    cmd.arg("parse").arg(pancakes()).arg("--no-color");

    let expected = predicate::str::contains("servings: 4")
        .and(predicate::str::contains("title: Pancakes"))
        .and(predicate::str::contains("> Rest the batter if you have time."))
        .and(predicate::str::contains(
            "1. Crack eggs into a bowl and whisk. Add flour and milk.",
        ))
        .and(predicate::str::contains(
            "2. Fry in a frying pan for 2 minutes per side.",
        ))
        .and(predicate::str::contains("- flour: 125 g"));

    cmd.assert().success().stdout(expected);
}

#[test]
fn bare_file_argument_means_parse() {
    let mut cmd = cargo_bin_cmd!("cook");
    cmd.arg(pancakes()).arg("--format").arg("json");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"cookware\""));
}

#[test]
fn check_reports_success_on_stderr() {
    let mut cmd = cargo_bin_cmd!("cook");
    cmd.arg("parse").arg(pancakes()).arg("--check");

    cmd.assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("parsed successfully"));
}

#[test]
fn parse_error_renders_diagnostic() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.cook");
    fs::write(&path, "Add @salt{1%tsp\nand stir\n").unwrap();

    let mut cmd = cargo_bin_cmd!("cook");
    cmd.arg("parse").arg(&path).arg("--no-color");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unclosed `{` in ingredient"))
        .stderr(predicate::str::contains("broken.cook"));
}

#[test]
fn missing_file_is_an_error() {
    let mut cmd = cargo_bin_cmd!("cook");
    cmd.arg("parse").arg("does-not-exist.cook");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("error: cannot read"));
}

#[test]
fn config_file_sets_default_format() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("cook.toml");
    fs::write(&config, "format = \"json\"\n").unwrap();

    let mut cmd = cargo_bin_cmd!("cook");
    cmd.arg("--config").arg(&config).arg("parse").arg(pancakes());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"sections\""));

    // The flag wins over the file.
    let mut cmd = cargo_bin_cmd!("cook");
    cmd.arg("--config")
        .arg(&config)
        .arg("parse")
        .arg(pancakes())
        .arg("--format")
        .arg("text");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"sections\"").not());
}

#[test]
fn bare_file_after_config_flag_means_parse() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("cook.toml");
    fs::write(&config, "format = \"json\"\n").unwrap();

    let mut cmd = cargo_bin_cmd!("cook");
    cmd.arg("--config").arg(&config).arg(pancakes());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"sections\""));
}

#[test]
fn cook_toml_in_working_directory_is_picked_up() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("cook.toml"), "format = \"debug\"\n").unwrap();

    let mut cmd = cargo_bin_cmd!("cook");
    cmd.current_dir(dir.path()).arg("parse").arg(pancakes());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Ingredient {"));
}

#[test]
fn invalid_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("cook.toml");
    fs::write(&config, "format = \"html\"\n").unwrap();

    let mut cmd = cargo_bin_cmd!("cook");
    cmd.arg("--config").arg(&config).arg("parse").arg(pancakes());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn canonical_corpus_passes() {
    let mut cmd = cargo_bin_cmd!("cook");
    cmd.arg("test")
        .arg(fixture_path("canonical.yaml"))
        .arg("--no-color");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("PASS  basicDirection"))
        .stderr(predicate::str::contains("test result: ok."))
        .stderr(predicate::str::contains("FAIL").not());
}

#[test]
fn corpus_filter_selects_tests() {
    let mut cmd = cargo_bin_cmd!("cook");
    cmd.arg("test")
        .arg(fixture_path("canonical.yaml"))
        .arg("--filter")
        .arg("timer")
        .arg("--no-color");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("PASS  timerDecimal"))
        .stderr(predicate::str::contains("basicDirection").not());
}

#[test]
fn corpus_failure_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("wrong.yaml"),
        r#"
version: 7
tests:
  wrongName:
    source: "Add @salt"
    result:
      steps:
        - - type: text
            value: "Add "
          - type: ingredient
            name: "pepper"
      metadata: {}
"#,
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("cook");
    cmd.arg("test").arg(dir.path()).arg("--no-color");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("FAIL  wrongName"))
        .stderr(predicate::str::contains("--- wrong::wrongName ---"))
        .stderr(predicate::str::contains("test result: FAILED. 0 passed, 1 failed (of 1)"));
}

#[test]
fn list_prints_test_names() {
    let mut cmd = cargo_bin_cmd!("cook");
    cmd.arg("test").arg(fixture_path("canonical.yaml")).arg("--list");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("canonical::singleWordTimer"));
}

#[test]
fn empty_corpus_directory_is_an_error() {
    let dir = TempDir::new().unwrap();

    let mut cmd = cargo_bin_cmd!("cook");
    cmd.arg("test").arg(dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no corpus files found"));
}
