use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn data_dir() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../data/regulations")
        .display()
        .to_string()
}

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("verdict-preview").unwrap();
    cmd.env_remove("ANTHROPIC_API_KEY")
        .env("ADVISOR_REGULATIONS_DIR", data_dir());
    cmd
}

#[test]
fn rules_validate_accepts_the_shipped_data() {
    cmd()
        .args(["rules", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("36 rules across 6 files"));
}

#[test]
fn rules_validate_rejects_a_broken_directory() {
    let tmp = tempfile::TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("bad.json"),
        r#"{ "scope": "country", "code": "US", "rules": [] }"#,
    )
    .unwrap();

    cmd()
        .args(["rules", "validate", &tmp.path().display().to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty rules array"));
}

#[test]
fn taxonomy_list_prints_the_closed_set() {
    cmd()
        .args(["taxonomy", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("lithium_battery_spare")
                .and(predicate::str::contains("alcohol_beverage"))
                .and(predicate::str::contains("dry_ice")),
        );
}

#[test]
fn preview_without_an_api_key_takes_the_llm_error_fallback() {
    cmd()
        .args([
            "preview",
            "hair spray 350ml",
            "--from",
            "ICN",
            "--to",
            "LAX",
            "--json",
        ])
        .assert()
        .code(2)
        .stdout(
            predicate::str::contains("\"llm_error\": true")
                .and(predicate::str::contains("\"state\": \"needs_review\""))
                .and(predicate::str::contains("manual review required")),
        );
}

#[test]
fn preview_human_output_names_the_raised_flags() {
    cmd()
        .args(["preview", "hoodie", "--from", "ICN", "--to", "LAX"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("llm_error"));
}
