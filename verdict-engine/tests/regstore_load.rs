mod common;

use verdict_engine::{Canonical, EngineError, RegulationIndex, Scope};

#[test]
fn shipped_data_directory_loads() {
    let index = RegulationIndex::load_dir(&common::shipped_regulations_dir()).unwrap();
    assert_eq!(index.file_count(), 6);
    assert_eq!(index.rule_count(), 36);
}

#[test]
fn find_returns_every_conditional_variant() {
    let index = RegulationIndex::load_dir(&common::shipped_regulations_dir()).unwrap();
    let rules = index.find(Scope::Airline, "KE", Canonical::BenignGeneral);
    assert_eq!(rules.len(), 2);
    assert!(rules.iter().all(|r| r.id.starts_with("airline:KE:benign_general#")));

    let spare = index.find(Scope::International, "", Canonical::LithiumBatterySpare);
    assert_eq!(spare.len(), 2);
}

#[test]
fn unknown_key_finds_nothing() {
    let index = RegulationIndex::load_dir(&common::shipped_regulations_dir()).unwrap();
    assert!(index.find(Scope::Airline, "ZZ", Canonical::Knife).is_empty());
}

#[test]
fn empty_rules_array_is_rejected() {
    let tmp = tempfile::TempDir::new().unwrap();
    common::write_file(
        tmp.path(),
        "bad.json",
        r#"{ "scope": "country", "code": "US", "rules": [] }"#,
    );
    let err = RegulationIndex::load_dir(tmp.path()).unwrap_err();
    assert!(matches!(err, EngineError::Data { .. }), "{err}");
    assert!(err.to_string().contains("bad.json"));
}

#[test]
fn out_of_enum_severity_is_rejected() {
    let tmp = tempfile::TempDir::new().unwrap();
    common::write_file(
        tmp.path(),
        "bad.json",
        r#"{
            "scope": "country",
            "code": "US",
            "rules": [
                { "item_category": "knife", "constraints": {}, "severity": "fatal" }
            ]
        }"#,
    );
    let err = RegulationIndex::load_dir(tmp.path()).unwrap_err();
    assert!(matches!(err, EngineError::Data { .. }), "{err}");
}

#[test]
fn out_of_enum_condition_value_is_rejected() {
    let tmp = tempfile::TempDir::new().unwrap();
    common::write_file(
        tmp.path(),
        "bad.json",
        r#"{
            "scope": "airline",
            "code": "KE",
            "rules": [
                {
                    "item_category": "knife",
                    "constraints": { "cabin_class": "steerage" },
                    "severity": "warn"
                }
            ]
        }"#,
    );
    assert!(RegulationIndex::load_dir(tmp.path()).is_err());
}

#[test]
fn unknown_item_category_is_rejected() {
    let tmp = tempfile::TempDir::new().unwrap();
    common::write_file(
        tmp.path(),
        "bad.json",
        r#"{
            "scope": "country",
            "code": "US",
            "rules": [
                { "item_category": "plasma_rifle", "constraints": {}, "severity": "block" }
            ]
        }"#,
    );
    assert!(RegulationIndex::load_dir(tmp.path()).is_err());
}

#[test]
fn colliding_condition_vectors_are_a_load_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    common::write_file(
        tmp.path(),
        "dupe.json",
        r#"{
            "scope": "country",
            "code": "US",
            "rules": [
                { "item_category": "knife", "constraints": {}, "severity": "warn" },
                { "item_category": "knife", "constraints": { "max_blade_length_cm": 6 }, "severity": "block" }
            ]
        }"#,
    );
    let err = RegulationIndex::load_dir(tmp.path()).unwrap_err();
    match err {
        EngineError::DuplicateRule { path, index } => {
            assert!(path.contains("dupe.json"));
            assert_eq!(index, 1);
        }
        other => panic!("expected DuplicateRule, got {other}"),
    }
}

#[test]
fn distinct_condition_vectors_under_one_key_are_fine() {
    let tmp = tempfile::TempDir::new().unwrap();
    common::write_file(
        tmp.path(),
        "ok.json",
        r#"{
            "scope": "country",
            "code": "US",
            "rules": [
                { "item_category": "knife", "constraints": { "route_type": "domestic" }, "severity": "warn" },
                { "item_category": "knife", "constraints": { "route_type": "international" }, "severity": "block" }
            ]
        }"#,
    );
    let index = RegulationIndex::load_dir(tmp.path()).unwrap();
    assert_eq!(index.find(Scope::Country, "US", Canonical::Knife).len(), 2);
}

#[test]
fn international_scope_must_not_carry_a_code() {
    let tmp = tempfile::TempDir::new().unwrap();
    common::write_file(
        tmp.path(),
        "bad.json",
        r#"{
            "scope": "international",
            "code": "XX",
            "rules": [
                { "item_category": "dry_ice", "constraints": {}, "severity": "warn" }
            ]
        }"#,
    );
    assert!(RegulationIndex::load_dir(tmp.path()).is_err());
}

#[test]
fn lowercase_country_code_is_rejected() {
    let tmp = tempfile::TempDir::new().unwrap();
    common::write_file(
        tmp.path(),
        "bad.json",
        r#"{
            "scope": "country",
            "code": "us",
            "rules": [
                { "item_category": "knife", "constraints": {}, "severity": "block" }
            ]
        }"#,
    );
    assert!(RegulationIndex::load_dir(tmp.path()).is_err());
}
