//! End-to-end tests for `udt-sync sync`.
//!
//! Each test writes its exports into an isolated temp directory.

mod common;

use common::*;
use serde_json::{Value, json};

fn member_names(def: &Value) -> Vec<&str> {
    def["tags"]
        .as_array()
        .map(|tags| tags.iter().filter_map(|t| t["name"].as_str()).collect())
        .unwrap_or_default()
}

#[test]
fn merged_tree_written_to_output() {
    let dir = setup_dir();
    write_motor_pair(dir.path());

    let stdout = udt_sync_ok(dir.path(), &["sync", "a.json", "b.json", "-o", "merged.json"]);
    assert!(stdout.contains("Reference: a.json"), "stdout: {stdout}");

    let merged = read_json(dir.path(), "merged.json");
    assert_eq!(merged["name"], "_types_");
    assert_eq!(merged["tagType"], "Folder");
    let drives = find(&merged, "Drives").expect("Drives folder");
    assert_eq!(member_names(drives), vec!["Motor", "Pump"]);
}

#[test]
fn merged_tree_on_stdout_without_output_flag() {
    let dir = setup_dir();
    write_motor_pair(dir.path());

    let out = udt_sync_in(dir.path(), &["sync", "a.json", "b.json"]);
    assert!(out.status.success());
    let tree: Value = serde_json::from_slice(&out.stdout).expect("stdout is the merged tree");
    assert!(find(&tree, "Pump").is_some());

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("missing in b.json"), "stderr: {stderr}");
}

#[test]
fn reference_wins_without_union() {
    let dir = setup_dir();
    write_motor_pair(dir.path());

    udt_sync_ok(
        dir.path(),
        &["sync", "a.json", "b.json", "--reference", "b.json", "-o", "merged.json"],
    );
    let merged = read_json(dir.path(), "merged.json");
    let motor = find(&merged, "Motor").expect("Motor");
    assert_eq!(member_names(motor), vec!["rpm"]);
}

#[test]
fn union_restores_missing_member() {
    let dir = setup_dir();
    write_motor_pair(dir.path());

    udt_sync_ok(
        dir.path(),
        &[
            "sync", "a.json", "b.json", "--reference", "b.json", "--union", "Motor", "-o",
            "merged.json",
        ],
    );
    let merged = read_json(dir.path(), "merged.json");
    let motor = find(&merged, "Motor").expect("Motor");
    let mut names = member_names(motor);
    names.sort_unstable();
    assert_eq!(names, vec!["rpm", "rpmMax"]);
}

#[test]
fn union_all_applies_to_eligible_names() {
    let dir = setup_dir();
    write_motor_pair(dir.path());

    udt_sync_ok(
        dir.path(),
        &[
            "sync", "b.json", "a.json", "--union-all", "-o", "merged.json", "--report",
            "report.json",
        ],
    );
    let report = read_json(dir.path(), "report.json");
    assert_eq!(report["reference_file"], "b.json");
    assert_eq!(report["union_merged"], json!(["Motor"]));
    assert_eq!(report["merged_count"], 2);
}

#[test]
fn union_of_conflicting_values_keeps_reference() {
    let dir = setup_dir();
    write_export(
        dir.path(),
        "a.json",
        &export(&[udt("Motor", &[member("ratedVoltage", json!(480))])]),
    );
    write_export(
        dir.path(),
        "b.json",
        &export(&[udt("Motor", &[member("ratedVoltage", json!(600))])]),
    );

    let stdout = udt_sync_ok(
        dir.path(),
        &[
            "sync", "a.json", "b.json", "--union", "Motor", "-o", "merged.json", "--format",
            "json",
        ],
    );
    let report: Value = serde_json::from_str(&stdout).expect("json report");
    assert_eq!(report["union_merged"], json!([]));
    assert_eq!(report["differences"][0]["union_merge_eligible"], false);
    let unequal = &report["differences"][0]["variants"][0]["unequal_values"][0];
    assert_eq!(unequal["path"], "Motor/ratedVoltage/value");

    let merged = read_json(dir.path(), "merged.json");
    let motor = find(&merged, "Motor").expect("Motor");
    assert_eq!(motor["tags"][0]["value"], 480);
}

#[test]
fn glob_patterns_expand_in_sorted_order() {
    let dir = setup_dir();
    write_motor_pair(dir.path());

    let stdout = udt_sync_ok(
        dir.path(),
        &["sync", "*.json", "-o", "merged.out", "--format", "json"],
    );
    let report: Value = serde_json::from_str(&stdout).expect("json report");
    assert_eq!(report["reference_file"], "a.json");
    assert_eq!(report["files"], 2);
}

#[test]
fn invalid_json_names_the_file() {
    let dir = setup_dir();
    write_motor_pair(dir.path());
    std::fs::write(dir.path().join("broken.json"), "{ nope").unwrap();

    let stderr = udt_sync_fails(dir.path(), &["sync", "a.json", "broken.json"]);
    assert!(stderr.contains("broken.json"), "stderr: {stderr}");
}

#[test]
fn exports_without_definitions_fail() {
    let dir = setup_dir();
    write_export(dir.path(), "a.json", &export(&[folder("Empty", &[])]));

    let stderr = udt_sync_fails(dir.path(), &["sync", "a.json"]);
    assert!(stderr.contains("no UDT definitions"), "stderr: {stderr}");
}

#[test]
fn unknown_reference_fails() {
    let dir = setup_dir();
    write_motor_pair(dir.path());

    let stderr = udt_sync_fails(dir.path(), &["sync", "a.json", "--reference", "z.json"]);
    assert!(stderr.contains("not among the input files"), "stderr: {stderr}");
}

#[test]
fn config_sets_compact_output_and_root_name() {
    let dir = setup_dir();
    write_motor_pair(dir.path());
    std::fs::write(
        dir.path().join("udt-sync.toml"),
        "[policy]\ndefault_root_name = \"Merged\"\n\n[output]\npretty = false\n",
    )
    .unwrap();

    udt_sync_ok(dir.path(), &["sync", "a.json", "b.json", "-o", "merged.json"]);
    let text = std::fs::read_to_string(dir.path().join("merged.json")).unwrap();
    assert!(!text.contains('\n'), "expected compact output: {text}");
    let merged: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(merged["name"], "Merged");
}

#[test]
fn bad_config_reports_line() {
    let dir = setup_dir();
    write_motor_pair(dir.path());
    std::fs::write(dir.path().join("custom.toml"), "[output]\n\nbogus = 1\n").unwrap();

    let stderr = udt_sync_fails(
        dir.path(),
        &["--config", "custom.toml", "sync", "a.json", "b.json"],
    );
    assert!(stderr.contains("line 3"), "stderr: {stderr}");
}
