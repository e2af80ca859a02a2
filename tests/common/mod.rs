//! Shared test helpers for udt-sync integration tests.
//!
//! All tests use temp directories, so nothing touches the real filesystem.
//! Each test writes its own exports via `write_export()`.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Create an empty temp directory to run in.
pub fn setup_dir() -> TempDir {
    TempDir::new().expect("failed to create temp dir")
}

/// Write a JSON export into `dir`, returning its file name.
pub fn write_export(dir: &Path, name: &str, doc: &Value) -> String {
    let text = serde_json::to_string_pretty(doc).expect("serialize export");
    std::fs::write(dir.join(name), text).expect("failed to write export");
    name.to_owned()
}

/// Read and parse a JSON file in `dir`.
pub fn read_json(dir: &Path, name: &str) -> Value {
    let text = std::fs::read_to_string(dir.join(name)).expect("failed to read output");
    serde_json::from_str(&text).expect("output is not JSON")
}

/// A UDT definition with the given members.
pub fn udt(name: &str, members: &[Value]) -> Value {
    json!({"name": name, "tagType": "UdtType", "tags": members})
}

/// A member tag with a value.
pub fn member(name: &str, value: Value) -> Value {
    json!({"name": name, "tagType": "AtomicTag", "value": value})
}

/// A standard export: synthetic `_types_` root holding the given nodes.
pub fn export(nodes: &[Value]) -> Value {
    json!({"name": "_types_", "tagType": "Folder", "tags": nodes})
}

/// A folder node.
pub fn folder(name: &str, nodes: &[Value]) -> Value {
    json!({"name": name, "tagType": "Folder", "tags": nodes})
}

/// Run udt-sync in `dir` with logging disabled.
pub fn udt_sync_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_udt-sync"))
        .args(args)
        .current_dir(dir)
        .env_remove("UDT_SYNC_LOG")
        .env_remove("UDT_SYNC_CONFIG")
        .output()
        .expect("failed to execute udt-sync")
}

/// Run udt-sync and assert it succeeds. Returns stdout as string.
pub fn udt_sync_ok(dir: &Path, args: &[&str]) -> String {
    let out = udt_sync_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "udt-sync {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    stdout.to_string()
}

/// Run udt-sync and assert it fails. Returns stderr as string.
pub fn udt_sync_fails(dir: &Path, args: &[&str]) -> String {
    let out = udt_sync_in(dir, args);
    assert!(
        !out.status.success(),
        "Expected udt-sync {} to fail, but it succeeded.\nstdout: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
    );
    String::from_utf8_lossy(&out.stderr).to_string()
}

/// Two exports where Motor differs only by a missing `rpmMax` member and
/// Pump exists only in the first file.
pub fn write_motor_pair(dir: &Path) {
    write_export(
        dir,
        "a.json",
        &export(&[folder(
            "Drives",
            &[
                udt(
                    "Motor",
                    &[member("rpm", json!(1800)), member("rpmMax", json!(3600))],
                ),
                udt("Pump", &[member("flow", json!(10))]),
            ],
        )]),
    );
    write_export(
        dir,
        "b.json",
        &export(&[folder("Drives", &[udt("Motor", &[member("rpm", json!(1800))])])]),
    );
}

/// Find a node by name anywhere below `node`.
pub fn find<'a>(node: &'a Value, name: &str) -> Option<&'a Value> {
    if node.get("name").and_then(Value::as_str) == Some(name) {
        return Some(node);
    }
    node.get("tags")
        .and_then(Value::as_array)?
        .iter()
        .find_map(|child| find(child, name))
}
