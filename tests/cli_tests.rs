//! Runs the `anyflow` binary against snapshot files on disk.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const LEAKY: &str = r#"{
    "file": "leaky.ts",
    "source": "function f(): Promise<string> {\n  return p;\n}\n",
    "types": [
        { "kind": "intrinsic", "name": "any" },
        { "kind": "intrinsic", "name": "string" },
        { "kind": "reference", "name": "Promise" },
        { "kind": "application", "base": 2, "args": [0] },
        { "kind": "application", "base": 2, "args": [1] },
        { "kind": "function", "return_type": 4 }
    ],
    "root": { "kind": "block", "statements": [
        { "kind": "function", "flavor": "declaration", "type": 5,
          "return_type": "Promise<string>", "start": 0, "length": 45,
          "body": { "kind": "block", "statements": [
              { "kind": "return", "start": 34, "length": 9,
                "expression": { "kind": "expression", "type": 3, "start": 41, "length": 1 } }
          ]}}
    ]}
}"#;

const CLEAN: &str = r#"{
    "file": "clean.ts",
    "types": [
        { "kind": "intrinsic", "name": "any" },
        { "kind": "intrinsic", "name": "unknown" },
        { "kind": "function", "return_type": 1 }
    ],
    "root": { "kind": "block", "statements": [
        { "kind": "function", "flavor": "arrow", "type": 2, "return_type": "unknown",
          "body": { "kind": "expression", "type": 1 } }
    ]}
}"#;

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write snapshot");
    path
}

fn anyflow(args: &[&str], files: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_anyflow"))
        .args(args)
        .args(files)
        .env_remove("ANYFLOW_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("binary runs")
}

#[test]
fn reports_findings_and_exits_nonzero() {
    let dir = tempfile::tempdir().expect("temp dir");
    let leaky = write(dir.path(), "leaky.json", LEAKY);

    let output = anyflow(&["--no-color"], &[&leaky]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains(
        "leaky.ts:2:3 - error AF7102: Unsafe return of type 'Promise<any>' from function with return type 'Promise<string>'."
    ));
    assert!(stdout.contains("Found 1 finding in 1 file."));
}

#[test]
fn clean_snapshot_exits_zero() {
    let dir = tempfile::tempdir().expect("temp dir");
    let clean = write(dir.path(), "clean.json", CLEAN);

    let output = anyflow(&[], &[&clean]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout.trim(), "Found 0 findings in 1 file.");
}

#[test]
fn json_output_lists_diagnostics() {
    let dir = tempfile::tempdir().expect("temp dir");
    let leaky = write(dir.path(), "leaky.json", LEAKY);
    let clean = write(dir.path(), "clean.json", CLEAN);

    let output = anyflow(&["--format", "json"], &[&leaky, &clean]);
    assert_eq!(output.status.code(), Some(1));

    let diagnostics: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    let diagnostics = diagnostics.as_array().expect("a JSON array");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["file"], "leaky.ts");
    assert_eq!(diagnostics[0]["code"], 7102);
    assert_eq!(diagnostics[0]["key"], "unsafeReturnAssignment");
    assert_eq!(diagnostics[0]["category"], "error");
    assert_eq!(diagnostics[0]["start"], 34);
    assert_eq!(diagnostics[0]["length"], 9);
}

#[test]
fn pretty_output_shows_the_source_line() {
    let dir = tempfile::tempdir().expect("temp dir");
    let leaky = write(dir.path(), "leaky.json", LEAKY);

    let output = anyflow(&["--pretty", "--no-color"], &[&leaky]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("    2     return p;"));
    assert!(stdout.contains("~~~~~~~~~"));
}

#[test]
fn missing_snapshot_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("missing.json");

    let output = anyflow(&[], &[&missing]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("failed to load snapshot"));
    assert!(stderr.contains("missing.json"));
}
