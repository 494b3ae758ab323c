#![allow(deprecated)]
//! CLI contract for `regterm`: decode, encode and report over files and stdin.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

/// `%{"name" => :ok, "items" => [1, 2, 3]}`
fn example_bytes() -> Vec<u8> {
    let mut bytes = vec![131, 116, 0, 0, 0, 2, 109, 0, 0, 0, 4];
    bytes.extend_from_slice(b"name");
    bytes.extend_from_slice(&[119, 2, b'o', b'k', 109, 0, 0, 0, 5]);
    bytes.extend_from_slice(b"items");
    bytes.extend_from_slice(&[107, 0, 3, 1, 2, 3]);
    bytes
}

fn regterm() -> Command {
    let mut cmd = Command::cargo_bin("regterm").unwrap();
    cmd.env_remove("REGISTRY_TERM_ALLOW_NEW_ATOMS")
        .env_remove("REGISTRY_TERM_MAX_DEPTH");
    cmd
}

#[test]
fn decode_file_prints_inspect_form() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("body.etf");
    fs::write(&path, example_bytes()).unwrap();

    regterm()
        .arg("decode")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"%{"name" => :ok, "items" => [1, 2, 3]}"#,
        ));
}

#[test]
fn decode_stdin_as_json() {
    let output = regterm()
        .args(["decode", "--json"])
        .write_stdin(example_bytes())
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["name"], "ok");
    assert_eq!(value["items"], serde_json::json!([1, 2, 3]));
}

#[test]
fn decode_empty_input_is_nil() {
    regterm()
        .arg("decode")
        .write_stdin(Vec::new())
        .assert()
        .success()
        .stdout(predicate::str::diff("nil\n"));
}

#[test]
fn decode_malformed_input_fails() {
    regterm()
        .arg("decode")
        .write_stdin(&b"garbage"[..])
        .assert()
        .code(6)
        .stderr(predicate::str::contains(
            "error: received malformed data from the registry",
        ));
}

#[test]
fn decode_port_is_rejected() {
    // [#Port<nonode@nohost.5>]
    let mut bytes = vec![131, 108, 0, 0, 0, 1, 89, 119, 13];
    bytes.extend_from_slice(b"nonode@nohost");
    bytes.extend_from_slice(&[0, 0, 0, 5, 0, 0, 0, 0, 106]);

    regterm()
        .arg("decode")
        .write_stdin(bytes)
        .assert()
        .code(6)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "error: received malformed data from the registry",
        ))
        .stderr(predicate::str::contains("disallowed port at depth 1"));
}

#[test]
fn decode_unknown_atom_needs_flag() {
    let bytes = vec![131, 119, 4, b'e', b'v', b'i', b'l'];
    regterm()
        .arg("decode")
        .write_stdin(bytes.clone())
        .assert()
        .code(6)
        .stderr(predicate::str::contains("unknown atom"));

    regterm()
        .args(["decode", "--allow-new-atoms"])
        .write_stdin(bytes)
        .assert()
        .success()
        .stdout(predicate::str::contains(":evil"));
}

#[test]
fn decode_respects_max_depth() {
    // [[[1]]]
    let bytes = vec![
        131, 108, 0, 0, 0, 1, 108, 0, 0, 0, 1, 108, 0, 0, 0, 1, 97, 1, 106, 106, 106,
    ];
    regterm()
        .args(["decode", "--max-depth", "2"])
        .write_stdin(bytes.clone())
        .assert()
        .code(6);
    regterm()
        .args(["decode", "--max-depth", "3"])
        .write_stdin(bytes)
        .assert()
        .success()
        .stdout(predicate::str::contains("[[[1]]]"));
}

#[test]
fn encode_then_decode_round_trip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("body.json");
    let output = dir.path().join("body.etf");
    fs::write(&input, r#"{"name": "decimal", "tags": ["a", "b"]}"#).unwrap();

    regterm()
        .arg("encode")
        .arg(&input)
        .arg("--compress")
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote"));

    let bytes = fs::read(&output).unwrap();
    assert_eq!(&bytes[..2], &[131, 80]);

    regterm()
        .args(["decode", "--json"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"decimal\""));
}

#[test]
fn encode_pairs_to_stdout() {
    let output = regterm()
        .args(["encode", "--pairs"])
        .write_stdin(r#"{"k": 1}"#)
        .output()
        .unwrap();
    assert!(output.status.success());
    // [{"k", 1}]
    assert_eq!(
        output.stdout,
        vec![131, 108, 0, 0, 0, 1, 104, 2, 109, 0, 0, 0, 1, b'k', 97, 1, 106]
    );
}

#[test]
fn encode_rejects_bad_json() {
    regterm()
        .arg("encode")
        .write_stdin("{not json")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid JSON input"));
}

#[test]
fn report_empty_body_prints_status() {
    regterm()
        .args(["report", "--status", "404"])
        .write_stdin(Vec::new())
        .assert()
        .success()
        .stdout(predicate::str::diff("Entity not found (404)\n"));
}

#[test]
fn report_validation_errors() {
    // %{"message" => "Validation error(s)", "errors" => %{"name" => "is taken"}}
    let mut bytes = vec![131, 116, 0, 0, 0, 2, 109, 0, 0, 0, 7];
    bytes.extend_from_slice(b"message");
    bytes.extend_from_slice(&[109, 0, 0, 0, 19]);
    bytes.extend_from_slice(b"Validation error(s)");
    bytes.extend_from_slice(&[109, 0, 0, 0, 6]);
    bytes.extend_from_slice(b"errors");
    bytes.extend_from_slice(&[116, 0, 0, 0, 1, 109, 0, 0, 0, 4]);
    bytes.extend_from_slice(b"name");
    bytes.extend_from_slice(&[109, 0, 0, 0, 8]);
    bytes.extend_from_slice(b"is taken");

    regterm()
        .args(["report", "--status", "422"])
        .write_stdin(bytes)
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "Validation error(s)\n  name: is taken\n",
        ));
}
