use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn webidl_index_cli() -> Command {
  let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("webidl-index-cli");
  cmd.timeout(Duration::from_secs(10));
  cmd
}

fn write(dir: &Path, name: &str, source: &str) {
  fs::write(dir.join(name), source).unwrap();
}

#[test]
fn parse_lists_types_per_library() {
  let dir = tempdir().unwrap();
  write(
    dir.path(),
    "dom.idl",
    "interface Node { readonly attribute unsigned short nodeType; };\nenum Mode { \"open\" };",
  );

  let assert = webidl_index_cli()
    .arg("parse")
    .arg(dir.path().join("dom.idl"))
    .assert()
    .success();
  let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
  assert!(stdout.contains("dom: 2 types"), "{stdout}");
  assert!(stdout.contains("  interface Node"), "{stdout}");
  assert!(stdout.contains("  enum Mode"), "{stdout}");
}

#[test]
fn parse_json_walks_directories() {
  let dir = tempdir().unwrap();
  write(dir.path(), "a.idl", "interface A { void f(long x); void f(DOMString x, long y); };");
  write(dir.path(), "b.idl", "partial interface A { attribute long extra; };");
  write(dir.path(), "notes.txt", "not idl");

  let assert = webidl_index_cli()
    .arg("parse")
    .arg(dir.path())
    .arg("--json")
    .assert()
    .success();
  let output: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  let libraries = output["libraries"].as_array().unwrap();
  assert_eq!(libraries.len(), 2);
  assert_eq!(libraries[0]["name"], "a");
  assert_eq!(libraries[1]["name"], "b");
  assert_eq!(libraries[0]["read_only"], true);

  let a = &libraries[0]["types"][0];
  assert_eq!(a["name"], "A");
  assert_eq!(a["kind"], "Interface");
  assert_eq!(a["operations"][0], "void f(any x, optional long y)");
  assert_eq!(a["properties"][0], "long extra");

  let shim = &libraries[1]["types"][0];
  assert_eq!(shim["kind"], "Partial");
  assert_eq!(shim["super_type"], "A");
  assert!(output.get("failures").is_none());
}

#[test]
fn shared_library_collects_every_file() {
  let dir = tempdir().unwrap();
  write(dir.path(), "one.idl", "interface One {};");
  write(dir.path(), "two.idl", "interface Two : One {};");

  let assert = webidl_index_cli()
    .arg("parse")
    .arg(dir.path())
    .args(["--library", "web platform", "--json"])
    .assert()
    .success();
  let output: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  let libraries = output["libraries"].as_array().unwrap();
  assert_eq!(libraries.len(), 1);
  assert_eq!(libraries[0]["name"], "web platform");
  assert_eq!(libraries[0]["types"].as_array().unwrap().len(), 2);
  assert_eq!(libraries[0]["types"][1]["super_type"], "One");
}

#[test]
fn parse_failure_is_reported_and_other_files_continue() {
  let dir = tempdir().unwrap();
  write(dir.path(), "bad.idl", "interface Broken {\n  attribute long x\n};");
  write(dir.path(), "good.idl", "interface Fine {};");

  let assert = webidl_index_cli()
    .arg("parse")
    .arg(dir.path())
    .assert()
    .failure()
    .code(1);
  let output = assert.get_output();
  let stdout = String::from_utf8_lossy(&output.stdout);
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stdout.contains("good: 1 types"), "{stdout}");
  assert!(!stdout.contains("bad:"), "{stdout}");
  assert!(stderr.contains("bad.idl"), "{stderr}");
  assert!(stderr.contains("IDL0001"), "{stderr}");
  assert!(stderr.contains("3:1"), "{stderr}");
}

#[test]
fn unknown_extended_attribute_fails() {
  let dir = tempdir().unwrap();
  write(dir.path(), "x.idl", "[Mystery] interface X {};");

  let assert = webidl_index_cli()
    .arg("parse")
    .arg(dir.path().join("x.idl"))
    .assert()
    .failure();
  let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
  assert!(stderr.contains("IDL0004"), "{stderr}");
  assert!(stderr.contains("Mystery"), "{stderr}");
}

#[test]
fn compare_prints_types_missing_from_baseline() {
  let baseline = tempdir().unwrap();
  let candidate = tempdir().unwrap();
  write(
    baseline.path(),
    "dom.idl",
    "interface Node {}; interface Element : Node { attribute Attr id; };",
  );
  write(
    candidate.path(),
    "dom.idl",
    "interface Node {}; interface Element : Node {}; interface Attr {}; interface Text : Node {};",
  );

  let assert = webidl_index_cli()
    .arg("compare")
    .arg("--baseline")
    .arg(baseline.path())
    .arg("--candidate")
    .arg(candidate.path())
    .assert()
    .success();
  let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
  let lines: Vec<&str> = stdout.lines().collect();
  assert_eq!(lines, vec!["Attr", "Text"]);
}

#[test]
fn trace_emits_json_spans_on_stderr() {
  let dir = tempdir().unwrap();
  write(dir.path(), "t.idl", "interface T { attribute Missing m; };");

  let assert = webidl_index_cli()
    .arg("parse")
    .arg(dir.path().join("t.idl"))
    .args(["--trace", "--json"])
    .assert()
    .success();
  let output = assert.get_output();
  serde_json::from_slice::<Value>(&output.stdout).expect("stdout stays valid JSON");
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("parse_idl"), "{stderr}");
  assert!(stderr.contains("synthesized placeholder type"), "{stderr}");
}
