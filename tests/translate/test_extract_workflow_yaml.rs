use pipeshift::core::document::RawDocument;
use pipeshift::core::extract;
use pipeshift::core::types::{ConstructKind, Dialect, Severity};

const WORKFLOW: &str = r#"name: build and test
on:
  push:
    branches: [main, develop]
  pull_request:
env:
  CARGO_TERM_COLOR: always
jobs:
  test:
    runs-on: ubuntu-latest
    env:
      RUST_BACKTRACE: "1"
    strategy:
      matrix:
        toolchain: [stable, beta]
    steps:
      - uses: actions/checkout@v4
      - name: run tests
        run: cargo test --all
"#;

fn doc(text: &str) -> RawDocument {
    RawDocument::new(text, Dialect::WorkflowYaml)
}

#[test]
fn test_extracts_all_construct_kinds() {
    let (constructs, diagnostics) = extract::extract(&doc(WORKFLOW));
    assert!(diagnostics.is_empty());

    let kinds: Vec<ConstructKind> = constructs.iter().map(|c| c.kind).collect();
    assert!(kinds.contains(&ConstructKind::Trigger));
    assert!(kinds.contains(&ConstructKind::Job));
    assert!(kinds.contains(&ConstructKind::Step));
    assert!(kinds.contains(&ConstructKind::EnvBlock));
    assert!(kinds.contains(&ConstructKind::Matrix));
    assert!(kinds.contains(&ConstructKind::Other)); // the name key
}

#[test]
fn test_triggers_carry_event_and_filters() {
    let (constructs, _) = extract::extract(&doc(WORKFLOW));
    let push = constructs
        .iter()
        .find(|c| c.kind == ConstructKind::Trigger && c.identifier.as_deref() == Some("push"))
        .expect("push trigger");
    assert_eq!(push.attr("event"), Some("push"));
    assert_eq!(push.attr("branches"), Some("main, develop"));

    let pr = constructs
        .iter()
        .find(|c| c.identifier.as_deref() == Some("pull_request"))
        .expect("pull_request trigger");
    assert_eq!(pr.attr("event"), Some("pull_request"));
}

#[test]
fn test_job_children_carry_parent_attribute() {
    let (constructs, _) = extract::extract(&doc(WORKFLOW));
    let steps: Vec<_> = constructs
        .iter()
        .filter(|c| c.kind == ConstructKind::Step)
        .collect();
    assert_eq!(steps.len(), 2);
    assert!(steps.iter().all(|s| s.parent() == Some("test")));

    let matrix = constructs
        .iter()
        .find(|c| c.kind == ConstructKind::Matrix)
        .expect("matrix construct");
    assert_eq!(matrix.parent(), Some("test"));
    assert_eq!(matrix.attr("toolchain"), Some("stable, beta"));
}

#[test]
fn test_step_attributes_flattened() {
    let (constructs, _) = extract::extract(&doc(WORKFLOW));
    let checkout = constructs
        .iter()
        .find(|c| c.identifier.as_deref() == Some("actions/checkout@v4"))
        .expect("checkout step");
    assert_eq!(checkout.attr("uses"), Some("actions/checkout@v4"));

    let test_step = constructs
        .iter()
        .find(|c| c.identifier.as_deref() == Some("run tests"))
        .expect("named step");
    assert_eq!(test_step.attr("run"), Some("cargo test --all"));
}

#[test]
fn test_global_and_job_env_are_separate_constructs() {
    let (constructs, _) = extract::extract(&doc(WORKFLOW));
    let envs: Vec<_> = constructs
        .iter()
        .filter(|c| c.kind == ConstructKind::EnvBlock)
        .collect();
    assert_eq!(envs.len(), 2);
    let global = envs.iter().find(|e| e.parent().is_none()).expect("global env");
    assert_eq!(global.attr("CARGO_TERM_COLOR"), Some("always"));
    let job_env = envs.iter().find(|e| e.parent() == Some("test")).expect("job env");
    assert_eq!(job_env.attr("RUST_BACKTRACE"), Some("1"));
}

#[test]
fn test_spans_do_not_alias() {
    let (constructs, _) = extract::extract(&doc(WORKFLOW));
    let mut spans: Vec<_> = constructs
        .iter()
        .map(|c| c.span)
        .filter(|s| !s.is_empty())
        .collect();
    spans.sort_by_key(|s| s.start);
    for pair in spans.windows(2) {
        assert!(
            pair[0].end <= pair[1].start,
            "spans overlap: {:?} and {:?}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_malformed_section_degrades_not_fails() {
    let text = "on:\n  push:\njobs:\n  build: [::bad::\n";
    let (constructs, diagnostics) = extract::extract(&doc(text));
    // The push trigger survives even though the jobs section is broken.
    assert!(constructs.iter().any(|c| c.kind == ConstructKind::Trigger));
    assert!(constructs
        .iter()
        .any(|c| c.kind == ConstructKind::Other && c.identifier.as_deref() == Some("jobs")));
    assert!(diagnostics
        .iter()
        .any(|d| d.code == extract::EXTRACTION_DEGRADED && d.severity == Severity::Warning));
}

#[test]
fn test_empty_document_yields_nothing() {
    let (constructs, diagnostics) = extract::extract(&doc(""));
    assert!(constructs.is_empty());
    assert!(diagnostics.is_empty());
}

#[test]
fn test_string_trigger_form() {
    let (constructs, _) = extract::extract(&doc("on: push\n"));
    let trigger = constructs
        .iter()
        .find(|c| c.kind == ConstructKind::Trigger)
        .expect("trigger");
    assert_eq!(trigger.attr("event"), Some("push"));
}

#[test]
fn test_sequence_trigger_form() {
    let (constructs, _) = extract::extract(&doc("on: [push, pull_request]\n"));
    let events: Vec<_> = constructs
        .iter()
        .filter(|c| c.kind == ConstructKind::Trigger)
        .filter_map(|c| c.attr("event"))
        .collect();
    assert_eq!(events, vec!["push", "pull_request"]);
}
