use pipeshift::core::types::*;

#[test]
fn test_dialect_default() {
    assert_eq!(Dialect::default(), Dialect::WorkflowYaml);
}

#[test]
fn test_dialect_round_trips_through_parse() {
    for dialect in Dialect::ALL {
        assert_eq!(Dialect::parse(dialect.as_str()), Some(dialect));
    }
    assert_eq!(Dialect::parse("makefile"), None);
}

#[test]
fn test_construct_kind_round_trips_through_parse() {
    let kinds = vec![
        ConstructKind::Trigger,
        ConstructKind::Job,
        ConstructKind::Step,
        ConstructKind::EnvBlock,
        ConstructKind::Matrix,
        ConstructKind::Credential,
        ConstructKind::Conditional,
        ConstructKind::Artifact,
        ConstructKind::Other,
    ];
    for kind in kinds {
        assert_eq!(ConstructKind::parse(kind.as_str()), Some(kind));
    }
    assert_eq!(ConstructKind::parse("gizmo"), None);
}

#[test]
fn test_env_block_kind_is_kebab_case() {
    assert_eq!(ConstructKind::EnvBlock.as_str(), "env-block");
}

#[test]
fn test_severity_rank_ordering() {
    assert!(Severity::Blocked.rank() > Severity::Warning.rank());
    assert!(Severity::Warning.rank() > Severity::Info.rank());
}

#[test]
fn test_severity_display() {
    assert_eq!(format!("{}", Severity::Blocked), "Blocked");
    assert_eq!(format!("{}", Severity::Warning), "Warning");
}

#[test]
fn test_diagnostic_category_default() {
    assert_eq!(DiagnosticCategory::default(), DiagnosticCategory::General);
}

#[test]
fn test_diagnostic_category_header_order() {
    assert_eq!(
        DiagnosticCategory::ORDERED,
        [
            DiagnosticCategory::Triggers,
            DiagnosticCategory::Permissions,
            DiagnosticCategory::Agent,
            DiagnosticCategory::Security,
            DiagnosticCategory::General,
        ]
    );
}

#[test]
fn test_diagnostic_category_parse() {
    assert_eq!(
        DiagnosticCategory::parse("security"),
        Some(DiagnosticCategory::Security)
    );
    assert_eq!(DiagnosticCategory::parse("observability"), None);
}

#[test]
fn test_error_category_display() {
    let category = ErrorCategory::SecurityRejected;
    assert_eq!(format!("{:?}", category), "SecurityRejected");
}

#[test]
fn test_error_severity_display() {
    let severity = ErrorSeverity::Error;
    assert_eq!(format!("{:?}", severity), "Error");
}
