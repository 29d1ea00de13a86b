use pipeshift::core::error::AppError;
use pipeshift::core::types::{ErrorCategory, ErrorSeverity};

#[test]
fn test_error_creation_all_categories() {
    let categories = vec![
        ErrorCategory::SecurityRejected,
        ErrorCategory::MalformedRule,
        ErrorCategory::ValidationError,
        ErrorCategory::IoError,
        ErrorCategory::InternalError,
        ErrorCategory::Unknown,
    ];

    for category in categories {
        let error = AppError::new(category, "test message");
        assert_eq!(error.category, category);
        assert_eq!(error.message, "test message");
        assert_eq!(error.context.len(), 0);
        assert!(error.occurred_at <= chrono::Utc::now());
        assert!(error.source.is_none());
    }
}

#[test]
fn test_security_rejected_shape() {
    let error = AppError::security_rejected("reverse-shell risk: matched 'nc -e'");
    assert_eq!(error.category, ErrorCategory::SecurityRejected);
    assert_eq!(error.code, "PS-SECURITY-REJECTED");
    assert_eq!(error.severity(), ErrorSeverity::Error);
    assert!(!error.recovery_suggestions.is_empty());
}

#[test]
fn test_malformed_rule_shape() {
    let error = AppError::malformed_rule("rule 'x' references unknown construct kind 'gizmo'");
    assert_eq!(error.category, ErrorCategory::MalformedRule);
    assert_eq!(error.code, "PS-MALFORMED-RULE");
    assert!(error
        .recovery_suggestions
        .iter()
        .any(|s| s.contains("configuration defect")));
}

#[test]
fn test_error_context_round_trip() {
    let mut error = AppError::security_rejected("blocked content");
    error.add_context("pattern", "PS-SEC-003");
    error.add_context("excerpt", "nc -e /bin/sh");
    assert_eq!(error.context_value("pattern"), Some("PS-SEC-003"));
    assert_eq!(error.context_value("excerpt"), Some("nc -e /bin/sh"));
    assert_eq!(error.context_value("missing"), None);
}

#[test]
fn test_error_display_includes_code_and_context() {
    let mut error = AppError::new(ErrorCategory::ValidationError, "bad input").with_code("PS-TEST");
    error.add_context("field", "dialect");
    let rendered = format!("{}", error);
    assert!(rendered.contains("[PS-TEST]"));
    assert!(rendered.contains("bad input"));
    assert!(rendered.contains("dialect"));
}

#[test]
fn test_error_from_io_error() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
    let error: AppError = io.into();
    assert_eq!(error.category, ErrorCategory::IoError);
    assert!(error.source.is_some());
}

#[test]
fn test_error_from_anyhow() {
    let error: AppError = anyhow::anyhow!("boom").into();
    assert_eq!(error.category, ErrorCategory::InternalError);
    assert_eq!(error.message, "boom");
}

#[test]
fn test_with_source_preserves_chain() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error = AppError::with_source(ErrorCategory::IoError, "cannot read bundle", Box::new(io));
    let rendered = format!("{}", error);
    assert!(rendered.contains("Caused by"));
    assert!(rendered.contains("denied"));
}
