use crate::core::document::{Construct, Diagnostic, RawDocument, Span};
use crate::core::types::{Dialect, DiagnosticCategory, Severity};

pub mod groovy;
pub mod workflow_yaml;

/// Diagnostic code attached when a section degrades to a raw passthrough.
pub const EXTRACTION_DEGRADED: &str = "PS-EXT-001";

/// Extract typed constructs from a raw document using its dialect profile.
///
/// Extraction is tolerant: malformed sections become `Other` constructs with a
/// warning diagnostic, never a hard failure. Constructs come back in source
/// appearance order.
pub fn extract(doc: &RawDocument) -> (Vec<Construct>, Vec<Diagnostic>) {
    if doc.is_empty() {
        return (Vec::new(), Vec::new());
    }
    match doc.dialect() {
        Dialect::WorkflowYaml => workflow_yaml::extract(doc.text()),
        Dialect::GroovyPipeline => groovy::extract(doc.text()),
    }
}

pub(crate) fn degraded(span: Span, detail: impl Into<String>) -> Diagnostic {
    Diagnostic::new(
        EXTRACTION_DEGRADED,
        Severity::Warning,
        DiagnosticCategory::General,
        format!("section could not be parsed, passed through raw: {}", detail.into()),
    )
    .with_span(span)
}

/// Byte offset of the start of every line, including the first.
pub(crate) fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (idx, byte) in text.bytes().enumerate() {
        if byte == b'\n' && idx + 1 < text.len() {
            starts.push(idx + 1);
        }
    }
    starts
}

pub(crate) fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

pub(crate) fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Strip one level of matching single or double quotes.
pub(crate) fn unquote(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.len() >= 2 {
        let bytes = trimmed.as_bytes();
        if (bytes[0] == b'\'' && bytes[trimmed.len() - 1] == b'\'')
            || (bytes[0] == b'"' && bytes[trimmed.len() - 1] == b'"')
        {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}
