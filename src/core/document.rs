use crate::core::types::{ConstructKind, Dialect, DiagnosticCategory, Severity};
use indexmap::IndexMap;
use serde::Serialize;

/// Half-open byte range into the raw source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start.min(text.len())..self.end.min(text.len())]
    }
}

/// Unparsed source text plus its detected dialect. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct RawDocument {
    text: String,
    dialect: Dialect,
}

impl RawDocument {
    pub fn new(text: impl Into<String>, dialect: Dialect) -> Self {
        RawDocument {
            text: text.into(),
            dialect,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Attribute key holding the identifier of the enclosing construct, when any.
pub const PARENT_ATTR: &str = "parent";

/// Typed node extracted from a raw document.
///
/// Constructs are produced in source appearance order and never mutated after
/// extraction; rewriting produces fragments instead of editing constructs.
/// Spans are non-aliasing: each byte range belongs to at most one construct.
#[derive(Debug, Clone, Serialize)]
pub struct Construct {
    pub kind: ConstructKind,
    pub identifier: Option<String>,
    pub span: Span,
    pub attributes: IndexMap<String, String>,
}

impl Construct {
    pub fn new(kind: ConstructKind, span: Span) -> Self {
        Construct {
            kind,
            identifier: None,
            span,
            attributes: IndexMap::new(),
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Identifier of the enclosing construct, stored as a weak relation.
    pub fn parent(&self) -> Option<&str> {
        self.attr(PARENT_ATTR)
    }

    /// Display label used in diagnostics: identifier when present, kind otherwise.
    pub fn label(&self) -> String {
        match &self.identifier {
            Some(id) => format!("{} '{}'", self.kind, id),
            None => self.kind.to_string(),
        }
    }
}

/// Individual finding emitted by the scanner, extractor, or rewrite engine.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub category: DiagnosticCategory,
    pub message: String,
    pub span: Option<Span>,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(
        code: impl Into<String>,
        severity: Severity,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            code: code.into(),
            severity,
            category,
            message: message.into(),
            span: None,
            suggestion: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocked
    }
}
