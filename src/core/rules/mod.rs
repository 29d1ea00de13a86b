use crate::core::document::Construct;
use crate::core::types::{ConstructKind, DiagnosticCategory};
use indexmap::IndexMap;
use regex::Regex;

pub mod loader;
pub use loader::{builtin, load_from_path, load_from_str};

pub const DEFAULT_PRIORITY: i32 = 100;

/// Placeholder template rendered against a matched construct.
///
/// Supported placeholders: `${id}`, `${kind}`, `${attr.NAME}`. Anything else
/// is rejected at bundle load time, never at rewrite time. A `${attr.NAME}`
/// whose attribute is absent on the matched construct renders as empty.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Id,
    Kind,
    Attr(String),
}

impl Template {
    /// Parse a template string; the error value is the offending placeholder.
    pub(crate) fn parse(raw: &str) -> Result<Template, String> {
        let mut segments = Vec::new();
        let mut rest = raw;
        while let Some(open) = rest.find("${") {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 2..];
            let close = after.find('}').ok_or_else(|| rest[open..].to_string())?;
            let name = &after[..close];
            let segment = match name {
                "id" => Segment::Id,
                "kind" => Segment::Kind,
                _ => match name.strip_prefix("attr.") {
                    Some(attr) if !attr.is_empty() => Segment::Attr(attr.to_string()),
                    _ => return Err(format!("${{{}}}", name)),
                },
            };
            segments.push(segment);
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }
        Ok(Template { segments })
    }

    pub fn render(&self, construct: &Construct) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Id => out.push_str(construct.identifier.as_deref().unwrap_or("")),
                Segment::Kind => out.push_str(construct.kind.as_str()),
                Segment::Attr(name) => out.push_str(construct.attr(name).unwrap_or("")),
            }
        }
        out
    }
}

/// Predicate over a construct's kind, identifier, and attributes.
#[derive(Debug)]
pub struct Matcher {
    pub kind: ConstructKind,
    pub identifier: Option<Regex>,
    pub attr_equals: IndexMap<String, String>,
    pub attr_present: Vec<String>,
}

impl Matcher {
    pub fn accepts(&self, construct: &Construct) -> bool {
        if construct.kind != self.kind {
            return false;
        }
        if let Some(pattern) = &self.identifier {
            match &construct.identifier {
                Some(id) if pattern.is_match(id) => {}
                _ => return false,
            }
        }
        for (key, expected) in &self.attr_equals {
            if construct.attr(key) != Some(expected.as_str()) {
                return false;
            }
        }
        self.attr_present
            .iter()
            .all(|key| construct.attr(key).is_some())
    }
}

/// One output fragment template of a rule.
///
/// `inherit` seeds the emitted construct with the matched construct's
/// identifier and attributes before templated attributes overlay them; it is
/// how normalization rules carry arbitrary source attributes forward.
#[derive(Debug)]
pub enum EmitTemplate {
    Construct {
        kind: ConstructKind,
        inherit: bool,
        identifier: Option<Template>,
        attributes: IndexMap<String, Template>,
    },
    Comment {
        text: Template,
        category: DiagnosticCategory,
    },
}

/// matcher + template + priority tuple governing one rewrite.
#[derive(Debug)]
pub struct RuleEntry {
    pub id: String,
    pub description: Option<String>,
    pub priority: i32,
    pub terminal: bool,
    pub matcher: Matcher,
    pub template: Vec<EmitTemplate>,
}

/// Ordered, immutable rule collection. Loaded once at startup; safe for any
/// number of concurrent readers afterwards.
#[derive(Debug, Default)]
pub struct RuleTable {
    entries: Vec<RuleEntry>,
}

impl RuleTable {
    pub(crate) fn new(entries: Vec<RuleEntry>) -> Self {
        RuleTable { entries }
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries accepting the construct, sorted by priority descending with
    /// terminal entries first among equal priority. Remaining ties keep bundle
    /// order (stable sort), so matching is fully deterministic.
    pub fn matches(&self, construct: &Construct) -> Vec<&RuleEntry> {
        let mut hits: Vec<&RuleEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.matcher.accepts(construct))
            .collect();
        hits.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.terminal.cmp(&a.terminal))
        });
        hits
    }
}
