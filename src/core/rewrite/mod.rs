use crate::core::document::{Construct, Diagnostic, RawDocument};
use crate::core::rules::{EmitTemplate, RuleEntry, RuleTable};
use crate::core::types::{ConstructKind, DiagnosticCategory, Severity};
use indexmap::IndexMap;
use serde::Serialize;

/// Diagnostic code attached when no rule matches a construct.
pub const UNMAPPED_CONSTRUCT: &str = "PS-RWR-001";

/// One unit of rewriter output, tagged with the index of the source construct
/// it was produced from. Every extracted construct is represented by at least
/// one fragment; nothing disappears silently.
#[derive(Debug, Clone, Serialize)]
pub struct OutputFragment {
    pub provenance: usize,
    pub body: FragmentBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FragmentBody {
    Construct {
        kind: ConstructKind,
        identifier: Option<String>,
        attributes: IndexMap<String, String>,
    },
    Comment {
        text: String,
        category: DiagnosticCategory,
    },
    Passthrough {
        raw: String,
    },
}

/// Apply the rule table to each construct in source order.
///
/// Matches fire in priority order and their fragments concatenate; a terminal
/// match short-circuits, suppressing every lower-priority match for that
/// construct. Unmatched constructs pass through raw with an
/// `UnmappedConstruct` warning. Output is byte-identical across runs for the
/// same inputs: iteration order is source order and match order is the
/// table's deterministic sort.
pub fn rewrite(
    doc: &RawDocument,
    constructs: &[Construct],
    table: &RuleTable,
) -> (Vec<OutputFragment>, Vec<Diagnostic>) {
    let mut fragments = Vec::new();
    let mut diagnostics = Vec::new();

    for (index, construct) in constructs.iter().enumerate() {
        let matches = table.matches(construct);
        if matches.is_empty() {
            fragments.push(OutputFragment {
                provenance: index,
                body: FragmentBody::Passthrough {
                    raw: construct.span.slice(doc.text()).to_string(),
                },
            });
            diagnostics.push(
                Diagnostic::new(
                    UNMAPPED_CONSTRUCT,
                    Severity::Warning,
                    DiagnosticCategory::General,
                    format!(
                        "no rule matched {}; original text passed through as a comment",
                        construct.label()
                    ),
                )
                .with_span(construct.span),
            );
            continue;
        }

        let before = fragments.len();
        for entry in &matches {
            apply(entry, construct, index, &mut fragments);
            if entry.terminal {
                break;
            }
        }

        // A rule with an empty template would otherwise drop the construct
        // without a trace; keep provenance intact with an explicit note.
        if fragments.len() == before {
            fragments.push(OutputFragment {
                provenance: index,
                body: FragmentBody::Comment {
                    text: format!("{} removed during translation", construct.label()),
                    category: DiagnosticCategory::General,
                },
            });
        }
    }

    (fragments, diagnostics)
}

fn apply(
    entry: &RuleEntry,
    construct: &Construct,
    index: usize,
    fragments: &mut Vec<OutputFragment>,
) {
    tracing::trace!(rule = %entry.id, construct = %construct.label(), "rule applied");
    for emit in &entry.template {
        let body = match emit {
            EmitTemplate::Construct {
                kind,
                inherit,
                identifier,
                attributes,
            } => {
                let mut out_attrs = if *inherit {
                    construct.attributes.clone()
                } else {
                    IndexMap::new()
                };
                for (key, template) in attributes {
                    let rendered = template.render(construct);
                    if rendered.is_empty() {
                        out_attrs.shift_remove(key);
                    } else {
                        out_attrs.insert(key.clone(), rendered);
                    }
                }
                let rendered_id = identifier
                    .as_ref()
                    .map(|template| template.render(construct))
                    .filter(|rendered| !rendered.is_empty());
                FragmentBody::Construct {
                    kind: *kind,
                    identifier: rendered_id
                        .or_else(|| inherit.then(|| construct.identifier.clone()).flatten()),
                    attributes: out_attrs,
                }
            }
            EmitTemplate::Comment { text, category } => FragmentBody::Comment {
                text: text.render(construct),
                category: *category,
            },
        };
        fragments.push(OutputFragment {
            provenance: index,
            body,
        });
    }
}
