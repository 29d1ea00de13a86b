//! Serializes rewrite output into the destination workflow-YAML document.
//!
//! The emitted text is a header comment block (all info/warning diagnostics
//! grouped by category, plus comment fragments hoisted from the rules) followed
//! by the target document. serde_yaml does the serialization, so destination
//! quoting rules are honored without hand-rolled escaping. No diagnostic is
//! ever dropped: what is not in the header appears as a trailing comment.

use crate::core::document::Diagnostic;
use crate::core::rewrite::{FragmentBody, OutputFragment};
use crate::core::types::{ConstructKind, DiagnosticCategory};
use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

const BANNER: &str = "# Translated by pipeshift. Review before first use.";

#[derive(Default)]
struct JobAccumulator {
    attributes: Mapping,
    condition: Option<String>,
    matrix: Mapping,
    env: Mapping,
    steps: Vec<Value>,
}

/// Serialize fragments plus non-blocked diagnostics into the target text.
pub fn emit(fragments: &[OutputFragment], diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    out.push_str(BANNER);
    out.push('\n');
    render_header(fragments, diagnostics, &mut out);

    let (root, trailing) = assemble(fragments);
    if !root.is_empty() {
        out.push('\n');
        match serde_yaml::to_string(&Value::Mapping(root)) {
            Ok(body) => out.push_str(&body),
            Err(err) => {
                // serde_yaml cannot fail on string/mapping values, but never
                // drop the document silently if it somehow does.
                out.push_str(&format!("# serialization failed: {}\n", err));
            }
        }
    }
    for line in trailing {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn render_header(fragments: &[OutputFragment], diagnostics: &[Diagnostic], out: &mut String) {
    for category in DiagnosticCategory::ORDERED {
        let mut notes: Vec<String> = Vec::new();
        for fragment in fragments {
            if let FragmentBody::Comment { text, category: c } = &fragment.body {
                if *c == category {
                    notes.push(text.clone());
                }
            }
        }
        for diag in diagnostics {
            if diag.is_blocking() || diag.category != category {
                continue;
            }
            let mut note = format!("{} [{}]: {}", diag.severity, diag.code, diag.message);
            if let Some(suggestion) = &diag.suggestion {
                note.push_str(&format!(" (hint: {})", suggestion));
            }
            notes.push(note);
        }
        if notes.is_empty() {
            continue;
        }
        out.push_str("#\n");
        out.push_str(&format!("# {}:\n", category.header_title()));
        for note in notes {
            out.push_str(&format!("#   - {}\n", note));
        }
    }
}

fn assemble(fragments: &[OutputFragment]) -> (Mapping, Vec<String>) {
    let mut name: Option<String> = None;
    let mut permissions = Mapping::new();
    let mut triggers = Mapping::new();
    let mut global_env = Mapping::new();
    let mut jobs: IndexMap<String, JobAccumulator> = IndexMap::new();
    let mut trailing: Vec<String> = Vec::new();

    for fragment in fragments {
        match &fragment.body {
            FragmentBody::Comment { .. } => {} // hoisted into the header
            FragmentBody::Passthrough { raw } => {
                trailing.push("# unmapped original:".to_string());
                for line in raw.trim_end().lines() {
                    trailing.push(format!("#   {}", line));
                }
            }
            FragmentBody::Construct {
                kind,
                identifier,
                attributes,
            } => place_construct(
                *kind,
                identifier.as_deref(),
                attributes,
                &mut name,
                &mut permissions,
                &mut triggers,
                &mut global_env,
                &mut jobs,
                &mut trailing,
            ),
        }
    }

    let mut root = Mapping::new();
    if let Some(name) = name {
        root.insert(Value::from("name"), Value::from(name));
    }
    if !triggers.is_empty() {
        root.insert(Value::from("on"), Value::Mapping(triggers));
    }
    if !permissions.is_empty() {
        root.insert(Value::from("permissions"), Value::Mapping(permissions));
    }
    if !global_env.is_empty() {
        root.insert(Value::from("env"), Value::Mapping(global_env));
    }
    if !jobs.is_empty() {
        let mut jobs_map = Mapping::new();
        for (key, acc) in jobs {
            jobs_map.insert(Value::from(key), Value::Mapping(render_job(acc)));
        }
        root.insert(Value::from("jobs"), Value::Mapping(jobs_map));
    }
    (root, trailing)
}

#[allow(clippy::too_many_arguments)]
fn place_construct(
    kind: ConstructKind,
    identifier: Option<&str>,
    attributes: &IndexMap<String, String>,
    name: &mut Option<String>,
    permissions: &mut Mapping,
    triggers: &mut Mapping,
    global_env: &mut Mapping,
    jobs: &mut IndexMap<String, JobAccumulator>,
    trailing: &mut Vec<String>,
) {
    let parent = attributes.get("parent").cloned();
    match kind {
        ConstructKind::Trigger => {
            let event = attributes
                .get("event")
                .map(String::as_str)
                .or(identifier)
                .unwrap_or("workflow_dispatch")
                .to_string();
            let mut config = Mapping::new();
            for (key, value) in attributes {
                if key == "event" || key == "parent" {
                    continue;
                }
                insert_dotted(&mut config, key, list_or_scalar(value));
            }
            let config = if config.is_empty() {
                Value::Null
            } else if event == "schedule" {
                // Destination schedule triggers take a sequence of entries.
                Value::Sequence(vec![Value::Mapping(config)])
            } else {
                Value::Mapping(config)
            };
            merge_trigger(triggers, event, config);
        }
        ConstructKind::Job => {
            let key = job_key(identifier, jobs.len());
            let acc = jobs.entry(key).or_default();
            for (attr, value) in attributes {
                if attr == "parent" {
                    continue;
                }
                insert_dotted(&mut acc.attributes, attr, Value::from(value.clone()));
            }
        }
        ConstructKind::Step => {
            let acc = job_for(jobs, parent.as_deref(), trailing);
            let mut step = Mapping::new();
            for (attr, value) in attributes {
                if attr == "parent" {
                    continue;
                }
                insert_dotted(&mut step, attr, Value::from(value.clone()));
            }
            acc.steps.push(Value::Mapping(step));
        }
        ConstructKind::EnvBlock => {
            let target = match parent.as_deref() {
                Some(parent) => &mut job_for(jobs, Some(parent), trailing).env,
                None => global_env,
            };
            for (attr, value) in attributes {
                if attr == "parent" {
                    continue;
                }
                target.insert(Value::from(attr.clone()), Value::from(value.clone()));
            }
        }
        ConstructKind::Matrix => {
            let acc = job_for(jobs, parent.as_deref(), trailing);
            for (axis, values) in attributes {
                if axis == "parent" {
                    continue;
                }
                let items: Vec<Value> = values
                    .split(", ")
                    .filter(|item| !item.is_empty())
                    .map(Value::from)
                    .collect();
                acc.matrix.insert(Value::from(axis.clone()), Value::Sequence(items));
            }
        }
        ConstructKind::Conditional => {
            let acc = job_for(jobs, parent.as_deref(), trailing);
            if let Some(expr) = attributes.get("expression").or_else(|| attributes.get("if")) {
                acc.condition = Some(expr.clone());
            }
        }
        ConstructKind::Other => match identifier {
            Some("name") => {
                if let Some(value) = attributes.get("value") {
                    *name = Some(value.clone());
                }
            }
            Some("permissions") => {
                for (attr, value) in attributes {
                    permissions.insert(Value::from(attr.clone()), Value::from(value.clone()));
                }
            }
            _ => trailing.push(describe(kind, identifier, attributes)),
        },
        ConstructKind::Credential | ConstructKind::Artifact => {
            trailing.push(describe(kind, identifier, attributes));
        }
    }
}

fn render_job(acc: JobAccumulator) -> Mapping {
    let mut job = acc.attributes;
    let runs_on = Value::from("runs-on");
    if !job.contains_key(&runs_on) {
        job.insert(runs_on, Value::from("ubuntu-latest"));
    }
    if let Some(condition) = acc.condition {
        job.insert(Value::from("if"), Value::from(condition));
    }
    if !acc.matrix.is_empty() {
        let mut strategy = Mapping::new();
        strategy.insert(Value::from("matrix"), Value::Mapping(acc.matrix));
        job.insert(Value::from("strategy"), Value::Mapping(strategy));
    }
    if !acc.env.is_empty() {
        job.insert(Value::from("env"), Value::Mapping(acc.env));
    }
    if !acc.steps.is_empty() {
        job.insert(Value::from("steps"), Value::Sequence(acc.steps));
    }
    job
}

/// Job accumulator for a parent reference, creating a fallback job when a
/// step arrives with no enclosing job.
fn job_for<'a>(
    jobs: &'a mut IndexMap<String, JobAccumulator>,
    parent: Option<&str>,
    trailing: &mut Vec<String>,
) -> &'a mut JobAccumulator {
    let key = match parent {
        Some(parent) => job_key(Some(parent), jobs.len()),
        None => match jobs.keys().next_back().cloned() {
            Some(last) => last,
            None => {
                trailing.push("# orphan steps collected into job 'translated'".to_string());
                let acc = jobs.entry("translated".to_string()).or_default();
                acc.attributes
                    .insert(Value::from("runs-on"), Value::from("ubuntu-latest"));
                "translated".to_string()
            }
        },
    };
    jobs.entry(key).or_default()
}

/// Destination job keys must be identifier-shaped.
fn job_key(identifier: Option<&str>, ordinal: usize) -> String {
    let raw = match identifier {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => format!("job-{}", ordinal + 1),
    };
    let mut key: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    if key.starts_with(|c: char| c.is_ascii_digit()) {
        key.insert_str(0, "job-");
    }
    key
}

fn describe(
    kind: ConstructKind,
    identifier: Option<&str>,
    attributes: &IndexMap<String, String>,
) -> String {
    let attrs: Vec<String> = attributes
        .iter()
        .filter(|(key, _)| key.as_str() != "parent")
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    format!(
        "# {} {}: {}",
        kind,
        identifier.unwrap_or("(unnamed)"),
        attrs.join(" ")
    )
}

/// Several source triggers can land on the same destination event. Schedule
/// entries accumulate into one sequence and colliding configs merge key by
/// key, so no trigger is dropped from the emitted document.
fn merge_trigger(triggers: &mut Mapping, event: String, config: Value) {
    let key = Value::from(event);
    if !triggers.contains_key(&key) {
        triggers.insert(key, config);
        return;
    }
    let Some(existing) = triggers.get_mut(&key) else {
        return;
    };
    match (existing, config) {
        (_, Value::Null) => {}
        (slot @ Value::Null, incoming) => *slot = incoming,
        (Value::Sequence(entries), Value::Sequence(added)) => entries.extend(added),
        (Value::Sequence(entries), entry) => entries.push(entry),
        (Value::Mapping(current), Value::Mapping(incoming)) => {
            for (attr, value) in incoming {
                if current.contains_key(&attr) {
                    if let Some(slot) = current.get_mut(&attr) {
                        merge_value(slot, value);
                    }
                } else {
                    current.insert(attr, value);
                }
            }
        }
        (slot, incoming) => merge_value(slot, incoming),
    }
}

/// Colliding attribute values promote to a deduplicated sequence.
fn merge_value(current: &mut Value, incoming: Value) {
    if *current == incoming {
        return;
    }
    let mut items = match std::mem::take(current) {
        Value::Sequence(items) => items,
        scalar => vec![scalar],
    };
    match incoming {
        Value::Sequence(added) => {
            for item in added {
                if !items.contains(&item) {
                    items.push(item);
                }
            }
        }
        scalar => {
            if !items.contains(&scalar) {
                items.push(scalar);
            }
        }
    }
    *current = Value::Sequence(items);
}

/// Attribute values that were flattened from a source list (", " joined)
/// become sequences again; everything else stays scalar.
fn list_or_scalar(value: &str) -> Value {
    if value.contains(", ") {
        Value::Sequence(value.split(", ").map(Value::from).collect())
    } else {
        Value::from(value)
    }
}

fn insert_dotted(map: &mut Mapping, key: &str, value: Value) {
    let parts: Vec<&str> = key.split('.').collect();
    insert_path(map, &parts, value);
}

fn insert_path(map: &mut Mapping, parts: &[&str], value: Value) {
    if parts.len() == 1 {
        map.insert(Value::from(parts[0]), value);
        return;
    }
    let head = Value::from(parts[0]);
    if !matches!(map.get(&head), Some(Value::Mapping(_))) {
        map.insert(head.clone(), Value::Mapping(Mapping::new()));
    }
    if let Some(Value::Mapping(child)) = map.get_mut(&head) {
        insert_path(child, &parts[1..], value);
    }
}
