//! Grammar profile for workflow-style YAML documents.
//!
//! The document is split into top-level blocks by line scanning (so byte spans
//! survive), then each block is parsed standalone with serde_yaml. A block
//! that fails to parse degrades to a single `Other` construct with a warning
//! instead of failing the whole extraction.

use super::{degraded, indent_of, is_blank_or_comment, line_starts, unquote};
use crate::core::document::{Construct, Diagnostic, Span, PARENT_ATTR};
use crate::core::types::ConstructKind;
use serde_yaml::Value;

struct Block<'a> {
    key: String,
    span: Span,
    text: &'a str,
}

pub fn extract(text: &str) -> (Vec<Construct>, Vec<Diagnostic>) {
    let blocks = top_level_blocks(text);
    if blocks.is_empty() {
        let span = Span::new(0, text.len());
        return (
            vec![Construct::new(ConstructKind::Other, span)],
            vec![degraded(span, "no top-level keys found")],
        );
    }

    let mut constructs = Vec::new();
    let mut diagnostics = Vec::new();
    for block in &blocks {
        let value = match serde_yaml::from_str::<Value>(block.text) {
            Ok(Value::Mapping(map)) => map
                .into_iter()
                .next()
                .map(|(_, v)| v)
                .unwrap_or(Value::Null),
            Ok(other) => other,
            Err(err) => {
                constructs.push(
                    Construct::new(ConstructKind::Other, block.span)
                        .with_identifier(block.key.clone()),
                );
                diagnostics.push(degraded(block.span, format!("'{}': {}", block.key, err)));
                continue;
            }
        };
        match block.key.as_str() {
            "on" => extract_triggers(block, &value, &mut constructs),
            "env" => constructs.push(env_construct(block.span, &value, None)),
            "jobs" => extract_jobs(block, &value, text, &mut constructs, &mut diagnostics),
            _ => constructs.push(other_construct(block, &value)),
        }
    }
    (constructs, diagnostics)
}

fn top_level_blocks(text: &str) -> Vec<Block<'_>> {
    let starts = line_starts(text);
    let mut heads: Vec<(usize, String)> = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if is_blank_or_comment(line) || line.trim_end() == "---" {
            continue;
        }
        if indent_of(line) == 0 {
            if let Some(key) = key_of(line) {
                heads.push((i, key));
            }
        }
    }

    let mut blocks = Vec::new();
    for (n, (line_idx, key)) in heads.iter().enumerate() {
        let start = starts[*line_idx];
        let end = heads
            .get(n + 1)
            .map(|(next, _)| starts[*next])
            .unwrap_or(text.len());
        blocks.push(Block {
            key: key.clone(),
            span: Span::new(start, end),
            text: &text[start..end],
        });
    }
    blocks
}

fn key_of(line: &str) -> Option<String> {
    let trimmed = line.trim_end();
    let colon = trimmed.find(':')?;
    let key = unquote(trimmed[..colon].trim());
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    valid.then(|| key.to_string())
}

/// Entries at the first indent level below a block's header line.
/// Returns `(key, span)` pairs where the span covers the entry's whole body.
fn nested_entries(block_text: &str, base: usize) -> Vec<(String, Span)> {
    let starts = line_starts(block_text);
    let mut child_indent: Option<usize> = None;
    let mut heads: Vec<(usize, String)> = Vec::new();
    for (i, line) in block_text.lines().enumerate().skip(1) {
        if is_blank_or_comment(line) {
            continue;
        }
        let ind = indent_of(line);
        let child = *child_indent.get_or_insert(ind);
        if ind == child {
            if let Some(key) = key_of(line) {
                heads.push((i, key));
            }
        }
    }

    let mut entries = Vec::new();
    for (n, (line_idx, key)) in heads.iter().enumerate() {
        let start = base + starts[*line_idx];
        let end = heads
            .get(n + 1)
            .map(|(next, _)| base + starts[*next])
            .unwrap_or(base + block_text.len());
        entries.push((key.clone(), Span::new(start, end)));
    }
    entries
}

/// Spans of `- ` sequence items inside a section body.
fn sequence_items(section_text: &str, base: usize) -> Vec<Span> {
    let starts = line_starts(section_text);
    let mut item_indent: Option<usize> = None;
    let mut heads: Vec<usize> = Vec::new();
    for (i, line) in section_text.lines().enumerate() {
        if is_blank_or_comment(line) || !line.trim_start().starts_with("- ") {
            continue;
        }
        let ind = indent_of(line);
        let item = *item_indent.get_or_insert(ind);
        if ind == item {
            heads.push(i);
        }
    }

    let mut items = Vec::new();
    for (n, line_idx) in heads.iter().enumerate() {
        let start = base + starts[*line_idx];
        let end = heads
            .get(n + 1)
            .map(|next| base + starts[*next])
            .unwrap_or(base + section_text.len());
        items.push(Span::new(start, end));
    }
    items
}

fn extract_triggers(block: &Block<'_>, value: &Value, out: &mut Vec<Construct>) {
    match value {
        Value::String(event) => out.push(trigger(event, block.span)),
        Value::Sequence(items) => {
            for item in items {
                if let Some(event) = scalar(item) {
                    out.push(trigger(&event, name_span(block, &event)));
                }
            }
        }
        Value::Mapping(map) => {
            for (key, config) in map {
                let Some(event) = scalar(key) else { continue };
                let mut construct = trigger(&event, name_span(block, &event));
                flatten_attr_children(&mut construct, config, "");
                out.push(construct);
            }
        }
        _ => out.push(trigger("unknown", block.span)),
    }
}

fn trigger(event: &str, span: Span) -> Construct {
    Construct::new(ConstructKind::Trigger, span)
        .with_identifier(event)
        .with_attr("event", event)
}

/// Span of the first occurrence of a nested key name inside the block, used
/// so sibling triggers get distinct, non-aliasing spans.
fn name_span(block: &Block<'_>, needle: &str) -> Span {
    let body_start = block.text.find('\n').map(|p| p + 1).unwrap_or(0);
    match block.text[body_start..].find(needle) {
        Some(pos) => {
            let start = block.span.start + body_start + pos;
            Span::new(start, start + needle.len())
        }
        None => Span::new(block.span.end, block.span.end),
    }
}

fn env_construct(span: Span, value: &Value, parent: Option<&str>) -> Construct {
    let mut construct = Construct::new(ConstructKind::EnvBlock, span);
    if let Some(parent) = parent {
        construct = construct.with_attr(PARENT_ATTR, parent);
    }
    if let Value::Mapping(map) = value {
        for (key, val) in map {
            if let (Some(key), Some(val)) = (scalar(key), scalar(val)) {
                construct.attributes.insert(key, val);
            }
        }
    }
    construct
}

fn other_construct(block: &Block<'_>, value: &Value) -> Construct {
    let mut construct =
        Construct::new(ConstructKind::Other, block.span).with_identifier(block.key.clone());
    if let Some(val) = scalar(value) {
        construct.attributes.insert("value".to_string(), val);
    } else {
        flatten_attr_children(&mut construct, value, "");
    }
    construct
}

fn extract_jobs(
    block: &Block<'_>,
    value: &Value,
    text: &str,
    out: &mut Vec<Construct>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if !matches!(value, Value::Mapping(_)) {
        out.push(Construct::new(ConstructKind::Other, block.span).with_identifier("jobs"));
        diagnostics.push(degraded(block.span, "'jobs' is not a mapping"));
        return;
    }

    for (job_name, entry_span) in nested_entries(block.text, block.span.start) {
        let job_value = value.get(job_name.as_str());
        let entry_text = &text[entry_span.start..entry_span.end];
        let sections = nested_entries(entry_text, entry_span.start);

        // The job construct owns only its header line; nested sections get
        // their own constructs so spans never alias.
        let header_end = entry_text
            .find('\n')
            .map(|p| entry_span.start + p + 1)
            .unwrap_or(entry_span.end);
        let mut job = Construct::new(ConstructKind::Job, Span::new(entry_span.start, header_end))
            .with_identifier(job_name.clone());
        if let Some(Value::Mapping(map)) = job_value {
            for (key, val) in map {
                let Some(key) = scalar(key) else { continue };
                if matches!(key.as_str(), "steps" | "strategy" | "env") {
                    continue;
                }
                flatten_attr(&mut job, &key, val);
            }
        }
        out.push(job);

        for (section, section_span) in &sections {
            match section.as_str() {
                "env" => {
                    let env_value = job_value.and_then(|j| j.get("env"));
                    if let Some(env_value) = env_value {
                        out.push(env_construct(*section_span, env_value, Some(&job_name)));
                    }
                }
                "strategy" => {
                    let matrix = job_value
                        .and_then(|j| j.get("strategy"))
                        .and_then(|s| s.get("matrix"));
                    if let Some(matrix) = matrix {
                        let mut construct = Construct::new(ConstructKind::Matrix, *section_span)
                            .with_attr(PARENT_ATTR, job_name.clone());
                        flatten_attr_children(&mut construct, matrix, "");
                        out.push(construct);
                    }
                }
                "steps" => {
                    let steps_value = job_value.and_then(|j| j.get("steps"));
                    let section_text = &text[section_span.start..section_span.end];
                    let item_spans = sequence_items(section_text, section_span.start);
                    for (idx, item_span) in item_spans.iter().enumerate() {
                        let step_value = steps_value.and_then(|s| s.get(idx));
                        out.push(step_construct(*item_span, step_value, &job_name, idx));
                    }
                }
                _ => {}
            }
        }
    }
}

fn step_construct(span: Span, value: Option<&Value>, job: &str, index: usize) -> Construct {
    let mut construct =
        Construct::new(ConstructKind::Step, span).with_attr(PARENT_ATTR, job.to_string());
    if let Some(Value::Mapping(map)) = value {
        for (key, val) in map {
            let Some(key) = scalar(key) else { continue };
            flatten_attr(&mut construct, &key, val);
        }
    }
    let identifier = construct
        .attr("name")
        .or_else(|| construct.attr("uses"))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}-step-{}", job, index + 1));
    construct.with_identifier(identifier)
}

/// Flatten one attribute value: scalars directly, scalar sequences joined
/// with ", ", mappings recursed with dotted keys.
fn flatten_attr(construct: &mut Construct, key: &str, value: &Value) {
    match value {
        Value::Mapping(map) => {
            for (sub_key, sub_val) in map {
                if let Some(sub_key) = scalar(sub_key) {
                    flatten_attr(construct, &format!("{}.{}", key, sub_key), sub_val);
                }
            }
        }
        Value::Sequence(items) => {
            let scalars: Vec<String> = items.iter().filter_map(scalar).collect();
            if scalars.len() == items.len() {
                construct
                    .attributes
                    .insert(key.to_string(), scalars.join(", "));
            } else {
                for item in items {
                    flatten_attr(construct, key, item);
                }
            }
        }
        _ => {
            if let Some(val) = scalar(value) {
                construct.attributes.insert(key.to_string(), val);
            }
        }
    }
}

fn flatten_attr_children(construct: &mut Construct, value: &Value, prefix: &str) {
    if let Value::Mapping(map) = value {
        for (key, val) in map {
            if let Some(key) = scalar(key) {
                let full = if prefix.is_empty() {
                    key
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_attr(construct, &full, val);
            }
        }
    } else if let Value::Sequence(items) = value {
        for item in items {
            flatten_attr_children(construct, item, prefix);
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
