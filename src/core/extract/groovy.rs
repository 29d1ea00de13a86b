//! Grammar profile for Groovy-style declarative pipeline DSL.
//!
//! This is not a Groovy parser. It is a brace-aware scanner that recognizes
//! the declarative sections (agent, triggers, environment, stages, steps) and
//! degrades anything else to raw passthrough, which is all the translation
//! rules can act on anyway.

use super::{degraded, unquote};
use crate::core::document::{Construct, Diagnostic, Span, PARENT_ATTR};
use crate::core::types::ConstructKind;
use regex::Regex;

struct GroovyBlock {
    header_start: usize,
    arg: Option<String>,
    body: Span,
}

impl GroovyBlock {
    /// Span covering the whole block, braces included.
    fn full(&self) -> Span {
        Span::new(self.header_start, self.body.end + 1)
    }

    /// Span covering only the header line, for constructs whose children are
    /// extracted separately (spans must not alias).
    fn header(&self) -> Span {
        Span::new(self.header_start, self.body.start)
    }
}

pub fn extract(text: &str) -> (Vec<Construct>, Vec<Diagnostic>) {
    let mut constructs = Vec::new();
    let mut diagnostics = Vec::new();

    let whole = Span::new(0, text.len());
    let Some(pipeline) = find_block(text, whole, "pipeline") else {
        constructs.push(Construct::new(ConstructKind::Other, whole));
        diagnostics.push(degraded(whole, "no pipeline block found"));
        return (constructs, diagnostics);
    };
    let body = pipeline.body;
    let stages = find_block(text, body, "stages");

    // A stage-scoped agent must not surface as a pipeline-level one, so the
    // top-level search stops where the stages block begins.
    let agent_scope = match &stages {
        Some(stages) => Span::new(body.start, stages.header_start),
        None => body,
    };
    if let Some((span, description)) = find_agent(text, agent_scope) {
        constructs.push(
            Construct::new(ConstructKind::Other, span)
                .with_identifier("agent")
                .with_attr("agent", description),
        );
    }

    if let Some(triggers) = find_block(text, body, "triggers") {
        extract_trigger_calls(text, triggers.body, &mut constructs);
    }

    if let Some(env) = find_block(text, body, "environment") {
        constructs.push(environment_construct(text, &env, None));
    }

    for section in ["options", "parameters", "tools", "post"] {
        if let Some(block) = find_block(text, body, section) {
            constructs.push(
                Construct::new(ConstructKind::Other, block.full())
                    .with_identifier(section)
                    .with_attr("block", condense(block.body.slice(text))),
            );
        }
    }

    match stages {
        Some(stages) => {
            let mut cursor = stages.body.start;
            let mut index = 0usize;
            while let Some(stage) =
                find_block(text, Span::new(cursor, stages.body.end), "stage")
            {
                index += 1;
                cursor = stage.body.end + 1;
                extract_stage(text, &stage, index, &mut constructs, &mut diagnostics);
            }
            if index == 0 {
                diagnostics.push(degraded(stages.full(), "stages block contains no stage"));
            }
        }
        None => {
            diagnostics.push(degraded(pipeline.full(), "pipeline has no stages block"));
        }
    }

    constructs.sort_by_key(|c| c.span.start);
    (constructs, diagnostics)
}

fn extract_stage(
    text: &str,
    stage: &GroovyBlock,
    index: usize,
    out: &mut Vec<Construct>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let stage_id = stage
        .arg
        .clone()
        .unwrap_or_else(|| format!("stage-{}", index));

    let mut job = Construct::new(ConstructKind::Job, stage.header()).with_identifier(stage_id.clone());
    if let Some((_, agent)) = find_agent(text, stage.body) {
        job = job.with_attr("agent", agent);
    }
    out.push(job);

    if let Some(when) = find_block(text, stage.body, "when") {
        let mut conditional = Construct::new(ConstructKind::Conditional, when.full())
            .with_attr(PARENT_ATTR, stage_id.clone());
        let when_body = when.body.slice(text);
        if let Some(branch) = capture(r#"branch\s+['"]([^'"]+)['"]"#, when_body) {
            conditional = conditional.with_attr("branch", branch);
        } else {
            conditional = conditional.with_attr("expression", condense(when_body));
        }
        out.push(conditional);
    }

    if let Some(env) = find_block(text, stage.body, "environment") {
        out.push(environment_construct(text, &env, Some(&stage_id)));
    }

    if let Some(matrix) = find_block(text, stage.body, "matrix") {
        out.push(matrix_construct(text, &matrix, &stage_id));
    }

    match find_block(text, stage.body, "steps") {
        Some(steps) => extract_steps(text, steps.body, &stage_id, out),
        None => {
            if find_block(text, stage.body, "matrix").is_none() {
                diagnostics.push(degraded(stage.full(), format!("stage '{}' has no steps", stage_id)));
            }
        }
    }
}

fn extract_steps(text: &str, body: Span, stage_id: &str, out: &mut Vec<Construct>) {
    let slice = body.slice(text);
    let mut offset = 0usize;
    let mut skip_until = 0usize;
    for line in slice.split_inclusive('\n') {
        let line_start = body.start + offset;
        offset += line.len();
        if line_start < skip_until {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed == "}" || trimmed.starts_with("//") {
            continue;
        }
        let Some((verb, rest)) = split_statement(trimmed) else {
            continue;
        };
        let line_span = Span::new(line_start, line_start + line.trim_end().len());

        match verb {
            "withCredentials" => {
                out.push(
                    Construct::new(ConstructKind::Credential, line_span)
                        .with_identifier("withCredentials")
                        .with_attr(PARENT_ATTR, stage_id.to_string())
                        .with_attr("binding", condense(strip_call(rest))),
                );
            }
            "archiveArtifacts" => {
                let mut artifact = Construct::new(ConstructKind::Artifact, line_span)
                    .with_identifier("archiveArtifacts")
                    .with_attr(PARENT_ATTR, stage_id.to_string());
                if let Some(pattern) = capture(r#"artifacts:\s*['"]([^'"]+)['"]"#, rest) {
                    artifact = artifact.with_attr("artifacts", pattern);
                } else {
                    artifact = artifact.with_attr("artifacts", unquote(strip_call(rest)).to_string());
                }
                out.push(artifact);
            }
            "script" => {
                // Consume the whole script block as one opaque step.
                let open = text[line_start..body.end].find('{').map(|p| line_start + p);
                let end = open
                    .and_then(|o| matching_brace(text, o + 1))
                    .unwrap_or(line_span.end);
                skip_until = end + 1;
                out.push(
                    Construct::new(ConstructKind::Step, Span::new(line_start, end + 1))
                        .with_identifier("script")
                        .with_attr(PARENT_ATTR, stage_id.to_string())
                        .with_attr("body", condense(&text[open.map(|o| o + 1).unwrap_or(line_start)..end])),
                );
            }
            _ => {
                out.push(
                    Construct::new(ConstructKind::Step, line_span)
                        .with_identifier(verb.to_string())
                        .with_attr(PARENT_ATTR, stage_id.to_string())
                        .with_attr("command", unquote(strip_call(rest)).to_string()),
                );
            }
        }
    }
}

fn environment_construct(text: &str, block: &GroovyBlock, parent: Option<&str>) -> Construct {
    let mut construct = Construct::new(ConstructKind::EnvBlock, block.full());
    if let Some(parent) = parent {
        construct = construct.with_attr(PARENT_ATTR, parent);
    }
    let assign = Regex::new(r"(?m)^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.+)$")
        .expect("environment assignment pattern compiles");
    for caps in assign.captures_iter(block.body.slice(text)) {
        construct
            .attributes
            .insert(caps[1].to_string(), unquote(&caps[2]).to_string());
    }
    construct
}

fn matrix_construct(text: &str, block: &GroovyBlock, stage_id: &str) -> Construct {
    let mut construct =
        Construct::new(ConstructKind::Matrix, block.full()).with_attr(PARENT_ATTR, stage_id.to_string());
    let mut cursor = block.body.start;
    while let Some(axis) = find_block(text, Span::new(cursor, block.body.end), "axis") {
        cursor = axis.body.end + 1;
        let axis_body = axis.body.slice(text);
        let Some(name) = capture(r#"name\s+['"]([^'"]+)['"]"#, axis_body) else {
            continue;
        };
        let values = capture(r"values\s+(.+)", axis_body)
            .map(|raw| {
                raw.split(',')
                    .map(|v| unquote(v).to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        construct.attributes.insert(name, values);
    }
    construct
}

fn extract_trigger_calls(text: &str, body: Span, out: &mut Vec<Construct>) {
    let call = Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*\(([^)]*)\)")
        .expect("trigger call pattern compiles");
    for caps in call.captures_iter(body.slice(text)) {
        let whole = caps.get(0).expect("capture 0 always present");
        let name = caps[1].to_string();
        let span = Span::new(body.start + whole.start(), body.start + whole.end());
        out.push(
            Construct::new(ConstructKind::Trigger, span)
                .with_identifier(name.clone())
                .with_attr("event", name)
                .with_attr("spec", unquote(&caps[2]).to_string()),
        );
    }
}

/// Pipeline- or stage-level agent declaration: `agent any`, `agent none`, or
/// an `agent { ... }` block condensed to one line.
fn find_agent(text: &str, within: Span) -> Option<(Span, String)> {
    let simple = Regex::new(r"\bagent\s+(any|none)\b").expect("agent pattern compiles");
    if let Some(caps) = simple.captures(within.slice(text)) {
        let whole = caps.get(0).expect("capture 0 always present");
        let span = Span::new(within.start + whole.start(), within.start + whole.end());
        return Some((span, caps[1].to_string()));
    }
    let block = find_block(text, within, "agent")?;
    Some((block.full(), condense(block.body.slice(text))))
}

/// First `name { ... }` or `name('arg') { ... }` block inside a range.
fn find_block(text: &str, within: Span, name: &str) -> Option<GroovyBlock> {
    let pattern = Regex::new(&format!(
        r"\b{}\b\s*(?:\(([^)]*)\))?\s*\{{",
        regex::escape(name)
    ))
    .expect("block pattern compiles");
    let slice = within.slice(text);
    let caps = pattern.captures(slice)?;
    let whole = caps.get(0).expect("capture 0 always present");
    let body_start = within.start + whole.end();
    let body_end = matching_brace(text, body_start)?;
    if body_end > within.end {
        return None;
    }
    Some(GroovyBlock {
        header_start: within.start + whole.start(),
        arg: caps.get(1).map(|m| unquote(m.as_str()).to_string()),
        body: Span::new(body_start, body_end),
    })
}

/// Offset of the brace closing the block whose body starts at `from`.
fn matching_brace(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut quote: Option<u8> = None;
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
        } else {
            match b {
                b'\'' | b'"' => quote = Some(b),
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'/' => {
                    while i < bytes.len() && bytes[i] != b'\n' {
                        i += 1;
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    None
}

fn split_statement(line: &str) -> Option<(&str, &str)> {
    let end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(line.len());
    if end == 0 {
        return None;
    }
    Some((&line[..end], line[end..].trim()))
}

/// Strip one wrapping pair of parentheses and any trailing block opener.
fn strip_call(rest: &str) -> &str {
    let trimmed = rest.trim().trim_end_matches('{').trim_end();
    if trimmed.starts_with('(') && trimmed.ends_with(')') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

fn capture(pattern: &str, haystack: &str) -> Option<String> {
    Regex::new(pattern)
        .ok()?
        .captures(haystack)
        .map(|caps| caps[1].to_string())
}

fn condense(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
