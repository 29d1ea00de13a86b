//! Declarative rule bundle loading.
//!
//! Rule sources are YAML records, not executable code, so the rule set stays
//! auditable and diffable. Every structural problem (unknown construct kind,
//! undefined placeholder, bad identifier pattern, duplicate id) is a
//! startup-time `MalformedRule` failure, never a per-document one.

use super::{EmitTemplate, Matcher, RuleEntry, RuleTable, Template, DEFAULT_PRIORITY};
use crate::core::error::AppError;
use crate::core::types::{ConstructKind, DiagnosticCategory};
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Built-in bundle embedded in the binary; used when no bundle path is given.
const BUILTIN_BUNDLE: &str = include_str!("../../../rules/builtin.yaml");

#[derive(Debug, Error)]
pub enum RuleParseError {
    #[error("rule bundle is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("rule '{rule}' references unknown construct kind '{kind}'")]
    UnknownKind { rule: String, kind: String },
    #[error("rule '{rule}' references undefined placeholder '{placeholder}'")]
    UnknownPlaceholder { rule: String, placeholder: String },
    #[error("rule '{rule}' has an invalid identifier pattern: {source}")]
    BadPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
    #[error("rule '{rule}' names unknown comment category '{category}'")]
    UnknownCategory { rule: String, category: String },
    #[error("duplicate rule id '{id}'")]
    DuplicateId { id: String },
}

#[derive(Debug, Deserialize)]
struct BundleRecord {
    rules: Vec<RuleRecord>,
}

#[derive(Debug, Deserialize)]
struct RuleRecord {
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_priority")]
    priority: i32,
    #[serde(default)]
    terminal: bool,
    #[serde(rename = "match")]
    matcher: MatchRecord,
    #[serde(default)]
    emit: Vec<EmitRecord>,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

#[derive(Debug, Deserialize)]
struct MatchRecord {
    kind: String,
    #[serde(default)]
    identifier: Option<String>,
    #[serde(default)]
    attributes: IndexMap<String, String>,
    #[serde(default)]
    has_attributes: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmitRecord {
    Construct {
        construct: ConstructRecord,
    },
    Comment {
        comment: String,
        #[serde(default)]
        category: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct ConstructRecord {
    kind: String,
    #[serde(default)]
    inherit: bool,
    #[serde(default)]
    identifier: Option<String>,
    #[serde(default)]
    attributes: IndexMap<String, String>,
}

/// Load a rule bundle from YAML text.
pub fn load_from_str(source: &str) -> Result<RuleTable, AppError> {
    compile(source).map_err(|err| {
        let mut app = AppError::malformed_rule(err.to_string());
        app.add_context("stage", "rule-table-load");
        app
    })
}

/// Load a rule bundle from a file path.
pub fn load_from_path(path: &Path) -> Result<RuleTable, AppError> {
    let text = fs::read_to_string(path).map_err(|err| {
        AppError::new(
            crate::core::types::ErrorCategory::IoError,
            format!("failed to read rule bundle {}: {}", path.display(), err),
        )
    })?;
    let mut table = load_from_str(&text);
    if let Err(app) = &mut table {
        app.add_context("bundle", &path.display().to_string());
    }
    table
}

/// The embedded built-in bundle. A failure here is a packaging defect.
pub fn builtin() -> Result<RuleTable, AppError> {
    load_from_str(BUILTIN_BUNDLE)
}

fn compile(source: &str) -> Result<RuleTable, RuleParseError> {
    let bundle: BundleRecord = serde_yaml::from_str(source)?;
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(bundle.rules.len());
    for record in bundle.rules {
        if !seen.insert(record.id.clone()) {
            return Err(RuleParseError::DuplicateId { id: record.id });
        }
        entries.push(compile_rule(record)?);
    }
    Ok(RuleTable::new(entries))
}

fn compile_rule(record: RuleRecord) -> Result<RuleEntry, RuleParseError> {
    let rule_id = record.id.clone();

    let kind = parse_kind(&record.matcher.kind, &rule_id)?;
    let identifier = match &record.matcher.identifier {
        Some(pattern) => Some(Regex::new(pattern).map_err(|source| RuleParseError::BadPattern {
            rule: rule_id.clone(),
            source,
        })?),
        None => None,
    };
    let matcher = Matcher {
        kind,
        identifier,
        attr_equals: record.matcher.attributes,
        attr_present: record.matcher.has_attributes,
    };

    let mut template = Vec::with_capacity(record.emit.len());
    for emit in record.emit {
        template.push(compile_emit(emit, &rule_id)?);
    }

    Ok(RuleEntry {
        id: record.id,
        description: record.description,
        priority: record.priority,
        terminal: record.terminal,
        matcher,
        template,
    })
}

fn compile_emit(record: EmitRecord, rule_id: &str) -> Result<EmitTemplate, RuleParseError> {
    match record {
        EmitRecord::Comment { comment, category } => {
            let category = match category {
                Some(name) => DiagnosticCategory::parse(&name).ok_or_else(|| {
                    RuleParseError::UnknownCategory {
                        rule: rule_id.to_string(),
                        category: name,
                    }
                })?,
                None => DiagnosticCategory::General,
            };
            Ok(EmitTemplate::Comment {
                text: parse_template(&comment, rule_id)?,
                category,
            })
        }
        EmitRecord::Construct { construct } => {
            let kind = parse_kind(&construct.kind, rule_id)?;
            let identifier = match &construct.identifier {
                Some(raw) => Some(parse_template(raw, rule_id)?),
                None => None,
            };
            let mut attributes = IndexMap::with_capacity(construct.attributes.len());
            for (key, raw) in construct.attributes {
                attributes.insert(key, parse_template(&raw, rule_id)?);
            }
            Ok(EmitTemplate::Construct {
                kind,
                inherit: construct.inherit,
                identifier,
                attributes,
            })
        }
    }
}

fn parse_kind(raw: &str, rule_id: &str) -> Result<ConstructKind, RuleParseError> {
    ConstructKind::parse(raw).ok_or_else(|| RuleParseError::UnknownKind {
        rule: rule_id.to_string(),
        kind: raw.to_string(),
    })
}

fn parse_template(raw: &str, rule_id: &str) -> Result<Template, RuleParseError> {
    Template::parse(raw).map_err(|placeholder| RuleParseError::UnknownPlaceholder {
        rule: rule_id.to_string(),
        placeholder,
    })
}
