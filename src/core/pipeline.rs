use crate::core::document::{Diagnostic, RawDocument};
use crate::core::emit;
use crate::core::error::AppError;
use crate::core::extract;
use crate::core::rewrite;
use crate::core::rules::RuleTable;
use crate::core::scan::{first_blocked, SecurityScanner};
use serde::Serialize;

/// Document-level translation states. `Rejected` and `Emitted` are terminal;
/// there are no cycles and no retries within one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Loaded,
    Scanned,
    Rejected,
    Extracted,
    Rewritten,
    Emitted,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Successful translation result: target text plus the full diagnostics list.
#[derive(Debug, Serialize)]
pub struct Translation {
    pub target_text: String,
    pub diagnostics: Vec<Diagnostic>,
    pub construct_count: usize,
    pub fragment_count: usize,
}

/// Run the full synchronous pipeline: Scan, Extract, Rewrite, Emit.
///
/// The only error paths are `SecurityRejected` (a blocked scan finding) and
/// host-level failures; everything else degrades into diagnostics attached to
/// a successful result. Either a complete target text is produced or nothing
/// is returned; there are no partial commits.
pub fn translate(doc: &RawDocument, table: &RuleTable) -> Result<Translation, AppError> {
    tracing::debug!(stage = %Stage::Loaded, dialect = %doc.dialect(), bytes = doc.text().len());

    let scanner = SecurityScanner::new();
    let mut diagnostics = scanner.scan(doc.text());
    tracing::debug!(stage = %Stage::Scanned, findings = diagnostics.len());

    if let Some(blocked) = first_blocked(&diagnostics) {
        tracing::warn!(stage = %Stage::Rejected, code = %blocked.code, "translation rejected");
        let mut err = AppError::security_rejected(blocked.message.clone());
        err.add_context("pattern", &blocked.code);
        if let Some(span) = blocked.span {
            err.add_context("excerpt", span.slice(doc.text()));
        }
        if let Some(suggestion) = &blocked.suggestion {
            err.recovery_suggestions.insert(0, suggestion.clone());
        }
        return Err(err);
    }

    let (constructs, extract_diags) = extract::extract(doc);
    diagnostics.extend(extract_diags);
    tracing::debug!(stage = %Stage::Extracted, constructs = constructs.len());

    let (fragments, rewrite_diags) = rewrite::rewrite(doc, &constructs, table);
    diagnostics.extend(rewrite_diags);
    tracing::debug!(stage = %Stage::Rewritten, fragments = fragments.len());

    let target_text = emit::emit(&fragments, &diagnostics);
    tracing::debug!(stage = %Stage::Emitted, bytes = target_text.len());

    Ok(Translation {
        target_text,
        diagnostics,
        construct_count: constructs.len(),
        fragment_count: fragments.len(),
    })
}
