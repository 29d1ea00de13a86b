use crate::core::document::Diagnostic;

pub mod detectors;
pub use detectors::built_in_detectors;

/// Risk detector run against the raw document text before any translation.
pub trait RiskDetector {
    /// Stable category name, surfaced on security rejections.
    fn name(&self) -> &'static str;
    fn inspect(&self, text: &str) -> Vec<Diagnostic>;
}

/// Security pre-screen that runs an ordered detector catalog over raw text.
///
/// Scanning is a pure function: diagnostics are collected in catalog order,
/// and within one detector in pattern order, so results are deterministic.
pub struct SecurityScanner {
    detectors: Vec<Box<dyn RiskDetector>>,
}

impl SecurityScanner {
    /// Construct a scanner populated with the built-in detector catalog.
    pub fn new() -> Self {
        SecurityScanner {
            detectors: built_in_detectors(),
        }
    }

    /// Scan raw text and return every diagnostic found, blocked and soft alike.
    pub fn scan(&self, text: &str) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for detector in &self.detectors {
            out.extend(detector.inspect(text));
        }
        out
    }
}

impl Default for SecurityScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// First blocked diagnostic in scan order, if any. This is the one reported to
/// the caller on rejection; the full list is still returned for completeness.
pub fn first_blocked(diagnostics: &[Diagnostic]) -> Option<&Diagnostic> {
    diagnostics.iter().find(|d| d.is_blocking())
}
