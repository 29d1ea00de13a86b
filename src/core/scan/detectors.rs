use super::RiskDetector;
use crate::core::document::{Diagnostic, Span};
use crate::core::types::{DiagnosticCategory, Severity};
use regex::Regex;

/// Ordered detector catalog. Catalog order is scan order and therefore decides
/// which blocked finding is reported first on rejection.
pub fn built_in_detectors() -> Vec<Box<dyn RiskDetector>> {
    vec![
        Box::new(ObfuscatedExecutionDetector::new()),
        Box::new(CryptominingDetector::new()),
        Box::new(ReverseShellDetector::new()),
        Box::new(DataExfiltrationDetector::new()),
        Box::new(RawIpDownloadDetector::new()),
        Box::new(PersistenceDetector::new()),
        Box::new(StructuralRedFlagDetector::new()),
    ]
}

const EXCERPT_LIMIT: usize = 80;

struct RiskPattern {
    regex: Regex,
    severity: Severity,
    note: &'static str,
    suggestion: Option<&'static str>,
}

impl RiskPattern {
    fn blocked(pattern: &str, note: &'static str, suggestion: &'static str) -> Self {
        RiskPattern {
            regex: compile(pattern),
            severity: Severity::Blocked,
            note,
            suggestion: Some(suggestion),
        }
    }

    fn warning(pattern: &str, note: &'static str) -> Self {
        RiskPattern {
            regex: compile(pattern),
            severity: Severity::Warning,
            note,
            suggestion: None,
        }
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in risk pattern compiles")
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.len() <= EXCERPT_LIMIT {
        trimmed.to_string()
    } else {
        let mut cut = EXCERPT_LIMIT;
        while !trimmed.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &trimmed[..cut])
    }
}

/// Shared implementation: a named catalog section with its pattern list.
struct PatternDetector {
    name: &'static str,
    code: &'static str,
    patterns: Vec<RiskPattern>,
}

impl PatternDetector {
    fn inspect(&self, text: &str) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for pattern in &self.patterns {
            if let Some(found) = pattern.regex.find(text) {
                let mut diag = Diagnostic::new(
                    self.code,
                    pattern.severity,
                    DiagnosticCategory::Security,
                    format!(
                        "{} risk: matched '{}' ({})",
                        self.name,
                        excerpt(found.as_str()),
                        pattern.note
                    ),
                )
                .with_span(Span::new(found.start(), found.end()));
                if let Some(suggestion) = pattern.suggestion {
                    diag = diag.with_suggestion(suggestion);
                }
                out.push(diag);
            }
        }
        out
    }
}

pub struct ObfuscatedExecutionDetector(PatternDetector);

impl ObfuscatedExecutionDetector {
    pub fn new() -> Self {
        ObfuscatedExecutionDetector(PatternDetector {
            name: "obfuscated-execution",
            code: "PS-SEC-001",
            patterns: vec![
                RiskPattern::blocked(
                    r"base64\s+(-d|--decode)[^\n|]*\|\s*(sh|bash)\b",
                    "decoded payload piped straight into a shell",
                    "commit the script in clear text and run it from the repository",
                ),
                RiskPattern::blocked(
                    r"\beval\s*\$\(",
                    "eval of a command substitution hides the executed command",
                    "invoke the command directly so reviewers can read it",
                ),
                RiskPattern::blocked(
                    r"\b(curl|wget)\b[^\n]*\|\s*(sh|bash)\b",
                    "remote script piped into a shell without inspection",
                    "download the script, verify its checksum, then execute it",
                ),
            ],
        })
    }
}

impl RiskDetector for ObfuscatedExecutionDetector {
    fn name(&self) -> &'static str {
        self.0.name
    }

    fn inspect(&self, text: &str) -> Vec<Diagnostic> {
        self.0.inspect(text)
    }
}

pub struct CryptominingDetector(PatternDetector);

impl CryptominingDetector {
    pub fn new() -> Self {
        CryptominingDetector(PatternDetector {
            name: "cryptomining",
            code: "PS-SEC-002",
            patterns: vec![RiskPattern::blocked(
                r"(?i)\b(xmrig|minerd|cryptonight|nicehash)\b|stratum\+tcp://",
                "known mining software or pool protocol",
                "CI runners must not be used for mining workloads",
            )],
        })
    }
}

impl RiskDetector for CryptominingDetector {
    fn name(&self) -> &'static str {
        self.0.name
    }

    fn inspect(&self, text: &str) -> Vec<Diagnostic> {
        self.0.inspect(text)
    }
}

pub struct ReverseShellDetector(PatternDetector);

impl ReverseShellDetector {
    pub fn new() -> Self {
        ReverseShellDetector(PatternDetector {
            name: "reverse-shell",
            code: "PS-SEC-003",
            patterns: vec![
                RiskPattern::blocked(
                    r"\bnc(\.exe)?\s+-[a-z]*e\b",
                    "netcat invoked with an exec flag",
                    "use the CI platform's debug session feature for interactive access",
                ),
                RiskPattern::blocked(
                    r"bash\s+-i\s+>&\s*/dev/tcp/",
                    "interactive shell redirected over a TCP socket",
                    "use the CI platform's debug session feature for interactive access",
                ),
                RiskPattern::blocked(
                    r"/dev/tcp/\d",
                    "raw TCP connection to a literal address",
                    "connect to named services over the platform's supported mechanisms",
                ),
                RiskPattern::blocked(
                    r"\bsocat\b[^\n]*\bexec\b",
                    "socat bridging a socket to an executed program",
                    "use the CI platform's debug session feature for interactive access",
                ),
            ],
        })
    }
}

impl RiskDetector for ReverseShellDetector {
    fn name(&self) -> &'static str {
        self.0.name
    }

    fn inspect(&self, text: &str) -> Vec<Diagnostic> {
        self.0.inspect(text)
    }
}

pub struct DataExfiltrationDetector(PatternDetector);

impl DataExfiltrationDetector {
    pub fn new() -> Self {
        DataExfiltrationDetector(PatternDetector {
            name: "data-exfiltration",
            code: "PS-SEC-004",
            patterns: vec![
                RiskPattern::blocked(
                    r"\b(env|printenv)\b\s*\|\s*(curl|wget|nc)\b",
                    "environment dump piped to a network client",
                    "pass individual, named variables to the steps that need them",
                ),
                RiskPattern::blocked(
                    r"\bcurl\b[^\n]*(--data|--data-binary|-d)\s[^\n]*\$\{?\w*(TOKEN|SECRET|PASSWORD|KEY)\w*\}?",
                    "credential material posted to an external endpoint",
                    "use the platform's secret store instead of shipping secrets off-host",
                ),
            ],
        })
    }
}

impl RiskDetector for DataExfiltrationDetector {
    fn name(&self) -> &'static str {
        self.0.name
    }

    fn inspect(&self, text: &str) -> Vec<Diagnostic> {
        self.0.inspect(text)
    }
}

pub struct RawIpDownloadDetector(PatternDetector);

impl RawIpDownloadDetector {
    pub fn new() -> Self {
        RawIpDownloadDetector(PatternDetector {
            name: "raw-ip-download",
            code: "PS-SEC-005",
            patterns: vec![RiskPattern::blocked(
                r"\b(curl|wget)\b[^\n]*https?://(\d{1,3}\.){3}\d{1,3}",
                "download from a literal IP address bypasses DNS-level controls",
                "fetch over HTTPS from a named host, pinned by checksum",
            )],
        })
    }
}

impl RiskDetector for RawIpDownloadDetector {
    fn name(&self) -> &'static str {
        self.0.name
    }

    fn inspect(&self, text: &str) -> Vec<Diagnostic> {
        self.0.inspect(text)
    }
}

pub struct PersistenceDetector(PatternDetector);

impl PersistenceDetector {
    pub fn new() -> Self {
        PersistenceDetector(PatternDetector {
            name: "persistence-mechanism",
            code: "PS-SEC-006",
            patterns: vec![
                RiskPattern::blocked(
                    r">>\s*[^\n]*(authorized_keys|\.bashrc|\.profile)\b",
                    "append to a login or key file survives the build",
                    "CI steps must not install persistent access on the runner",
                ),
                RiskPattern::blocked(
                    r"\bcrontab\b[^\n]*(\||<)",
                    "crontab rewritten from a pipeline step",
                    "use the CI platform's own scheduled triggers",
                ),
                RiskPattern::warning(
                    r"\bsystemctl\s+enable\b",
                    "service enabled on the build host",
                ),
            ],
        })
    }
}

impl RiskDetector for PersistenceDetector {
    fn name(&self) -> &'static str {
        self.0.name
    }

    fn inspect(&self, text: &str) -> Vec<Diagnostic> {
        self.0.inspect(text)
    }
}

/// Soft structural signals: things that are not malicious on their own but
/// correlate with pipelines that hide what they run.
pub struct StructuralRedFlagDetector(PatternDetector);

impl StructuralRedFlagDetector {
    pub fn new() -> Self {
        StructuralRedFlagDetector(PatternDetector {
            name: "structural",
            code: "PS-SEC-007",
            patterns: vec![
                RiskPattern::warning(
                    r"[A-Za-z0-9+/]{120,}={0,2}",
                    "long encoded blob embedded in the pipeline",
                ),
                RiskPattern::warning(
                    r#"(?im)\bname:\s*['"]?(do stuff|stuff|misc|temp|tmp|asdf)['"]?\s*$"#,
                    "step name does not describe what the step runs",
                ),
            ],
        })
    }
}

impl RiskDetector for StructuralRedFlagDetector {
    fn name(&self) -> &'static str {
        self.0.name
    }

    fn inspect(&self, text: &str) -> Vec<Diagnostic> {
        self.0.inspect(text)
    }
}
