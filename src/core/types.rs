use serde::{Deserialize, Serialize};

/// Source-format grammar profile the extractor can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    #[default]
    WorkflowYaml,
    GroovyPipeline,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::WorkflowYaml, Dialect::GroovyPipeline];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::WorkflowYaml => "workflow-yaml",
            Dialect::GroovyPipeline => "groovy-pipeline",
        }
    }

    pub fn parse(value: &str) -> Option<Dialect> {
        match value {
            "workflow-yaml" => Some(Dialect::WorkflowYaml),
            "groovy-pipeline" => Some(Dialect::GroovyPipeline),
            _ => None,
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed unit of a CI document recognized by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstructKind {
    Trigger,
    Job,
    Step,
    EnvBlock,
    Matrix,
    Credential,
    Conditional,
    Artifact,
    Other,
}

impl ConstructKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstructKind::Trigger => "trigger",
            ConstructKind::Job => "job",
            ConstructKind::Step => "step",
            ConstructKind::EnvBlock => "env-block",
            ConstructKind::Matrix => "matrix",
            ConstructKind::Credential => "credential",
            ConstructKind::Conditional => "conditional",
            ConstructKind::Artifact => "artifact",
            ConstructKind::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<ConstructKind> {
        match value {
            "trigger" => Some(ConstructKind::Trigger),
            "job" => Some(ConstructKind::Job),
            "step" => Some(ConstructKind::Step),
            "env-block" => Some(ConstructKind::EnvBlock),
            "matrix" => Some(ConstructKind::Matrix),
            "credential" => Some(ConstructKind::Credential),
            "conditional" => Some(ConstructKind::Conditional),
            "artifact" => Some(ConstructKind::Artifact),
            "other" => Some(ConstructKind::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity levels emitted by the scanner, extractor, and rewriter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Blocked,
}

impl Severity {
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Blocked => 3,
            Severity::Warning => 2,
            Severity::Info => 1,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "Info"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Blocked => write!(f, "Blocked"),
        }
    }
}

/// Grouping used when diagnostics are aggregated into the emitted header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Triggers,
    Permissions,
    Agent,
    Security,
    #[default]
    General,
}

impl DiagnosticCategory {
    /// Fixed header emission order.
    pub const ORDERED: [DiagnosticCategory; 5] = [
        DiagnosticCategory::Triggers,
        DiagnosticCategory::Permissions,
        DiagnosticCategory::Agent,
        DiagnosticCategory::Security,
        DiagnosticCategory::General,
    ];

    pub fn header_title(&self) -> &'static str {
        match self {
            DiagnosticCategory::Triggers => "Triggers",
            DiagnosticCategory::Permissions => "Permissions",
            DiagnosticCategory::Agent => "Agent requirements",
            DiagnosticCategory::Security => "Security notes",
            DiagnosticCategory::General => "General notes",
        }
    }

    pub fn parse(value: &str) -> Option<DiagnosticCategory> {
        match value {
            "triggers" => Some(DiagnosticCategory::Triggers),
            "permissions" => Some(DiagnosticCategory::Permissions),
            "agent" => Some(DiagnosticCategory::Agent),
            "security" => Some(DiagnosticCategory::Security),
            "general" => Some(DiagnosticCategory::General),
            _ => None,
        }
    }
}

impl std::fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.header_title())
    }
}

/// Error category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    SecurityRejected,
    MalformedRule,
    ValidationError,
    IoError,
    InternalError,
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Error severity enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Error,
    Warning,
    Info,
    Debug,
}
