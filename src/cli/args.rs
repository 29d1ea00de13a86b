use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct TranslateArgs {
    /// Source CI document to translate ('-' or omitted reads stdin)
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Source dialect: workflow-yaml or groovy-pipeline (sniffed when omitted)
    #[arg(long, value_name = "DIALECT")]
    pub dialect: Option<String>,

    /// Write the target document here instead of stdout
    #[arg(long, short = 'o', value_name = "FILE", help_heading = "Output Options")]
    pub output: Option<PathBuf>,

    /// Emit a JSON report (target text plus diagnostics) instead of raw text
    #[arg(long, help_heading = "Output Options")]
    pub json: bool,

    /// Alternate rule bundle (default: the embedded built-in bundle)
    #[arg(long, value_name = "FILE", help_heading = "Rule Bundle")]
    pub rules: Option<PathBuf>,

    /// Path to custom config file (default: ./pipeshift.toml)
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ScanArgs {
    /// Source CI document to scan ('-' or omitted reads stdin)
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Emit findings as JSON instead of plain text
    #[arg(long, help_heading = "Output Options")]
    pub json: bool,

    /// Path to custom config file (default: ./pipeshift.toml)
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct RulesArgs {
    /// Rule bundle to validate and list (default: the embedded built-in bundle)
    #[arg(long, value_name = "FILE", help_heading = "Rule Bundle")]
    pub rules: Option<PathBuf>,

    /// Path to custom config file (default: ./pipeshift.toml)
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,
}
