pub mod args;
pub mod commands;

pub use args::{RulesArgs, ScanArgs, TranslateArgs};
use clap::{Parser, Subcommand};
use std::path::Path;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
TRANSLATION COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "pipeshift")]
#[command(version = crate::VERSION)]
#[command(about = "Rule-driven CI pipeline translator")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: scan a pipeline for risky content, then translate it into workflow YAML and review the header diagnostics."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Translate a CI document into workflow YAML",
        long_about = "Translate scans the source for risky content, extracts its constructs, rewrites them through the rule table, and emits a workflow YAML document with a diagnostic header.",
        after_help = "Example:\n    pipeshift translate Jenkinsfile --dialect groovy-pipeline -o workflow.yml"
    )]
    Translate(TranslateArgs),
    #[command(
        about = "Scan a CI document for risky content without translating",
        long_about = "Scan runs the security detector catalog over the raw source text and lists every finding. Blocked findings exit with status 2.",
        after_help = "Example:\n    pipeshift scan Jenkinsfile"
    )]
    Scan(ScanArgs),
    #[command(
        about = "Validate and list a rule bundle",
        long_about = "Rules loads a bundle (built-in by default), reports malformed entries, and prints each rule in match order.",
        after_help = "Example:\n    pipeshift rules --rules ./custom-rules.yaml"
    )]
    Rules(RulesArgs),
    #[command(
        about = "List supported source dialects",
        after_help = "Example:\n    pipeshift dialects"
    )]
    Dialects,
}

impl Command {
    /// Config path for logging setup, when the subcommand carries one.
    pub fn config_path(&self) -> Option<&Path> {
        match self {
            Command::Translate(args) => args.config.as_deref(),
            Command::Scan(args) => args.config.as_deref(),
            Command::Rules(args) => args.config.as_deref(),
            Command::Dialects => None,
        }
    }
}
