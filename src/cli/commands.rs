use std::fs;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;

use crate::cli::{Command, RulesArgs, ScanArgs, TranslateArgs};
use crate::core::config::PipeshiftConfig;
use crate::core::document::{Diagnostic, RawDocument};
use crate::core::error::AppError;
use crate::core::pipeline;
use crate::core::rules::{self, RuleTable};
use crate::core::scan::{first_blocked, SecurityScanner};
use crate::core::types::{Dialect, ErrorCategory};

/// Exit status for a document rejected by the security scanner.
pub const EXIT_SECURITY_REJECTED: u8 = 2;
/// Exit status for a rule bundle that fails validation.
pub const EXIT_MALFORMED_RULE: u8 = 3;

pub fn execute(command: Command) -> crate::Result<ExitCode> {
    match command {
        Command::Translate(args) => translate(args),
        Command::Scan(args) => scan(args),
        Command::Rules(args) => rules_cmd(args),
        Command::Dialects => dialects(),
    }
}

fn translate(args: TranslateArgs) -> crate::Result<ExitCode> {
    let config = PipeshiftConfig::load(args.config.as_deref())?;
    let text = read_input(args.input.as_deref())?;
    let dialect = resolve_dialect(args.dialect.as_deref(), &text, &config)?;

    let table = match load_table(args.rules.as_deref(), &config) {
        Ok(table) => table,
        Err(err) if err.category == ErrorCategory::MalformedRule => {
            report_app_error(&err);
            return Ok(ExitCode::from(EXIT_MALFORMED_RULE));
        }
        Err(err) => return Err(err.into()),
    };

    let doc = RawDocument::new(text, dialect);
    let translation = match pipeline::translate(&doc, &table) {
        Ok(translation) => translation,
        Err(err) if err.category == ErrorCategory::SecurityRejected => {
            report_app_error(&err);
            return Ok(ExitCode::from(EXIT_SECURITY_REJECTED));
        }
        Err(err) => return Err(err.into()),
    };

    let rendered = if args.json {
        let mut out = serde_json::to_string_pretty(&translation)
            .context("failed to serialize translation report")?;
        out.push('\n');
        out
    } else {
        translation.target_text.clone()
    };

    match &args.output {
        Some(path) => fs::write(path, &rendered)
            .with_context(|| format!("failed to write output to {}", path.display()))?,
        None => print!("{rendered}"),
    }

    for diag in &translation.diagnostics {
        eprintln!("{}", format_diagnostic(diag));
    }
    tracing::info!(
        constructs = translation.construct_count,
        fragments = translation.fragment_count,
        diagnostics = translation.diagnostics.len(),
        "translation complete"
    );
    Ok(ExitCode::SUCCESS)
}

fn scan(args: ScanArgs) -> crate::Result<ExitCode> {
    // Config is loaded for parity (and to fail early on a broken file) even
    // though scanning itself takes no settings from it.
    let _config = PipeshiftConfig::load(args.config.as_deref())?;
    let text = read_input(args.input.as_deref())?;

    let scanner = SecurityScanner::new();
    let findings = scanner.scan(&text);

    if args.json {
        let mut out = serde_json::to_string_pretty(&findings)
            .context("failed to serialize scan findings")?;
        out.push('\n');
        print!("{out}");
    } else if findings.is_empty() {
        println!("no findings");
    } else {
        for diag in &findings {
            println!("{}", format_diagnostic(diag));
        }
    }

    if first_blocked(&findings).is_some() {
        return Ok(ExitCode::from(EXIT_SECURITY_REJECTED));
    }
    Ok(ExitCode::SUCCESS)
}

fn rules_cmd(args: RulesArgs) -> crate::Result<ExitCode> {
    let config = PipeshiftConfig::load(args.config.as_deref())?;
    let table = match load_table(args.rules.as_deref(), &config) {
        Ok(table) => table,
        Err(err) if err.category == ErrorCategory::MalformedRule => {
            report_app_error(&err);
            return Ok(ExitCode::from(EXIT_MALFORMED_RULE));
        }
        Err(err) => return Err(err.into()),
    };

    println!("{} rules loaded", table.len());
    for entry in table.entries() {
        let terminal = if entry.terminal { " terminal" } else { "" };
        let description = entry.description.as_deref().unwrap_or("");
        println!(
            "  {:<28} p{:<4}{} {:<12} {}",
            entry.id,
            entry.priority,
            terminal,
            entry.matcher.kind.as_str(),
            description
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn dialects() -> crate::Result<ExitCode> {
    for dialect in Dialect::ALL {
        let default = if dialect == Dialect::default() {
            " (default)"
        } else {
            ""
        };
        println!("{}{}", dialect.as_str(), default);
    }
    Ok(ExitCode::SUCCESS)
}

/// Read the source document from a file, or stdin when `path` is `-`/absent.
fn read_input(path: Option<&Path>) -> crate::Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("failed to read input from {}", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read input from stdin")?;
            Ok(buf)
        }
    }
}

/// Resolve the source dialect: explicit flag wins, then a content sniff for
/// Groovy pipeline syntax, then the configured default.
fn resolve_dialect(
    flag: Option<&str>,
    text: &str,
    config: &PipeshiftConfig,
) -> crate::Result<Dialect> {
    if let Some(value) = flag {
        return Dialect::parse(value).ok_or_else(|| {
            anyhow::anyhow!(
                "unknown dialect '{}' (expected one of: {})",
                value,
                Dialect::ALL.map(|d| d.as_str()).join(", ")
            )
        });
    }
    if looks_like_groovy(text) {
        return Ok(Dialect::GroovyPipeline);
    }
    Ok(config.translate.default_dialect)
}

fn looks_like_groovy(text: &str) -> bool {
    text.lines()
        .map(str::trim_start)
        .any(|line| line.starts_with("pipeline") && line.trim_end().ends_with('{'))
}

/// Rule table precedence: --rules flag, then the config bundle path, then the
/// embedded built-in bundle.
fn load_table(flag: Option<&Path>, config: &PipeshiftConfig) -> Result<RuleTable, AppError> {
    match flag.or(config.rules.bundle.as_deref()) {
        Some(path) => rules::load_from_path(path),
        None => rules::builtin(),
    }
}

fn format_diagnostic(diag: &Diagnostic) -> String {
    let mut line = format!("{} [{}]: {}", diag.severity, diag.code, diag.message);
    if let Some(suggestion) = &diag.suggestion {
        line.push_str(&format!(" (hint: {suggestion})"));
    }
    line
}

fn report_app_error(err: &AppError) {
    eprintln!("error [{}]: {}", err.code, err.message);
    if let Some(excerpt) = err.context_value("excerpt") {
        eprintln!("  offending content: {excerpt}");
    }
    for suggestion in &err.recovery_suggestions {
        eprintln!("  hint: {suggestion}");
    }
}
