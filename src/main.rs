use clap::Parser;
use std::process::ExitCode;

use pipeshift::cli::{commands, Args};

fn main() -> ExitCode {
    let args = Args::parse();

    // Logging failures must not take the translator down; fall back to no
    // subscriber and keep going.
    let _guard = match pipeshift::logging::init(args.command.config_path()) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: logging setup failed: {err:#}");
            None
        }
    };

    match commands::execute(args.command) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
