use crate::core::error::AppError;
use crate::core::types::{Dialect, ErrorCategory};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE: &str = "pipeshift.toml";

/// Main pipeshift configuration loaded from pipeshift.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipeshiftConfig {
    /// Translation defaults
    #[serde(default)]
    pub translate: TranslateConfig,

    /// Rule bundle configuration
    #[serde(default)]
    pub rules: RulesConfig,
}

/// Translation defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TranslateConfig {
    /// Source dialect assumed when neither the CLI flag nor sniffing decides
    #[serde(default)]
    pub default_dialect: Dialect,
}

/// Rule bundle configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RulesConfig {
    /// Path to an alternate rule bundle; the embedded bundle is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<PathBuf>,
}

impl PipeshiftConfig {
    /// Load configuration with CLI-flag > file > defaults precedence: an
    /// explicit path must exist; otherwise `pipeshift.toml` in the working
    /// directory is used when present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, AppError> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::new(
                        ErrorCategory::IoError,
                        format!("config file not found: {}", path.display()),
                    ));
                }
                path.to_path_buf()
            }
            None => {
                let default = PathBuf::from(CONFIG_FILE);
                if !default.exists() {
                    return Ok(PipeshiftConfig::default());
                }
                default
            }
        };

        let text = fs::read_to_string(&path).map_err(|err| {
            AppError::new(
                ErrorCategory::IoError,
                format!("failed to read {}: {}", path.display(), err),
            )
        })?;
        toml::from_str(&text).map_err(|err| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("failed to parse {}: {}", path.display(), err),
            )
        })
    }
}
