//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::LensConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const SCHOLAR_API_KEY_ENV: &str = "SEMANTIC_SCHOLAR_API_KEY";
pub const LLM_API_KEY_ENV: &str = "LLM_API_KEY";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML config file without validating it.
pub fn parse_config(path: &Path) -> Result<LensConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Load the config file at `path` (or defaults when `None`), apply
/// environment overrides, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<LensConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(path)?,
        None => LensConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Fill API keys from the environment. A non-empty variable wins over the file.
pub fn apply_env_overrides(config: &mut LensConfig, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(key) = non_empty(SCHOLAR_API_KEY_ENV) {
        config.scholar.api_key = Some(key);
    }
    if let Some(key) = non_empty(LLM_API_KEY_ENV) {
        config.llm.api_key = Some(key);
    }

    if config.scholar.api_key.is_none() {
        tracing::warn!("{} not set; using unauthenticated search quota", SCHOLAR_API_KEY_ENV);
    }
    if config.llm.api_key.is_none() {
        tracing::warn!("{} not set; analysis requests will be rejected upstream", LLM_API_KEY_ENV);
    }
}
