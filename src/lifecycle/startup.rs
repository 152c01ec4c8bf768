//! Startup errors.
//!
//! Any failure while building subsystems from the config is fatal; the
//! binary reports it and exits before binding the listener.

use thiserror::Error;

use crate::config::ConfigError;
use crate::llm::LlmError;
use crate::scholar::ScholarError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("paper search client: {0}")]
    Scholar(#[from] ScholarError),

    #[error("language model client: {0}")]
    Llm(#[from] LlmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
