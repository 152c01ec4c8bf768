//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, env overrides for API keys)
//!     → validation.rs (semantic checks)
//!     → LensConfig (validated, immutable)
//!     → handed to HttpServer::new, which builds every subsystem from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets come from the environment, not the file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ApiConfig, CacheConfig, LensConfig, ListenerConfig, LlmConfig, LogFormat,
    ObservabilityConfig, RetriesConfig, RetryConfig, ScholarConfig, TimeoutConfig,
};
