//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (TTL > 0, backoff factor >= 1, topic bounds)
//! - Check that addresses and base URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LensConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{LensConfig, RetryConfig};

/// A single failed check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &LensConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.api.min_topic_len > config.api.max_topic_len {
        errors.push(ValidationError::new(
            "api.min_topic_len",
            "must not exceed api.max_topic_len",
        ));
    }

    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::new("timeouts.upstream_secs", "must be > 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    if !(1..=100).contains(&config.scholar.papers_per_request) {
        errors.push(ValidationError::new(
            "scholar.papers_per_request",
            "must be between 1 and 100",
        ));
    }

    for (field, value) in [
        ("scholar.base_url", &config.scholar.base_url),
        ("llm.base_url", &config.llm.base_url),
    ] {
        if let Err(e) = url::Url::parse(value) {
            errors.push(ValidationError::new(field, format!("'{}': {}", value, e)));
        }
    }

    if config.llm.model.trim().is_empty() {
        errors.push(ValidationError::new("llm.model", "must not be empty"));
    }

    validate_retry("retries.scholar", &config.retries.scholar, &mut errors);
    validate_retry("retries.llm", &config.retries.llm, &mut errors);

    if config.cache.ttl_secs == 0 {
        errors.push(ValidationError::new("cache.ttl_secs", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_retry(prefix: &str, retry: &RetryConfig, errors: &mut Vec<ValidationError>) {
    if retry.base_delay_ms == 0 {
        errors.push(ValidationError::new(format!("{}.base_delay_ms", prefix), "must be > 0"));
    }
    if !(retry.backoff_factor >= 1.0 && retry.backoff_factor.is_finite()) {
        errors.push(ValidationError::new(
            format!("{}.backoff_factor", prefix),
            "must be a finite number >= 1",
        ));
    }
    if !(0.0..1.0).contains(&retry.jitter_ratio) {
        errors.push(ValidationError::new(
            format!("{}.jitter_ratio", prefix),
            "must be in [0, 1)",
        ));
    }
    if retry.max_delay_ms == Some(0) {
        errors.push(ValidationError::new(format!("{}.max_delay_ms", prefix), "must be > 0"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&LensConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = LensConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.api.min_topic_len = 500;
        config.retries.llm.backoff_factor = 0.5;
        config.retries.scholar.base_delay_ms = 0;
        config.cache.ttl_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "api.min_topic_len",
                "retries.scholar.base_delay_ms",
                "retries.llm.backoff_factor",
                "cache.ttl_secs",
            ]
        );
    }

    #[test]
    fn test_rejects_bad_urls_and_jitter() {
        let mut config = LensConfig::default();
        config.scholar.base_url = "::nope::".to_string();
        config.retries.scholar.jitter_ratio = 1.0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].to_string().starts_with("scholar.base_url"));
    }
}
