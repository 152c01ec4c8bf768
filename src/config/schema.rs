//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so a minimal (or absent) file is valid.

use serde::{Deserialize, Serialize};

use crate::resilience::ErrorKind;

/// Root configuration for research-lens.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LensConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Request validation limits for the HTTP API.
    pub api: ApiConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Paper search API settings.
    pub scholar: ScholarConfig,

    /// Language model API settings.
    pub llm: LlmConfig,

    /// Retry policy per external integration.
    pub retries: RetriesConfig,

    /// Result cache settings.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            max_body_size: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Shortest accepted topic, in characters after trimming.
    pub min_topic_len: usize,

    /// Longest accepted topic, in characters after trimming.
    pub max_topic_len: usize,

    /// Allow cross-origin requests from any origin (browser frontend).
    pub cors_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            min_topic_len: 3,
            max_topic_len: 200,
            cors_enabled: true,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole inbound request, including every upstream retry, in seconds.
    pub request_secs: u64,

    /// Single upstream attempt, in seconds.
    pub upstream_secs: u64,

    /// Upstream connection establishment, in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 300,
            upstream_secs: 30,
            connect_secs: 10,
        }
    }
}

/// Semantic Scholar Graph API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScholarConfig {
    pub base_url: String,

    /// Sent as `x-api-key`. Overridden by `SEMANTIC_SCHOLAR_API_KEY`.
    pub api_key: Option<String>,

    /// Papers requested per search (API maximum is 100).
    pub papers_per_request: u32,

    /// Comma-separated paper fields to request.
    pub fields: String,

    /// Minimum spacing between calls in milliseconds (1 req/s quota).
    pub min_interval_ms: u64,
}

impl Default for ScholarConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.semanticscholar.org/graph/v1".to_string(),
            api_key: None,
            papers_per_request: 50,
            fields: "title,abstract,year,citationCount,authors,url,externalIds,venue,journal"
                .to_string(),
            min_interval_ms: 1000,
        }
    }
}

/// Generative language model API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,

    /// Sent as the `key` query parameter. Overridden by `LLM_API_KEY`.
    pub api_key: Option<String>,

    pub model: String,

    pub temperature: f32,

    pub top_p: f32,

    /// Output token budget for gap/question analysis.
    pub analysis_max_tokens: u32,

    /// Output token budget for proposal generation.
    pub proposal_max_tokens: u32,

    /// Minimum spacing between calls in milliseconds (0 disables spacing).
    pub min_interval_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.7,
            top_p: 0.9,
            analysis_max_tokens: 4096,
            proposal_max_tokens: 8192,
            min_interval_ms: 0,
        }
    }
}

/// Retry policies, one per external integration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetriesConfig {
    pub scholar: RetryConfig,
    pub llm: RetryConfig,
}

impl Default for RetriesConfig {
    fn default() -> Self {
        Self {
            scholar: RetryConfig::default(),
            llm: RetryConfig {
                retry_on: vec![ErrorKind::Transient, ErrorKind::ResponseMalformed],
                ..RetryConfig::default()
            },
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds.
    pub base_delay_ms: u64,

    /// Multiplier applied to the delay after each retry.
    pub backoff_factor: f64,

    /// Optional cap on a single delay in milliseconds.
    pub max_delay_ms: Option<u64>,

    /// Random extra delay as a fraction of each delay, in [0, 1).
    pub jitter_ratio: f64,

    /// Failure kinds that are retried.
    pub retry_on: Vec<ErrorKind>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 2000,
            backoff_factor: 2.0,
            max_delay_ms: None,
            jitter_ratio: 0.0,
            retry_on: vec![ErrorKind::Transient],
        }
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry time-to-live in seconds.
    pub ttl_secs: u64,

    /// Background sweep interval in seconds; 0 disables the sweeper.
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 60 * 60,
            sweep_interval_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
