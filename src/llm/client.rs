//! Text generation client.
//!
//! Speaks the `generateContent` REST shape: the model is addressed in the
//! path, the API key travels as the `key` query parameter, and the reply
//! text sits at `candidates[0].content.parts[0].text`.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::{LlmConfig, TimeoutConfig};
use crate::llm::types::{LlmError, LlmResult};
use crate::observability::metrics;
use crate::resilience::RateLimiter;

const UPSTREAM: &str = "llm";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
}

pub struct LlmClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    top_p: f32,
    limiter: Option<Arc<RateLimiter>>,
}

impl LlmClient {
    /// `limiter`, when given, spaces every call to the model.
    pub fn new(
        config: &LlmConfig,
        timeouts: &TimeoutConfig,
        limiter: Option<Arc<RateLimiter>>,
    ) -> LlmResult<Self> {
        let endpoint = endpoint(&config.base_url, &config.model)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.upstream_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(LlmError::Client)?;

        if config.api_key.as_deref().unwrap_or_default().is_empty() {
            tracing::warn!("No language model API key configured");
        }

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            limiter,
        })
    }

    /// Send one prompt and return the generated text. Not retried here.
    pub async fn generate(&self, prompt: &str, max_tokens: u32) -> LlmResult<String> {
        if let Some(limiter) = &self.limiter {
            limiter.wait().await;
        }

        let result = self.send(prompt, max_tokens).await;
        metrics::record_upstream_call(UPSTREAM, if result.is_ok() { "success" } else { "failure" });
        result
    }

    async fn send(&self, prompt: &str, max_tokens: u32) -> LlmResult<String> {
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: max_tokens,
                temperature: self.temperature,
                top_p: self.top_p,
            },
        };

        let mut request = self.http.post(self.endpoint.clone()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), max_tokens, "Calling language model");
        let response = request.send().await.map_err(LlmError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status.as_u16(), body));
        }

        let bytes = response.bytes().await.map_err(LlmError::from_reqwest)?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| LlmError::InvalidStructure(e.to_string()))?;

        extract_text(&value)
    }
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

fn endpoint(base_url: &str, model: &str) -> LlmResult<Url> {
    let joined = format!(
        "{}/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    );
    Url::parse(&joined).map_err(|e| LlmError::InvalidUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

fn extract_text(value: &Value) -> LlmResult<String> {
    let candidate = value
        .pointer("/candidates/0")
        .ok_or_else(|| LlmError::InvalidStructure("no candidates".into()))?;
    let parts = candidate
        .pointer("/content/parts")
        .and_then(Value::as_array)
        .filter(|parts| !parts.is_empty())
        .ok_or_else(|| LlmError::InvalidStructure("no content parts".into()))?;

    match parts[0].get("text").and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(LlmError::EmptyResponse),
    }
}
