//! Language model types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resilience::{Classify, ErrorKind};

/// Research analysis extracted from a paper set.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Analysis {
    pub research_gaps: Vec<String>,
    pub research_questions: Vec<String>,
    pub methodology_suggestions: Vec<String>,
    pub novelty_assessment: String,
}

impl Analysis {
    /// Placeholder returned to clients when analysis could not be produced.
    pub fn fallback() -> Self {
        Self {
            research_gaps: vec!["Unable to analyze research gaps due to API error".into()],
            research_questions: vec!["Unable to generate research questions due to API error".into()],
            methodology_suggestions: vec!["Unable to suggest methodologies due to API error".into()],
            novelty_assessment: "Analysis could not be completed. Please try again.".into(),
        }
    }
}

/// A generated research proposal.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Proposal {
    pub title: String,
    pub introduction: String,
    pub literature_review: String,
    pub research_questions: Vec<String>,
    pub methodology: String,
    pub expected_outcomes: String,
    pub timeline: String,
}

impl Proposal {
    pub fn fallback() -> Self {
        Self {
            title: "Research Proposal".into(),
            introduction: "Unable to generate introduction due to API error.".into(),
            literature_review: "Unable to generate literature review due to API error.".into(),
            research_questions: Vec::new(),
            methodology: "Unable to generate methodology due to API error.".into(),
            expected_outcomes: "Unable to generate expected outcomes due to API error.".into(),
            timeline: "Unable to generate timeline due to API error.".into(),
        }
    }
}

/// Errors that can occur while talking to the language model.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Language model rate limit exceeded")]
    RateLimited,

    #[error("Invalid request to language model: {0}")]
    BadRequest(String),

    #[error("Language model rejected credentials (status {status})")]
    Unauthorized { status: u16 },

    #[error("Language model API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Language model request timed out")]
    Timeout,

    #[error("Language model request failed: {0}")]
    Request(String),

    /// Response did not have the expected candidate/content/parts shape.
    #[error("Invalid language model response structure: {0}")]
    InvalidStructure(String),

    #[error("Empty response from language model")]
    EmptyResponse,

    #[error("Could not find JSON in language model response")]
    NoJson,

    #[error("Failed to parse language model response as JSON: {0}")]
    InvalidJson(String),

    /// Nothing to send, e.g. an empty paper set.
    #[error("{0}")]
    MissingInput(String),

    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl LlmError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(err.to_string())
        }
    }

    pub(crate) fn from_status(status: u16, body: String) -> Self {
        match status {
            429 => LlmError::RateLimited,
            400 => LlmError::BadRequest(body),
            401 | 403 => LlmError::Unauthorized { status },
            _ => LlmError::Status { status, body },
        }
    }
}

impl Classify for LlmError {
    fn kind(&self) -> ErrorKind {
        match self {
            LlmError::RateLimited | LlmError::Timeout | LlmError::Request(_) => ErrorKind::Transient,
            LlmError::Status { status, .. } if *status >= 500 => ErrorKind::Transient,
            LlmError::InvalidStructure(_)
            | LlmError::EmptyResponse
            | LlmError::NoJson
            | LlmError::InvalidJson(_) => ErrorKind::ResponseMalformed,
            LlmError::Status { .. }
            | LlmError::BadRequest(_)
            | LlmError::Unauthorized { .. }
            | LlmError::MissingInput(_)
            | LlmError::Client(_)
            | LlmError::InvalidUrl { .. } => ErrorKind::PermanentRequest,
        }
    }
}

pub type LlmResult<T> = Result<T, LlmError>;
