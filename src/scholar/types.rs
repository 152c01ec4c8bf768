//! Paper search types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resilience::{Classify, ErrorKind};

/// Search response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    pub total: Option<u64>,
    pub data: Option<Vec<RawPaper>>,
}

/// A paper exactly as the search API returns it. Every field may be null.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPaper {
    pub paper_id: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub year: Option<i32>,
    pub citation_count: Option<u64>,
    pub authors: Option<Vec<Author>>,
    pub url: Option<String>,
    pub external_ids: Option<ExternalIds>,
    pub venue: Option<String>,
    pub journal: Option<Journal>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExternalIds {
    #[serde(rename = "DOI")]
    pub doi: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Journal {
    pub name: Option<String>,
    pub volume: Option<String>,
    pub pages: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Author {
    pub author_id: Option<String>,
    pub name: Option<String>,
}

impl Author {
    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => "Unknown",
        }
    }

    /// Last whitespace-separated word of the name.
    pub fn last_name(&self) -> &str {
        self.display_name().split_whitespace().last().unwrap_or("Unknown")
    }
}

/// A paper after filtering and normalization.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub year: Option<i32>,
    pub citation_count: u64,
    pub authors: Vec<Author>,
    pub doi: Option<String>,
    /// DOI link when known, otherwise the search API's own page.
    pub url: Option<String>,
    pub venue: Option<String>,
    pub volume: Option<String>,
    pub pages: Option<String>,
}

/// Year bounds of a paper set.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

/// Counts and citation statistics for a paper set.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PaperSummary {
    pub total_papers: usize,
    pub year_range: Option<YearRange>,
    pub total_citations: u64,
    pub avg_citations: f64,
}

/// Errors that can occur while searching for papers.
#[derive(Debug, Error)]
pub enum ScholarError {
    /// HTTP 429.
    #[error("Rate limit exceeded. Please wait before retrying.")]
    RateLimited,

    /// HTTP 400.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 401/403.
    #[error("Request rejected with status {status}; check the API key")]
    Unauthorized { status: u16 },

    /// Any other non-200 status.
    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request timed out")]
    Timeout,

    /// Connection or transport failure.
    #[error("Request failed: {0}")]
    Request(String),

    /// Body was not the JSON we expect.
    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ScholarError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScholarError::Timeout
        } else {
            ScholarError::Request(err.to_string())
        }
    }

    pub(crate) fn from_status(status: u16, body: String) -> Self {
        match status {
            429 => ScholarError::RateLimited,
            400 => ScholarError::BadRequest(body),
            401 | 403 => ScholarError::Unauthorized { status },
            _ => ScholarError::Status { status, body },
        }
    }
}

impl Classify for ScholarError {
    fn kind(&self) -> ErrorKind {
        match self {
            ScholarError::RateLimited | ScholarError::Timeout | ScholarError::Request(_) => {
                ErrorKind::Transient
            }
            ScholarError::Status { status, .. } if *status >= 500 => ErrorKind::Transient,
            ScholarError::Decode(_) => ErrorKind::ResponseMalformed,
            ScholarError::Status { .. }
            | ScholarError::BadRequest(_)
            | ScholarError::Unauthorized { .. }
            | ScholarError::Client(_)
            | ScholarError::InvalidUrl { .. } => ErrorKind::PermanentRequest,
        }
    }
}

/// Result type for paper search operations.
pub type ScholarResult<T> = Result<T, ScholarError>;
