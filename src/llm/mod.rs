//! Language model analysis.
//!
//! # Data Flow
//! ```text
//! topic + papers
//!     → prompt.rs (numbered papers, citation hints, truncated abstracts)
//!     → client.rs (generateContent call, optional rate limiter)
//!     → parse.rs (JSON span extraction, field defaults)
//!     → Analysis / Proposal
//! ```
//! `analyzer.rs` wraps generate + parse in the retry policy.

pub mod analyzer;
pub mod client;
pub mod parse;
pub mod prompt;
pub mod types;

pub use analyzer::Analyzer;
pub use client::LlmClient;
pub use types::{Analysis, LlmError, LlmResult, Proposal};
