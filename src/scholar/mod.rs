//! Academic paper search.
//!
//! # Data Flow
//! ```text
//! topic
//!     → client.rs (rate limiter wait, GET /paper/search, retried)
//!     → process.rs (drop untitled, reference URL, venue, newest first)
//!     → Vec<Paper> + PaperSummary
//! ```

pub mod client;
pub mod process;
pub mod types;

pub use client::ScholarClient;
pub use process::{process_papers, round_tenth, summarize};
pub use types::{Author, Paper, PaperSummary, RawPaper, ScholarError, ScholarResult, YearRange};
