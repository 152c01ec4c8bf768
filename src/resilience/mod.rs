//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call to an external API:
//!     → retries.rs (run the attempt, classify failures, back off)
//!         → rate_limiter.rs (each attempt waits for its slot)
//!         → the HTTP call itself (per-attempt timeout lives in the client)
//!     → kind.rs maps the client's error onto Transient / PermanentRequest /
//!       ResponseMalformed so the policy can decide
//! ```
//!
//! # Design Decisions
//! - Limiter and retry policy are explicit values injected by the composition root
//! - One limiter per external API, shared for the whole process lifetime
//! - Retries are driven by error kind, never by concrete error type
//! - Every wait is an async sleep; nothing blocks a runtime worker

pub mod backoff;
pub mod kind;
pub mod rate_limiter;
pub mod retries;

pub use kind::{Classify, ErrorKind};
pub use rate_limiter::RateLimiter;
pub use retries::{run, RetryPolicy};
