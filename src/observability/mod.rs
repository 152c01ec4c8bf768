//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, opt-in)
//! ```
//!
//! # Design Decisions
//! - Structured fields (topic, attempt, delay, kind) instead of formatted strings
//! - Request ID (x-request-id) attached to every request span
//! - Metrics are cheap no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
