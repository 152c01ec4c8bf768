//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Build clients, limiters, caches → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → server stops accepting, drains → sweeper exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then subsystems, then listener
//! - Fail fast: any startup error is fatal (startup.rs)

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::StartupError;
