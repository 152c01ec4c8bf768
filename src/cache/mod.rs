//! Result caching subsystem.
//!
//! # Data Flow
//! ```text
//! /analyze request
//!     → key.rs (trim + lowercase topic, 128-bit digest)
//!     → expiring.rs get (hit within TTL → return; stale → purge)
//!     → on miss the handler does the work, then expiring.rs set
//!
//! Maintenance:
//!     → expiring.rs sweep (explicit, via /cache/sweep)
//!     → sweeper.rs (optional periodic sweep)
//! ```
//!
//! # Design Decisions
//! - In-memory only; a restart empties the cache
//! - Expiry is lazy; `size` counts stale entries until they are purged
//! - Time comes from an injected `Clock` so expiry is testable
//! - Each cache is an explicitly constructed value, never a global

pub mod clock;
pub mod expiring;
pub mod key;
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use expiring::{ExpiringCache, DEFAULT_TTL};
pub use key::{normalize_topic, CacheKey};
pub use sweeper::CacheSweeper;
