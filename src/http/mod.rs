//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (x-request-id assigned and propagated)
//!     → handlers.rs (validate topic → cache → scholar → llm → report)
//!     → error.rs (ApiError → JSON error body + status)
//!     → middleware.rs (per-route request metrics)
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;

pub use error::ApiError;
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
