//! Research topic analysis service library.

pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod llm;
pub mod observability;
pub mod report;
pub mod resilience;
pub mod scholar;

pub use config::schema::LensConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
