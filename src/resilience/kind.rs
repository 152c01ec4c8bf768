//! Failure classification shared by every outbound integration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse category of an outbound failure.
///
/// Each integration maps its own signals (status codes, timeouts, parse
/// failures) onto one of these, and retry policies are written against
/// the kind rather than the concrete error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Rate limited, timed out, connection failure, 5xx.
    Transient,
    /// Malformed request, authentication failure, any other 4xx.
    PermanentRequest,
    /// Upstream answered, but with a payload we could not use.
    ResponseMalformed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transient => "transient",
            ErrorKind::PermanentRequest => "permanent_request",
            ErrorKind::ResponseMalformed => "response_malformed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by error types that can be fed to [`crate::resilience::retries::run`].
pub trait Classify {
    fn kind(&self) -> ErrorKind;
}
