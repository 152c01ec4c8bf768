//! Topic normalization and cache key derivation.

use sha2::{Digest, Sha256};
use std::fmt;

/// 128-bit digest of a normalized topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 16]);

impl CacheKey {
    /// Normalize `topic` and hash it. Topics that normalize identically
    /// share a key.
    pub fn from_topic(topic: &str) -> Self {
        let digest = Sha256::digest(normalize_topic(topic).as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Trim surrounding whitespace and lowercase.
pub fn normalize_topic(topic: &str) -> String {
    topic.trim().to_lowercase()
}
