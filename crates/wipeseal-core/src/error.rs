// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Wipeseal.

use thiserror::Error;

/// Top-level error type for all Wipeseal operations.
#[derive(Debug, Error)]
pub enum WipesealError {
    // -- Key material --
    #[error("signing key material unavailable: {0}")]
    KeyUnavailable(String),

    #[error("cryptographic operation failed: {0}")]
    Crypto(String),

    // -- Record / document --
    #[error("attestation record is malformed: {0}")]
    Schema(String),

    #[error("document rendering failed: {0}")]
    Render(String),

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Orchestration --
    #[error("operation cancelled")]
    Cancelled,
}

/// Coarse failure classes a caller branches on.
///
/// Library-specific failures are folded into one of these so that "no key
/// configured", "bad input record" and "disk full" stay distinguishable
/// without matching on third-party error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    KeyUnavailable,
    SchemaError,
    RenderError,
    IoError,
    Cancelled,
}

impl WipesealError {
    /// Classify this error into the pipeline's failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            // A key that refuses to sign is as good as no key at all.
            Self::KeyUnavailable(_) | Self::Crypto(_) => ErrorKind::KeyUnavailable,
            Self::Schema(_) | Self::Serialization(_) => ErrorKind::SchemaError,
            Self::Render(_) => ErrorKind::RenderError,
            Self::Io(_) | Self::Database(_) => ErrorKind::IoError,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WipesealError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            WipesealError::KeyUnavailable("missing".into()).kind(),
            ErrorKind::KeyUnavailable
        );
        assert_eq!(
            WipesealError::Crypto("bad modulus".into()).kind(),
            ErrorKind::KeyUnavailable
        );
        assert_eq!(
            WipesealError::Schema("no audit".into()).kind(),
            ErrorKind::SchemaError
        );
        assert_eq!(
            WipesealError::Render("not a pdf".into()).kind(),
            ErrorKind::RenderError
        );
        let io = std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full");
        assert_eq!(WipesealError::from(io).kind(), ErrorKind::IoError);
        assert_eq!(WipesealError::Cancelled.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn json_errors_are_schema_errors() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(WipesealError::from(err).kind(), ErrorKind::SchemaError);
    }
}
