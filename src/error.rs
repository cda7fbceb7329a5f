//! Error types for the emitter.

use thiserror::Error;

/// Main error type for registry operations.
///
/// `on`, `once`, `off` and `emit` never fail; only the strict variants
/// ([`Registry::try_emit`](crate::Registry::try_emit)) and identifier parsing
/// produce errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmitterError {
    #[error("Payload type mismatch on event {event:?}: subscriber expects {expected}, got {found}")]
    PayloadMismatch {
        event: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, EmitterError>;
