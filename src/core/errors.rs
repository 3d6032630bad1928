//! Error types for the pairup state core.
//!
//! Store operations never fail: unknown ids degrade to a reported no-op.
//! These errors cover the fallible edges around them (configuration, seed
//! loading and input validation at the session boundary).

use thiserror::Error;

/// Crate error type.
#[derive(Debug, Error)]
pub enum PairupError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Seed data that would break a store invariant.
    #[error("invalid seed data: {0}")]
    InvalidSeed(String),
    /// Message content is empty after trimming.
    #[error("message content is empty")]
    EmptyMessage,
    /// Identifier that is not a valid UUID.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] uuid::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias.
pub type PairupResult<T> = Result<T, PairupError>;
