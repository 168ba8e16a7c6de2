//! Error types for event validation.

use thiserror::Error;

/// Problems found when checking an event against analytics backend limits.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    /// The event name is empty, too long, or contains invalid characters.
    #[error("invalid event name: {0:?}")]
    InvalidName(String),

    /// The event carries more parameters than the backend accepts.
    #[error("too many parameters: {count} (max {max})")]
    TooManyParams { count: usize, max: usize },

    /// A parameter name is empty or too long.
    #[error("invalid parameter name: {0:?}")]
    InvalidParamName(String),

    /// A string parameter value exceeds the backend limit.
    #[error("parameter {name:?} value too long: {len} chars (max {max})")]
    ValueTooLong { name: String, len: usize, max: usize },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EventError {
    fn from(err: serde_json::Error) -> Self {
        EventError::Serialization(err.to_string())
    }
}
