//! Error types for the tracker, resolver, and environment configuration.
//!
//! None of these cross the public `Tracker`/`ConfigResolver` surface: they are
//! logged and discarded at that boundary.

use std::time::Duration;

use thiserror::Error;

/// Failure to hand an event to the analytics backend.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The backend exists but cannot accept events right now.
    #[error("analytics backend unavailable: {0}")]
    Unavailable(String),

    /// The event could not be encoded.
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    /// Network error talking to the backend.
    #[error("analytics transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend rejected the event.
    #[error("analytics backend rejected event: {status} - {body}")]
    Status { status: u16, body: String },
}

/// Failure to fetch remote configuration.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No remote configuration backend is configured.
    #[error("remote config backend unavailable")]
    Unavailable,

    /// Network error talking to the backend.
    #[error("remote config transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("remote config fetch failed: {status} - {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("failed to decode remote config: {0}")]
    Decode(String),

    /// The fetch did not finish within the configured timeout.
    #[error("remote config fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Invalid environment configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}
