//! Error types for atcmix-engine
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for the atcmix engine
#[derive(Error, Debug)]
pub enum Error {
    /// Host audio subsystem unavailable or graph construction failed.
    ///
    /// Retryable: a subsequent `init()` may succeed, or a fresh engine
    /// instance can be created.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Media element failed to start or resume playback (network failure,
    /// decode failure, autoplay-policy rejection). Recoverable; the caller
    /// may retry with the same or a different URL.
    #[error("Playback error: {0}")]
    Playback(String),

    /// Catalog transport or JSON decode failure
    #[error("Catalog error: {0}")]
    Catalog(#[from] reqwest::Error),

    /// Operation issued against a closed audio output
    #[error("Output closed: {0}")]
    Closed(String),
}

/// Convenience Result type using the atcmix engine Error
pub type Result<T> = std::result::Result<T, Error>;
