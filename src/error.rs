//! Error types for Wellscope
//!
//! This module defines the error taxonomy used throughout the session core,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Wellscope operations
///
/// Covers configuration loading, backend REST calls, local session storage
/// and input validation.
#[derive(Error, Debug)]
pub enum WellscopeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backend answered with a non-success status
    #[error("Backend error {status}: {detail}")]
    Api {
        /// HTTP status code returned by the backend
        status: u16,
        /// The backend `detail` message, or the raw body when absent
        detail: String,
    },

    /// The request never produced a backend answer (connect, timeout, decode)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Local session store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// A write would push the local store over its byte quota
    #[error("Storage quota exceeded: needed={needed}, quota={quota}")]
    QuotaExceeded {
        /// Total bytes the store would hold after the write
        needed: usize,
        /// Configured quota in bytes
        quota: usize,
    },

    /// Rejected user or caller input
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl WellscopeError {
    /// Text suitable for a toast: the backend's own detail when there is one
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { detail, .. } if !detail.is_empty() => detail.clone(),
            Self::Api { status, .. } => format!("Request failed with status {}", status),
            Self::Transport(msg) | Self::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for Wellscope operations
///
/// Uses `anyhow::Error` so call sites can attach context while the
/// underlying [`WellscopeError`] stays recoverable via downcasting.
pub type Result<T> = anyhow::Result<T>;

/// Toast text for any error produced by this crate
pub fn user_message_of(err: &anyhow::Error) -> String {
    match err.downcast_ref::<WellscopeError>() {
        Some(e) => e.user_message(),
        None => err.to_string(),
    }
}
