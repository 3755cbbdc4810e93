use std::fmt;
use thiserror::Error;

/// The base error type for all MedConf errors.
///
/// Crates keep their own narrower error enums and implement
/// `From<CrateError> for MedconfError` so binaries can report one type.
#[derive(Error, Debug)]
pub enum MedconfError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The backend rejected the session credential
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Reading or writing the local key-value store failed
    #[error("Storage error: {0}")]
    StorageError(String),

    /// The platform messaging, share or alert layer failed
    #[error("Platform error: {0}")]
    PlatformError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a timeout
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl MedconfError {
    /// Whether a later trigger (next start, login or token refresh) may succeed
    /// where this attempt failed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            MedconfError::HttpError(_)
                | MedconfError::TimeoutError(_)
                | MedconfError::ExternalServiceError { .. }
        )
    }
}

// Common error conversions
impl From<reqwest::Error> for MedconfError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MedconfError::TimeoutError(err.to_string())
        } else {
            MedconfError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MedconfError {
    fn from(err: serde_json::Error) -> Self {
        MedconfError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for MedconfError {
    fn from(err: std::io::Error) -> Self {
        MedconfError::StorageError(err.to_string())
    }
}

/// Shorthand for a [`MedconfError::StorageError`].
pub fn storage_error<T: fmt::Display>(message: T) -> MedconfError {
    MedconfError::StorageError(message.to_string())
}
