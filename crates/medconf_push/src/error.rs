//! Error type for the notification core.

use medconf_common::MedconfError;
use thiserror::Error;

/// Errors that can occur inside the notification core.
///
/// These stay inside the crate: public operations log them and hand the
/// caller a sentinel (`None`, `NoRoute`, an unsuccessful verification).
#[derive(Error, Debug)]
pub enum PushError {
    /// Error during HTTP request to the backend
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Error returned by the backend
    #[error("Backend API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The local key-value store failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// The platform messaging layer failed
    #[error("Platform error: {0}")]
    Platform(String),

    /// The OS share sheet or clipboard failed
    #[error("Share error: {0}")]
    Share(String),

    /// A payload or stored value could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing or invalid configuration
    #[error("Missing configuration: {0}")]
    Config(String),
}

impl From<MedconfError> for PushError {
    fn from(err: MedconfError) -> Self {
        match err {
            MedconfError::PlatformError(msg) => PushError::Platform(msg),
            MedconfError::ConfigError(msg) => PushError::Config(msg),
            other => PushError::Storage(other.to_string()),
        }
    }
}

impl From<PushError> for MedconfError {
    fn from(err: PushError) -> Self {
        match err {
            PushError::Request(e) => MedconfError::from(e),
            PushError::Api { status: 401, message } | PushError::Api { status: 403, message } => {
                MedconfError::AuthError(message)
            }
            PushError::Api { status, message } => MedconfError::ExternalServiceError {
                service_name: "backend".to_string(),
                message: format!("{}: {}", status, message),
            },
            PushError::Storage(msg) => MedconfError::StorageError(msg),
            PushError::Platform(msg) | PushError::Share(msg) => MedconfError::PlatformError(msg),
            PushError::Serialization(e) => MedconfError::ParseError(e.to_string()),
            PushError::Config(msg) => MedconfError::ConfigError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_auth_error() {
        let err: MedconfError = PushError::Api {
            status: 401,
            message: "token expired".to_string(),
        }
        .into();
        assert!(matches!(err, MedconfError::AuthError(ref m) if m == "token expired"));
    }

    #[test]
    fn test_server_error_is_transient() {
        let err: MedconfError = PushError::Api {
            status: 503,
            message: "maintenance".to_string(),
        }
        .into();
        assert!(err.is_transient());
    }
}
