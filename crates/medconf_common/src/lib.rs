// --- File: crates/medconf_common/src/lib.rs ---

pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Shared value types
pub mod services; // Collaborator abstractions

// Re-export error types and utilities for easier access
pub use error::{storage_error, MedconfError};

// Re-export HTTP utilities for easier access
pub use http::{bearer, client::create_client, join_url};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, redact};

pub use models::{DeviceToken, RegistrationState, SessionCredential, TokenStatus};
pub use services::{AlertPresenter, AlertPrompt, KeyValueStore, SessionProvider};
