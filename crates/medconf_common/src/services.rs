//! Collaborator abstractions provided by the surrounding app.
//!
//! The notification core never talks to storage, dialogs or the session layer
//! directly; it goes through these traits so the composition root can plug in
//! platform implementations and tests can plug in fakes.

use async_trait::async_trait;

use crate::error::MedconfError;
use crate::models::SessionCredential;

/// Durable string key-value persistence.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, MedconfError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), MedconfError>;

    async fn remove(&self, key: &str) -> Result<(), MedconfError>;
}

/// Read access to the current session.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn session_credential(&self) -> Option<SessionCredential>;
}

/// A two-button dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertPrompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

/// User-facing alerts and banners.
#[async_trait]
pub trait AlertPresenter: Send + Sync {
    /// Shows `prompt` and resolves to `true` when the confirm button was chosen.
    async fn confirm(&self, prompt: AlertPrompt) -> bool;

    /// Shows a dismiss-only message.
    async fn notify(&self, title: &str, message: &str);
}
