//! Seams to the host platform.
//!
//! Everything the notification core needs from the OS (messaging, navigation,
//! share sheet, clipboard) is expressed here as a trait. The composition root
//! supplies real implementations; tests supply fakes.

use async_trait::async_trait;

use crate::error::PushError;
use crate::models::{PermissionStatus, RemoteMessage};
use crate::router::{RouteParams, Screen};

/// Platform push-messaging layer.
#[async_trait]
pub trait MessagingPlatform: Send + Sync {
    /// One-time registration for remote messages. Only iOS needs an explicit
    /// call before a token can be requested; other platforms return `Ok(())`.
    async fn register_device(&self) -> Result<(), PushError>;

    /// Shows the notification consent dialog (or returns the remembered answer).
    async fn request_permission(&self) -> Result<PermissionStatus, PushError>;

    /// Asks the platform for the current device token.
    async fn fetch_token(&self) -> Result<Option<String>, PushError>;

    /// The notification that launched the app from a killed state, if any.
    async fn initial_notification(&self) -> Result<Option<RemoteMessage>, PushError>;

    /// The external URL that launched the app from a killed state, if any.
    async fn initial_link(&self) -> Result<Option<String>, PushError> {
        Ok(None)
    }

    /// Opens the system settings page for this app.
    async fn open_settings(&self) -> Result<(), PushError>;
}

/// Navigation primitive of the host UI.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, screen: Screen, params: &RouteParams);
}

/// What the OS share sheet reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareSheetResult {
    Shared,
    Dismissed,
}

#[async_trait]
pub trait ShareSheet: Send + Sync {
    async fn share(&self, message: &str) -> Result<ShareSheetResult, PushError>;
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn set_text(&self, text: &str) -> Result<(), PushError>;
}
