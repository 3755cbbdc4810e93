//! Wire and event models for the notification core.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A push message as handed over by the platform messaging layer.
///
/// `title` and `body` are presentation-only; routing looks at `data` alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMessage {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl RemoteMessage {
    pub fn with_data<I, K, V>(data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            title: None,
            body: None,
            data: data
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Asynchronous inbound events from the platform layer.
///
/// Serialized as `{"event": "token_refreshed", "payload": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum PlatformEvent {
    /// A push arrived while the app is in the foreground.
    ForegroundMessage(RemoteMessage),
    /// The user tapped a notification while the app was in the background.
    NotificationOpened(RemoteMessage),
    /// The platform rotated the device token.
    TokenRefreshed(String),
    /// The app was asked to open an external URL.
    LinkOpened(String),
}

/// Outcome of the notification consent dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Authorized,
    Provisional,
    Denied,
    NotDetermined,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, PermissionStatus::Authorized | PermissionStatus::Provisional)
    }
}

/// Body of `POST /users/fcm-token` and `DELETE /users/fcm-token`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenRequest {
    pub token: String,
}

/// Body of `POST /verify-fcm-token`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyTokenRequest {
    #[serde(rename = "fcmToken")]
    pub fcm_token: String,
}

/// Result of the diagnostic server-side verification round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl VerificationResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
