// --- File: crates/medconf_common/src/models.rs ---

// Value types shared between the notification core and the surrounding app:
// the session credential owned by authentication and the device token owned
// by the push registrar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::logging::redact;

/// Bearer credential of the signed-in user.
///
/// Owned by the authentication subsystem; the notification core only reads it.
/// `Debug` never prints the full value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCredential(String);

impl SessionCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionCredential")
            .field(&redact(&self.0))
            .finish()
    }
}

/// Opaque identifier issued by the platform push-messaging layer.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceToken(String);

impl DeviceToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DeviceToken").field(&redact(&self.0)).finish()
    }
}

impl fmt::Display for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(&self.0))
    }
}

/// Where the locally cached device token stands relative to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    /// No token is cached.
    #[default]
    Unregistered,
    /// A token is cached but the backend has not acknowledged it.
    CachedOnly,
    /// The backend acknowledged the currently cached token.
    SyncedWithServer,
}

/// Diagnostic snapshot of the registrar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenStatus {
    pub state: RegistrationState,
    pub last_synced_at: Option<DateTime<Utc>>,
}
