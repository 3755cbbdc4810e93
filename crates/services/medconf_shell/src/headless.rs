// File: services/medconf_shell/src/headless.rs
//
// Stand-ins for the mobile platform when the engine runs in a terminal.
// Navigation and dialogs are printed; every dialog is answered "yes".

use async_trait::async_trait;
use medconf_common::{AlertPresenter, AlertPrompt};
use medconf_push::{
    Clipboard, MessagingPlatform, Navigator, PermissionStatus, PushError, RemoteMessage,
    RouteParams, Screen, ShareSheet, ShareSheetResult,
};
use serde_json::json;
use tracing::info;

/// Environment variable holding the device token the headless platform hands out.
pub const DEVICE_TOKEN_ENV: &str = "MEDCONF_DEVICE_TOKEN";

pub struct HeadlessPlatform {
    token: Option<String>,
}

impl HeadlessPlatform {
    pub fn from_env() -> Self {
        let token = std::env::var(DEVICE_TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty());
        Self { token }
    }
}

#[async_trait]
impl MessagingPlatform for HeadlessPlatform {
    async fn register_device(&self) -> Result<(), PushError> {
        Ok(())
    }

    async fn request_permission(&self) -> Result<PermissionStatus, PushError> {
        Ok(match self.token {
            Some(_) => PermissionStatus::Authorized,
            None => PermissionStatus::Denied,
        })
    }

    async fn fetch_token(&self) -> Result<Option<String>, PushError> {
        Ok(self.token.clone())
    }

    async fn initial_notification(&self) -> Result<Option<RemoteMessage>, PushError> {
        Ok(None)
    }

    async fn open_settings(&self) -> Result<(), PushError> {
        Err(PushError::Platform(format!(
            "no system settings in a terminal; set {} instead",
            DEVICE_TOKEN_ENV
        )))
    }
}

pub struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn navigate_to(&self, screen: Screen, params: &RouteParams) {
        println!("{}", json!({ "navigate": screen, "params": params }));
    }
}

pub struct StdoutAlerts;

#[async_trait]
impl AlertPresenter for StdoutAlerts {
    async fn confirm(&self, prompt: AlertPrompt) -> bool {
        println!(
            "[{}] {} ({} / {}) -> {}",
            prompt.title,
            prompt.message,
            prompt.confirm_label,
            prompt.cancel_label,
            prompt.confirm_label
        );
        true
    }

    async fn notify(&self, title: &str, message: &str) {
        println!("[{}] {}", title, message);
    }
}

pub struct StdoutShareSheet;

#[async_trait]
impl ShareSheet for StdoutShareSheet {
    async fn share(&self, message: &str) -> Result<ShareSheetResult, PushError> {
        println!("{}", message);
        Ok(ShareSheetResult::Shared)
    }
}

/// A terminal has no clipboard we can reach portably.
pub struct NoClipboard;

#[async_trait]
impl Clipboard for NoClipboard {
    async fn set_text(&self, _text: &str) -> Result<(), PushError> {
        info!("Clipboard is not available in headless mode");
        Err(PushError::Share("clipboard unavailable".to_string()))
    }
}
