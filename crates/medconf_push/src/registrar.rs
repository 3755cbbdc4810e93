//! Device token lifecycle.
//!
//! The registrar acquires the platform token, caches it in the [`TokenStore`],
//! and keeps the backend informed across app start, login, token rotation and
//! logout. Push is an enhancement, never a blocking capability: every backend
//! and platform failure is logged and swallowed, and the next natural trigger
//! (start, login, refresh) tries again.
//!
//! Concurrent calls may interleave between awaits, so the cached token is
//! always re-read from the store right before it is sent anywhere.

use chrono::Utc;
use medconf_common::{
    AlertPresenter, AlertPrompt, DeviceToken, MedconfError, RegistrationState, SessionCredential,
    SessionProvider, TokenStatus,
};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::client::TokenApi;
use crate::models::VerificationResult;
use crate::platform::MessagingPlatform;
use crate::token_store::TokenStore;

/// Delay before the settings explanation appears after a denied permission.
pub const DEFAULT_PROMPT_DELAY: Duration = Duration::from_millis(1500);

const SETTINGS_PROMPT_MESSAGE: &str = "Turn on notifications in Settings to hear about \
    event approvals, meeting invitations and new messages.";

#[derive(Clone)]
pub struct TokenRegistrar {
    store: TokenStore,
    platform: Arc<dyn MessagingPlatform>,
    api: Arc<dyn TokenApi>,
    sessions: Arc<dyn SessionProvider>,
    alerts: Arc<dyn AlertPresenter>,
    prompt_delay: Duration,
    status: Arc<Mutex<TokenStatus>>,
}

impl TokenRegistrar {
    pub fn new(
        store: TokenStore,
        platform: Arc<dyn MessagingPlatform>,
        api: Arc<dyn TokenApi>,
        sessions: Arc<dyn SessionProvider>,
        alerts: Arc<dyn AlertPresenter>,
    ) -> Self {
        Self {
            store,
            platform,
            api,
            sessions,
            alerts,
            prompt_delay: DEFAULT_PROMPT_DELAY,
            status: Arc::new(Mutex::new(TokenStatus {
                state: RegistrationState::Unregistered,
                last_synced_at: None,
            })),
        }
    }

    pub fn with_prompt_delay(mut self, delay: Duration) -> Self {
        self.prompt_delay = delay;
        self
    }

    /// One-time platform registration for remote messages. Never fails.
    ///
    /// A token cached by an earlier run is picked up as `CachedOnly`; it is
    /// only `SyncedWithServer` once this run has sent it.
    pub async fn initialize(&self) {
        match self.platform.register_device().await {
            Ok(()) => debug!("Registered for remote messages"),
            Err(err) => warn!("Remote message registration failed: {}", err),
        }

        if matches!(self.store.device_token().await, Ok(Some(_)))
            && self.registration_state() == RegistrationState::Unregistered
        {
            self.set_status(RegistrationState::CachedOnly, None);
        }
    }

    /// Asks for notification consent and, when granted, returns the device token.
    ///
    /// On denial a dismissible "open settings" prompt is scheduled after the
    /// configured delay and `None` is returned immediately.
    pub async fn request_permission(&self) -> Option<DeviceToken> {
        match self.platform.request_permission().await {
            Ok(status) if status.is_granted() => {
                debug!("Notification permission granted ({:?})", status);
                self.get_token().await
            }
            Ok(status) => {
                info!("Notification permission not granted ({:?})", status);
                self.schedule_settings_prompt();
                None
            }
            Err(err) => {
                warn!("Notification permission request failed: {}", err);
                None
            }
        }
    }

    fn schedule_settings_prompt(&self) {
        let alerts = Arc::clone(&self.alerts);
        let platform = Arc::clone(&self.platform);
        let delay = self.prompt_delay;

        // Fire-and-forget; the caller has already returned by the time this runs.
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let open = alerts
                .confirm(AlertPrompt {
                    title: "Notifications are turned off".to_string(),
                    message: SETTINGS_PROMPT_MESSAGE.to_string(),
                    confirm_label: "Open Settings".to_string(),
                    cancel_label: "Not now".to_string(),
                })
                .await;
            if open {
                if let Err(err) = platform.open_settings().await {
                    warn!("Could not open system settings: {}", err);
                }
            }
        });
    }

    /// Returns the cached token, or acquires and caches a fresh one.
    ///
    /// A freshly acquired token is synced in the background when a session is
    /// active; the caller does not wait for it.
    pub async fn get_token(&self) -> Option<DeviceToken> {
        match self.store.device_token().await {
            Ok(Some(token)) => return Some(token),
            Ok(None) => {}
            Err(err) => warn!("Could not read cached device token: {}", err),
        }

        let token = self.acquire_token().await?;

        if let Some(credential) = self.sessions.session_credential().await {
            let registrar = self.clone();
            tokio::spawn(async move {
                registrar.sync_with_server(&credential).await;
            });
        }

        Some(token)
    }

    async fn acquire_token(&self) -> Option<DeviceToken> {
        let raw = match self.platform.fetch_token().await {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => {
                warn!("Platform returned no device token");
                return None;
            }
            Err(err) => {
                warn!("Failed to fetch device token: {}", err);
                return None;
            }
        };

        let token = DeviceToken::new(raw);
        self.persist(&token).await;
        info!("Acquired device token {}", token);
        Some(token)
    }

    async fn persist(&self, token: &DeviceToken) {
        match self.store.set_device_token(token).await {
            Ok(()) => self.set_status(RegistrationState::CachedOnly, None),
            Err(err) => warn!("Failed to persist device token: {}", err),
        }
    }

    /// Syncs the device token under a freshly established session.
    ///
    /// Safe to call repeatedly: the backend upserts by token value and every
    /// call sends the currently cached value.
    pub async fn register_after_login(&self, credential: &SessionCredential) -> RegistrationState {
        let cached = match self.store.device_token().await {
            Ok(cached) => cached,
            Err(err) => {
                warn!("Could not read cached device token: {}", err);
                None
            }
        };

        if cached.is_none() && self.acquire_token().await.is_none() {
            warn!("No device token available after login; will retry on next trigger");
            return self.registration_state();
        }

        self.sync_with_server(credential).await;
        self.registration_state()
    }

    /// Stores a rotated token, superseding the previous one, and re-syncs if signed in.
    pub async fn on_token_refreshed(&self, new_token: String) {
        if new_token.trim().is_empty() {
            warn!("Ignoring empty refreshed token");
            return;
        }

        let token = DeviceToken::new(new_token);
        info!("Device token refreshed to {}", token);
        self.persist(&token).await;

        if let Some(credential) = self.sessions.session_credential().await {
            self.sync_with_server(&credential).await;
        }
    }

    /// Sends the cached token to the backend. Returns whether the backend accepted it.
    async fn sync_with_server(&self, credential: &SessionCredential) -> bool {
        let token = match self.store.device_token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No cached device token to sync");
                return false;
            }
            Err(err) => {
                warn!("Could not read cached device token: {}", err);
                return false;
            }
        };

        if let Err(err) = self.api.register_token(credential, &token).await {
            let err = MedconfError::from(err);
            if err.is_transient() {
                warn!("Device token sync failed, retrying on next trigger: {}", err);
            } else {
                error!("Failed to sync device token: {}", err);
            }
            return false;
        }
        info!("Device token {} synced with server", token);

        // A refresh may have replaced the token while the request was in flight.
        match self.store.device_token().await {
            Ok(Some(current)) if current == token => {
                self.set_status(RegistrationState::SyncedWithServer, Some(Utc::now()));
            }
            _ => debug!("Cached token changed during sync; state stays cached-only"),
        }
        true
    }

    /// Diagnostic round trip: is the locally cached token known to the backend?
    pub async fn verify_registration(&self) -> VerificationResult {
        let token = match self.store.device_token().await {
            Ok(Some(token)) => token,
            Ok(None) => return VerificationResult::failure("No device token cached on this device"),
            Err(err) => {
                return VerificationResult::failure(format!("Could not read device token: {}", err))
            }
        };

        let credential = self.sessions.session_credential().await;
        match self.api.verify_token(credential.as_ref(), &token).await {
            Ok(result) => {
                info!("Token verification: success={} ({})", result.success, result.message);
                result
            }
            Err(err) => {
                warn!("Token verification failed: {}", err);
                VerificationResult::failure(format!("Verification request failed: {}", err))
            }
        }
    }

    /// Logout: best-effort server-side removal, then local clear.
    ///
    /// Must run while the session credential is still available.
    pub async fn unregister(&self) {
        let token = self.store.device_token().await.unwrap_or_else(|err| {
            warn!("Could not read cached device token: {}", err);
            None
        });

        if let Some(token) = token {
            match self.sessions.session_credential().await {
                Some(credential) => {
                    if let Err(err) = self.api.delete_token(&credential, &token).await {
                        warn!("Failed to remove device token on server: {}", err);
                    }
                }
                None => debug!("No session; skipping server-side token removal"),
            }
        }

        if let Err(err) = self.store.clear_device_token().await {
            warn!("Failed to clear cached device token: {}", err);
        }
        self.set_status(RegistrationState::Unregistered, None);
    }

    /// Runs [`Self::register_after_login`] for every established session.
    pub fn spawn_session_listener(
        &self,
        mut sessions: watch::Receiver<Option<SessionCredential>>,
    ) -> JoinHandle<()> {
        let registrar = self.clone();
        tokio::spawn(async move {
            let current = sessions.borrow_and_update().clone();
            if let Some(credential) = current {
                registrar.register_after_login(&credential).await;
            }
            while sessions.changed().await.is_ok() {
                let current = sessions.borrow_and_update().clone();
                if let Some(credential) = current {
                    registrar.register_after_login(&credential).await;
                }
            }
            debug!("Session listener stopped");
        })
    }

    pub fn registration_state(&self) -> RegistrationState {
        self.lock_status().state
    }

    /// Registration snapshot, reconciled with what is actually cached.
    pub async fn status(&self) -> TokenStatus {
        let cached = matches!(self.store.device_token().await, Ok(Some(_)));
        let mut status = self.lock_status().clone();
        match (cached, status.state) {
            (false, _) => {
                status.state = RegistrationState::Unregistered;
                status.last_synced_at = None;
            }
            (true, RegistrationState::Unregistered) => status.state = RegistrationState::CachedOnly,
            _ => {}
        }
        status
    }

    fn set_status(&self, state: RegistrationState, synced_at: Option<chrono::DateTime<Utc>>) {
        let mut status = self.lock_status();
        status.state = state;
        status.last_synced_at = synced_at;
    }

    fn lock_status(&self) -> MutexGuard<'_, TokenStatus> {
        self.status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
