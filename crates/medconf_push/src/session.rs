//! Session-established events.
//!
//! Login and token sync are sequenced, not raced: [`SessionHub::establish`]
//! persists the credential first and only then publishes it, so every
//! subscriber observes a credential that is already durable.

use async_trait::async_trait;
use medconf_common::{SessionCredential, SessionProvider};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::PushError;
use crate::token_store::TokenStore;

/// Reads the session credential straight from the [`TokenStore`].
#[derive(Clone)]
pub struct StoredSession {
    store: TokenStore,
}

impl StoredSession {
    pub fn new(store: TokenStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SessionProvider for StoredSession {
    async fn session_credential(&self) -> Option<SessionCredential> {
        match self.store.session_credential().await {
            Ok(credential) => credential,
            Err(err) => {
                warn!("Could not read session credential: {}", err);
                None
            }
        }
    }
}

/// Publishes session start and end to interested components.
pub struct SessionHub {
    store: TokenStore,
    sender: watch::Sender<Option<SessionCredential>>,
}

impl SessionHub {
    /// A hub with no session announced yet.
    pub fn new(store: TokenStore) -> Self {
        let (sender, _) = watch::channel(None);
        Self { store, sender }
    }

    /// A hub that starts from the credential already in the store, so
    /// subscribers see a session that outlived the previous app run.
    pub async fn restore(store: TokenStore) -> Self {
        let current = match store.session_credential().await {
            Ok(current) => current,
            Err(err) => {
                warn!("Could not restore session credential: {}", err);
                None
            }
        };
        if current.is_some() {
            debug!("Restored stored session");
        }
        let (sender, _) = watch::channel(current);
        Self { store, sender }
    }

    /// Receives `Some(credential)` after every login and `None` after logout.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionCredential>> {
        self.sender.subscribe()
    }

    /// Persists `credential`, then announces it.
    pub async fn establish(&self, credential: SessionCredential) -> Result<(), PushError> {
        self.store.set_session_credential(&credential).await?;
        info!("Session established");
        self.sender.send_replace(Some(credential));
        Ok(())
    }

    /// Clears the credential, then announces the logout.
    pub async fn end(&self) -> Result<(), PushError> {
        self.store.clear_session_credential().await?;
        info!("Session ended");
        self.sender.send_replace(None);
        Ok(())
    }

    pub fn provider(&self) -> StoredSession {
        StoredSession::new(self.store.clone())
    }
}
