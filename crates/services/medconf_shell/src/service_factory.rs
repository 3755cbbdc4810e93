// --- File: crates/services/medconf_shell/src/service_factory.rs ---
//! Wires the notification engine to file-backed storage and the headless platform.

use medconf_common::MedconfError;
use medconf_config::AppConfig;
use medconf_push::{
    Collaborators, HttpTokenApi, JsonFileStore, LinkResolver, PushEngine, SessionHub,
    ShareLinkBuilder, ShareService, TokenRegistrar, TokenStore,
};
use std::sync::Arc;
use tracing::info;

use crate::headless::{
    HeadlessPlatform, NoClipboard, StdoutAlerts, StdoutNavigator, StdoutShareSheet,
};

pub struct ShellServiceFactory {
    config: Arc<AppConfig>,
    store: TokenStore,
    sessions: Arc<SessionHub>,
}

impl ShellServiceFactory {
    /// Opens the token store and picks up a session left by a previous run.
    pub async fn new(config: Arc<AppConfig>) -> Self {
        info!("Using token store at {}", config.push.store_path);
        let store = TokenStore::new(Arc::new(JsonFileStore::new(&config.push.store_path)));
        let sessions = Arc::new(SessionHub::restore(store.clone()).await);
        Self {
            config,
            store,
            sessions,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionHub> {
        &self.sessions
    }

    pub fn link_resolver(&self) -> LinkResolver {
        LinkResolver::from_config(&self.config.deep_links)
    }

    pub fn share_service(&self) -> ShareService {
        ShareService::new(
            ShareLinkBuilder::new(self.link_resolver()),
            Arc::new(StdoutShareSheet),
            Arc::new(NoClipboard),
            Arc::new(StdoutAlerts),
        )
    }

    fn collaborators(&self) -> Result<Collaborators, MedconfError> {
        Ok(Collaborators {
            store: self.store.clone(),
            platform: Arc::new(HeadlessPlatform::from_env()),
            api: Arc::new(HttpTokenApi::new(&self.config.api)?),
            sessions: Arc::new(self.sessions.provider()),
            alerts: Arc::new(StdoutAlerts),
            navigator: Arc::new(StdoutNavigator),
        })
    }

    pub fn registrar(&self) -> Result<TokenRegistrar, MedconfError> {
        let c = self.collaborators()?;
        Ok(TokenRegistrar::new(c.store, c.platform, c.api, c.sessions, c.alerts))
    }

    pub fn engine(&self) -> Result<Arc<PushEngine>, MedconfError> {
        Ok(Arc::new(PushEngine::new(self.collaborators()?, &self.config)))
    }
}
