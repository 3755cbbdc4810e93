//! Process-wide composition of the notification core.
//!
//! [`PushEngine::initialize`] is called once at startup. It owns the only
//! live-message subscription: the platform event receiver is moved into a
//! single listener task, and the returned [`ListenerHandle`] is the one thing
//! that keeps it alive. Screens never subscribe on their own.

use medconf_common::{AlertPresenter, SessionCredential, SessionProvider};
use medconf_config::AppConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::client::TokenApi;
use crate::delivery::{
    BackgroundOpenedAdapter, ColdStartAdapter, DeliveryChannelAdapter, DispatchOutcome,
    ForegroundAdapter, IntentDispatcher, LinkAdapter, NavigationGate,
};
use crate::links::LinkResolver;
use crate::models::PlatformEvent;
use crate::platform::{MessagingPlatform, Navigator};
use crate::registrar::TokenRegistrar;
use crate::router::Screen;
use crate::session::SessionHub;
use crate::token_store::TokenStore;

/// Everything the engine needs from the host app.
#[derive(Clone)]
pub struct Collaborators {
    pub store: TokenStore,
    pub platform: Arc<dyn MessagingPlatform>,
    pub api: Arc<dyn TokenApi>,
    pub sessions: Arc<dyn SessionProvider>,
    pub alerts: Arc<dyn AlertPresenter>,
    pub navigator: Arc<dyn Navigator>,
}

/// Keeps the live listeners running. Dropping it (or calling
/// [`ListenerHandle::teardown`]) stops them along with any banner still
/// waiting for an answer; the cached token is untouched.
pub struct ListenerHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl ListenerHandle {
    pub fn teardown(self) {
        drop(self);
    }

    pub fn is_active(&self) -> bool {
        self.tasks.iter().any(|task| !task.is_finished())
    }

    /// Waits for the platform event stream to close, then stops the rest.
    pub async fn run_until_closed(mut self) {
        let mut tasks = std::mem::take(&mut self.tasks).into_iter();
        if let Some(events) = tasks.next() {
            if let Err(err) = events.await {
                warn!("Event listener ended abnormally: {}", err);
            }
        }
        for task in tasks {
            task.abort();
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        debug!("Notification listeners torn down");
    }
}

pub struct PushEngine {
    registrar: TokenRegistrar,
    gate: Arc<NavigationGate>,
    foreground: ForegroundAdapter,
    opened: BackgroundOpenedAdapter,
    cold_start: ColdStartAdapter,
    links: LinkAdapter,
}

impl PushEngine {
    pub fn new(collaborators: Collaborators, config: &AppConfig) -> Self {
        let Collaborators {
            store,
            platform,
            api,
            sessions,
            alerts,
            navigator,
        } = collaborators;

        let registrar = TokenRegistrar::new(
            store,
            Arc::clone(&platform),
            api,
            sessions,
            Arc::clone(&alerts),
        )
        .with_prompt_delay(Duration::from_millis(config.push.permission_prompt_delay_ms));

        let gate = Arc::new(NavigationGate::new(navigator));
        let dispatcher = IntentDispatcher::new(Arc::clone(&gate));
        let links = LinkAdapter::new(
            dispatcher.clone(),
            LinkResolver::from_config(&config.deep_links),
        );

        Self {
            registrar,
            foreground: ForegroundAdapter::new(dispatcher.clone(), alerts),
            opened: BackgroundOpenedAdapter::new(dispatcher.clone()),
            cold_start: ColdStartAdapter::new(dispatcher, links.clone(), platform),
            links,
            gate,
        }
    }

    pub fn registrar(&self) -> &TokenRegistrar {
        &self.registrar
    }

    /// Startup sequence: platform registration, listeners, launch event,
    /// then the permission request (which acquires and syncs the token).
    pub async fn initialize(
        self: &Arc<Self>,
        events: mpsc::Receiver<PlatformEvent>,
        sessions: watch::Receiver<Option<SessionCredential>>,
    ) -> ListenerHandle {
        self.registrar.initialize().await;

        let listener = self.spawn_event_listener(events);
        let session_listener = self.registrar.spawn_session_listener(sessions);

        if let Some(outcome) = self.cold_start.deliver_initial().await {
            debug!("Launch event: {:?}", outcome);
        }

        if self.registrar.request_permission().await.is_none() {
            info!("Push notifications unavailable for now");
        }

        ListenerHandle {
            tasks: vec![listener, session_listener],
        }
    }

    fn spawn_event_listener(
        self: &Arc<Self>,
        mut events: mpsc::Receiver<PlatformEvent>,
    ) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            // Open banners belong to this task and are aborted with it.
            let mut banners = JoinSet::new();
            while let Some(event) = events.recv().await {
                while banners.try_join_next().is_some() {}
                match event {
                    PlatformEvent::ForegroundMessage(message) => {
                        // The banner waits for the user; keep the stream moving meanwhile.
                        let foreground = engine.foreground.clone();
                        banners.spawn(async move {
                            let outcome = foreground.deliver(message).await;
                            debug!("Foreground message: {:?}", outcome);
                        });
                    }
                    other => engine.handle_event(other).await,
                }
            }
            debug!("Platform event stream closed");
            while banners.join_next().await.is_some() {}
        })
    }

    /// Routes one platform event to its channel.
    ///
    /// A foreground message is awaited until the user answers its banner.
    pub async fn handle_event(&self, event: PlatformEvent) {
        match event {
            PlatformEvent::ForegroundMessage(message) => {
                let outcome = self.foreground.deliver(message).await;
                debug!("Foreground message: {:?}", outcome);
            }
            PlatformEvent::NotificationOpened(message) => {
                let outcome = self.opened.deliver(message).await;
                debug!("Opened notification: {:?}", outcome);
            }
            PlatformEvent::TokenRefreshed(token) => self.registrar.on_token_refreshed(token).await,
            PlatformEvent::LinkOpened(url) => {
                let outcome = self.links.open(&url);
                if outcome == DispatchOutcome::Ignored {
                    debug!("Link ignored: {}", url);
                }
            }
        }
    }

    /// Signals that the navigation tree is mounted; replays a held launch event.
    pub fn navigation_ready(&self) -> Option<Screen> {
        self.gate.mark_ready()
    }

    /// Removes the device registration, then ends the session.
    pub async fn logout(&self, sessions: &SessionHub) {
        self.registrar.unregister().await;
        if let Err(err) = sessions.end().await {
            warn!("Failed to clear session on logout: {}", err);
        }
    }
}
