//! Delivery channels: how inbound events reach the router and the navigator.
//!
//! Three push channels share one contract ([`DeliveryChannelAdapter`]):
//!
//! - foreground: a live push is shown as a banner first, and only a "View" tap routes
//! - background-opened: the user already tapped the notification, so route right away
//! - cold start: the notification that launched the app, routed right away
//!
//! Opened links go through [`LinkAdapter`]. All of them end in the
//! [`NavigationGate`], which holds at most one decision until the navigation
//! tree is mounted.

use async_trait::async_trait;
use medconf_common::{AlertPresenter, AlertPrompt};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::intent::NotificationIntent;
use crate::links::LinkResolver;
use crate::models::RemoteMessage;
use crate::normalizer::normalize;
use crate::platform::{MessagingPlatform, Navigator};
use crate::router::{route, RouteDecision, RouteParams, Screen};

/// What happened to one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Navigated(Screen),
    /// Held until the navigation layer is ready.
    Queued(Screen),
    /// The router said `NoRoute`, or the link was not ours.
    Ignored,
    /// The user dismissed the foreground banner.
    Dismissed,
}

#[derive(Default)]
struct GateState {
    ready: bool,
    pending: Option<(Screen, RouteParams)>,
}

/// Pending-intent queue of capacity one, latest wins, drained once on readiness.
pub struct NavigationGate {
    navigator: Arc<dyn Navigator>,
    state: Mutex<GateState>,
}

impl NavigationGate {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            navigator,
            state: Mutex::new(GateState::default()),
        }
    }

    /// Navigates now, queues until ready, or drops a `NoRoute`.
    ///
    /// The navigator is called with the gate locked so a replayed decision can
    /// never overtake a newer one; navigators must not call back into the gate.
    pub fn submit(&self, decision: &RouteDecision) -> DispatchOutcome {
        let Some((screen, params)) = decision.navigation() else {
            return DispatchOutcome::Ignored;
        };

        let mut state = self.lock();
        if state.ready {
            info!("Navigating to {}", screen);
            self.navigator.navigate_to(screen, &params);
            DispatchOutcome::Navigated(screen)
        } else {
            if let Some((replaced, _)) = state.pending.replace((screen, params)) {
                debug!("Pending navigation to {} replaced by {}", replaced, screen);
            } else {
                debug!("Navigation not ready; holding {}", screen);
            }
            DispatchOutcome::Queued(screen)
        }
    }

    /// Marks the navigation tree as mounted and replays the held decision.
    ///
    /// Returns the replayed screen. Only the first call has any effect.
    pub fn mark_ready(&self) -> Option<Screen> {
        let mut state = self.lock();
        if state.ready {
            return None;
        }
        state.ready = true;
        let (screen, params) = state.pending.take()?;
        info!("Replaying held navigation to {}", screen);
        self.navigator.navigate_to(screen, &params);
        Some(screen)
    }

    pub fn is_ready(&self) -> bool {
        self.lock().ready
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Router plus gate: the tail every channel shares.
#[derive(Clone)]
pub struct IntentDispatcher {
    gate: Arc<NavigationGate>,
}

impl IntentDispatcher {
    pub fn new(gate: Arc<NavigationGate>) -> Self {
        Self { gate }
    }

    pub fn dispatch(&self, intent: &NotificationIntent) -> DispatchOutcome {
        let decision = route(intent);
        match &decision {
            RouteDecision::NoRoute { reason } => warn!("Not navigating: {}", reason),
            RouteDecision::DefaultRoute => debug!("{} has no route; opening home", intent.kind()),
            RouteDecision::Navigate { target, .. } => {
                debug!("{} routes to {}", intent.kind(), target)
            }
        }
        self.gate.submit(&decision)
    }

    pub fn gate(&self) -> &Arc<NavigationGate> {
        &self.gate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryChannel {
    Foreground,
    BackgroundOpened,
    ColdStart,
}

#[async_trait]
pub trait DeliveryChannelAdapter: Send + Sync {
    fn channel(&self) -> DeliveryChannel;

    async fn deliver(&self, message: RemoteMessage) -> DispatchOutcome;
}

/// Live pushes while the app is open. Never steals focus without a tap.
#[derive(Clone)]
pub struct ForegroundAdapter {
    dispatcher: IntentDispatcher,
    alerts: Arc<dyn AlertPresenter>,
}

impl ForegroundAdapter {
    pub fn new(dispatcher: IntentDispatcher, alerts: Arc<dyn AlertPresenter>) -> Self {
        Self { dispatcher, alerts }
    }
}

#[async_trait]
impl DeliveryChannelAdapter for ForegroundAdapter {
    fn channel(&self) -> DeliveryChannel {
        DeliveryChannel::Foreground
    }

    async fn deliver(&self, message: RemoteMessage) -> DispatchOutcome {
        let intent = normalize(&message.data);
        let prompt = AlertPrompt {
            title: message
                .title
                .clone()
                .unwrap_or_else(|| "New notification".to_string()),
            message: message.body.clone().unwrap_or_default(),
            confirm_label: "View".to_string(),
            cancel_label: "Dismiss".to_string(),
        };

        if self.alerts.confirm(prompt).await {
            self.dispatcher.dispatch(&intent)
        } else {
            debug!("Foreground {} dismissed", intent.kind());
            DispatchOutcome::Dismissed
        }
    }
}

/// Notification tapped while the app was backgrounded.
#[derive(Clone)]
pub struct BackgroundOpenedAdapter {
    dispatcher: IntentDispatcher,
}

impl BackgroundOpenedAdapter {
    pub fn new(dispatcher: IntentDispatcher) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl DeliveryChannelAdapter for BackgroundOpenedAdapter {
    fn channel(&self) -> DeliveryChannel {
        DeliveryChannel::BackgroundOpened
    }

    async fn deliver(&self, message: RemoteMessage) -> DispatchOutcome {
        self.dispatcher.dispatch(&normalize(&message.data))
    }
}

/// External URLs opened while the app is running or at launch.
#[derive(Clone)]
pub struct LinkAdapter {
    dispatcher: IntentDispatcher,
    resolver: LinkResolver,
}

impl LinkAdapter {
    pub fn new(dispatcher: IntentDispatcher, resolver: LinkResolver) -> Self {
        Self {
            dispatcher,
            resolver,
        }
    }

    pub fn open(&self, url: &str) -> DispatchOutcome {
        match self.resolver.resolve(url) {
            Some(intent) => self.dispatcher.dispatch(&intent),
            None => {
                debug!("Not our link: {}", url);
                DispatchOutcome::Ignored
            }
        }
    }
}

/// The notification or link that launched the app from a killed state.
#[derive(Clone)]
pub struct ColdStartAdapter {
    dispatcher: IntentDispatcher,
    links: LinkAdapter,
    platform: Arc<dyn MessagingPlatform>,
}

impl ColdStartAdapter {
    pub fn new(
        dispatcher: IntentDispatcher,
        links: LinkAdapter,
        platform: Arc<dyn MessagingPlatform>,
    ) -> Self {
        Self {
            dispatcher,
            links,
            platform,
        }
    }

    /// Asks the platform what launched the app and routes it. A launch
    /// notification takes precedence over a launch link.
    pub async fn deliver_initial(&self) -> Option<DispatchOutcome> {
        match self.platform.initial_notification().await {
            Ok(Some(message)) => return Some(self.deliver(message).await),
            Ok(None) => {}
            Err(err) => warn!("Could not read launch notification: {}", err),
        }

        match self.platform.initial_link().await {
            Ok(Some(url)) => Some(self.links.open(&url)),
            Ok(None) => None,
            Err(err) => {
                warn!("Could not read launch link: {}", err);
                None
            }
        }
    }
}

#[async_trait]
impl DeliveryChannelAdapter for ColdStartAdapter {
    fn channel(&self) -> DeliveryChannel {
        DeliveryChannel::ColdStart
    }

    async fn deliver(&self, message: RemoteMessage) -> DispatchOutcome {
        self.dispatcher.dispatch(&normalize(&message.data))
    }
}
