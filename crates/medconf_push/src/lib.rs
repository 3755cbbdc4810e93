// --- File: crates/medconf_push/src/lib.rs ---

//! Push notification and deep-link routing core for the MedConf app.
//!
//! Inbound push payloads and external URLs are normalized into a
//! [`NotificationIntent`], routed to a [`Screen`] by a pure table, and handed
//! to the host navigator. Device token acquisition and backend registration
//! live in [`TokenRegistrar`]; [`PushEngine`] wires the pieces together.

// Declare modules within this crate
pub mod client; // Backend token API
pub mod delivery; // Delivery channels and the navigation gate
pub mod engine; // Composition root
pub mod error; // Error handling
pub mod intent; // Canonical intent model
pub mod links; // Deep link resolution and URL building
pub mod models; // Wire and event models
pub mod normalizer; // Push payload normalization
pub mod platform; // Host platform seams
pub mod registrar; // Device token lifecycle
pub mod router; // Intent to screen dispatch table
pub mod session; // Session-established events
pub mod share; // Share links
pub mod token_store; // Durable token cache

#[cfg(test)]
mod links_proptest;

// Re-export key types for the composition root
pub use client::{HttpTokenApi, TokenApi};
pub use delivery::{
    BackgroundOpenedAdapter, ColdStartAdapter, DeliveryChannel, DeliveryChannelAdapter,
    DispatchOutcome, ForegroundAdapter, IntentDispatcher, LinkAdapter, NavigationGate,
};
pub use engine::{Collaborators, ListenerHandle, PushEngine};
pub use error::PushError;
pub use intent::{IntentKind, NotificationIntent};
pub use links::LinkResolver;
pub use models::{PermissionStatus, PlatformEvent, RemoteMessage, VerificationResult};
pub use normalizer::normalize;
pub use platform::{Clipboard, MessagingPlatform, Navigator, ShareSheet, ShareSheetResult};
pub use registrar::TokenRegistrar;
pub use router::{route, RouteDecision, RouteParams, Screen};
pub use session::{SessionHub, StoredSession};
pub use share::{ShareLinkBuilder, ShareOutcome, ShareService};
pub use token_store::{JsonFileStore, MemoryStore, TokenStore};
