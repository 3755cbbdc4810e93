//! The canonical "what should happen next in the UI" value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Closed set of things an inbound notification or link can mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentKind {
    PendingEventApproval,
    EventApproved,
    EventRejected,
    NewEvent,
    ChatMessage,
    MeetingInvitation,
    InvitationResponse,
    AccountVerified,
    AccountRejected,
    SponsorshipRequest,
    SponsorshipResponse,
    CourseComment,
    UnknownEvent,
    UnknownLink,
}

impl IntentKind {
    /// Maps the `type` field of a push payload. Anything unrecognised is
    /// [`IntentKind::UnknownEvent`].
    pub fn from_push_type(raw: &str) -> Self {
        match raw.trim() {
            "pending_event_approval" => IntentKind::PendingEventApproval,
            "event_approved" => IntentKind::EventApproved,
            "event_rejected" => IntentKind::EventRejected,
            "new_event" => IntentKind::NewEvent,
            "chat_message" => IntentKind::ChatMessage,
            "meeting_invitation" => IntentKind::MeetingInvitation,
            "invitation_response" => IntentKind::InvitationResponse,
            "account_verified" => IntentKind::AccountVerified,
            "account_rejected" => IntentKind::AccountRejected,
            "sponsorship_request" => IntentKind::SponsorshipRequest,
            "sponsorship_response" => IntentKind::SponsorshipResponse,
            "course_new_comment" | "course_comment_reply" => IntentKind::CourseComment,
            _ => IntentKind::UnknownEvent,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, IntentKind::UnknownEvent | IntentKind::UnknownLink)
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Normalized inbound event, built fresh per event and consumed once by the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationIntent {
    kind: IntentKind,
    entity_id: Option<String>,
    action: Option<String>,
    attributes: BTreeMap<String, String>,
}

impl NotificationIntent {
    pub fn new(kind: IntentKind) -> Self {
        Self {
            kind,
            entity_id: None,
            action: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Blank ids are dropped so that "present" always means "non-empty".
    pub fn with_entity_id(mut self, entity_id: Option<String>) -> Self {
        self.entity_id = entity_id.filter(|id| !id.trim().is_empty());
        self
    }

    pub fn with_action(mut self, action: Option<String>) -> Self {
        self.action = action.filter(|a| !a.trim().is_empty());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn kind(&self) -> IntentKind {
        self.kind
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// A non-empty attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}
