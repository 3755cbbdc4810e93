//! Dispatch table from [`NotificationIntent`] to a navigation target.
//!
//! Fail-closed: a target is only chosen when every field its screen needs is
//! present and non-empty. Anything less is [`RouteDecision::NoRoute`] and the
//! caller must not navigate.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::intent::{IntentKind, NotificationIntent};

pub type RouteParams = BTreeMap<String, String>;

/// Screens the notification core can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Screen {
    Home,
    AdminPendingEvents,
    MyEvents,
    EventDetails,
    Chat,
    MeetingInvitations,
    MeetingDetails,
    Verification,
    SponsorshipRequests,
    CourseDetails,
}

impl Screen {
    /// Route name registered with the host navigator.
    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::AdminPendingEvents => "AdminPendingEvents",
            Screen::MyEvents => "MyEvents",
            Screen::EventDetails => "EventDetails",
            Screen::Chat => "Chat",
            Screen::MeetingInvitations => "MeetingInvitations",
            Screen::MeetingDetails => "MeetingDetails",
            Screen::Verification => "Verification",
            Screen::SponsorshipRequests => "SponsorshipRequests",
            Screen::CourseDetails => "CourseDetails",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Screen used for [`RouteDecision::DefaultRoute`].
pub const DEFAULT_SCREEN: Screen = Screen::Home;

/// Status value of a sponsorship response that leads to the event itself.
pub const SPONSORSHIP_ACCEPTED: &str = "accepted";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RouteDecision {
    Navigate { target: Screen, params: RouteParams },
    /// Recognised, but a field the target needs is missing.
    NoRoute { reason: String },
    /// Unrecognised kind; open the home screen.
    DefaultRoute,
}

impl RouteDecision {
    fn to(target: Screen) -> Self {
        RouteDecision::Navigate {
            target,
            params: RouteParams::new(),
        }
    }

    fn to_with(target: Screen, params: &[(&str, &str)]) -> Self {
        RouteDecision::Navigate {
            target,
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// The navigation call this decision stands for, if any.
    pub fn navigation(&self) -> Option<(Screen, RouteParams)> {
        match self {
            RouteDecision::Navigate { target, params } => Some((*target, params.clone())),
            RouteDecision::DefaultRoute => Some((DEFAULT_SCREEN, RouteParams::new())),
            RouteDecision::NoRoute { .. } => None,
        }
    }
}

fn require_action(intent: &NotificationIntent, expected: &str) -> Result<(), RouteDecision> {
    match intent.action() {
        Some(action) if action == expected => Ok(()),
        other => Err(RouteDecision::NoRoute {
            reason: format!(
                "{} expects action {:?}, got {:?}",
                intent.kind(),
                expected,
                other
            ),
        }),
    }
}

fn require_entity(intent: &NotificationIntent) -> Result<&str, RouteDecision> {
    intent.entity_id().ok_or_else(|| RouteDecision::NoRoute {
        reason: format!("{} is missing its entity id", intent.kind()),
    })
}

/// Chooses the single navigation action for `intent`.
pub fn route(intent: &NotificationIntent) -> RouteDecision {
    dispatch(intent).unwrap_or_else(|no_route| no_route)
}

fn dispatch(intent: &NotificationIntent) -> Result<RouteDecision, RouteDecision> {
    let decision = match intent.kind() {
        IntentKind::PendingEventApproval => {
            require_action(intent, "approval")?;
            RouteDecision::to(Screen::AdminPendingEvents)
        }
        IntentKind::EventApproved | IntentKind::EventRejected => {
            require_action(intent, "view")?;
            let event_id = require_entity(intent)?;
            RouteDecision::to_with(Screen::MyEvents, &[("eventId", event_id)])
        }
        IntentKind::NewEvent => {
            require_action(intent, "view")?;
            let event_id = require_entity(intent)?;
            RouteDecision::to_with(Screen::EventDetails, &[("eventId", event_id)])
        }
        IntentKind::ChatMessage => {
            require_action(intent, "open_chat")?;
            let peer_id = require_entity(intent)?;
            let mut params = RouteParams::new();
            params.insert("userId".to_string(), peer_id.to_string());
            for key in ["roomId", "senderName"] {
                if let Some(value) = intent.attribute(key) {
                    params.insert(key.to_string(), value.to_string());
                }
            }
            RouteDecision::Navigate {
                target: Screen::Chat,
                params,
            }
        }
        IntentKind::MeetingInvitation => {
            require_action(intent, "view_invitation")?;
            RouteDecision::to(Screen::MeetingInvitations)
        }
        IntentKind::InvitationResponse => {
            require_action(intent, "view_meeting")?;
            let meeting_id = require_entity(intent)?;
            RouteDecision::to_with(Screen::MeetingDetails, &[("meetingId", meeting_id)])
        }
        IntentKind::AccountVerified => {
            require_action(intent, "dashboard")?;
            RouteDecision::to(Screen::Home)
        }
        IntentKind::AccountRejected => {
            require_action(intent, "verification")?;
            RouteDecision::to(Screen::Verification)
        }
        IntentKind::SponsorshipRequest => {
            require_action(intent, "respond")?;
            RouteDecision::to(Screen::SponsorshipRequests)
        }
        IntentKind::SponsorshipResponse => {
            require_action(intent, "view")?;
            let event_id = require_entity(intent)?;
            if intent.attribute("status") == Some(SPONSORSHIP_ACCEPTED) {
                RouteDecision::to_with(Screen::EventDetails, &[("eventId", event_id)])
            } else {
                RouteDecision::to(Screen::SponsorshipRequests)
            }
        }
        IntentKind::CourseComment => {
            require_action(intent, "view_discussion")?;
            let course_id = require_entity(intent)?;
            let mut params = RouteParams::new();
            params.insert("courseId".to_string(), course_id.to_string());
            for key in ["videoId", "commentId"] {
                if let Some(value) = intent.attribute(key) {
                    params.insert(key.to_string(), value.to_string());
                }
            }
            RouteDecision::Navigate {
                target: Screen::CourseDetails,
                params,
            }
        }
        IntentKind::UnknownEvent | IntentKind::UnknownLink => RouteDecision::DefaultRoute,
    };
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;

    fn route_payload(pairs: &[(&str, &str)]) -> RouteDecision {
        let data = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        route(&normalize(&data))
    }

    fn navigate(target: Screen, params: &[(&str, &str)]) -> RouteDecision {
        RouteDecision::to_with(target, params)
    }

    #[test]
    fn test_new_event_routes_to_event_details() {
        assert_eq!(
            route_payload(&[("type", "new_event"), ("action", "view"), ("id", "evt-42")]),
            navigate(Screen::EventDetails, &[("eventId", "evt-42")])
        );
    }

    #[test]
    fn test_declined_sponsorship_opens_inbox() {
        assert_eq!(
            route_payload(&[
                ("type", "sponsorship_response"),
                ("action", "view"),
                ("id", "evt-9"),
                ("status", "declined"),
            ]),
            navigate(Screen::SponsorshipRequests, &[])
        );
    }

    #[test]
    fn test_accepted_sponsorship_opens_event() {
        assert_eq!(
            route_payload(&[
                ("type", "sponsorship_response"),
                ("action", "view"),
                ("id", "evt-9"),
                ("status", "accepted"),
            ]),
            navigate(Screen::EventDetails, &[("eventId", "evt-9")])
        );
    }

    #[test]
    fn test_sponsorship_status_compared_exactly() {
        assert_eq!(
            route_payload(&[
                ("type", "sponsorship_response"),
                ("action", "view"),
                ("id", "evt-9"),
                ("status", "Accepted"),
            ]),
            navigate(Screen::SponsorshipRequests, &[])
        );
    }

    #[test]
    fn test_sponsorship_without_id_fails_closed() {
        for status in ["accepted", "declined", ""] {
            let decision = route_payload(&[
                ("type", "sponsorship_response"),
                ("action", "view"),
                ("status", status),
            ]);
            assert!(matches!(decision, RouteDecision::NoRoute { .. }));
            assert_eq!(decision.navigation(), None);
        }
    }

    #[test]
    fn test_unknown_type_uses_default_route() {
        let decision = route_payload(&[("type", "totally_unknown_type")]);
        assert_eq!(decision, RouteDecision::DefaultRoute);
        assert_eq!(
            decision.navigation(),
            Some((Screen::Home, RouteParams::new()))
        );
    }

    #[test]
    fn test_wrong_action_is_no_route() {
        let decision = route_payload(&[("type", "new_event"), ("action", "edit"), ("id", "e1")]);
        assert!(matches!(decision, RouteDecision::NoRoute { .. }));

        let decision = route_payload(&[("type", "pending_event_approval")]);
        assert!(matches!(decision, RouteDecision::NoRoute { .. }));
    }

    #[test]
    fn test_action_only_targets() {
        assert_eq!(
            route_payload(&[("type", "pending_event_approval"), ("action", "approval")]),
            navigate(Screen::AdminPendingEvents, &[])
        );
        assert_eq!(
            route_payload(&[("type", "meeting_invitation"), ("action", "view_invitation")]),
            navigate(Screen::MeetingInvitations, &[])
        );
        assert_eq!(
            route_payload(&[("type", "account_verified"), ("action", "dashboard")]),
            navigate(Screen::Home, &[])
        );
        assert_eq!(
            route_payload(&[("type", "account_rejected"), ("action", "verification")]),
            navigate(Screen::Verification, &[])
        );
        assert_eq!(
            route_payload(&[("type", "sponsorship_request"), ("action", "respond")]),
            navigate(Screen::SponsorshipRequests, &[])
        );
    }

    #[test]
    fn test_event_moderation_results_open_my_events() {
        for kind in ["event_approved", "event_rejected"] {
            assert_eq!(
                route_payload(&[("type", kind), ("action", "view"), ("id", "e5")]),
                navigate(Screen::MyEvents, &[("eventId", "e5")])
            );
        }
        assert!(matches!(
            route_payload(&[("type", "event_rejected"), ("action", "view")]),
            RouteDecision::NoRoute { .. }
        ));
    }

    #[test]
    fn test_chat_carries_optional_room_and_sender() {
        assert_eq!(
            route_payload(&[
                ("type", "chat_message"),
                ("action", "open_chat"),
                ("senderId", "u-3"),
                ("roomId", "r-8"),
            ]),
            navigate(Screen::Chat, &[("userId", "u-3"), ("roomId", "r-8")])
        );
    }

    #[test]
    fn test_invitation_response_needs_meeting_id() {
        assert_eq!(
            route_payload(&[
                ("type", "invitation_response"),
                ("action", "view_meeting"),
                ("id", "m-1"),
            ]),
            navigate(Screen::MeetingDetails, &[("meetingId", "m-1")])
        );
        assert!(matches!(
            route_payload(&[("type", "invitation_response"), ("action", "view_meeting")]),
            RouteDecision::NoRoute { .. }
        ));
    }

    #[test]
    fn test_course_comment_deep_scroll_is_optional() {
        assert_eq!(
            route_payload(&[
                ("type", "course_new_comment"),
                ("action", "view_discussion"),
                ("id", "c-1"),
            ]),
            navigate(Screen::CourseDetails, &[("courseId", "c-1")])
        );
        assert_eq!(
            route_payload(&[
                ("type", "course_new_comment"),
                ("action", "view_discussion"),
                ("courseId", "c-1"),
                ("videoId", "v-2"),
                ("comment_id", "cm-3"),
            ]),
            navigate(
                Screen::CourseDetails,
                &[("courseId", "c-1"), ("videoId", "v-2"), ("commentId", "cm-3")]
            )
        );
    }
}
