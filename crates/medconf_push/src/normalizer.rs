//! Push payload normalization.
//!
//! Upstream producers are not consistent about field names (`sender_id`,
//! `senderId` and `user_id` all name the chat peer). Every such alias is listed
//! once here, as a priority-ordered [`FieldRule`]; nothing downstream has to
//! know about the aliases.

use std::collections::BTreeMap;
use tracing::debug;

use crate::intent::{IntentKind, NotificationIntent};

pub const TYPE_FIELD: &str = "type";
pub const ACTION_FIELD: &str = "action";

/// A canonical field and the payload keys it may be read from, highest priority first.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub canonical: &'static str,
    pub sources: &'static [&'static str],
}

impl FieldRule {
    /// First non-empty value among `sources`.
    pub fn pick<'a>(&self, data: &'a BTreeMap<String, String>) -> Option<&'a str> {
        self.sources
            .iter()
            .filter_map(|key| data.get(*key))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }
}

const ENTITY_ID: FieldRule = FieldRule {
    canonical: "entityId",
    sources: &["id"],
};

const CHAT_PEER_ID: FieldRule = FieldRule {
    canonical: "entityId",
    sources: &["id", "sender_id", "senderId", "user_id"],
};

const COURSE_ID: FieldRule = FieldRule {
    canonical: "entityId",
    sources: &["course_id", "courseId", "id"],
};

const CHAT_ATTRIBUTES: &[FieldRule] = &[
    FieldRule {
        canonical: "roomId",
        sources: &["room_id", "roomId"],
    },
    FieldRule {
        canonical: "senderName",
        sources: &["sender_name", "senderName"],
    },
];

const COURSE_ATTRIBUTES: &[FieldRule] = &[
    FieldRule {
        canonical: "videoId",
        sources: &["videoId", "video_id"],
    },
    FieldRule {
        canonical: "commentId",
        sources: &["commentId", "comment_id"],
    },
];

fn entity_rule(kind: IntentKind) -> FieldRule {
    match kind {
        IntentKind::ChatMessage => CHAT_PEER_ID,
        IntentKind::CourseComment => COURSE_ID,
        _ => ENTITY_ID,
    }
}

fn attribute_rules(kind: IntentKind) -> &'static [FieldRule] {
    match kind {
        IntentKind::ChatMessage => CHAT_ATTRIBUTES,
        IntentKind::CourseComment => COURSE_ATTRIBUTES,
        _ => &[],
    }
}

/// Converts the flat `data` map of a push message into a [`NotificationIntent`].
///
/// Never fails. Unknown `type` values become [`IntentKind::UnknownEvent`] with
/// every original field, `type` included, kept in `attributes`.
pub fn normalize(data: &BTreeMap<String, String>) -> NotificationIntent {
    let raw_type = data.get(TYPE_FIELD).map(String::as_str).unwrap_or_default();
    let kind = IntentKind::from_push_type(raw_type);

    if kind == IntentKind::UnknownEvent {
        debug!("Unrecognised push type {:?}; keeping payload opaque", raw_type);
        return NotificationIntent::new(kind)
            .with_entity_id(ENTITY_ID.pick(data).map(str::to_string))
            .with_action(data.get(ACTION_FIELD).cloned())
            .with_attributes(data.clone());
    }

    let passthrough: BTreeMap<String, String> = data
        .iter()
        .filter(|(key, _)| key.as_str() != TYPE_FIELD && key.as_str() != ACTION_FIELD)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let mut intent = NotificationIntent::new(kind)
        .with_entity_id(entity_rule(kind).pick(data).map(str::to_string))
        .with_action(data.get(ACTION_FIELD).map(|a| a.trim().to_string()))
        .with_attributes(passthrough);

    for rule in attribute_rules(kind) {
        if let Some(value) = rule.pick(data) {
            intent = intent.with_attribute(rule.canonical, value);
        }
    }

    intent
}
