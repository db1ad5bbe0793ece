//! Event Model
//!
//! Defines the immutable application event handed to the registry for
//! delivery, and the addressing modes used to resolve its recipients.

use serde_json::Value;
use std::collections::HashSet;

use super::messages::ServerMessage;

/// Addressing mode of an event.
///
/// Targets are resolved against the registry's snapshot of currently open
/// sessions at publish time. A target naming no open session resolves to an
/// empty recipient set; the event is dropped without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Every open session.
    All,
    /// Every open session associated with one of these user ids.
    Users(HashSet<String>),
    /// These sessions, if open.
    Sessions(HashSet<String>),
}

/// An immutable message published into the registry.
///
/// Delivery is at-most-once and fire-and-forget: there is no queuing for
/// offline users and no replay after reconnect.
#[derive(Debug, Clone)]
pub struct Event {
    /// Topic string, e.g. "items.linked" or "transactions.default_update"
    pub topic: String,
    /// Opaque structured payload forwarded to clients verbatim
    pub payload: Value,
    /// Which sessions should receive this event
    pub target: Target,
}

impl Event {
    /// Create an event addressed to every open session
    pub fn broadcast(topic: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
            target: Target::All,
        }
    }

    /// Create an event addressed to a single user's sessions
    pub fn for_user(user_id: impl Into<String>, topic: impl Into<String>, payload: Value) -> Self {
        let mut users = HashSet::new();
        users.insert(user_id.into());
        Self {
            topic: topic.into(),
            payload,
            target: Target::Users(users),
        }
    }

    /// Create an event addressed to a set of users
    pub fn for_users(
        user_ids: impl IntoIterator<Item = String>,
        topic: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            topic: topic.into(),
            payload,
            target: Target::Users(user_ids.into_iter().collect()),
        }
    }

    /// Create an event addressed to specific sessions
    pub fn for_sessions(
        session_ids: impl IntoIterator<Item = String>,
        topic: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            topic: topic.into(),
            payload,
            target: Target::Sessions(session_ids.into_iter().collect()),
        }
    }

    /// Wire representation delivered to each resolved session
    pub fn to_message(&self) -> ServerMessage {
        ServerMessage::Event {
            topic: self.topic.clone(),
            payload: self.payload.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_broadcast_targets_all() {
        let event = Event::broadcast("system.notice", json!({"message": "hi"}));
        assert_eq!(event.target, Target::All);
        assert_eq!(event.topic, "system.notice");
    }

    #[test]
    fn test_for_user_single_target() {
        let event = Event::for_user("user-1", "items.linked", json!({"item_id": "i-1"}));
        match &event.target {
            Target::Users(users) => {
                assert_eq!(users.len(), 1);
                assert!(users.contains("user-1"));
            }
            _ => panic!("Expected Users target"),
        }
    }

    #[test]
    fn test_to_message_carries_topic_and_payload() {
        let event = Event::broadcast("link.event", json!({"status": "success"}));
        match event.to_message() {
            ServerMessage::Event { topic, payload } => {
                assert_eq!(topic, "link.event");
                assert_eq!(payload["status"], "success");
            }
            _ => panic!("Expected Event message"),
        }
    }
}
