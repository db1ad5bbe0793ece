//! Channel Message Types
//!
//! Defines the message types exchanged over the persistent channel between
//! clients and the LedgerLink server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Post-connect handshake step: associate this session with a user.
    ///
    /// Verifying the identity is the job of the auth collaborator upstream;
    /// the registry only records the association.
    Authenticate {
        /// Identifier of the authenticated principal
        user_id: String,
    },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established and registered
    Connected {
        /// Unique session identifier assigned at connect time
        session_id: String,
    },
    /// Session association confirmed
    Authenticated {
        /// User this session now belongs to
        user_id: String,
    },
    /// A published event resolved to this session
    Event {
        /// Topic string (e.g. "items.linked")
        topic: String,
        /// Opaque payload
        payload: Value,
    },
    /// Pong response to ping
    Pong,
    /// Error message
    Error {
        /// Error description
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_message_deserialize_authenticate() {
        let json = r#"{"type": "authenticate", "user_id": "user-42"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Authenticate { user_id } => assert_eq!(user_id, "user-42"),
            _ => panic!("Expected Authenticate"),
        }
    }

    #[test]
    fn test_client_message_deserialize_ping() {
        let json = r#"{"type": "ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_client_message_rejects_unknown_type() {
        let json = r#"{"type": "subscribe", "topics": []}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_server_message_serialize_connected() {
        let msg = ServerMessage::Connected {
            session_id: "abc-123".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"connected\""));
        assert!(json.contains("\"session_id\":\"abc-123\""));
    }

    #[test]
    fn test_server_message_serialize_event() {
        let msg = ServerMessage::Event {
            topic: "items.linked".to_string(),
            payload: json!({"item_id": "item-1"}),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"event\""));
        assert!(json.contains("\"topic\":\"items.linked\""));
        assert!(json.contains("\"item_id\":\"item-1\""));
    }
}
