//! Messages sent from the main process to renderer windows.
//!
//! # Responsibilities
//! - Carry a routed link and main's outcome (routed channel)
//! - Carry a parse failure and the raw link (invalid channel)
//! - Encode to and decode from the JSON wire form
//!
//! # Design Decisions
//! - Only plain data crosses the boundary; errors travel as their message text
//! - Every message carries the event id of the deep link that produced it

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::routing::attempt::RouteAttempt;
use crate::routing::link::LinkTarget;

/// Identifies one incoming deep link across processes.
pub type EventId = Uuid;

/// A main → renderer message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "lowercase")]
pub enum RouterMessage {
    /// The link parsed and main routed it.
    Routed {
        event_id: EventId,
        url: String,
        target: LinkTarget,
        attempt: RouteAttempt,
    },
    /// The link could not be parsed.
    Invalid {
        event_id: EventId,
        error: String,
        url: String,
    },
}

impl RouterMessage {
    pub fn event_id(&self) -> EventId {
        match self {
            RouterMessage::Routed { event_id, .. } | RouterMessage::Invalid { event_id, .. } => *event_id,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            RouterMessage::Routed { url, .. } | RouterMessage::Invalid { url, .. } => url,
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(wire: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(wire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let event_id = Uuid::nil();
        let message = RouterMessage::Routed {
            event_id,
            url: "app://extension/acme/widget".into(),
            target: LinkTarget::Extension,
            attempt: RouteAttempt::MissingExtension,
        };

        let wire = message.encode().unwrap();
        let value: serde_json::Value = serde_json::from_str(&wire).unwrap();
        assert_eq!(value["channel"], "routed");
        assert_eq!(value["target"], "extension");
        assert_eq!(value["attempt"], "no-extension");

        assert_eq!(RouterMessage::decode(&wire).unwrap(), message);
    }

    #[test]
    fn test_decode_rejects_unknown_channel() {
        let wire = r#"{"channel":"bogus","event_id":"00000000-0000-0000-0000-000000000000"}"#;
        assert!(RouterMessage::decode(wire).is_err());
    }
}
