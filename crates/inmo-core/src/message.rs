use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An inbound text event from the chat transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundText {
    pub id: Uuid,
    /// Platform-specific user id (phone number on WhatsApp-style gateways).
    pub sender_id: String,
    /// Human-readable sender name, when the transport provides one.
    pub sender_name: Option<String>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl InboundText {
    pub fn new(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id: sender_id.into(),
            sender_name: None,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Acknowledgement returned by the transport for one delivered message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendReceipt {
    pub message_id: String,
}
