//! Live-stream event contracts.
//!
//! Frames are JSON text shaped `{"event": "<name>", "data": <payload>}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Message, PresenceEntry, ReadReceipt};

/// Events pushed by the server over the live stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// A message was posted to the joined channel (including our own, echoed back)
    ReceiveMessage(Message),
    /// Authoritative receipt list for one message
    MessageRead(MessageReadPayload),
    /// A user entered the joined channel
    UserOnline(PresenceEntry),
    /// A user left the joined channel
    UserOffline(PresenceEntry),
    /// Full roster broadcast after a join
    ChannelOnlineUsers(Vec<PresenceEntry>),
    UserTyping(PresenceEntry),
    UserStopTyping(PresenceEntry),
    /// Server-side failure report for this connection
    Error(StreamErrorPayload),
}

impl ServerEvent {
    /// Get event name for logging
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerEvent::ReceiveMessage(_) => "receive-message",
            ServerEvent::MessageRead(_) => "message-read",
            ServerEvent::UserOnline(_) => "user-online",
            ServerEvent::UserOffline(_) => "user-offline",
            ServerEvent::ChannelOnlineUsers(_) => "channel-online-users",
            ServerEvent::UserTyping(_) => "user-typing",
            ServerEvent::UserStopTyping(_) => "user-stop-typing",
            ServerEvent::Error(_) => "error",
        }
    }
}

/// Events sent by the client; none of them is acknowledged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinChannel(String),
    LeaveChannel(String),
    NewMessage(NewMessagePayload),
    Typing(ChannelScope),
    StopTyping(ChannelScope),
}

impl ClientEvent {
    pub fn new_message(channel_id: impl Into<String>, content: impl Into<String>) -> Self {
        ClientEvent::NewMessage(NewMessagePayload {
            channel_id: channel_id.into(),
            message: OutgoingMessage {
                content: content.into(),
                created_at: Utc::now(),
            },
        })
    }

    pub fn typing(channel_id: impl Into<String>) -> Self {
        ClientEvent::Typing(ChannelScope {
            channel_id: channel_id.into(),
        })
    }

    pub fn stop_typing(channel_id: impl Into<String>) -> Self {
        ClientEvent::StopTyping(ChannelScope {
            channel_id: channel_id.into(),
        })
    }

    /// Get event name for logging
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientEvent::JoinChannel(_) => "join-channel",
            ClientEvent::LeaveChannel(_) => "leave-channel",
            ClientEvent::NewMessage(_) => "new-message",
            ClientEvent::Typing(_) => "typing",
            ClientEvent::StopTyping(_) => "stop-typing",
        }
    }

    /// Membership and typing signals only mean something on the connection
    /// they were issued on; new messages do not.
    pub fn is_channel_signal(&self) -> bool {
        !matches!(self, ClientEvent::NewMessage(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReadPayload {
    pub message_id: String,
    pub read_by: Vec<ReadReceipt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelScope {
    pub channel_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessagePayload {
    pub channel_id: String,
    pub message: OutgoingMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Error payload; servers send either a bare string or `{message}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamErrorPayload {
    Text(String),
    Detailed { message: String },
}

impl StreamErrorPayload {
    pub fn message(&self) -> &str {
        match self {
            StreamErrorPayload::Text(message) | StreamErrorPayload::Detailed { message } => message,
        }
    }
}
