//! # Huddle Chats Crate
//!
//! Domain entities and typed wire contracts shared by every part of the
//! Huddle client: the REST transport, the live stream, the durable cache and
//! the session engine all speak in these types.
//!
//! ## Architecture
//!
//! - **Entities**: Domain models (Channel, Message, ReadReceipt, User)
//! - **Types**: Live-stream events, REST payloads, errors
//! - **Utils**: Authorization predicate and input validation
//!
//! ## Usage
//!
//! ```rust
//! use huddle_chats::ServerEvent;
//!
//! let frame = r#"{"event":"user-stop-typing","data":{"userId":"u1"}}"#;
//! let event: ServerEvent = serde_json::from_str(frame).unwrap();
//! assert_eq!(event.event_name(), "user-stop-typing");
//! ```

pub mod entities;
pub mod types;
pub mod utils;

pub use entities::{
    normalize_receipts, Channel, Message, PresenceEntry, ReadReceipt, User, UserRef,
    UNKNOWN_USER,
};
pub use types::{
    AuthResponse, ChannelEnvelope, ChannelScope, ChatError, ClientEvent,
    CreateChannelRequest, ErrorBody, LoginRequest, MarkReadResponse, MembershipRequest,
    MessageReadPayload, NewMessagePayload, OutgoingMessage, ReceiptsPayload, RegisterRequest,
    ServerEvent, StreamErrorPayload,
};
pub use utils::{is_channel_owner, PermissionChecker, Validator};
