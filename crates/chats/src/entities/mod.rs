//! Domain entities for the chat client.
//!
//! Every entity is a read-only snapshot of server-owned state. The client
//! never mutates message content; it only merges read receipts.

pub mod channel;
pub mod message;
pub mod user;

pub use channel::Channel;
pub use message::{normalize_receipts, Message, ReadReceipt};
pub use user::{PresenceEntry, User, UserRef, UNKNOWN_USER};
