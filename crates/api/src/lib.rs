//! Request/response transport for the chat backend.
//!
//! The client is deliberately dumb: it maps each endpoint to one call and
//! decodes the typed response. All merging policy lives in the session engine.

mod client;
mod error;

use async_trait::async_trait;
use huddle_chats::{Channel, CreateChannelRequest, Message, ReadReceipt, User};

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};

/// The endpoints the session engine depends on.
#[async_trait]
pub trait ChatApi: Send + Sync + 'static {
    async fn profile(&self) -> ApiResult<User>;

    async fn list_users(&self) -> ApiResult<Vec<User>>;

    async fn list_channels(&self) -> ApiResult<Vec<Channel>>;

    async fn get_channel(&self, channel_id: &str) -> ApiResult<Channel>;

    async fn create_channel(&self, request: &CreateChannelRequest) -> ApiResult<Channel>;

    async fn invite_user(&self, channel_id: &str, user_id: &str) -> ApiResult<Channel>;

    async fn remove_user(&self, channel_id: &str, user_id: &str) -> ApiResult<Channel>;

    async fn delete_channel(&self, channel_id: &str) -> ApiResult<()>;

    /// Latest page of a channel's history
    async fn fetch_messages(&self, channel_id: &str) -> ApiResult<Vec<Message>>;

    /// Older page; `skip` is the number of messages already held
    async fn fetch_history(&self, channel_id: &str, skip: usize) -> ApiResult<Vec<Message>>;

    /// Mark a message read and return the server's authoritative receipt list
    async fn mark_read(&self, message_id: &str) -> ApiResult<Vec<ReadReceipt>>;
}
