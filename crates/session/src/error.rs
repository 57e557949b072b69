use huddle_api::ApiError;
use huddle_chats::ChatError;
use thiserror::Error;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no channel is active")]
    NoChannel,

    /// A later selection or leave replaced the operation's channel
    #[error("superseded by a later channel selection")]
    Superseded,

    #[error("session has been closed")]
    Closed,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Chat(#[from] ChatError),
}
