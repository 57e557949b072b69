//! Error types for the live-stream connection

use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("invalid live stream url: {0}")]
    InvalidUrl(String),

    #[error("credential cannot be sent as a header")]
    InvalidCredential,

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("failed to encode outbound event: {0}")]
    Encode(#[from] serde_json::Error),
}

impl GatewayError {
    /// Whether another attempt could succeed without a configuration change
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::WebSocket(_))
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
