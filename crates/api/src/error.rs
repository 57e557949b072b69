use reqwest::StatusCode;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("not authenticated")]
    Unauthorized,

    #[error("{path} returned {status}: {message}")]
    Status {
        status: StatusCode,
        path: String,
        message: String,
    },

    #[error("malformed response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(error) => error.status(),
            ApiError::Decode { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// A payload that did not match its contract
    pub fn is_malformed(&self) -> bool {
        matches!(self, ApiError::Decode { .. })
    }
}
