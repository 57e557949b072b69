//! Error types for chat domain rules.

use thiserror::Error;

/// Domain-level failures raised before any request leaves the client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("Channel not found: {id}")]
    ChannelNotFound { id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },
}

impl ChatError {
    /// Create a not found error for channels
    pub fn channel_not_found(id: impl Into<String>) -> Self {
        Self::ChannelNotFound { id: id.into() }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }
}
