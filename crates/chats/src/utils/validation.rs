//! Validation utilities.

use crate::types::ChatError;

const MAX_MESSAGE_LENGTH: usize = 10_000;
const MAX_CHANNEL_NAME_LENGTH: usize = 100;

/// Validation utilities
pub struct Validator;

impl Validator {
    /// Validate message content
    pub fn message_content(content: &str) -> Result<(), ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::validation("Message content cannot be empty"));
        }

        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(ChatError::validation(format!(
                "Message content too long (max {MAX_MESSAGE_LENGTH} characters)"
            )));
        }

        Ok(())
    }

    /// Validate channel name
    pub fn channel_name(name: &str) -> Result<(), ChatError> {
        if name.trim().is_empty() {
            return Err(ChatError::validation("Channel name cannot be empty"));
        }

        if name.chars().count() > MAX_CHANNEL_NAME_LENGTH {
            return Err(ChatError::validation(format!(
                "Channel name too long (max {MAX_CHANNEL_NAME_LENGTH} characters)"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_message_is_rejected() {
        assert!(Validator::message_content("   ").is_err());
        assert!(Validator::message_content("hello").is_ok());
        assert!(Validator::message_content(&"a".repeat(MAX_MESSAGE_LENGTH + 1)).is_err());
    }

    #[test]
    fn channel_name_bounds() {
        assert!(Validator::channel_name("").is_err());
        assert!(Validator::channel_name("general").is_ok());
        assert!(Validator::channel_name(&"c".repeat(MAX_CHANNEL_NAME_LENGTH + 1)).is_err());
    }
}
