//! Permission checking utilities.

use crate::entities::Channel;
use crate::types::ChatError;

/// The single ownership predicate every channel-management check reduces to.
pub fn is_channel_owner(user_id: &str, channel: &Channel) -> bool {
    channel
        .created_by
        .as_ref()
        .is_some_and(|creator| creator.id == user_id)
}

/// Permission checking utilities
pub struct PermissionChecker;

impl PermissionChecker {
    /// Only the owner of a private channel may invite
    pub fn can_invite(user_id: &str, channel: &Channel) -> Result<(), ChatError> {
        if !is_channel_owner(user_id, channel) {
            return Err(ChatError::permission_denied(
                "Only the channel owner can invite members",
            ));
        }
        if !channel.is_private {
            return Err(ChatError::permission_denied(
                "Invitations are only used by private channels",
            ));
        }
        Ok(())
    }

    /// Check if a user can remove a member from a channel
    pub fn can_remove_member(user_id: &str, channel: &Channel) -> Result<(), ChatError> {
        if !is_channel_owner(user_id, channel) {
            return Err(ChatError::permission_denied(
                "Only the channel owner can remove members",
            ));
        }
        Ok(())
    }

    /// Check if a user can delete a channel
    pub fn can_delete_channel(user_id: &str, channel: &Channel) -> Result<(), ChatError> {
        if !is_channel_owner(user_id, channel) {
            return Err(ChatError::permission_denied(
                "Only the channel owner can delete the channel",
            ));
        }
        Ok(())
    }
}
