//! Read-only snapshot published after every change.

use huddle_chats::{is_channel_owner, Channel, Message, PermissionChecker, PresenceEntry, User};
use huddle_gateway::ConnectionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelPhase {
    NoChannel,
    /// A selection is in flight; the previous channel, if any, is still shown
    Selecting { channel_id: String },
    Active,
}

#[derive(Debug, Clone)]
pub struct SessionView {
    pub user: User,
    pub connection: ConnectionState,
    pub phase: ChannelPhase,
    pub channel: Option<Channel>,
    pub channels: Vec<Channel>,
    pub messages: Vec<Message>,
    pub online: Vec<PresenceEntry>,
    pub typing: Vec<PresenceEntry>,
    pub last_error: Option<String>,
}

impl SessionView {
    /// View of a session that has not selected anything yet
    pub fn empty(user: User) -> Self {
        Self {
            user,
            connection: ConnectionState::Disconnected,
            phase: ChannelPhase::NoChannel,
            channel: None,
            channels: Vec::new(),
            messages: Vec::new(),
            online: Vec::new(),
            typing: Vec::new(),
            last_error: None,
        }
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.channel.as_ref().map(|channel| channel.id.as_str())
    }

    pub fn is_owner(&self) -> bool {
        self.channel
            .as_ref()
            .is_some_and(|channel| is_channel_owner(&self.user.id, channel))
    }

    pub fn can_invite(&self) -> bool {
        self.channel
            .as_ref()
            .is_some_and(|channel| PermissionChecker::can_invite(&self.user.id, channel).is_ok())
    }

    pub fn can_delete(&self) -> bool {
        self.channel.as_ref().is_some_and(|channel| {
            PermissionChecker::can_delete_channel(&self.user.id, channel).is_ok()
        })
    }

    /// "ada is typing", "ada, bo are typing", or nothing
    pub fn typing_summary(&self) -> Option<String> {
        match self.typing.as_slice() {
            [] => None,
            [single] => Some(format!("{} is typing", single.display_name())),
            many => {
                let names: Vec<&str> = many.iter().map(PresenceEntry::display_name).collect();
                Some(format!("{} are typing", names.join(", ")))
            }
        }
    }
}
