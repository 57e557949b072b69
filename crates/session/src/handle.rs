use huddle_chats::{Channel, CreateChannelRequest, User};
use tokio::sync::{mpsc, oneshot, watch};

use crate::coordinator::{Command, Reply};
use crate::error::{SessionError, SessionResult};
use crate::view::SessionView;

/// Cloneable front door to a running session.
///
/// Every call is enqueued to the session task; none of them touch session
/// state directly.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<SessionView>,
}

impl SessionHandle {
    pub(crate) fn new(commands: mpsc::Sender<Command>, view: watch::Receiver<SessionView>) -> Self {
        Self { commands, view }
    }

    async fn send(&self, command: Command) -> SessionResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> SessionResult<T> {
        let (reply, response) = oneshot::channel();
        self.send(build(reply)).await?;
        response.await.map_err(|_| SessionError::Closed)?
    }

    /// Switch to `channel_id`; resolves once the channel is active.
    ///
    /// Fails with [`SessionError::Superseded`] when another selection or a
    /// leave overtakes it. A failed selection leaves the previous channel in
    /// place.
    pub async fn select_channel(&self, channel_id: impl Into<String>) -> SessionResult<Channel> {
        let channel_id = channel_id.into();
        self.request(|reply| Command::SelectChannel { channel_id, reply })
            .await
    }

    pub async fn leave_channel(&self) -> SessionResult<()> {
        let (reply, response) = oneshot::channel();
        self.send(Command::LeaveChannel { reply }).await?;
        response.await.map_err(|_| SessionError::Closed)
    }

    pub async fn list_channels(&self) -> SessionResult<Vec<Channel>> {
        self.request(|reply| Command::ListChannels { reply }).await
    }

    pub async fn list_users(&self) -> SessionResult<Vec<User>> {
        self.request(|reply| Command::ListUsers { reply }).await
    }

    /// Create a channel; members of a private channel are invited one by one
    pub async fn create_channel(&self, request: CreateChannelRequest) -> SessionResult<Channel> {
        self.request(|reply| Command::CreateChannel { request, reply })
            .await
    }

    pub async fn invite_user(&self, user_id: impl Into<String>) -> SessionResult<Channel> {
        let user_id = user_id.into();
        self.request(|reply| Command::InviteUser { user_id, reply })
            .await
    }

    pub async fn remove_user(&self, user_id: impl Into<String>) -> SessionResult<Channel> {
        let user_id = user_id.into();
        self.request(|reply| Command::RemoveUser { user_id, reply })
            .await
    }

    /// Delete the active channel
    pub async fn delete_channel(&self) -> SessionResult<()> {
        self.request(|reply| Command::DeleteChannel { reply }).await
    }

    /// Emit a message to the active channel. It shows up in the message list
    /// only once the server echoes it back.
    pub async fn send_message(&self, content: impl Into<String>) -> SessionResult<()> {
        let content = content.into();
        self.request(|reply| Command::SendMessage { content, reply })
            .await
    }

    pub async fn keystroke(&self) -> SessionResult<()> {
        self.send(Command::Keystroke).await
    }

    pub async fn stop_typing(&self) -> SessionResult<()> {
        self.send(Command::StopTyping).await
    }

    pub async fn mark_read(&self, message_id: impl Into<String>) -> SessionResult<()> {
        let message_id = message_id.into();
        self.request(|reply| Command::MarkRead { message_id, reply })
            .await
    }

    /// Load the next older page; returns how many messages were added
    pub async fn load_more(&self) -> SessionResult<usize> {
        self.request(|reply| Command::LoadMore { reply }).await
    }

    /// Snapshot taken by the session task after everything queued before it
    pub async fn snapshot(&self) -> SessionResult<SessionView> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        response.await.map_err(|_| SessionError::Closed)
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    /// End the session: leave the channel, disconnect, run the logout hook
    pub async fn logout(&self) -> SessionResult<()> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Logout { reply }).await?;
        response.await.map_err(|_| SessionError::Closed)
    }
}
