//! Channel session coordinator.
//!
//! One task owns every piece of per-channel state. Callers talk to it through
//! [`Command`]s; request-style work runs in spawned tasks that post a
//! [`Completion`] back, so all mutation happens on this task in arrival order.
//! Each selection (or leave) bumps `generation`; completions tagged with an
//! older generation are discarded instead of being applied to whatever
//! channel happens to be current by then.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use huddle_api::{ApiResult, ChatApi};
use huddle_cache::CacheStore;
use huddle_chats::{
    Channel, ClientEvent, CreateChannelRequest, Message, PermissionChecker, ReadReceipt,
    ServerEvent, User, Validator,
};
use huddle_config::SyncConfig;
use huddle_gateway::{ConnectionEvent, ConnectionState, LiveStream};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::context::SessionContext;
use crate::error::{SessionError, SessionResult};
use crate::message_store::MessageStore;
use crate::presence::PresenceTracker;
use crate::typing::{TypingDebounce, TypingTracker};
use crate::view::{ChannelPhase, SessionView};

pub(crate) type Reply<T> = oneshot::Sender<SessionResult<T>>;

pub(crate) enum Command {
    SelectChannel {
        channel_id: String,
        reply: Reply<Channel>,
    },
    LeaveChannel {
        reply: oneshot::Sender<()>,
    },
    ListChannels {
        reply: Reply<Vec<Channel>>,
    },
    ListUsers {
        reply: Reply<Vec<User>>,
    },
    CreateChannel {
        request: CreateChannelRequest,
        reply: Reply<Channel>,
    },
    InviteUser {
        user_id: String,
        reply: Reply<Channel>,
    },
    RemoveUser {
        user_id: String,
        reply: Reply<Channel>,
    },
    DeleteChannel {
        reply: Reply<()>,
    },
    SendMessage {
        content: String,
        reply: Reply<()>,
    },
    Keystroke,
    StopTyping,
    MarkRead {
        message_id: String,
        reply: Reply<()>,
    },
    LoadMore {
        reply: Reply<usize>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionView>,
    },
    Logout {
        reply: oneshot::Sender<()>,
    },
}

struct Selection {
    channel: Channel,
    cached: Option<Vec<Message>>,
    fetched: Vec<Message>,
}

enum Completion {
    Selected {
        generation: u64,
        outcome: ApiResult<Selection>,
    },
    ChannelsListed {
        result: ApiResult<Vec<Channel>>,
        reply: Option<Reply<Vec<Channel>>>,
    },
    ChannelCreated {
        result: ApiResult<(Channel, Vec<Channel>)>,
        reply: Reply<Channel>,
    },
    MembershipChanged {
        generation: u64,
        result: ApiResult<Channel>,
        reply: Reply<Channel>,
    },
    ChannelDeleted {
        channel_id: String,
        result: ApiResult<()>,
        reply: Reply<()>,
    },
    ReadMarked {
        message_id: String,
        result: ApiResult<Vec<ReadReceipt>>,
        reply: Option<Reply<()>>,
    },
    HistoryPage {
        generation: u64,
        channel_id: String,
        result: ApiResult<Vec<Message>>,
        reply: Reply<usize>,
    },
}

pub(crate) struct Coordinator {
    user: User,
    api: Arc<dyn ChatApi>,
    live: Arc<dyn LiveStream>,
    cache: Arc<dyn CacheStore>,
    config: SyncConfig,
    on_logout: Option<Box<dyn FnOnce() + Send>>,

    commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedReceiver<ConnectionEvent>,
    events_open: bool,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
    view: watch::Sender<SessionView>,

    generation: u64,
    phase: ChannelPhase,
    channel: Option<Channel>,
    pending_selection: Option<Reply<Channel>>,
    channels: Vec<Channel>,
    connection: ConnectionState,
    messages: MessageStore,
    presence: PresenceTracker,
    typing: TypingTracker,
    debounce: TypingDebounce,
    pending_reads: HashSet<String>,
    last_error: Option<String>,
}

impl Coordinator {
    pub(crate) fn new(
        mut context: SessionContext,
        api: Arc<dyn ChatApi>,
        live: Arc<dyn LiveStream>,
        events: mpsc::UnboundedReceiver<ConnectionEvent>,
        commands: mpsc::Receiver<Command>,
        config: &SyncConfig,
    ) -> Self {
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let on_logout = context.take_logout_hook();
        let SessionContext { user, cache, .. } = context;

        let view = watch::channel(SessionView::empty(user.clone())).0;

        Self {
            user,
            api,
            live,
            cache,
            config: config.clone(),
            on_logout,
            commands,
            events,
            events_open: true,
            completions_tx,
            completions,
            view,
            generation: 0,
            phase: ChannelPhase::NoChannel,
            channel: None,
            pending_selection: None,
            channels: Vec::new(),
            connection: ConnectionState::Disconnected,
            messages: MessageStore::new(config.dedupe_by_id),
            presence: PresenceTracker::new(),
            typing: TypingTracker::new(config.typing_expiry()),
            debounce: TypingDebounce::new(config.typing_stop_after()),
            pending_reads: HashSet::new(),
            last_error: None,
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.subscribe()
    }

    pub(crate) async fn run(mut self) {
        info!(user_id = %self.user.id, "session started");
        self.refresh_channels(None);

        loop {
            let wakeup = self.next_wakeup();

            // live events drain before commands so a snapshot observes every
            // event delivered ahead of it
            tokio::select! {
                biased;
                event = self.events.recv(), if self.events_open => match event {
                    Some(event) => self.on_connection_event(event).await,
                    None => {
                        debug!("live stream event channel closed");
                        self.events_open = false;
                    }
                },
                Some(completion) = self.completions.recv() => self.on_completion(completion).await,
                command = self.commands.recv() => match command {
                    Some(command) => {
                        if !self.on_command(command) {
                            break;
                        }
                    }
                    None => {
                        debug!("all session handles dropped");
                        self.deselect();
                        self.live.disconnect();
                        break;
                    }
                },
                _ = sleep_until(wakeup) => self.on_timer(),
            }

            self.publish();
        }

        info!(user_id = %self.user.id, "session stopped");
    }

    /// Returns `false` once the session has ended
    fn on_command(&mut self, command: Command) -> bool {
        match command {
            Command::SelectChannel { channel_id, reply } => self.begin_selection(channel_id, reply),
            Command::LeaveChannel { reply } => {
                self.deselect();
                let _ = reply.send(());
            }
            Command::ListChannels { reply } => self.refresh_channels(Some(reply)),
            Command::ListUsers { reply } => {
                let api = self.api.clone();
                tokio::spawn(async move {
                    let _ = reply.send(api.list_users().await.map_err(SessionError::from));
                });
            }
            Command::CreateChannel { request, reply } => self.begin_create(request, reply),
            Command::InviteUser { user_id, reply } => self.begin_membership(user_id, true, reply),
            Command::RemoveUser { user_id, reply } => self.begin_membership(user_id, false, reply),
            Command::DeleteChannel { reply } => self.begin_delete(reply),
            Command::SendMessage { content, reply } => {
                let _ = reply.send(self.send_message(content));
            }
            Command::Keystroke => self.keystroke(),
            Command::StopTyping => self.stop_typing(),
            Command::MarkRead { message_id, reply } => self.begin_mark_read(message_id, Some(reply)),
            Command::LoadMore { reply } => self.begin_load_more(reply),
            Command::Snapshot { reply } => {
                let _ = reply.send(self.view());
            }
            Command::Logout { reply } => {
                self.logout();
                self.publish();
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    async fn on_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Selected {
                generation,
                outcome,
            } => self.finish_selection(generation, outcome).await,
            Completion::ChannelsListed { result, reply } => self.apply_channels(result, reply),
            Completion::ChannelCreated { result, reply } => {
                let result = match result {
                    Ok((channel, channels)) => {
                        self.channels = channels;
                        Ok(channel)
                    }
                    Err(error) => {
                        warn!(%error, "failed to create channel");
                        Err(error.into())
                    }
                };
                let _ = reply.send(result);
            }
            Completion::MembershipChanged {
                generation,
                result,
                reply,
            } => self.apply_membership(generation, result, reply),
            Completion::ChannelDeleted {
                channel_id,
                result,
                reply,
            } => self.apply_deleted(channel_id, result, reply).await,
            Completion::ReadMarked {
                message_id,
                result,
                reply,
            } => self.apply_receipts(message_id, result, reply).await,
            Completion::HistoryPage {
                generation,
                channel_id,
                result,
                reply,
            } => {
                self.apply_history_page(generation, channel_id, result, reply)
                    .await
            }
        }
    }

    fn spawn<F>(&self, work: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let _ = completions.send(work.await);
        });
    }

    // Selection

    fn begin_selection(&mut self, channel_id: String, reply: Reply<Channel>) {
        self.generation += 1;
        if let Some(previous) = self.pending_selection.replace(reply) {
            let _ = previous.send(Err(SessionError::Superseded));
        }
        self.phase = ChannelPhase::Selecting {
            channel_id: channel_id.clone(),
        };

        let generation = self.generation;
        info!(%channel_id, generation, "selecting channel");

        let api = self.api.clone();
        let cache = self.cache.clone();
        self.spawn(async move {
            let outcome = fetch_selection(api.as_ref(), cache.as_ref(), &channel_id).await;
            Completion::Selected {
                generation,
                outcome,
            }
        });
    }

    async fn finish_selection(&mut self, generation: u64, outcome: ApiResult<Selection>) {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "discarding superseded selection"
            );
            return;
        }
        let reply = self.pending_selection.take();

        let Selection {
            channel,
            cached,
            fetched,
        } = match outcome {
            Ok(selection) => selection,
            Err(error) => {
                warn!(%error, "channel selection failed");
                self.phase = self.settled_phase();
                self.last_error = Some(error.to_string());
                if let Some(reply) = reply {
                    let _ = reply.send(Err(error.into()));
                }
                return;
            }
        };

        if let Some(previous) = self.channel.take() {
            if previous.id != channel.id {
                self.live.leave_channel(&previous.id);
            }
        }

        let hydration = MessageStore::hydrate(cached, fetched);
        debug!(
            channel_id = %channel.id,
            source = ?hydration.source,
            count = hydration.messages.len(),
            "hydrated channel"
        );
        self.messages.replace(hydration.messages);
        self.pending_reads.clear();

        if let Some(listed) = self.channels.iter_mut().find(|c| c.id == channel.id) {
            *listed = channel.clone();
        }
        self.channel = Some(channel.clone());
        self.phase = ChannelPhase::Active;
        self.last_error = None;

        self.persist().await;
        self.presence.reset();
        self.live.join_channel(&channel.id);
        info!(channel_id = %channel.id, "channel active");

        self.schedule_auto_reads();
        if let Some(reply) = reply {
            let _ = reply.send(Ok(channel));
        }
    }

    /// Leave the current channel, abandoning any selection in flight
    fn deselect(&mut self) {
        self.generation += 1;
        if let Some(pending) = self.pending_selection.take() {
            let _ = pending.send(Err(SessionError::Superseded));
        }
        self.drop_active_channel();
        self.phase = ChannelPhase::NoChannel;
    }

    /// Forget the active channel only; a selection in flight keeps going and
    /// the phase stays `Selecting` until it settles.
    fn drop_active_channel(&mut self) {
        if let Some(channel) = self.channel.take() {
            info!(channel_id = %channel.id, "leaving channel");
            self.live.leave_channel(&channel.id);
        }
        self.presence.reset();
        self.messages.clear();
        self.pending_reads.clear();
        if self.pending_selection.is_none() {
            self.phase = ChannelPhase::NoChannel;
        }
    }

    fn settled_phase(&self) -> ChannelPhase {
        if self.channel.is_some() {
            ChannelPhase::Active
        } else {
            ChannelPhase::NoChannel
        }
    }

    fn current_channel_id(&self) -> Option<String> {
        self.channel.as_ref().map(|channel| channel.id.clone())
    }

    // Channel directory

    fn refresh_channels(&self, reply: Option<Reply<Vec<Channel>>>) {
        let api = self.api.clone();
        self.spawn(async move {
            Completion::ChannelsListed {
                result: api.list_channels().await,
                reply,
            }
        });
    }

    fn apply_channels(&mut self, result: ApiResult<Vec<Channel>>, reply: Option<Reply<Vec<Channel>>>) {
        let result = match result {
            Ok(channels) => {
                debug!(count = channels.len(), "channel list refreshed");
                self.channels = channels.clone();
                Ok(channels)
            }
            Err(error) => {
                warn!(%error, "failed to list channels");
                Err(error.into())
            }
        };
        if let Some(reply) = reply {
            let _ = reply.send(result);
        }
    }

    fn begin_create(&mut self, request: CreateChannelRequest, reply: Reply<Channel>) {
        if let Err(error) = Validator::channel_name(&request.name) {
            let _ = reply.send(Err(error.into()));
            return;
        }

        let api = self.api.clone();
        self.spawn(async move {
            Completion::ChannelCreated {
                result: create_channel(api.as_ref(), &request).await,
                reply,
            }
        });
    }

    fn begin_membership(&mut self, user_id: String, invite: bool, reply: Reply<Channel>) {
        let Some(channel) = &self.channel else {
            let _ = reply.send(Err(SessionError::NoChannel));
            return;
        };
        let allowed = if invite {
            PermissionChecker::can_invite(&self.user.id, channel)
        } else {
            PermissionChecker::can_remove_member(&self.user.id, channel)
        };
        if let Err(error) = allowed {
            let _ = reply.send(Err(error.into()));
            return;
        }

        let api = self.api.clone();
        let channel_id = channel.id.clone();
        let generation = self.generation;
        self.spawn(async move {
            let result = if invite {
                api.invite_user(&channel_id, &user_id).await
            } else {
                api.remove_user(&channel_id, &user_id).await
            };
            Completion::MembershipChanged {
                generation,
                result,
                reply,
            }
        });
    }

    fn apply_membership(&mut self, generation: u64, result: ApiResult<Channel>, reply: Reply<Channel>) {
        let channel = match result {
            Ok(channel) => channel,
            Err(error) => {
                let _ = reply.send(Err(error.into()));
                return;
            }
        };

        if generation == self.generation
            && self.channel.as_ref().is_some_and(|current| current.id == channel.id)
        {
            self.channel = Some(channel.clone());
        }
        if let Some(listed) = self.channels.iter_mut().find(|c| c.id == channel.id) {
            *listed = channel.clone();
        }
        let _ = reply.send(Ok(channel));
    }

    fn begin_delete(&mut self, reply: Reply<()>) {
        let Some(channel) = &self.channel else {
            let _ = reply.send(Err(SessionError::NoChannel));
            return;
        };
        if let Err(error) = PermissionChecker::can_delete_channel(&self.user.id, channel) {
            let _ = reply.send(Err(error.into()));
            return;
        }

        let api = self.api.clone();
        let channel_id = channel.id.clone();
        self.spawn(async move {
            let result = api.delete_channel(&channel_id).await;
            Completion::ChannelDeleted {
                channel_id,
                result,
                reply,
            }
        });
    }

    async fn apply_deleted(&mut self, channel_id: String, result: ApiResult<()>, reply: Reply<()>) {
        if let Err(error) = result {
            let _ = reply.send(Err(error.into()));
            return;
        }

        info!(%channel_id, "channel deleted");
        self.channels.retain(|channel| channel.id != channel_id);
        if self.current_channel_id().as_deref() == Some(channel_id.as_str()) {
            self.drop_active_channel();
        }
        if let Err(error) = self.cache.remove(&channel_id).await {
            warn!(%channel_id, %error, "failed to drop cache for deleted channel");
        }
        self.refresh_channels(None);
        let _ = reply.send(Ok(()));
    }

    // Messages

    fn send_message(&mut self, content: String) -> SessionResult<()> {
        let channel_id = self.current_channel_id().ok_or(SessionError::NoChannel)?;
        Validator::message_content(&content)?;

        self.live.emit(ClientEvent::new_message(&channel_id, content));
        self.stop_typing();
        Ok(())
    }

    fn begin_load_more(&mut self, reply: Reply<usize>) {
        let Some(channel_id) = self.current_channel_id() else {
            let _ = reply.send(Err(SessionError::NoChannel));
            return;
        };

        let skip = self.messages.cursor();
        let generation = self.generation;
        let api = self.api.clone();
        debug!(%channel_id, skip, "loading older messages");
        self.spawn(async move {
            Completion::HistoryPage {
                generation,
                result: api.fetch_history(&channel_id, skip).await,
                channel_id,
                reply,
            }
        });
    }

    async fn apply_history_page(
        &mut self,
        generation: u64,
        channel_id: String,
        result: ApiResult<Vec<Message>>,
        reply: Reply<usize>,
    ) {
        let same_channel = self.current_channel_id().as_deref() == Some(channel_id.as_str());
        if generation != self.generation || !same_channel {
            let _ = reply.send(Err(SessionError::Superseded));
            return;
        }

        match result {
            Ok(older) => {
                let added = self.messages.prepend_history(older);
                if added > 0 {
                    self.persist().await;
                    self.schedule_auto_reads();
                }
                let _ = reply.send(Ok(added));
            }
            Err(error) => {
                warn!(%error, "failed to load message history");
                let _ = reply.send(Err(error.into()));
            }
        }
    }

    fn begin_mark_read(&mut self, message_id: String, reply: Option<Reply<()>>) {
        self.pending_reads.insert(message_id.clone());
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.mark_read(&message_id).await;
            Completion::ReadMarked {
                message_id,
                result,
                reply,
            }
        });
    }

    async fn apply_receipts(
        &mut self,
        message_id: String,
        result: ApiResult<Vec<ReadReceipt>>,
        reply: Option<Reply<()>>,
    ) {
        let outcome = match result {
            Ok(receipts) => {
                if self.messages.reconcile_read_receipt(&message_id, receipts) {
                    self.persist().await;
                }
                Ok(())
            }
            Err(error) if error.is_malformed() => {
                warn!(%message_id, %error, "mark-read response carried no usable receipts");
                Err(error.into())
            }
            Err(error) => {
                warn!(%message_id, %error, "failed to mark message as read");
                Err(error.into())
            }
        };
        if let Some(reply) = reply {
            let _ = reply.send(outcome);
        }
    }

    /// Mark every unread message from someone else, once per message
    fn schedule_auto_reads(&mut self) {
        if !self.config.auto_mark_read {
            return;
        }
        let unread: Vec<String> = self
            .messages
            .unread_from_others(&self.user.id)
            .map(|message| message.id.clone())
            .filter(|id| !self.pending_reads.contains(id))
            .collect();

        for message_id in unread {
            trace!(%message_id, "auto marking message read");
            self.begin_mark_read(message_id, None);
        }
    }

    async fn persist(&mut self) {
        let Some(channel) = &self.channel else {
            return;
        };
        if let Err(error) = self.cache.store(&channel.id, self.messages.messages()).await {
            warn!(channel_id = %channel.id, %error, "failed to write channel cache");
        }
    }

    // Typing

    fn keystroke(&mut self) {
        let Some(channel_id) = self.current_channel_id() else {
            return;
        };
        if let Some(abandoned) = self.debounce.keystroke(&channel_id, Instant::now()) {
            self.live.emit(ClientEvent::stop_typing(abandoned));
        }
        self.live.emit(ClientEvent::typing(channel_id));
    }

    fn stop_typing(&mut self) {
        if let Some(channel_id) = self.debounce.cancel().or_else(|| self.current_channel_id()) {
            self.live.emit(ClientEvent::stop_typing(channel_id));
        }
    }

    fn next_wakeup(&self) -> Option<Instant> {
        [self.typing.next_deadline(), self.debounce.deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    fn on_timer(&mut self) {
        let now = Instant::now();
        let expired = self.typing.expire(now);
        if expired > 0 {
            trace!(expired, "typing indicators expired");
        }
        if let Some(channel_id) = self.debounce.due(now) {
            self.live.emit(ClientEvent::stop_typing(channel_id));
        }
    }

    // Live stream

    async fn on_connection_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::State(state) => {
                self.connection = state;
                if state.is_connected() {
                    if let Some(channel) = &self.channel {
                        debug!(channel_id = %channel.id, "re-joining channel after connect");
                        self.live.join_channel(&channel.id);
                    }
                }
            }
            ConnectionEvent::Event(event) => self.on_server_event(event).await,
        }
    }

    async fn on_server_event(&mut self, event: ServerEvent) {
        trace!(event = event.event_name(), "routing live event");
        match event {
            ServerEvent::ReceiveMessage(message) => {
                let Some(channel_id) = self.current_channel_id() else {
                    debug!(message_id = %message.id, "no active channel, dropping live message");
                    return;
                };
                if !message.belongs_to(&channel_id) {
                    debug!(message_id = %message.id, "live message for another channel ignored");
                    return;
                }
                let message_id = message.id.clone();
                if self.messages.append(message) {
                    self.persist().await;
                    self.schedule_auto_reads();
                } else {
                    debug!(%message_id, "duplicate live message ignored");
                }
            }
            ServerEvent::MessageRead(payload) => {
                if self
                    .messages
                    .reconcile_read_receipt(&payload.message_id, payload.read_by)
                {
                    self.persist().await;
                }
            }
            ServerEvent::UserOnline(entry) => {
                self.presence.upsert(entry);
            }
            ServerEvent::UserOffline(entry) => {
                self.presence.remove(&entry.user_id);
            }
            ServerEvent::ChannelOnlineUsers(entries) => self.presence.replace_all(entries),
            ServerEvent::UserTyping(entry) => {
                self.typing.start(entry, Instant::now());
            }
            ServerEvent::UserStopTyping(entry) => {
                self.typing.stop(&entry.user_id);
            }
            ServerEvent::Error(payload) => {
                warn!(message = payload.message(), "live stream reported an error");
                self.last_error = Some(payload.message().to_string());
            }
        }
    }

    // Lifecycle

    fn logout(&mut self) {
        info!(user_id = %self.user.id, "logging out");
        self.deselect();
        self.debounce.cancel();
        self.typing.reset();
        self.live.disconnect();
        if let Some(hook) = self.on_logout.take() {
            hook();
        }
    }

    fn view(&self) -> SessionView {
        SessionView {
            user: self.user.clone(),
            connection: self.connection,
            phase: self.phase.clone(),
            channel: self.channel.clone(),
            channels: self.channels.clone(),
            messages: self.messages.messages().to_vec(),
            online: self.presence.entries().to_vec(),
            typing: self.typing.users(),
            last_error: self.last_error.clone(),
        }
    }

    fn publish(&self) {
        self.view.send_replace(self.view());
    }
}

async fn fetch_selection(
    api: &dyn ChatApi,
    cache: &dyn CacheStore,
    channel_id: &str,
) -> ApiResult<Selection> {
    let channel = api.get_channel(channel_id).await?;

    let cached = match cache.load(channel_id).await {
        Ok(cached) => cached,
        Err(error) => {
            warn!(%channel_id, %error, "cache unavailable, continuing without it");
            None
        }
    };

    let fetched = api.fetch_messages(channel_id).await?;
    Ok(Selection {
        channel,
        cached,
        fetched,
    })
}

async fn create_channel(
    api: &dyn ChatApi,
    request: &CreateChannelRequest,
) -> ApiResult<(Channel, Vec<Channel>)> {
    let mut channel = api.create_channel(request).await?;
    info!(channel_id = %channel.id, private = request.is_private, "channel created");

    if request.is_private {
        for member in &request.members {
            match api.invite_user(&channel.id, member).await {
                Ok(updated) => channel = updated,
                Err(error) => warn!(channel_id = %channel.id, %member, %error, "failed to invite member"),
            }
        }
    }

    let channels = api.list_channels().await?;
    Ok((channel, channels))
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
