//! # Huddle Session Crate
//!
//! The real-time channel synchronization engine. A session keeps the view of
//! one active channel (messages, presence, typing, read receipts) consistent
//! across the live stream, paginated history fetches and the local cache.
//!
//! ## Architecture
//!
//! - **Message Store**: ordered message list, hydration and receipt merging
//! - **Presence / Typing Trackers**: per-channel user sets
//! - **Coordinator**: a single task owning all of the above, driven by
//!   commands, live events, request completions and timers
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use huddle_cache::MemoryCacheStore;
//! use huddle_chats::User;
//! use huddle_config::AppConfig;
//! use huddle_session::{Session, SessionContext};
//!
//! # async fn demo(user: User) -> Result<(), Box<dyn std::error::Error>> {
//! let context = SessionContext::new("jwt", user, Arc::new(MemoryCacheStore::new()));
//! let session = Session::connect(context, &AppConfig::default())?;
//! session.select_channel("c1").await?;
//! session.send_message("hello").await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod coordinator;
mod error;
mod handle;
mod message_store;
mod presence;
mod typing;
mod view;

use std::sync::Arc;

use huddle_api::{ApiClient, ChatApi};
use huddle_config::{AppConfig, SyncConfig};
use huddle_gateway::{ConnectionEvent, ConnectionHandle, LiveStream};
use tokio::sync::mpsc;
use tracing::{info_span, Instrument};

pub use context::SessionContext;
pub use error::{SessionError, SessionResult};
pub use handle::SessionHandle;
pub use message_store::{Hydration, HydrationSource, MessageStore};
pub use presence::PresenceTracker;
pub use typing::{TypingDebounce, TypingTracker};
pub use view::{ChannelPhase, SessionView};

use coordinator::Coordinator;

const COMMAND_BUFFER: usize = 64;

pub struct Session;

impl Session {
    /// Start a session over explicit transports.
    pub fn start(
        context: SessionContext,
        api: Arc<dyn ChatApi>,
        live: Arc<dyn LiveStream>,
        events: mpsc::UnboundedReceiver<ConnectionEvent>,
        config: &SyncConfig,
    ) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let span = info_span!("session", user_id = %context.user.id);

        let coordinator = Coordinator::new(context, api, live, events, command_rx, config);
        let view = coordinator.subscribe();
        tokio::spawn(coordinator.run().instrument(span));

        SessionHandle::new(command_tx, view)
    }

    /// Start a session with the REST client and live stream built from
    /// configuration, both authenticated with the context's token.
    pub fn connect(context: SessionContext, config: &AppConfig) -> SessionResult<SessionHandle> {
        let api = ApiClient::new(&config.api)?.with_token(context.token.clone());
        let (live, events) = ConnectionHandle::connect(&config.realtime, Some(&context.token));

        Ok(Self::start(
            context,
            Arc::new(api),
            Arc::new(live),
            events,
            &config.sync,
        ))
    }
}
