//! # Huddle Gateway Crate
//!
//! Owns the lifecycle of the single authenticated live-stream connection a
//! client keeps open to the chat server.
//!
//! ## Architecture
//!
//! - **Connection**: one background task per handle that performs the
//!   handshake, pumps frames both ways and reconnects with backoff
//! - **Policy**: the reconnection schedule
//! - **State**: the observable connection lifecycle
//!
//! ## Usage
//!
//! ```rust,no_run
//! use huddle_config::RealtimeConfig;
//! use huddle_gateway::{ConnectionEvent, ConnectionHandle, LiveStream};
//!
//! # async fn demo() {
//! let (handle, mut events) = ConnectionHandle::connect(&RealtimeConfig::default(), Some("jwt"));
//! handle.join_channel("c1");
//! while let Some(event) = events.recv().await {
//!     if let ConnectionEvent::Event(event) = event {
//!         println!("{}", event.event_name());
//!     }
//! }
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod policy;
pub mod state;

pub use connection::ConnectionHandle;
pub use error::{GatewayError, GatewayResult};
pub use policy::ReconnectPolicy;
pub use state::{ConnectionEvent, ConnectionState};

use huddle_chats::ClientEvent;

/// Outbound side of a live stream.
///
/// Every signal is fire-and-forget: nothing is acknowledged and delivery
/// failures surface only as connection state changes.
pub trait LiveStream: Send + Sync + 'static {
    fn emit(&self, event: ClientEvent);

    /// Disconnect and stop reconnecting; calling it again is a no-op
    fn disconnect(&self);

    fn join_channel(&self, channel_id: &str) {
        self.emit(ClientEvent::JoinChannel(channel_id.to_string()));
    }

    fn leave_channel(&self, channel_id: &str) {
        self.emit(ClientEvent::LeaveChannel(channel_id.to_string()));
    }
}
