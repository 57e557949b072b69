//! Live-stream connection task.
//!
//! A [`ConnectionHandle`] fronts exactly one background task. The task owns the
//! socket; the handle only enqueues outbound events and flips the shutdown
//! flag, so callers never block on the network.
//!
//! Channel signals (joins, leaves, typing) queued while the socket is down are
//! discarded when the next connection opens; the session re-joins on
//! `Connected`. Queued new messages are still delivered in order.

use std::collections::VecDeque;
use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use huddle_chats::{ClientEvent, ServerEvent};
use huddle_config::RealtimeConfig;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, info_span, trace, warn, Instrument};
use uuid::Uuid;

use crate::error::{GatewayError, GatewayResult};
use crate::policy::ReconnectPolicy;
use crate::state::{ConnectionEvent, ConnectionState};
use crate::LiveStream;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Cloneable handle to the live-stream connection
#[derive(Clone)]
pub struct ConnectionHandle {
    outbound: mpsc::UnboundedSender<ClientEvent>,
    state: watch::Receiver<ConnectionState>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl ConnectionHandle {
    /// Start the connection task.
    ///
    /// Without a credential nothing is attempted and the handle stays
    /// `Disconnected`. Transport failures never surface here; they show up as
    /// state changes on the returned receiver.
    pub fn connect(
        config: &RealtimeConfig,
        token: Option<&str>,
    ) -> (Self, mpsc::UnboundedReceiver<ConnectionEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        match token {
            Some(token) => {
                let connection_id = Uuid::new_v4();
                let task = ConnectionTask {
                    url: config.url.clone(),
                    token: token.to_string(),
                    policy: ReconnectPolicy::from(config),
                    events: event_tx,
                    outbound: outbound_rx,
                    state: state_tx,
                    shutdown: shutdown_rx,
                };
                tokio::spawn(
                    task.run()
                        .instrument(info_span!("live_stream", %connection_id)),
                );
            }
            None => debug!("no credential available, live stream not started"),
        }

        let handle = Self {
            outbound: outbound_tx,
            state: state_rx,
            shutdown: Arc::new(shutdown_tx),
        };
        (handle, event_rx)
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }
}

impl LiveStream for ConnectionHandle {
    fn emit(&self, event: ClientEvent) {
        let name = event.event_name();
        if self.outbound.send(event).is_err() {
            trace!(event = name, "live stream closed, dropping outbound event");
        }
    }

    fn disconnect(&self) {
        self.shutdown.send_replace(true);
    }
}

enum PumpOutcome {
    Shutdown,
    Dropped,
}

struct ConnectionTask {
    url: String,
    token: String,
    policy: ReconnectPolicy,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    outbound: mpsc::UnboundedReceiver<ClientEvent>,
    state: watch::Sender<ConnectionState>,
    shutdown: watch::Receiver<bool>,
}

impl ConnectionTask {
    async fn run(mut self) {
        let mut attempt: u32 = 0;

        while !self.stopping() {
            self.set_state(if attempt == 0 {
                ConnectionState::Connecting
            } else {
                ConnectionState::Reconnecting
            });

            let stream = match self.handshake().await {
                Ok(Some(stream)) => stream,
                Ok(None) => break,
                Err(error) if error.is_retryable() => {
                    warn!(%error, attempt, "live stream connection failed");
                    if self.back_off(&mut attempt).await {
                        continue;
                    }
                    break;
                }
                Err(error) => {
                    warn!(%error, "live stream cannot be established");
                    break;
                }
            };

            attempt = 0;
            let backlog = self.take_backlog();
            info!(url = %self.url, queued = backlog.len(), "live stream connected");
            self.set_state(ConnectionState::Connected);

            match self.pump(stream, backlog).await {
                PumpOutcome::Shutdown => break,
                PumpOutcome::Dropped => {
                    if !self.back_off(&mut attempt).await {
                        break;
                    }
                }
            }
        }

        self.set_state(ConnectionState::Disconnected);
        debug!("live stream task finished");
    }

    fn stopping(&self) -> bool {
        *self.shutdown.borrow() || self.shutdown.has_changed().is_err()
    }

    fn request(&self) -> GatewayResult<Request> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|error| GatewayError::InvalidUrl(format!("{}: {error}", self.url)))?;
        let credential = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| GatewayError::InvalidCredential)?;
        request.headers_mut().insert(AUTHORIZATION, credential);
        Ok(request)
    }

    /// `Ok(None)` means shutdown was requested mid-handshake.
    async fn handshake(&mut self) -> GatewayResult<Option<WsStream>> {
        let request = self.request()?;
        tokio::select! {
            result = tokio_tungstenite::connect_async(request) => {
                let (stream, _response) = result?;
                Ok(Some(stream))
            }
            _ = self.shutdown.changed() => Ok(None),
        }
    }

    /// Wait out the next backoff delay; `false` once the budget is spent or
    /// shutdown is requested.
    async fn back_off(&mut self, attempt: &mut u32) -> bool {
        *attempt += 1;
        let Some(delay) = self.policy.delay_for(*attempt) else {
            warn!(
                attempts = self.policy.attempts(),
                "giving up on live stream reconnection"
            );
            return false;
        };

        self.set_state(ConnectionState::Reconnecting);
        debug!(attempt = *attempt, delay_ms = delay.as_millis() as u64, "scheduling reconnect");

        tokio::select! {
            _ = tokio::time::sleep(delay) => !self.stopping(),
            _ = self.shutdown.changed() => false,
        }
    }

    /// Drain everything queued while disconnected, keeping only what is still
    /// meaningful on a fresh connection.
    fn take_backlog(&mut self) -> VecDeque<ClientEvent> {
        let mut backlog = VecDeque::new();
        while let Ok(event) = self.outbound.try_recv() {
            if event.is_channel_signal() {
                debug!(event = event.event_name(), "discarding stale channel signal");
            } else {
                backlog.push_back(event);
            }
        }
        backlog
    }

    async fn pump(&mut self, stream: WsStream, mut backlog: VecDeque<ClientEvent>) -> PumpOutcome {
        let (mut sink, mut source) = stream.split();

        while let Some(event) = backlog.pop_front() {
            if !forward(&mut sink, event).await {
                return PumpOutcome::Dropped;
            }
        }

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    let _ = sink.send(Message::Close(None)).await;
                    info!("live stream disconnected on request");
                    return PumpOutcome::Shutdown;
                }
                outbound = self.outbound.recv() => {
                    let Some(event) = outbound else {
                        let _ = sink.send(Message::Close(None)).await;
                        return PumpOutcome::Shutdown;
                    };
                    if !forward(&mut sink, event).await {
                        return PumpOutcome::Dropped;
                    }
                }
                inbound = source.next() => match inbound {
                    Some(Ok(Message::Text(text))) => {
                        if !self.dispatch(&text) {
                            return PumpOutcome::Shutdown;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!(?frame, "live stream closed by server");
                        return PumpOutcome::Dropped;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        warn!(%error, "live stream read failed");
                        return PumpOutcome::Dropped;
                    }
                    None => {
                        info!("live stream ended");
                        return PumpOutcome::Dropped;
                    }
                },
            }
        }
    }

    /// Decode and forward one frame; `false` once nobody is listening.
    fn dispatch(&self, text: &str) -> bool {
        match serde_json::from_str::<ServerEvent>(text) {
            Ok(event) => {
                trace!(event = event.event_name(), "received event");
                self.events.send(ConnectionEvent::Event(event)).is_ok()
            }
            Err(error) => {
                warn!(%error, frame_len = text.len(), "skipping undecodable live stream frame");
                true
            }
        }
    }

    fn set_state(&self, next: ConnectionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!(from = %previous, to = %next, "connection state changed");
            let _ = self.events.send(ConnectionEvent::State(next));
        }
    }
}

fn encode(event: &ClientEvent) -> GatewayResult<Message> {
    Ok(Message::Text(serde_json::to_string(event)?))
}

/// Write one event; `false` when the socket failed and must be replaced.
async fn forward(sink: &mut SplitSink<WsStream, Message>, event: ClientEvent) -> bool {
    let frame = match encode(&event) {
        Ok(frame) => frame,
        Err(error) => {
            warn!(event = event.event_name(), %error, "failed to encode outbound event");
            return true;
        }
    };
    if let Err(error) = sink.send(frame).await {
        warn!(event = event.event_name(), %error, "live stream write failed");
        return false;
    }
    trace!(event = event.event_name(), "sent event");
    true
}
