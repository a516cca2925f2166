//! Async feed driver.
//!
//! One task owns the socket and every timer, runs the connection state
//! machine over inbound events and executes the commands it returns. All
//! suspension points (connect, send, receive, refresh) live here; the state
//! machine itself stays pure.
//!
//! Refreshes run as fire-and-forget tasks: the token store replacement is
//! atomic and last-write-wins, so interleaved refreshes are tolerated.

use crate::{
    config::ClientConfig,
    connection::{Command, ConnectionEvent, ConnectionManager, ConnectionState},
    error::ClientError,
    protocol::ClientMessage,
    rest::RestClient,
    router::{route_message, RouteAction},
    store::TokenStore,
};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use std::collections::VecDeque;
use tokio::{
    net::TcpStream,
    sync::{mpsc, watch},
    time::{Instant, Interval},
};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Events surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// The token mirror was replaced with a fresh collection.
    TokensRefreshed { count: usize },
    /// A refresh failed; the previous mirror contents are retained.
    RefreshFailed(ClientError),
    /// The automatic reconnection budget is exhausted; only a manual
    /// reconnect recovers.
    Terminal(ClientError),
}

/// Control messages into the feed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedCommand {
    Reconnect,
    Disconnect,
    Refresh,
}

/// Cloneable handle for driving the feed from the presentation layer.
#[derive(Debug, Clone)]
pub struct FeedHandle {
    control_tx: mpsc::Sender<FeedCommand>,
}

impl FeedHandle {
    /// Request a manual reconnect: resets the retry budget and attempts
    /// immediately.
    pub async fn reconnect(&self) {
        let _ = self.control_tx.send(FeedCommand::Reconnect).await;
    }

    /// Tear down the connection and end the feed task.
    pub async fn disconnect(&self) {
        let _ = self.control_tx.send(FeedCommand::Disconnect).await;
    }

    /// Force a collection refresh outside the notification path.
    pub async fn refresh(&self) {
        let _ = self.control_tx.send(FeedCommand::Refresh).await;
    }
}

/// Spawn the feed task.
///
/// Returns the control handle, the event receiver, a watch receiver for
/// connection status, and the task handle.
pub fn spawn(
    config: ClientConfig,
    store: TokenStore,
) -> (
    FeedHandle,
    mpsc::Receiver<FeedEvent>,
    watch::Receiver<ConnectionState>,
    tokio::task::JoinHandle<()>,
) {
    let (control_tx, control_rx) = mpsc::channel(16);
    let (event_tx, event_rx) = mpsc::channel(config.channel_buffer_size);
    let (status_tx, status_rx) = watch::channel(ConnectionState::Disconnected);

    let driver = Driver::new(config, store, event_tx, status_tx);
    let join = tokio::spawn(driver.run(control_rx));

    (FeedHandle { control_tx }, event_rx, status_rx, join)
}

struct Driver {
    manager: ConnectionManager,
    config: ClientConfig,
    store: TokenStore,
    rest: RestClient,
    socket: Option<WsStream>,
    heartbeat: Option<Interval>,
    heartbeat_deadline: Option<Instant>,
    reconnect_at: Option<Instant>,
    last_state: ConnectionState,
    event_tx: mpsc::Sender<FeedEvent>,
    status_tx: watch::Sender<ConnectionState>,
}

impl Driver {
    fn new(
        config: ClientConfig,
        store: TokenStore,
        event_tx: mpsc::Sender<FeedEvent>,
        status_tx: watch::Sender<ConnectionState>,
    ) -> Self {
        Self {
            manager: ConnectionManager::new(config.heartbeat_timeout, config.max_retries),
            rest: RestClient::new(config.api_url.clone()),
            config,
            store,
            socket: None,
            heartbeat: None,
            heartbeat_deadline: None,
            reconnect_at: None,
            last_state: ConnectionState::Disconnected,
            event_tx,
            status_tx,
        }
    }

    async fn run(mut self, mut control_rx: mpsc::Receiver<FeedCommand>) {
        info!(url = %self.config.ws_url, "starting token feed");
        self.apply(ConnectionEvent::ConnectRequested).await;

        loop {
            let has_socket = self.socket.is_some();
            let has_heartbeat = self.heartbeat.is_some();
            let heartbeat_deadline = self.heartbeat_deadline;
            let reconnect_at = self.reconnect_at;

            tokio::select! {
                maybe_command = control_rx.recv() => match maybe_command {
                    Some(FeedCommand::Reconnect) => {
                        info!("manual reconnect requested");
                        self.apply(ConnectionEvent::ManualReconnect).await;
                    }
                    Some(FeedCommand::Refresh) => self.spawn_refresh(),
                    Some(FeedCommand::Disconnect) | None => {
                        self.apply(ConnectionEvent::DisconnectRequested).await;
                        info!("token feed stopped");
                        return;
                    }
                },
                message = next_message(&mut self.socket), if has_socket => {
                    self.on_socket_message(message).await;
                }
                _ = tick(&mut self.heartbeat), if has_heartbeat => {
                    self.apply(ConnectionEvent::HeartbeatTick).await;
                }
                _ = sleep_until(heartbeat_deadline), if heartbeat_deadline.is_some() => {
                    self.heartbeat_deadline = None;
                    self.apply(ConnectionEvent::HeartbeatTimeout).await;
                }
                _ = sleep_until(reconnect_at), if reconnect_at.is_some() => {
                    self.reconnect_at = None;
                    self.apply(ConnectionEvent::ReconnectElapsed).await;
                }
            }
        }
    }

    async fn on_socket_message(&mut self, message: Option<Result<Message, WsError>>) {
        match message {
            Some(Ok(Message::Text(text))) => {
                // Any inbound message refreshes liveness before routing.
                self.apply(ConnectionEvent::MessageReceived).await;
                if route_message(text.as_str()) == RouteAction::TriggerRefresh {
                    self.spawn_refresh();
                }
            }
            Some(Ok(Message::Close(frame))) => {
                info!(?frame, "server closed connection");
                self.apply(ConnectionEvent::SocketClosed).await;
            }
            Some(Ok(_)) => {
                // Ping/pong/binary frames still count for liveness.
                self.apply(ConnectionEvent::MessageReceived).await;
            }
            Some(Err(error)) => {
                let error = ClientError::Socket(error.to_string());
                error!(%error, "socket error");
                self.apply(ConnectionEvent::SocketClosed).await;
            }
            None => {
                warn!("socket stream ended");
                self.apply(ConnectionEvent::SocketClosed).await;
            }
        }
    }

    /// Run the state machine for one event and execute the resulting
    /// commands. Socket opens/failures feed follow-up events back in
    /// iteratively.
    async fn apply(&mut self, event: ConnectionEvent) {
        let mut pending = VecDeque::from([event]);
        while let Some(event) = pending.pop_front() {
            let commands = self.manager.handle(event, Utc::now());
            self.publish_state();
            for command in commands {
                if let Some(follow_up) = self.execute(command).await {
                    pending.push_back(follow_up);
                }
            }
        }
    }

    fn publish_state(&mut self) {
        let state = self.manager.state();
        if state != self.last_state {
            debug!(%state, "connection state changed");
            self.last_state = state;
            let _ = self.status_tx.send(state);
            if state == ConnectionState::Open {
                // Populate the mirror as soon as the channel is live.
                self.spawn_refresh();
            }
        }
    }

    async fn execute(&mut self, command: Command) -> Option<ConnectionEvent> {
        match command {
            Command::OpenSocket => {
                // The handshake is bounded: a peer that accepts TCP but never
                // answers the upgrade must not pin the loop in Connecting.
                let connect = connect_async(&self.config.ws_url);
                match tokio::time::timeout(self.config.connect_timeout, connect).await {
                    Ok(Ok((socket, _))) => {
                        info!(url = %self.config.ws_url, "socket connected");
                        self.socket = Some(socket);
                        Some(ConnectionEvent::SocketOpened)
                    }
                    Ok(Err(error)) => {
                        let error = ClientError::Socket(error.to_string());
                        error!(url = %self.config.ws_url, %error, "failed to connect");
                        Some(ConnectionEvent::SocketClosed)
                    }
                    Err(_) => {
                        warn!(
                            url = %self.config.ws_url,
                            budget = ?self.config.connect_timeout,
                            "handshake timed out"
                        );
                        Some(ConnectionEvent::SocketClosed)
                    }
                }
            }
            Command::CloseSocket => {
                if let Some(mut socket) = self.socket.take() {
                    let _ = socket.close(None).await;
                }
                None
            }
            Command::SendPing { timestamp } => {
                let payload = ClientMessage::Ping { timestamp }.to_json();
                let send_failed = match self.socket.as_mut() {
                    Some(socket) => socket.send(Message::Text(payload.into())).await.is_err(),
                    None => true,
                };
                if send_failed {
                    warn!("failed to send liveness probe, connection likely dead");
                    Some(ConnectionEvent::SocketClosed)
                } else {
                    None
                }
            }
            Command::StartHeartbeat => {
                // First tick must land one full interval from now, not
                // immediately.
                let period = self.config.heartbeat_interval;
                self.heartbeat = Some(tokio::time::interval_at(Instant::now() + period, period));
                self.heartbeat_deadline = None;
                None
            }
            Command::ArmHeartbeatTimeout => {
                self.heartbeat_deadline = Some(Instant::now() + self.config.heartbeat_timeout);
                None
            }
            Command::CancelHeartbeatTimeout => {
                self.heartbeat_deadline = None;
                None
            }
            Command::CancelTimers => {
                self.heartbeat = None;
                self.heartbeat_deadline = None;
                self.reconnect_at = None;
                None
            }
            Command::ScheduleReconnect { attempt } => {
                debug!(attempt, delay = ?self.config.reconnect_delay, "reconnect scheduled");
                self.reconnect_at = Some(Instant::now() + self.config.reconnect_delay);
                None
            }
            Command::SurfaceTerminal { attempts } => {
                let _ = self
                    .event_tx
                    .send(FeedEvent::Terminal(ClientError::RetriesExhausted { attempts }))
                    .await;
                None
            }
        }
    }

    /// Fire-and-forget full-collection refresh. The completion handler is
    /// the only writer of the token store.
    fn spawn_refresh(&self) {
        let rest = self.rest.clone();
        let store = self.store.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            match rest.fetch_tokens().await {
                Ok(tokens) => {
                    let count = tokens.len();
                    store.replace(tokens);
                    let _ = event_tx.send(FeedEvent::TokensRefreshed { count }).await;
                }
                Err(error) => {
                    warn!(%error, "token refresh failed, keeping previous collection");
                    let _ = event_tx.send(FeedEvent::RefreshFailed(error)).await;
                }
            }
        });
    }
}

async fn next_message(socket: &mut Option<WsStream>) -> Option<Result<Message, WsError>> {
    match socket.as_mut() {
        Some(socket) => socket.next().await,
        None => std::future::pending().await,
    }
}

async fn tick(interval: &mut Option<Interval>) {
    match interval.as_mut() {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
