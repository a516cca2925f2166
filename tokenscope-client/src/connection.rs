//! Connection lifecycle state machine.
//!
//! [`ConnectionManager`] owns the logical state of the one real-time
//! connection: lifecycle state, retry budget, heartbeat liveness tracking and
//! the reconnect reentrancy guard. It is deliberately pure - every inbound
//! event produces a list of [`Command`]s for the feed driver to execute
//! against the real transport and timers, which keeps the whole protocol
//! testable without a socket.
//!
//! Lifecycle: `Disconnected -> Connecting -> Open -> Closed -> (Connecting |
//! Disconnected)`.

use crate::error::ClientError;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Lifecycle state of the real-time connection. Exactly one live instance
/// per process; transitions are driven only by [`ConnectionManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Closed,
}

/// Inbound events driving the state machine.
///
/// Network-level errors and explicit close frames are both delivered as
/// [`ConnectionEvent::SocketClosed`]; they are not distinguished for retry
/// purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// `connect()` was called. No-op while an attempt is in flight or a
    /// connection is open.
    ConnectRequested,
    /// User-triggered reconnect: resets the retry budget and attempts
    /// immediately, bypassing the backoff delay.
    ManualReconnect,
    /// The underlying socket finished its handshake.
    SocketOpened,
    /// Any inbound message arrived (liveness reply or otherwise).
    MessageReceived,
    /// The heartbeat interval timer fired.
    HeartbeatTick,
    /// The heartbeat timeout timer fired.
    HeartbeatTimeout,
    /// The socket closed or errored.
    SocketClosed,
    /// The reconnect delay timer fired.
    ReconnectElapsed,
    /// `disconnect()` was called.
    DisconnectRequested,
}

/// Side effects for the feed driver. The state machine never touches the
/// transport directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open a fresh socket to the configured endpoint.
    OpenSocket,
    /// Close and drop the current socket, if any.
    CloseSocket,
    /// Send a liveness probe carrying an epoch-millisecond timestamp.
    SendPing { timestamp: i64 },
    /// Start the heartbeat interval timer.
    StartHeartbeat,
    /// Arm the bounded wait for any inbound message.
    ArmHeartbeatTimeout,
    /// Cancel the pending heartbeat timeout.
    CancelHeartbeatTimeout,
    /// Cancel every pending timer: heartbeat interval, heartbeat timeout and
    /// reconnect delay.
    CancelTimers,
    /// Schedule one reconnection attempt after the configured delay.
    ScheduleReconnect { attempt: u32 },
    /// Surface the terminal retries-exhausted error.
    SurfaceTerminal { attempts: u32 },
}

/// Owns lifecycle state, heartbeat liveness and the bounded retry budget for
/// the single real-time connection.
#[derive(Debug)]
pub struct ConnectionManager {
    state: ConnectionState,
    retry_count: u32,
    /// Reentrancy guard: at most one reconnection attempt in flight.
    reconnect_pending: bool,
    /// Timestamp of the most recent inbound message (or socket open).
    last_seen: DateTime<Utc>,
    last_error: Option<ClientError>,
    heartbeat_timeout: Duration,
    max_retries: u32,
}

impl ConnectionManager {
    pub fn new(heartbeat_timeout: Duration, max_retries: u32) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            retry_count: 0,
            reconnect_pending: false,
            last_seen: Utc::now(),
            last_error: None,
            heartbeat_timeout,
            max_retries,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    /// Apply one event at time `now`, returning the side effects to execute.
    pub fn handle(&mut self, event: ConnectionEvent, now: DateTime<Utc>) -> Vec<Command> {
        match event {
            ConnectionEvent::ConnectRequested => self.on_connect_requested(),
            ConnectionEvent::ManualReconnect => self.on_manual_reconnect(),
            ConnectionEvent::SocketOpened => self.on_socket_opened(now),
            ConnectionEvent::MessageReceived => self.on_message_received(now),
            ConnectionEvent::HeartbeatTick => self.on_heartbeat_tick(now),
            ConnectionEvent::HeartbeatTimeout => self.on_heartbeat_timeout(now),
            ConnectionEvent::SocketClosed => self.on_socket_closed(),
            ConnectionEvent::ReconnectElapsed => self.on_reconnect_elapsed(),
            ConnectionEvent::DisconnectRequested => self.on_disconnect_requested(),
        }
    }

    fn on_connect_requested(&mut self) -> Vec<Command> {
        match self.state {
            // Guard: an attempt is already in flight or a connection exists.
            ConnectionState::Connecting | ConnectionState::Open => Vec::new(),
            ConnectionState::Disconnected | ConnectionState::Closed => {
                self.reconnect_pending = false;
                self.state = ConnectionState::Connecting;
                // Tear down any stale socket and pending timers before
                // opening a new one: at most one socket alive at a time.
                vec![Command::CancelTimers, Command::CloseSocket, Command::OpenSocket]
            }
        }
    }

    fn on_manual_reconnect(&mut self) -> Vec<Command> {
        // Always resets the budget and attempts immediately, from any state.
        self.retry_count = 0;
        self.last_error = None;
        self.reconnect_pending = false;
        self.state = ConnectionState::Connecting;
        vec![Command::CancelTimers, Command::CloseSocket, Command::OpenSocket]
    }

    fn on_socket_opened(&mut self, now: DateTime<Utc>) -> Vec<Command> {
        if self.state != ConnectionState::Connecting {
            // A stale socket the driver failed to drop; nothing to do.
            return Vec::new();
        }
        self.state = ConnectionState::Open;
        self.retry_count = 0;
        self.last_error = None;
        self.last_seen = now;
        vec![Command::StartHeartbeat]
    }

    fn on_message_received(&mut self, now: DateTime<Utc>) -> Vec<Command> {
        if self.state != ConnectionState::Open {
            return Vec::new();
        }
        // Receipt of *any* message counts for liveness, not only PONG.
        self.last_seen = now;
        vec![Command::CancelHeartbeatTimeout]
    }

    fn on_heartbeat_tick(&mut self, now: DateTime<Utc>) -> Vec<Command> {
        if self.state != ConnectionState::Open {
            return Vec::new();
        }
        vec![
            Command::SendPing {
                timestamp: now.timestamp_millis(),
            },
            Command::ArmHeartbeatTimeout,
        ]
    }

    fn on_heartbeat_timeout(&mut self, now: DateTime<Utc>) -> Vec<Command> {
        if self.state != ConnectionState::Open {
            return Vec::new();
        }
        let elapsed = now
            .signed_duration_since(self.last_seen)
            .to_std()
            .unwrap_or(Duration::ZERO);
        if elapsed <= self.heartbeat_timeout {
            // A message slipped in before the cancel landed; late timer, not
            // a liveness failure.
            return Vec::new();
        }
        // The single liveness-failure trigger: force-close and route through
        // the same retry path as a transport failure.
        tracing::warn!(
            elapsed_ms = elapsed.as_millis() as u64,
            "heartbeat timeout - no message within budget, closing connection"
        );
        self.state = ConnectionState::Closed;
        let mut commands = vec![Command::CancelTimers, Command::CloseSocket];
        commands.extend(self.schedule_retry());
        commands
    }

    fn on_socket_closed(&mut self) -> Vec<Command> {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Open => {
                self.state = ConnectionState::Closed;
                let mut commands = vec![Command::CancelTimers, Command::CloseSocket];
                commands.extend(self.schedule_retry());
                commands
            }
            // Already handled (e.g. the close we forced after a heartbeat
            // timeout) or deliberately torn down; must not double-schedule.
            ConnectionState::Closed | ConnectionState::Disconnected => Vec::new(),
        }
    }

    /// Schedule one bounded reconnection attempt, incrementing the counter on
    /// the *scheduled* attempt. Guarded by the reentrancy flag.
    fn schedule_retry(&mut self) -> Vec<Command> {
        if self.reconnect_pending {
            return Vec::new();
        }
        if self.retry_count < self.max_retries {
            self.retry_count += 1;
            self.reconnect_pending = true;
            tracing::info!(
                attempt = self.retry_count,
                max = self.max_retries,
                "scheduling reconnection attempt"
            );
            vec![Command::ScheduleReconnect {
                attempt: self.retry_count,
            }]
        } else {
            let error = ClientError::RetriesExhausted {
                attempts: self.retry_count,
            };
            tracing::error!(attempts = self.retry_count, "reconnection budget exhausted");
            self.last_error = Some(error);
            vec![Command::SurfaceTerminal {
                attempts: self.retry_count,
            }]
        }
    }

    fn on_reconnect_elapsed(&mut self) -> Vec<Command> {
        if self.state != ConnectionState::Closed || !self.reconnect_pending {
            return Vec::new();
        }
        self.reconnect_pending = false;
        self.state = ConnectionState::Connecting;
        vec![Command::OpenSocket]
    }

    fn on_disconnect_requested(&mut self) -> Vec<Command> {
        // Safe to call multiple times and from any state.
        self.state = ConnectionState::Disconnected;
        self.reconnect_pending = false;
        vec![Command::CancelTimers, Command::CloseSocket]
    }
}
