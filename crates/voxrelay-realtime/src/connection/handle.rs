//! Individual relay connection handle.

use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use voxrelay_core::error::AppError;
use voxrelay_core::types::{ConnectionId, DeviceKey};

/// Which side of a device's stream a connection is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The single device connection supplying audio frames.
    Producer,
    /// A listener receiving the fan-out of a producer's frames.
    Subscriber,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Producer => write!(f, "producer"),
            Self::Subscriber => write!(f, "subscriber"),
        }
    }
}

/// A message queued for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A validated audio frame, sent as a binary message.
    Frame(Bytes),
    /// A structured control message, sent as a text message.
    Text(String),
    /// A protocol-level ping.
    Ping,
}

/// Close code and reason sent to the peer when the server ends a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReason {
    /// WebSocket close code.
    pub code: u16,
    /// Human-readable reason.
    pub reason: String,
}

impl CloseReason {
    /// A producer evicted by a newer producer for the same device key.
    pub fn replaced() -> Self {
        Self {
            code: 4000,
            reason: "replaced by newer connection".to_string(),
        }
    }

    /// The server is going away.
    pub fn shutdown() -> Self {
        Self {
            code: 1001,
            reason: "server shutting down".to_string(),
        }
    }

    /// Normal closure after the peer went away.
    pub fn normal() -> Self {
        Self {
            code: 1000,
            reason: String::new(),
        }
    }
}

/// A handle to a single relay connection.
///
/// Built once at handshake time; role and device key never change. The
/// transport task owns the socket, and this handle is the only way other
/// tasks talk to it: by queueing [`Outbound`] messages or by closing it.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Producer or subscriber
    pub role: Role,
    /// Device this connection belongs to
    pub device_key: DeviceKey,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Sender for outbound messages
    sender: mpsc::Sender<Outbound>,
    /// Cleared once the connection is closed from either side
    alive: AtomicBool,
    /// Fired when the server decides to close the connection
    shutdown: CancellationToken,
    /// Reason sent with the close frame
    close_reason: OnceLock<CloseReason>,
}

impl ConnectionHandle {
    /// Create a new connection handle and the receiver its writer drains.
    pub fn new(
        role: Role,
        device_key: DeviceKey,
        buffer_size: usize,
    ) -> (Self, mpsc::Receiver<Outbound>) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let handle = Self {
            id: ConnectionId::new(),
            role,
            device_key,
            connected_at: Utc::now(),
            sender,
            alive: AtomicBool::new(true),
            shutdown: CancellationToken::new(),
            close_reason: OnceLock::new(),
        };
        (handle, receiver)
    }

    /// Queue a message without waiting.
    ///
    /// A full queue fails with a delivery error and leaves the connection
    /// open; a closed queue marks the connection dead.
    pub fn send(&self, msg: Outbound) -> Result<(), AppError> {
        if !self.is_open() {
            return Err(AppError::transport_closed(format!(
                "Connection {} is closed",
                self.id
            )));
        }
        match self.sender.try_send(msg) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(AppError::delivery(format!(
                "Connection {} send buffer full",
                self.id
            ))),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                Err(AppError::transport_closed(format!(
                    "Connection {} writer has stopped",
                    self.id
                )))
            }
        }
    }

    /// Close the connection from the server side.
    ///
    /// The first reason wins; later calls are no-ops.
    pub fn close(&self, reason: CloseReason) {
        let _ = self.close_reason.set(reason);
        self.mark_dead();
        self.shutdown.cancel();
    }

    /// Resolves once [`close`](Self::close) has been called.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.shutdown.cancelled()
    }

    /// The reason recorded by [`close`](Self::close), if any.
    pub fn close_reason(&self) -> Option<&CloseReason> {
        self.close_reason.get()
    }

    /// Whether the transport can still accept messages.
    pub fn is_open(&self) -> bool {
        self.alive.load(Ordering::SeqCst) && !self.sender.is_closed()
    }

    /// Mark connection as dead
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
