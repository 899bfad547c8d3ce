//! The duplex text channel a session runs over.

use std::fmt;
use std::future::Future;

use url::Url;

/// Lifecycle of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// The close handshake has started.
    Closing,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Closing => "closing",
        })
    }
}

/// Something that happened on the transport, delivered in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    AboutToClose,
    StateChanged(ConnectionState),
    Error(String),
    Text(String),
    Binary(Vec<u8>),
}

/// A message-oriented connection to one engine.
///
/// `close` must be idempotent. After `close` or a fresh `open`, events
/// from the previous connection are never delivered.
pub trait Transport: Send {
    fn open(&mut self, url: &Url);

    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Queues one text frame. Returns `false` if the connection is not
    /// open.
    fn send_text(&mut self, text: String) -> bool;

    /// Waits for the next event. Resolves to `None` once the current
    /// connection has nothing more to deliver.
    fn next_event(&mut self) -> impl Future<Output = Option<TransportEvent>> + Send;
}
