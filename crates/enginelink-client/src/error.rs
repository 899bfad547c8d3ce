//! Client error types.

use std::fmt;

use enginelink_protocol::ProtocolError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// IO error.
    Io(std::io::Error),
    /// A message could not be encoded or decoded.
    Protocol(ProtocolError),
    /// A reply referenced a request id with no pending entry.
    UnmatchedRequestId(i32),
    /// Send attempted while the connection is not open.
    TransportNotOpen,
    /// The underlying socket reported an error.
    Transport(String),
    /// A console command could not be parsed.
    InvalidCommand(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Protocol(err) => write!(f, "protocol error: {}", err),
            Self::UnmatchedRequestId(id) => {
                write!(f, "no pending request for received file: RequestID={}", id)
            }
            Self::TransportNotOpen => write!(f, "connection is not open"),
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::InvalidCommand(msg) => write!(f, "invalid command: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err)
    }
}
