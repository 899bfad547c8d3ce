//! Client side of the engine inspection link.
//!
//! A [`Session`] drives one engine connection over a [`Transport`]; the
//! `enginelink` binary runs several of them from an interactive console.

pub mod cli;
pub mod commands;
pub mod config;
pub mod console;
pub mod correlation;
pub mod error;
pub mod files;
pub mod identity;
pub mod session;
pub mod transport;
pub mod websocket;

pub use cli::Cli;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use files::{FileStore, LocalFileStore};
pub use session::{MoveDirection, Session, SessionEvent};
pub use transport::{ConnectionState, Transport, TransportEvent};
pub use websocket::WebSocketTransport;
