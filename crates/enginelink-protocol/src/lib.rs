//! Wire protocol spoken between the inspection client and an engine.
//!
//! # Frames
//!
//! Every message travels as one WebSocket text frame:
//!
//! ```text
//! <type-key>,<flag>,<base64 payload>
//! ```
//!
//! - `type-key` names the variant, e.g. `SocketLogMessage`
//! - `flag` is `c` when the payload is gzip-compressed, `-` otherwise
//! - the payload is the variant's JSON body, whose first key is always
//!   `_messageType`
//!
//! A message with an empty body is framed as `<type-key>,`.
//!
//! # Example
//!
//! ```rust
//! use enginelink_protocol::{LogMessage, LogType, Message, decode_message, encode_message};
//!
//! let log = LogMessage {
//!     log_type: LogType::Warning,
//!     time: "12:00:00".into(),
//!     text: "low memory".into(),
//!     stack_trace: String::new(),
//! };
//! let text = encode_message(&Message::Log(log.clone())).unwrap();
//! assert_eq!(decode_message(&text).unwrap(), Message::Log(log));
//! ```

pub mod body;
pub mod codec;
mod envelope;
mod error;
mod message;
mod registry;
mod request_id;
mod types;

pub use body::Body;
pub use envelope::{Envelope, FLAG_COMPRESSED, FLAG_UNCOMPRESSED, MessageCodec};
pub use error::{DecompressError, ProtocolError, ProtocolResult};
pub use message::{
    ConnectGameObjectRequest, ConnectionInformation, FileList, FileListRequest, FileMessage,
    FileUploadRequest, ImageData, LogMessage, MoveGameObject, RequestHeader, RequestMessage,
    ScreenShot, ScreenShotRequest, SocketMessage, TextMessage, UNSOLICITED_REQUEST_ID,
};
pub use registry::{Message, MessageKind, Registry};
pub use request_id::RequestIds;
pub use types::{DirectoryType, LogType};

/// Default cap on the inflated size of one payload (64 MiB).
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: usize = 64 * 1024 * 1024;

/// Encodes `message` with the default codec.
pub fn encode_message(message: &Message) -> ProtocolResult<String> {
    MessageCodec::default().encode(message)
}

/// Decodes a frame the client accepts, using the default codec.
pub fn decode_message(text: &str) -> ProtocolResult<Message> {
    MessageCodec::default().decode(text)
}
