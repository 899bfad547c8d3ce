//! The `<type-key>,<flag>,<base64>` text frame.

use serde_json::Value;
use tracing::{debug, trace};

use crate::DEFAULT_MAX_DECOMPRESSED_SIZE;
use crate::body::Body;
use crate::codec;
use crate::error::{ProtocolError, ProtocolResult};
use crate::registry::{Message, Registry};

/// Flag marking a gzip-compressed payload.
pub const FLAG_COMPRESSED: char = 'c';
/// Flag marking a payload sent as-is.
pub const FLAG_UNCOMPRESSED: char = '-';

/// A parsed text frame. `payload` holds the bytes after base64 decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub type_key: String,
    pub compressed: bool,
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Splits a text frame into its parts.
    ///
    /// The character after the first comma is the flag; the payload
    /// starts two characters later. Any flag other than `c` is read as
    /// uncompressed.
    pub fn parse(text: &str) -> ProtocolResult<Self> {
        let (type_key, rest) = text
            .split_once(',')
            .ok_or_else(|| ProtocolError::malformed("no comma after type key"))?;
        if type_key.is_empty() {
            return Err(ProtocolError::malformed("empty type key"));
        }

        let mut chars = rest.chars();
        let flag = chars
            .next()
            .ok_or_else(|| ProtocolError::malformed("nothing after type key"))?;
        chars.next();
        let invalid = |source| ProtocolError::InvalidPayload {
            type_key: type_key.to_string(),
            source,
        };
        let payload = codec::decode_base64(chars.as_str()).map_err(invalid)?;

        Ok(Self {
            type_key: type_key.to_string(),
            compressed: flag == FLAG_COMPRESSED,
            payload,
        })
    }

    /// Renders the frame. An empty payload drops the flag section.
    pub fn to_text(&self) -> String {
        if self.payload.is_empty() {
            return format!("{},", self.type_key);
        }
        let flag = if self.compressed {
            FLAG_COMPRESSED
        } else {
            FLAG_UNCOMPRESSED
        };
        let payload = codec::encode_base64(&self.payload);
        format!("{},{},{}", self.type_key, flag, payload)
    }
}

/// Encoder/decoder for whole messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageCodec {
    compression: bool,
    max_decompressed_size: usize,
    registry: Registry,
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self {
            compression: true,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
            registry: Registry::Client,
        }
    }
}

impl MessageCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn outgoing compression on or off.
    #[must_use]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compression = enabled;
        self
    }

    /// Cap on the inflated size of an incoming payload.
    #[must_use]
    pub fn with_max_decompressed_size(mut self, limit: usize) -> Self {
        self.max_decompressed_size = limit;
        self
    }

    /// Type keys this codec will decode.
    #[must_use]
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> Registry {
        self.registry
    }

    /// Serializes `body` and frames it under `type_key`.
    ///
    /// The payload is compressed only when that makes it strictly
    /// smaller. A body holding a non-finite float is refused, since JSON
    /// cannot carry it.
    pub fn seal(&self, type_key: &str, body: &Body) -> ProtocolResult<Envelope> {
        if let Some(name) = body.unrepresentable_field() {
            return Err(ProtocolError::NonFiniteFloat {
                type_key: type_key.to_string(),
                name: name.to_string(),
            });
        }
        if body.is_empty() {
            return Ok(Envelope {
                type_key: type_key.to_string(),
                compressed: false,
                payload: Vec::new(),
            });
        }

        let json = serde_json::to_vec(body.as_map())?;
        if self.compression {
            let packed = codec::compress(&json).map_err(ProtocolError::Compression)?;
            trace!(
                type_key,
                plain = json.len(),
                packed = packed.len(),
                "compressed body"
            );
            if packed.len() < json.len() {
                return Ok(Envelope {
                    type_key: type_key.to_string(),
                    compressed: true,
                    payload: packed,
                });
            }
        }
        Ok(Envelope {
            type_key: type_key.to_string(),
            compressed: false,
            payload: json,
        })
    }

    /// Recovers the JSON object carried by `envelope`.
    pub fn open(&self, envelope: &Envelope) -> ProtocolResult<Body> {
        let type_key = envelope.type_key.as_str();
        let failed = |source| ProtocolError::DecompressionFailed {
            type_key: type_key.to_string(),
            source,
        };
        let inflated;
        let json = if envelope.compressed {
            inflated = codec::decompress(&envelope.payload, self.max_decompressed_size)
                .map_err(failed)?;
            inflated.as_slice()
        } else {
            envelope.payload.as_slice()
        };

        match serde_json::from_slice::<Value>(json) {
            Ok(Value::Object(map)) => Ok(Body::from(map)),
            Ok(_) => Err(ProtocolError::NotAnObject {
                type_key: type_key.to_string(),
            }),
            Err(source) => Err(ProtocolError::InvalidJson {
                type_key: type_key.to_string(),
                source,
            }),
        }
    }

    pub fn encode(&self, message: &Message) -> ProtocolResult<String> {
        let envelope = self.seal(message.type_key(), &message.to_body())?;
        debug!(
            type_key = %envelope.type_key,
            compressed = envelope.compressed,
            bytes = envelope.payload.len(),
            "encoded message"
        );
        Ok(envelope.to_text())
    }

    /// Decodes one text frame into a message this codec's registry
    /// accepts.
    pub fn decode(&self, text: &str) -> ProtocolResult<Message> {
        let envelope = Envelope::parse(text)?;
        let kind = self.registry.resolve(&envelope.type_key)?;
        let body = self.open(&envelope)?;
        debug!(
            type_key = %envelope.type_key,
            compressed = envelope.compressed,
            fields = body.len(),
            "decoded message"
        );
        Message::from_body(kind, &body)
    }
}
