//! Typed access to a message's JSON object.

use serde_json::{Map, Value};

use crate::codec;
use crate::error::{ProtocolError, ProtocolResult};

/// Key carried by every body, equal to the envelope's type key.
pub const MESSAGE_TYPE_FIELD: &str = "_messageType";

/// A message body as it travels on the wire.
///
/// Keys keep their insertion order, so the first field written is the
/// first field serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body(Map<String, Value>);

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a body with `_messageType` already set.
    pub fn with_type(type_key: &str) -> Self {
        let mut body = Self::new();
        body.put_str(MESSAGE_TYPE_FIELD, type_key);
        body
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn message_type(&self) -> ProtocolResult<&str> {
        self.str(MESSAGE_TYPE_FIELD)
    }

    pub fn put_str(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), Value::from(value));
    }

    pub fn put_i32(&mut self, name: &str, value: i32) {
        self.0.insert(name.to_string(), Value::from(value));
    }

    /// Non-finite values are written as `null` and make the body
    /// unsendable; see [`unrepresentable_field`](Self::unrepresentable_field).
    pub fn put_f32(&mut self, name: &str, value: f32) {
        self.0.insert(name.to_string(), Value::from(f64::from(value)));
    }

    pub fn put_bool(&mut self, name: &str, value: bool) {
        self.0.insert(name.to_string(), Value::from(value));
    }

    pub fn put_list(&mut self, name: &str, values: &[String]) {
        let items = values.iter().map(|v| Value::from(v.as_str())).collect();
        self.0.insert(name.to_string(), Value::Array(items));
    }

    /// Stores `data` as a base64 string.
    pub fn put_bytes(&mut self, name: &str, data: &[u8]) {
        self.put_str(name, &codec::encode_base64(data));
    }

    /// First field that holds no JSON value, i.e. a non-finite float.
    pub fn unrepresentable_field(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, value)| value.is_null())
            .map(|(name, _)| name.as_str())
    }

    fn field(&self, name: &'static str) -> ProtocolResult<&Value> {
        self.0.get(name).ok_or_else(|| ProtocolError::missing(name))
    }

    pub fn str(&self, name: &'static str) -> ProtocolResult<&str> {
        self.field(name)?
            .as_str()
            .ok_or_else(|| ProtocolError::mismatch(name, "string"))
    }

    pub fn string(&self, name: &'static str) -> ProtocolResult<String> {
        self.str(name).map(str::to_string)
    }

    /// Reads any JSON number, truncated toward zero.
    pub fn i32(&self, name: &'static str) -> ProtocolResult<i32> {
        let mismatch = || ProtocolError::mismatch(name, "32-bit integer");
        let Value::Number(number) = self.field(name)? else {
            return Err(mismatch());
        };
        if let Some(whole) = number.as_i64() {
            return i32::try_from(whole).map_err(|_| mismatch());
        }
        let float = number.as_f64().ok_or_else(mismatch)?.trunc();
        if float >= f64::from(i32::MIN) && float <= f64::from(i32::MAX) {
            Ok(float as i32)
        } else {
            Err(mismatch())
        }
    }

    pub fn f32(&self, name: &'static str) -> ProtocolResult<f32> {
        self.field(name)?
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| ProtocolError::mismatch(name, "number"))
    }

    pub fn bool(&self, name: &'static str) -> ProtocolResult<bool> {
        self.field(name)?
            .as_bool()
            .ok_or_else(|| ProtocolError::mismatch(name, "bool"))
    }

    /// Reads an array whose every element is a string.
    pub fn list(&self, name: &'static str) -> ProtocolResult<Vec<String>> {
        let mismatch = || ProtocolError::mismatch(name, "array of strings");
        self.field(name)?
            .as_array()
            .ok_or_else(mismatch)?
            .iter()
            .map(|s| s.as_str().map(str::to_string).ok_or_else(mismatch))
            .collect()
    }

    pub fn bytes(&self, name: &'static str) -> ProtocolResult<Vec<u8>> {
        codec::decode_base64(self.str(name)?)
            .map_err(|source| ProtocolError::InvalidBase64 { name, source })
    }
}

impl From<Map<String, Value>> for Body {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
