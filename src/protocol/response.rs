//! Response definitions
//!
//! Inbound call result. Serialized by the active packager as
//! `{"i": id, "s": status, "e": error, "o": output, "r": return value}`.
//!
//! The `o` and `r` sub-values are kept as encoded bytes in the packager's
//! own format and only decoded into a concrete type on request.

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{Result, YarError};
use crate::packager::{JsonCodec, MsgPackCodec, Packager};

use super::Header;

// =============================================================================
// Status
// =============================================================================

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum Status {
    #[default]
    Okey,
    Packager,
    Protocol,
    Request,
    Output,
    Transport,
    Forbidden,
    Exception,
    EmptyResponse,
    /// Code outside the known table, kept verbatim
    Other(u32),
}

impl Status {
    /// Numeric wire code
    pub fn code(&self) -> u32 {
        match self {
            Status::Okey => 0x0,
            Status::Packager => 0x1,
            Status::Protocol => 0x2,
            Status::Request => 0x4,
            Status::Output => 0x8,
            Status::Transport => 0x10,
            Status::Forbidden => 0x20,
            Status::Exception => 0x40,
            Status::EmptyResponse => 0x80,
            Status::Other(code) => *code,
        }
    }

    pub fn is_ok(&self) -> bool {
        *self == Status::Okey
    }
}

impl From<u32> for Status {
    fn from(code: u32) -> Self {
        match code {
            0x0 => Status::Okey,
            0x1 => Status::Packager,
            0x2 => Status::Protocol,
            0x4 => Status::Request,
            0x8 => Status::Output,
            0x10 => Status::Transport,
            0x20 => Status::Forbidden,
            0x40 => Status::Exception,
            0x80 => Status::EmptyResponse,
            other => Status::Other(other),
        }
    }
}

impl From<Status> for u32 {
    fn from(status: Status) -> Self {
        status.code()
    }
}

// =============================================================================
// Exception
// =============================================================================

/// Error reported by the peer
///
/// Accepted on the wire either as a bare string (message only) or as an
/// object with `message`, `code`, `file`, `line` and `_type`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Exception {
    pub message: String,
    pub code: i64,
    pub file: String,
    pub line: i64,
    #[serde(rename = "_type")]
    pub kind: String,
}

impl Exception {
    /// Exception carrying only a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

// Hand-written so numeric fields are read straight from the input; buffering
// through an untagged enum would hand them over as serde_json's
// arbitrary-precision number maps.
impl<'de> Deserialize<'de> for Exception {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ExceptionVisitor)
    }
}

struct ExceptionVisitor;

impl<'de> Visitor<'de> for ExceptionVisitor {
    type Value = Exception;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an exception message or an exception object")
    }

    fn visit_str<E: de::Error>(self, message: &str) -> std::result::Result<Exception, E> {
        Ok(Exception::new(message))
    }

    fn visit_string<E: de::Error>(self, message: String) -> std::result::Result<Exception, E> {
        Ok(Exception::new(message))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Exception, A::Error> {
        let mut exception = Exception::default();

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "message" => exception.message = map.next_value::<Option<String>>()?.unwrap_or_default(),
                "code" => exception.code = map.next_value::<Option<i64>>()?.unwrap_or_default(),
                "file" => exception.file = map.next_value::<Option<String>>()?.unwrap_or_default(),
                "line" => exception.line = map.next_value::<Option<i64>>()?.unwrap_or_default(),
                "_type" => exception.kind = map.next_value::<Option<String>>()?.unwrap_or_default(),
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(exception)
    }
}

// =============================================================================
// Response
// =============================================================================

/// A decoded response envelope
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Response {
    /// Header the response arrived with
    pub header: Header,

    /// Correlation id echoed by the peer
    pub id: u32,

    /// Status code
    pub status: Status,

    /// Populated only when `status` is not OK
    pub error: Option<Exception>,

    /// Captured side-channel output, encoded
    pub out: Option<Vec<u8>>,

    /// Return value, encoded
    pub response: Option<Vec<u8>>,
}

/// Body layout shared by both packagers; `V` is the codec's raw value type
#[derive(Serialize, Deserialize)]
struct WireResponse<V> {
    #[serde(rename = "i", default)]
    id: u32,

    #[serde(rename = "s", default)]
    status: Status,

    #[serde(rename = "e", default, skip_serializing_if = "Option::is_none")]
    error: Option<Exception>,

    #[serde(rename = "o", skip_serializing_if = "Option::is_none")]
    out: Option<V>,

    #[serde(rename = "r")]
    response: Option<V>,
}

impl Response {
    /// Create an empty OK response
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an OK response carrying an encoded return value
    pub fn ok(id: u32, response: Option<Vec<u8>>) -> Self {
        Self {
            id,
            response,
            ..Self::default()
        }
    }

    /// Create an OK response, encoding `value` with `packager`
    pub fn with_result<T: Serialize + ?Sized>(id: u32, packager: Packager, value: &T) -> Result<Self> {
        Ok(Self::ok(id, Some(packager.marshal(value)?)))
    }

    /// Create a failed response carrying only a message
    pub fn exception(message: &str) -> Self {
        let mut response = Self::default();
        response.fail(message);
        response
    }

    /// Mark this response as failed with `ERR_OUTPUT` and `message`
    pub fn fail(&mut self, message: &str) {
        self.status = Status::Output;
        self.error = Some(Exception::new(message));
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Message of the attached exception, or an empty string
    pub fn error_message(&self) -> &str {
        self.error.as_ref().map(|e| e.message.as_str()).unwrap_or("")
    }

    /// Decode the return value into `T`
    ///
    /// A missing return value decodes as the packager's null, so `()` and
    /// `Option<_>` targets succeed while others fail.
    pub fn result<T: serde::de::DeserializeOwned>(&self, packager: Packager) -> Result<T> {
        let decoded = match &self.response {
            Some(bytes) => packager.unmarshal(bytes),
            None => packager.unmarshal(null_value(packager)),
        };

        decoded.map_err(|e| {
            YarError::Packager(format!("pack response ret val error: {}", e.message()))
        })
    }

    // =========================================================================
    // Body Encoding/Decoding
    // =========================================================================

    /// Encode the response body (header excluded)
    pub fn pack(&self, packager: Packager) -> Result<Vec<u8>> {
        match packager {
            Packager::Json => {
                let wire = WireResponse {
                    id: self.id,
                    status: self.status,
                    error: self.error.clone(),
                    out: self.out.as_deref().map(json_raw).transpose()?,
                    response: self.response.as_deref().map(json_raw).transpose()?,
                };
                JsonCodec::encode(&wire)
            }
            Packager::MsgPack => {
                let wire = WireResponse {
                    id: self.id,
                    status: self.status,
                    error: self.error.clone(),
                    out: self.out.as_deref().map(msgpack_value).transpose()?,
                    response: self.response.as_deref().map(msgpack_value).transpose()?,
                };
                MsgPackCodec::encode(&wire)
            }
        }
    }

    /// Decode a response body (header excluded)
    pub fn unpack(packager: Packager, bytes: &[u8]) -> Result<Self> {
        match packager {
            Packager::Json => {
                let wire: WireResponse<Box<RawValue>> = JsonCodec::decode(bytes)?;
                Ok(Self {
                    header: Header::new(),
                    id: wire.id,
                    status: wire.status,
                    error: wire.error,
                    out: wire.out.map(|raw| raw.get().as_bytes().to_vec()),
                    response: wire.response.map(|raw| raw.get().as_bytes().to_vec()),
                })
            }
            Packager::MsgPack => {
                let wire: WireResponse<rmpv::Value> = MsgPackCodec::decode(bytes)?;
                Ok(Self {
                    header: Header::new(),
                    id: wire.id,
                    status: wire.status,
                    error: wire.error,
                    out: wire.out.as_ref().map(msgpack_bytes).transpose()?,
                    response: wire.response.as_ref().map(msgpack_bytes).transpose()?,
                })
            }
        }
    }
}

fn null_value(packager: Packager) -> &'static [u8] {
    match packager {
        Packager::Json => b"null",
        Packager::MsgPack => &[0xc0],
    }
}

fn json_raw(bytes: &[u8]) -> Result<Box<RawValue>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| YarError::Packager(format!("raw JSON value is not UTF-8: {}", e)))?;
    Ok(RawValue::from_string(text.to_string())?)
}

fn msgpack_value(mut bytes: &[u8]) -> Result<rmpv::Value> {
    rmpv::decode::read_value(&mut bytes)
        .map_err(|e| YarError::Packager(format!("raw MsgPack value: {}", e)))
}

fn msgpack_bytes(value: &rmpv::Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, value)
        .map_err(|e| YarError::Packager(format!("raw MsgPack value: {}", e)))?;
    Ok(buf)
}
