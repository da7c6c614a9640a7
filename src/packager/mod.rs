//! Packager Module
//!
//! Named encode/decode strategies for envelope bodies.
//!
//! ## Registry
//! The 8-byte packager field of the header names the codec. Names are
//! trimmed of NUL/space padding and compared case-insensitively against an
//! explicit table; anything else is rejected.
//!
//! | Wire name | Strategy          | MIME type             |
//! |-----------|-------------------|-----------------------|
//! | `JSON`    | [`JsonCodec`]     | `application/json`    |
//! | `MSGPACK` | [`MsgPackCodec`]  | `application/msgpack` |

mod json;
mod msgpack;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, YarError};
use crate::protocol::{fixed_field, PACKAGER_LENGTH};

pub use json::JsonCodec;
pub use msgpack::MsgPackCodec;

/// Body codec selected by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Packager {
    #[default]
    Json,
    MsgPack,
}

impl Packager {
    /// Every registered packager
    pub const ALL: [Packager; 2] = [Packager::Json, Packager::MsgPack];

    /// Canonical wire name
    pub fn name(&self) -> &'static str {
        match self {
            Packager::Json => "JSON",
            Packager::MsgPack => "MSGPACK",
        }
    }

    /// Wire name as the NUL padded header field
    pub fn wire_name(&self) -> [u8; PACKAGER_LENGTH] {
        fixed_field(self.name().as_bytes())
    }

    /// MIME type used as the HTTP content type
    pub fn mime_type(&self) -> &'static str {
        match self {
            Packager::Json => "application/json",
            Packager::MsgPack => "application/msgpack",
        }
    }

    /// Look up a packager by name
    pub fn from_name(name: &str) -> Result<Self> {
        let trimmed = name.trim_matches(|c: char| c == '\0' || c.is_whitespace());

        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| YarError::Packager(format!("unsupported packager: {:?}", trimmed)))
    }

    /// Look up a packager from a raw header field
    pub fn from_wire(field: &[u8]) -> Result<Self> {
        Self::from_name(&String::from_utf8_lossy(field))
    }

    /// Encode a value
    pub fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        match self {
            Packager::Json => JsonCodec::encode(value),
            Packager::MsgPack => MsgPackCodec::encode(value),
        }
    }

    /// Decode a value
    pub fn unmarshal<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        match self {
            Packager::Json => JsonCodec::decode(bytes),
            Packager::MsgPack => MsgPackCodec::decode(bytes),
        }
    }
}

impl fmt::Display for Packager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Packager {
    type Err = YarError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}
