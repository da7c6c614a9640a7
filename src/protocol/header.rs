//! Envelope header
//!
//! Fixed 90-byte preamble written in front of every request and response
//! body. All integers are big-endian.
//!
//! ```text
//! ┌────────┬─────────┬──────────┬────────────┬───────────────┐
//! │ Id (4) │ Ver (2) │ Magic(4) │Reserved (4)│ Provider (28) │
//! ├────────┴─────┬───┴──────────┴──┬─────────┴───────┬───────┘
//! │ Encrypt (4)  │   Token (32)    │ BodyLength (4)  │
//! ├──────────────┴─────────────────┴─────────────────┘
//! │ Packager (8) │
//! └──────────────┘
//! ```
//!
//! The codec only moves bytes. Magic number and body length checks belong
//! to the caller.

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, YarError};

/// Constant that opens every valid envelope
pub const MAGIC_NUMBER: u32 = 0x80DF_EC60;

/// Length of the header fields preceding the packager name
pub const PROTOCOL_LENGTH: usize = 82;

/// Length of the packager name field
pub const PACKAGER_LENGTH: usize = 8;

/// Total header size on the wire
pub const HEADER_SIZE: usize = PROTOCOL_LENGTH + PACKAGER_LENGTH;

/// Length of the provider field
pub const PROVIDER_LENGTH: usize = 28;

/// Length of the token field
pub const TOKEN_LENGTH: usize = 32;

const _: () = assert!(HEADER_SIZE == 90);

/// Fixed-layout envelope header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Request correlation identifier
    pub id: u32,

    /// Protocol version tag (carried, never interpreted)
    pub version: u16,

    /// Must equal [`MAGIC_NUMBER`]
    pub magic_number: u32,

    /// Always written as zero
    pub reserved: u32,

    /// Implementation identifier, NUL padded ASCII
    pub provider: [u8; PROVIDER_LENGTH],

    /// Reserved encryption flag, copied through
    pub encrypt: u32,

    /// Reserved auth token, copied through
    pub token: [u8; TOKEN_LENGTH],

    /// Encoded body length plus [`PACKAGER_LENGTH`]
    pub body_length: u32,

    /// Codec name, NUL padded ASCII
    pub packager: [u8; PACKAGER_LENGTH],
}

impl Header {
    /// Create an empty header carrying the magic number
    pub fn new() -> Self {
        Self {
            id: 0,
            version: 0,
            magic_number: MAGIC_NUMBER,
            reserved: 0,
            provider: [0u8; PROVIDER_LENGTH],
            encrypt: 0,
            token: [0u8; TOKEN_LENGTH],
            body_length: 0,
            packager: [0u8; PACKAGER_LENGTH],
        }
    }

    // =========================================================================
    // Field helpers
    // =========================================================================

    /// Set the provider string (truncated to 28 bytes)
    pub fn set_provider(&mut self, provider: &str) {
        self.provider = fixed_field(provider.as_bytes());
    }

    /// Provider string with padding removed
    pub fn provider(&self) -> String {
        trimmed_ascii(&self.provider)
    }

    /// Set the token bytes (truncated to 32 bytes)
    pub fn set_token(&mut self, token: &[u8]) {
        self.token = fixed_field(token);
    }

    /// Packager name with padding removed
    pub fn packager_name(&self) -> String {
        trimmed_ascii(&self.packager)
    }

    /// Whether the magic number matches [`MAGIC_NUMBER`]
    pub fn has_valid_magic(&self) -> bool {
        self.magic_number == MAGIC_NUMBER
    }

    /// Reset every field to the state returned by [`Header::new`]
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // =========================================================================
    // Encoding/Decoding
    // =========================================================================

    /// Append the header to a buffer
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u32(self.id);
        buf.put_u16(self.version);
        buf.put_u32(self.magic_number);
        buf.put_u32(0);
        buf.put_slice(&self.provider);
        buf.put_u32(self.encrypt);
        buf.put_slice(&self.token);
        buf.put_u32(self.body_length);
        buf.put_slice(&self.packager);
    }

    /// Encode into a freshly allocated array
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE);
        self.encode(&mut buf);

        let mut out = [0u8; HEADER_SIZE];
        out.copy_from_slice(&buf);
        out
    }

    /// Decode a header from the front of a buffer
    ///
    /// Consumes exactly [`HEADER_SIZE`] bytes. Fewer available bytes is a
    /// framing error and nothing is consumed.
    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        if buf.remaining() < HEADER_SIZE {
            return Err(YarError::Framing(format!(
                "Incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                buf.remaining()
            )));
        }

        let id = buf.get_u32();
        let version = buf.get_u16();
        let magic_number = buf.get_u32();
        let reserved = buf.get_u32();
        let mut provider = [0u8; PROVIDER_LENGTH];
        buf.copy_to_slice(&mut provider);
        let encrypt = buf.get_u32();
        let mut token = [0u8; TOKEN_LENGTH];
        buf.copy_to_slice(&mut token);
        let body_length = buf.get_u32();
        let mut packager = [0u8; PACKAGER_LENGTH];
        buf.copy_to_slice(&mut packager);

        Ok(Self {
            id,
            version,
            magic_number,
            reserved,
            provider,
            encrypt,
            token,
            body_length,
            packager,
        })
    }

    /// Write the header to a stream
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Read exactly one header from a stream
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut raw = [0u8; HEADER_SIZE];
        reader.read_exact(&mut raw).map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => YarError::Framing(format!(
                "Incomplete header: stream ended before {} bytes",
                HEADER_SIZE
            )),
            _ => YarError::Io(e),
        })?;
        Self::decode(&mut &raw[..])
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy `src` into a NUL padded fixed-size field, truncating if needed
pub(crate) fn fixed_field<const N: usize>(src: &[u8]) -> [u8; N] {
    let mut field = [0u8; N];
    let len = src.len().min(N);
    field[..len].copy_from_slice(&src[..len]);
    field
}

fn trimmed_ascii(field: &[u8]) -> String {
    String::from_utf8_lossy(field)
        .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}
