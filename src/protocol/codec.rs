//! Envelope codec
//!
//! Framing and unframing of complete envelopes.
//!
//! ## Wire Format
//! ```text
//! ┌──────────────────────┬───────────────┬──────────────────────────────┐
//! │ Header fields (82)   │ Packager (8)  │ Body (body_length - 8)       │
//! └──────────────────────┴───────────────┴──────────────────────────────┘
//! ```
//!
//! `body_length` counts the packager field as well as the body, so a reader
//! subtracts [`PACKAGER_LENGTH`] before slicing the body.

use std::io::{Read, Write};

use bytes::BufMut;

use crate::error::{Result, YarError};

use super::header::{Header, HEADER_SIZE, PACKAGER_LENGTH};

/// Maximum declared body size accepted from a peer (64 MB)
pub const MAX_BODY_SIZE: u32 = 64 * 1024 * 1024;

// =============================================================================
// Length Arithmetic
// =============================================================================

/// `body_length` value for a body of `encoded_len` bytes
pub fn framed_body_length(encoded_len: usize) -> Result<u32> {
    encoded_len
        .checked_add(PACKAGER_LENGTH)
        .and_then(|len| u32::try_from(len).ok())
        .ok_or_else(|| {
            YarError::Request(format!("Body too large to frame: {} bytes", encoded_len))
        })
}

/// Number of body bytes announced by a header
///
/// Fails when the declared length cannot even cover the packager field.
pub fn declared_body_len(header: &Header) -> Result<usize> {
    let body_length = header.body_length as usize;
    if body_length < PACKAGER_LENGTH {
        return Err(YarError::Response(format!(
            "Response Content Error: body length {} shorter than packager field",
            header.body_length
        )));
    }
    if header.body_length > MAX_BODY_SIZE {
        return Err(YarError::Response(format!(
            "Response Content Error: body length {} exceeds maximum {}",
            header.body_length, MAX_BODY_SIZE
        )));
    }
    Ok(body_length - PACKAGER_LENGTH)
}

// =============================================================================
// Envelope Encoding/Decoding
// =============================================================================

/// Frame `body` behind `header` into `buf`
///
/// Sets `header.body_length` before the header is written.
pub fn frame_into(header: &mut Header, body: &[u8], buf: &mut impl BufMut) -> Result<()> {
    header.body_length = framed_body_length(body.len())?;
    header.encode(buf);
    buf.put_slice(body);
    Ok(())
}

/// Frame `body` behind `header` into a new buffer
pub fn encode_envelope(header: &mut Header, body: &[u8]) -> Result<Vec<u8>> {
    let mut message = Vec::with_capacity(HEADER_SIZE + body.len());
    frame_into(header, body, &mut message)?;
    Ok(message)
}

/// Split a complete envelope into its header and body
///
/// Checks, in order: the buffer holds a full header, the magic number
/// matches, and the declared body is fully present. Bytes past the declared
/// body are ignored.
pub fn decode_envelope(bytes: &[u8]) -> Result<(Header, &[u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(YarError::Response(format!(
            "Response Parse Error: expected at least {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let header = Header::decode(&mut &bytes[..HEADER_SIZE])?;
    check_magic(&header)?;

    let body_len = declared_body_len(&header)?;
    let available = bytes.len() - HEADER_SIZE;
    if available < body_len {
        return Err(YarError::Response(format!(
            "Response Content Error: expected {} body bytes, got {}",
            body_len, available
        )));
    }

    Ok((header, &bytes[HEADER_SIZE..HEADER_SIZE + body_len]))
}

fn check_magic(header: &Header) -> Result<()> {
    if !header.has_valid_magic() {
        return Err(YarError::Response(format!(
            "Response Magic Error: expected 0x{:08X}, got 0x{:08X}",
            super::header::MAGIC_NUMBER,
            header.magic_number
        )));
    }
    Ok(())
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a framed envelope to a stream
pub fn write_envelope<W: Write>(writer: &mut W, header: &mut Header, body: &[u8]) -> Result<()> {
    let bytes = encode_envelope(header, body)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read exactly one envelope from a stream
///
/// Reads the fixed header first, then exactly the declared body.
pub fn read_envelope<R: Read>(reader: &mut R) -> Result<(Header, Vec<u8>)> {
    let header = Header::read_from(reader).map_err(|e| match e {
        YarError::Framing(msg) => YarError::Response(format!("Response Parse Error: {}", msg)),
        other => other,
    })?;
    check_magic(&header)?;

    let body_len = declared_body_len(&header)?;
    let mut body = vec![0u8; body_len];
    if body_len > 0 {
        reader.read_exact(&mut body).map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => YarError::Response(format!(
                "Response Content Error: stream ended before {} body bytes",
                body_len
            )),
            _ => YarError::Io(e),
        })?;
    }

    Ok((header, body))
}
