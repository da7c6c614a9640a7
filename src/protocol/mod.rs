//! Protocol Module
//!
//! Defines the YAR envelope exchanged between client and server.
//!
//! ## Envelope Format
//! ```text
//! ┌────────────────────────────┬────────────────────────────────────────┐
//! │       Header (90)          │    Body (packager encoded)             │
//! └────────────────────────────┴────────────────────────────────────────┘
//! ```
//!
//! Requests and responses share the header layout. The body is a map
//! encoded by the packager named in the header:
//! - Request:  `i` (id), `m` (method), `p` (params)
//! - Response: `i` (id), `s` (status), `e` (error), `o` (output), `r` (result)
//!
//! ### Status Codes
//! - 0x00: OKEY
//! - 0x01: PACKAGER
//! - 0x02: PROTOCOL
//! - 0x04: REQUEST
//! - 0x08: OUTPUT
//! - 0x10: TRANSPORT
//! - 0x20: FORBIDDEN
//! - 0x40: EXCEPTION
//! - 0x80: EMPTY_RESPONSE

mod header;
mod request;
mod response;
mod codec;

pub use header::{
    Header, HEADER_SIZE, MAGIC_NUMBER, PACKAGER_LENGTH, PROTOCOL_LENGTH, PROVIDER_LENGTH,
    TOKEN_LENGTH,
};
pub(crate) use header::fixed_field;
pub use request::Request;
pub use response::{Exception, Response, Status};
pub use codec::{
    declared_body_len, decode_envelope, encode_envelope, frame_into, framed_body_length,
    read_envelope, write_envelope, MAX_BODY_SIZE,
};
