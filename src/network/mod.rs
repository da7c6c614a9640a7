//! Network Module
//!
//! Byte-stream transports used by the client.
//!
//! ## Architecture
//! - [`Transport`] is the only seam the call lifecycle depends on:
//!   hand over a framed request, get the raw response stream back
//! - [`HttpTransport`] posts the request over HTTP(S)
//! - Retries, pooling and cancellation belong to the transport, never to
//!   the lifecycle

mod http;

use std::fmt;
use std::io::Read;

use bytes::Bytes;

use crate::error::{Result, YarError};

pub use http::HttpTransport;

/// Sends one framed request and returns the peer's response stream
///
/// `body` may share its allocation with the client's framing buffer pool;
/// the buffer is reused once the transport drops it.
pub trait Transport: Send + Sync {
    fn send(&self, body: Bytes, content_type: &str) -> Result<Box<dyn Read + Send>>;
}

impl<F> Transport for F
where
    F: Fn(Bytes, &str) -> Result<Box<dyn Read + Send>> + Send + Sync,
{
    fn send(&self, body: Bytes, content_type: &str) -> Result<Box<dyn Read + Send>> {
        self(body, content_type)
    }
}

/// Network kind selected by the address scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetKind {
    Http,
    Https,
    Tcp,
    Udp,
    Unix,
}

impl NetKind {
    /// Parse the scheme of `addr` (`http://host/path`, `tcp://host:port`, ...)
    pub fn from_addr(addr: &str) -> Result<Self> {
        let (scheme, rest) = addr
            .split_once("://")
            .ok_or_else(|| YarError::Param(format!("address without scheme: {:?}", addr)))?;

        if rest.is_empty() {
            return Err(YarError::Param(format!("address without host: {:?}", addr)));
        }

        match scheme.to_ascii_lowercase().as_str() {
            "http" => Ok(NetKind::Http),
            "https" => Ok(NetKind::Https),
            "tcp" => Ok(NetKind::Tcp),
            "udp" => Ok(NetKind::Udp),
            "unix" => Ok(NetKind::Unix),
            other => Err(YarError::Param(format!("unsupported scheme: {:?}", other))),
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self, NetKind::Http | NetKind::Https)
    }
}

impl fmt::Display for NetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetKind::Http => "http",
            NetKind::Https => "https",
            NetKind::Tcp => "tcp",
            NetKind::Udp => "udp",
            NetKind::Unix => "unix",
        };
        f.write_str(name)
    }
}
