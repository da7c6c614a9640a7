//! Error types for yar-client
//!
//! Every phase of a call reports failure through [`YarError`]. The variant
//! tells the caller which phase failed; [`YarError::kind`] exposes the same
//! information as a `Copy` value for matching.

use thiserror::Error;

/// Result type alias using YarError
pub type Result<T> = std::result::Result<T, YarError>;

/// Unified error type for yar-client operations
#[derive(Debug, Error)]
pub enum YarError {
    // -------------------------------------------------------------------------
    // Caller / Configuration Errors
    // -------------------------------------------------------------------------
    /// Invalid caller input (empty method, unparsable address)
    #[error("param error: {0}")]
    Param(String),

    /// Unsupported client configuration (non-HTTP net scheme)
    #[error("config error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    /// Packager lookup, marshal or unmarshal failure
    #[error("packager error: {0}")]
    Packager(String),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    /// Connection refused, timeout, TLS failure
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be built or the peer rejected it at the
    /// transport level
    #[error("request error: {0}")]
    Request(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// Response framing/length validation failure, or a non-OK status
    /// returned by the peer
    #[error("response error: {0}")]
    Response(String),

    /// Fixed-layout header could not be read
    #[error("framing error: {0}")]
    Framing(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Discriminant of [`YarError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Param,
    Config,
    Packager,
    Network,
    Request,
    Response,
    Framing,
    Io,
}

impl YarError {
    /// Which phase produced this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            YarError::Param(_) => ErrorKind::Param,
            YarError::Config(_) => ErrorKind::Config,
            YarError::Packager(_) => ErrorKind::Packager,
            YarError::Network(_) => ErrorKind::Network,
            YarError::Request(_) => ErrorKind::Request,
            YarError::Response(_) => ErrorKind::Response,
            YarError::Framing(_) => ErrorKind::Framing,
            YarError::Io(_) => ErrorKind::Io,
        }
    }

    /// The message without the kind prefix
    ///
    /// For a remote exception this is exactly the exception's message.
    pub fn message(&self) -> String {
        match self {
            YarError::Param(msg)
            | YarError::Config(msg)
            | YarError::Packager(msg)
            | YarError::Network(msg)
            | YarError::Request(msg)
            | YarError::Response(msg)
            | YarError::Framing(msg) => msg.clone(),
            YarError::Io(e) => e.to_string(),
        }
    }
}

impl From<serde_json::Error> for YarError {
    fn from(e: serde_json::Error) -> Self {
        YarError::Packager(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for YarError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        YarError::Packager(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for YarError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        YarError::Packager(e.to_string())
    }
}

impl From<reqwest::Error> for YarError {
    fn from(e: reqwest::Error) -> Self {
        YarError::Network(e.to_string())
    }
}
