//! # yar-client
//!
//! Client for the YAR binary RPC protocol:
//! - Fixed 90-byte big-endian envelope header
//! - Pluggable body packagers (JSON, MessagePack)
//! - Call lifecycle over an injected byte-stream transport (HTTP by default)
//! - Optional caching DNS resolver for the HTTP transport
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Client                               │
//! │        (Building → Packing → Framing → Sending → ...)        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────────────┐
//!          │            │                     │
//!          ▼            ▼                     ▼
//!   ┌─────────────┐ ┌─────────────┐   ┌──────────────┐
//!   │  Protocol   │ │  Packager   │   │  Transport   │
//!   │  (Header)   │ │ (JSON/MsgP) │   │ (HTTP POST)  │
//!   └─────────────┘ └─────────────┘   └──────┬───────┘
//!                                            │
//!                                            ▼
//!                                     ┌─────────────┐
//!                                     │ DNS Cache   │
//!                                     │ (optional)  │
//!                                     └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use serde_json::{json, Value};
//! use yar_client::{Client, ClientConfig};
//!
//! let client = Client::new("http://127.0.0.1:8080/api.php", ClientConfig::default())?;
//! let ret: Value = client.call("api", vec![json!("a"), json!({"d": "leo"})])?;
//! println!("{}", ret);
//! # Ok::<(), yar_client::YarError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod packager;
pub mod pool;
pub mod dns;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorKind, Result, YarError};
pub use config::{ClientConfig, DnsCacheConfig};
pub use client::{CallState, Client};
pub use packager::Packager;
pub use protocol::{Exception, Header, Request, Response, Status};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of yar-client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
