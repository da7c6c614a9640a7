//! Client Module
//!
//! Runs the YAR call lifecycle against an injected transport.
//!
//! ## Call Lifecycle
//! ```text
//! Building → Packing → Framing → Sending → AwaitingResponse
//!          → Unframing → Unpacking → Done
//! ```
//! Any state can end the call with a typed [`YarError`]; nothing is retried.
//!
//! ## Responsibilities
//! - Assign correlation ids (atomic counter, shared by all callers)
//! - Encode the request with the configured packager and frame it
//! - Hand the envelope to the transport
//! - Validate the response envelope before decoding anything
//! - Surface remote exceptions as errors

use std::fmt;
use std::io::Read;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::dns::{CacheResolver, SystemResolver};
use crate::error::{Result, YarError};
use crate::network::{HttpTransport, NetKind, Transport};
use crate::packager::Packager;
use crate::pool::Pool;
use crate::protocol::{decode_envelope, frame_into, Header, Request, Response, HEADER_SIZE, MAGIC_NUMBER};

/// States of a single call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Building,
    Packing,
    Framing,
    Sending,
    AwaitingResponse,
    Unframing,
    Unpacking,
    Done,
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// YAR client for one endpoint
///
/// ## Concurrency
/// - All methods take `&self`; share the client behind an `Arc`
/// - `next_id` is the only state mutated by concurrent calls (fetch-and-add)
/// - Framing buffers come from a bounded pool and go back on every exit path
pub struct Client {
    /// Address the client was built for
    addr: String,

    /// Net kind parsed from the address scheme
    net: NetKind,

    /// Client configuration
    config: ClientConfig,

    /// `None` for non-HTTP addresses, which fail at dispatch
    transport: Option<Arc<dyn Transport>>,

    /// Next correlation id
    next_id: AtomicU32,

    /// Reusable outbound framing buffers
    buffers: Pool<BytesMut>,
}

impl Client {
    /// Create a client for `addr`
    ///
    /// `http://` and `https://` addresses get an [`HttpTransport`]
    /// (behind a DNS cache when configured). `tcp://`, `udp://` and
    /// `unix://` addresses are accepted here but every call on them fails
    /// with a config error.
    pub fn new(addr: &str, config: ClientConfig) -> Result<Self> {
        let net = NetKind::from_addr(addr)?;

        let transport: Option<Arc<dyn Transport>> = if net.is_http() {
            let mut http = HttpTransport::new(addr, &config)?;
            if let Some(cache) = config.dns_cache {
                let resolver = CacheResolver::new(
                    SystemResolver,
                    cache.max_entries,
                    Duration::from_millis(cache.ttl_ms),
                );
                http = http.with_resolver(Arc::new(resolver));
            }
            Some(Arc::new(http))
        } else {
            None
        };

        Ok(Self::build(addr, net, config, transport))
    }

    /// Create a client that sends through `transport`
    pub fn with_transport(addr: &str, config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let net = NetKind::from_addr(addr)?;
        Ok(Self::build(addr, net, config, Some(transport)))
    }

    fn build(addr: &str, net: NetKind, config: ClientConfig, transport: Option<Arc<dyn Transport>>) -> Self {
        let buffers = Pool::new(config.buffer_pool_size, || BytesMut::with_capacity(256));

        tracing::debug!(addr, %net, packager = %config.packager, "yar client created");

        Self {
            addr: addr.to_string(),
            net,
            config,
            transport,
            next_id: AtomicU32::new(1),
            buffers,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn net(&self) -> NetKind {
        self.net
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn packager(&self) -> Packager {
        self.config.packager
    }

    // =========================================================================
    // Calls
    // =========================================================================

    /// Invoke `method` and decode its return value into `R`
    pub fn call<R: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<R> {
        let response = self.call_raw(method, params)?;
        response.result(self.config.packager)
    }

    /// Invoke `method` and return the checked response
    ///
    /// The return value stays encoded; decode it with [`Response::result`].
    pub fn call_raw(&self, method: &str, params: Vec<Value>) -> Result<Response> {
        let transport = match &self.transport {
            Some(transport) if self.net.is_http() => transport,
            _ => {
                return Err(YarError::Config(format!(
                    "unsupported non http protocol: {}",
                    self.net
                )))
            }
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let span = if self.config.trace_calls {
            tracing::info_span!("yar_call", id, method)
        } else {
            tracing::Span::none()
        };
        let _enter = span.enter();

        let result = self.run(transport.as_ref(), id, method, params);
        if let Err(e) = &result {
            tracing::debug!(id, method, kind = ?e.kind(), error = %e, "yar call failed");
        }
        result
    }

    fn run(&self, transport: &dyn Transport, id: u32, method: &str, params: Vec<Value>) -> Result<Response> {
        let packager = self.config.packager;

        self.trace(CallState::Building, id);
        let mut request = Request::new(id, method, params)?;

        self.trace(CallState::Packing, id);
        let body = packager.marshal(&request)?;

        self.trace(CallState::Framing, id);
        let outbound = {
            let mut buf = self.buffers.acquire();
            self.fill_header(&mut request.header, id);
            frame_into(&mut request.header, &body, &mut *buf)?;
            buf.split().freeze()
        };

        self.trace(CallState::Sending, id);
        let mut stream = transport.send(outbound, self.config.effective_content_type())?;

        self.trace(CallState::AwaitingResponse, id);
        let mut raw = Vec::with_capacity(HEADER_SIZE);
        stream
            .read_to_end(&mut raw)
            .map_err(|e| YarError::Response(format!("Read Response Error: {}", e)))?;

        self.trace(CallState::Unframing, id);
        let (header, body) = decode_envelope(&raw)?;
        self.check_packager(&header)?;
        if header.id != id {
            tracing::warn!(sent = id, received = header.id, "response header id differs from request id");
        }

        self.trace(CallState::Unpacking, id);
        let mut response = match Response::unpack(packager, body) {
            Ok(response) => response,
            Err(e) => {
                // A body that fails to decode is replaced, never passed on half-filled
                let failed = Response::exception(&format!("Unpack Error: {}", e.message()));
                tracing::debug!(id, status = failed.status.code(), "response body rejected");
                return Err(YarError::Packager(failed.error_message().to_string()));
            }
        };
        response.header = header;

        if !response.is_ok() {
            let message = match &response.error {
                Some(exception) => exception.message.clone(),
                None => format!("remote status 0x{:x}", response.status.code()),
            };
            return Err(YarError::Response(message));
        }

        self.trace(CallState::Done, id);
        Ok(response)
    }

    /// Populate the request header from the call and the configuration
    fn fill_header(&self, header: &mut Header, id: u32) {
        header.id = id;
        header.magic_number = MAGIC_NUMBER;
        header.packager = self.config.packager.wire_name();
        header.encrypt = u32::from(self.config.encrypt);
        header.set_provider(&self.config.provider);
        header.set_token(&self.config.token);
    }

    /// The response is always decoded with the configured packager; a peer
    /// that names a different known packager is rejected.
    fn check_packager(&self, header: &Header) -> Result<()> {
        let declared = header.packager_name();
        match Packager::from_name(&declared) {
            Ok(peer) if peer != self.config.packager => Err(YarError::Packager(format!(
                "packager mismatch: peer declared {}, client uses {}",
                peer, self.config.packager
            ))),
            Ok(_) => Ok(()),
            Err(_) if declared.is_empty() => Ok(()),
            Err(_) => {
                tracing::warn!(declared = %declared, "response declares unknown packager");
                Ok(())
            }
        }
    }

    fn trace(&self, state: CallState, id: u32) {
        if self.config.trace_calls {
            tracing::debug!(id, %state, "yar call state");
        }
    }
}
