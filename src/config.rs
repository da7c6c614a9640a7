//! Configuration for yar-client
//!
//! Centralized client configuration with defaults matching the reference
//! YAR client.

use crate::packager::Packager;

/// Main configuration for a [`Client`](crate::Client)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Codec Configuration
    // -------------------------------------------------------------------------
    /// Packager used to encode requests and decode responses
    pub packager: Packager,

    /// HTTP content type; `None` derives it from the packager's MIME type
    pub content_type: Option<String>,

    // -------------------------------------------------------------------------
    // Header Configuration
    // -------------------------------------------------------------------------
    /// Provider string written into every request header
    pub provider: String,

    /// Opaque auth token copied into the header (at most 32 bytes are kept)
    pub token: Vec<u8>,

    /// Encryption flag copied into the header; no encryption is performed
    pub encrypt: bool,

    // -------------------------------------------------------------------------
    // Transport Configuration
    // -------------------------------------------------------------------------
    /// Whole-request timeout (milliseconds, 0 = none)
    pub timeout_ms: u64,

    /// Connect timeout (milliseconds, 0 = transport default)
    pub connect_timeout_ms: u64,

    /// Reuse connections between calls
    pub keep_alive: bool,

    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,

    /// Resolve hosts through a caching resolver
    pub dns_cache: Option<DnsCacheConfig>,

    /// Size of the outbound framing buffer pool
    pub buffer_pool_size: usize,

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------
    /// Emit a debug event per call phase inside a `yar_call` span
    pub trace_calls: bool,
}

/// DNS cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DnsCacheConfig {
    /// Max cached domains before eviction (0 = unbounded)
    pub max_entries: usize,

    /// Time to live of a cached entry (milliseconds, 0 = forever)
    pub ttl_ms: u64,
}

impl Default for DnsCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1024,
            ttl_ms: 60_000,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            packager: Packager::Json,
            content_type: None,
            provider: format!("Yar/Rust v{}", crate::VERSION),
            token: Vec::new(),
            encrypt: false,
            timeout_ms: 1000,
            connect_timeout_ms: 0,
            keep_alive: false,
            accept_invalid_certs: false,
            dns_cache: None,
            buffer_pool_size: 32,
            trace_calls: false,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Content type sent with each request
    pub fn effective_content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or_else(|| self.packager.mime_type())
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the packager
    pub fn packager(mut self, packager: Packager) -> Self {
        self.config.packager = packager;
        self
    }

    /// Override the HTTP content type
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.config.content_type = Some(content_type.into());
        self
    }

    /// Set the provider string
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.config.provider = provider.into();
        self
    }

    /// Set the auth token
    pub fn token(mut self, token: impl Into<Vec<u8>>) -> Self {
        self.config.token = token.into();
        self
    }

    /// Set the encryption flag
    pub fn encrypt(mut self, encrypt: bool) -> Self {
        self.config.encrypt = encrypt;
        self
    }

    /// Set the request timeout (in milliseconds)
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Enable or disable connection reuse
    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.config.keep_alive = keep_alive;
        self
    }

    /// Accept invalid TLS certificates
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.accept_invalid_certs = accept;
        self
    }

    /// Enable the DNS cache
    pub fn dns_cache(mut self, cache: DnsCacheConfig) -> Self {
        self.config.dns_cache = Some(cache);
        self
    }

    /// Set the framing buffer pool size
    pub fn buffer_pool_size(mut self, size: usize) -> Self {
        self.config.buffer_pool_size = size;
        self
    }

    /// Enable per-phase call tracing
    pub fn trace_calls(mut self, trace: bool) -> Self {
        self.config.trace_calls = trace;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
