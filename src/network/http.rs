//! HTTP Transport
//!
//! POSTs framed requests with a blocking `reqwest` client.
//!
//! ## Resolution
//! Without a resolver the client dials whatever the system resolver returns.
//! With one, the endpoint host is looked up before every request and the
//! addresses are pinned into the client, so the URL (and with it the `Host`
//! header, TLS server name and certificate check) keeps the original host.
//! The client is rebuilt only when the resolved addresses change.

use std::io::Read;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::RwLock;
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;

use crate::config::ClientConfig;
use crate::dns::Resolver;
use crate::error::{Result, YarError};

use super::Transport;

/// Client settings taken from [`ClientConfig`]
#[derive(Debug, Clone, Copy)]
struct Settings {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    keep_alive: bool,
    accept_invalid_certs: bool,
}

impl Settings {
    fn from_config(config: &ClientConfig) -> Self {
        let millis = |ms: u64| (ms > 0).then(|| Duration::from_millis(ms));
        Self {
            timeout: millis(config.timeout_ms),
            connect_timeout: millis(config.connect_timeout_ms),
            keep_alive: config.keep_alive,
            accept_invalid_certs: config.accept_invalid_certs,
        }
    }

    fn builder(&self) -> ClientBuilder {
        let mut builder = Client::builder()
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .timeout(self.timeout);

        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if !self.keep_alive {
            builder = builder.pool_max_idle_per_host(0);
        }
        builder
    }
}

/// Client bound to one set of resolved addresses
struct Pinned {
    ips: Vec<IpAddr>,
    client: Client,
}

/// HTTP(S) transport for one endpoint
pub struct HttpTransport {
    /// Client used when no resolver is attached
    client: Client,

    settings: Settings,

    /// Endpoint every request is posted to
    url: Url,

    /// Optional resolver used to pick the address to dial
    resolver: Option<Arc<dyn Resolver>>,

    /// Client for the last resolved addresses
    pinned: RwLock<Option<Pinned>>,
}

impl HttpTransport {
    /// Create a transport posting to `url`
    pub fn new(url: &str, config: &ClientConfig) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| YarError::Param(format!("invalid url {:?}: {}", url, e)))?;

        let settings = Settings::from_config(config);
        let client = build_client(settings.builder())?;

        Ok(Self {
            client,
            settings,
            url,
            resolver: None,
            pinned: RwLock::new(None),
        })
    }

    /// Resolve the endpoint host through `resolver` before every request
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Addresses the transport currently dials, if a resolver pinned any
    pub fn pinned_addrs(&self) -> Option<Vec<IpAddr>> {
        self.pinned.read().as_ref().map(|pinned| pinned.ips.clone())
    }

    /// Client to send the next request with
    fn client(&self) -> Result<Client> {
        let (resolver, domain) = match (&self.resolver, self.url.domain()) {
            (Some(resolver), Some(domain)) => (resolver, domain),
            _ => return Ok(self.client.clone()),
        };

        let ips = resolver.lookup(domain)?;
        if ips.is_empty() {
            return Err(YarError::Network(format!(
                "Lookup Error: no address found for {}",
                domain
            )));
        }

        if let Some(pinned) = self.pinned.read().as_ref() {
            if pinned.ips == ips {
                return Ok(pinned.client.clone());
            }
        }

        let port = self.url.port_or_known_default().unwrap_or(80);
        let addrs: Vec<SocketAddr> = ips.iter().map(|ip| SocketAddr::new(*ip, port)).collect();
        let client = build_client(self.settings.builder().resolve_to_addrs(domain, &addrs))?;

        tracing::debug!(domain, ?ips, "pinned resolved addresses");
        let replaced = self.pinned.write().replace(Pinned {
            ips,
            client: client.clone(),
        });
        // Joins the old client's runtime thread, outside the lock
        drop(replaced);
        Ok(client)
    }
}

fn build_client(builder: ClientBuilder) -> Result<Client> {
    builder
        .build()
        .map_err(|e| YarError::Config(format!("failed to build HTTP client: {}", e)))
}

impl Transport for HttpTransport {
    fn send(&self, body: Bytes, content_type: &str) -> Result<Box<dyn Read + Send>> {
        let response = self
            .client()?
            .post(self.url.clone())
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(YarError::Request(format!("HTTP status {}", status)));
        }

        Ok(Box::new(response))
    }
}
