//! DNS Module
//!
//! Host name resolution for the HTTP transport.
//!
//! ## Resolvers
//! - [`SystemResolver`]: live lookup through the operating system
//! - [`StaticResolver`]: fixed table, optional fallback
//! - [`CacheResolver`]: expiring cache in front of another resolver

mod cache;
mod static_resolver;

use std::net::{IpAddr, ToSocketAddrs};
use std::sync::Arc;

use crate::error::{Result, YarError};

pub use cache::CacheResolver;
pub use static_resolver::StaticResolver;

/// Maps a host name to its addresses
pub trait Resolver: Send + Sync {
    /// Resolve `domain`; an empty result is not an error
    fn lookup(&self, domain: &str) -> Result<Vec<IpAddr>>;
}

impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    fn lookup(&self, domain: &str) -> Result<Vec<IpAddr>> {
        (**self).lookup(domain)
    }
}

impl<R: Resolver + ?Sized> Resolver for Box<R> {
    fn lookup(&self, domain: &str) -> Result<Vec<IpAddr>> {
        (**self).lookup(domain)
    }
}

/// Live resolution through the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn lookup(&self, domain: &str) -> Result<Vec<IpAddr>> {
        let addrs = (domain, 0)
            .to_socket_addrs()
            .map_err(|e| YarError::Network(format!("Lookup Error: {}: {}", domain, e)))?;

        let mut ips: Vec<IpAddr> = Vec::new();
        for addr in addrs {
            if !ips.contains(&addr.ip()) {
                ips.push(addr.ip());
            }
        }

        tracing::trace!(domain, count = ips.len(), "resolved");
        Ok(ips)
    }
}
