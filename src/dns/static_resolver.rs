//! Static resolver
//!
//! Fixed domain table, mainly for pinning hosts and for tests.

use std::collections::HashMap;
use std::net::IpAddr;

use parking_lot::RwLock;

use crate::error::{Result, YarError};

use super::Resolver;

/// Resolves from a fixed table, optionally falling back to another resolver
pub struct StaticResolver {
    domains: RwLock<HashMap<String, Vec<IpAddr>>>,
    fallback: Option<Box<dyn Resolver>>,
}

impl StaticResolver {
    /// Table-only resolver; unknown domains are an error
    pub fn new() -> Self {
        Self {
            domains: RwLock::new(HashMap::with_capacity(8)),
            fallback: None,
        }
    }

    /// Table resolver that defers unknown domains to `fallback`
    pub fn with_fallback(fallback: impl Resolver + 'static) -> Self {
        Self {
            domains: RwLock::new(HashMap::with_capacity(8)),
            fallback: Some(Box::new(fallback)),
        }
    }

    /// Pin `domain` to `ips`, replacing any previous entry
    pub fn add(&self, domain: impl Into<String>, ips: Vec<IpAddr>) {
        self.domains.write().insert(domain.into(), ips);
    }
}

impl Default for StaticResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver for StaticResolver {
    fn lookup(&self, domain: &str) -> Result<Vec<IpAddr>> {
        if let Some(ips) = self.domains.read().get(domain) {
            return Ok(ips.clone());
        }

        match &self.fallback {
            Some(fallback) => fallback.lookup(domain),
            None => Err(YarError::Network(format!(
                "Lookup Error: no such host: {}",
                domain
            ))),
        }
    }
}
