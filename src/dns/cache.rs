//! Caching resolver
//!
//! Expiring map from domain to addresses in front of another resolver.
//!
//! ## Eviction
//! When an insert pushes the cache past `max_entries`, the oldest inserted
//! entries are dropped until half of `max_entries` remain. Re-resolving a
//! domain counts as a fresh insert.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::error::Result;

use super::Resolver;

/// A cached lookup result
#[derive(Debug, Clone)]
struct CachedEntry {
    ips: Vec<IpAddr>,

    /// `None` never expires
    expires_at: Option<Instant>,
}

impl CachedEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CachedEntry>,

    /// Domains in insertion order, oldest first
    order: VecDeque<String>,
}

/// Resolver with an expiring, size-bounded cache
///
/// ## Concurrency:
/// - Lookups of fresh entries take the read lock only
/// - Live resolution runs without holding the lock
/// - Inserts and evictions take the write lock
pub struct CacheResolver<R: Resolver> {
    inner: R,
    state: RwLock<CacheState>,

    /// `None` caches forever
    ttl: Option<Duration>,

    /// 0 = unbounded
    max_entries: usize,
}

impl<R: Resolver> CacheResolver<R> {
    /// Create a cache over `inner`
    ///
    /// A zero `ttl` caches forever; a zero `max_entries` never evicts.
    pub fn new(inner: R, max_entries: usize, ttl: Duration) -> Self {
        Self {
            inner,
            state: RwLock::new(CacheState {
                entries: HashMap::with_capacity(max_entries / 2 + 1),
                order: VecDeque::new(),
            }),
            ttl: if ttl.is_zero() { None } else { Some(ttl) },
            max_entries,
        }
    }

    /// Number of cached domains (fresh or not)
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `domain` has a cached entry, fresh or not
    pub fn contains(&self, domain: &str) -> bool {
        self.state.read().entries.contains_key(domain)
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.entries.clear();
        state.order.clear();
    }

    fn insert(&self, domain: &str, ips: Vec<IpAddr>, now: Instant) {
        let entry = CachedEntry {
            ips,
            expires_at: self.ttl.map(|ttl| now + ttl),
        };

        let mut state = self.state.write();
        if state.entries.insert(domain.to_string(), entry).is_some() {
            state.order.retain(|d| d != domain);
        }
        state.order.push_back(domain.to_string());

        if self.max_entries > 0 && state.entries.len() > self.max_entries {
            let keep = (self.max_entries / 2).max(1);
            while state.entries.len() > keep {
                match state.order.pop_front() {
                    Some(oldest) => {
                        state.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            tracing::debug!(kept = state.entries.len(), "dns cache evicted oldest entries");
        }
    }
}

impl<R: Resolver> Resolver for CacheResolver<R> {
    fn lookup(&self, domain: &str) -> Result<Vec<IpAddr>> {
        let now = Instant::now();

        if let Some(entry) = self.state.read().entries.get(domain) {
            if entry.is_fresh(now) {
                return Ok(entry.ips.clone());
            }
        }

        let ips = self.inner.lookup(domain)?;
        self.insert(domain, ips.clone(), now);
        Ok(ips)
    }
}
