//! Object pool
//!
//! Bounded pool of reusable objects for per-call allocations.
//!
//! ## Design
//! - Idle objects live in a lock-free `ArrayQueue`
//! - `acquire()` hands out a [`Pooled`] guard, building a fresh object
//!   when the queue is empty
//! - Dropping the guard resets the object and returns it; if the queue is
//!   already full the object is dropped instead
//!
//! Return happens in `Drop`, so an early `?` in the caller still releases.

use std::fmt;
use std::ops::{Deref, DerefMut};

use bytes::BytesMut;
use crossbeam::queue::ArrayQueue;

use crate::protocol::Header;

/// Objects that can be cleared for reuse
pub trait Reset {
    /// Overwrite all state so nothing leaks into the next user
    fn reset(&mut self);
}

impl Reset for BytesMut {
    fn reset(&mut self) {
        self.clear();
    }
}

impl Reset for Vec<u8> {
    fn reset(&mut self) {
        self.clear();
    }
}

impl Reset for Header {
    fn reset(&mut self) {
        Header::reset(self);
    }
}

/// Bounded pool of `T`
pub struct Pool<T: Reset + Default> {
    /// Idle objects
    idle: ArrayQueue<T>,

    /// Builds an object when none is idle
    factory: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T: Reset + Default> Pool<T> {
    /// Create a pool holding at most `capacity` idle objects
    pub fn new(capacity: usize, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            idle: ArrayQueue::new(capacity.max(1)),
            factory: Box::new(factory),
        }
    }

    /// Take an object out of the pool
    pub fn acquire(&self) -> Pooled<'_, T> {
        let item = self.idle.pop().unwrap_or_else(|| (self.factory)());
        Pooled { pool: self, item }
    }

    /// Number of idle objects
    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    /// Max number of idle objects
    pub fn capacity(&self) -> usize {
        self.idle.capacity()
    }

    fn release(&self, mut item: T) {
        item.reset();
        // Full pool: let the object drop
        let _ = self.idle.push(item);
    }
}

impl<T: Reset + Default> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.idle.len())
            .field("capacity", &self.idle.capacity())
            .finish()
    }
}

/// An object borrowed from a [`Pool`], returned on drop
pub struct Pooled<'a, T: Reset + Default> {
    pool: &'a Pool<T>,
    item: T,
}

impl<T: Reset + Default> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T: Reset + Default> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.item
    }
}

impl<T: Reset + Default> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        let item = std::mem::take(&mut self.item);
        self.pool.release(item);
    }
}
