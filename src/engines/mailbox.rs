//! Thread-crossing message queue.
//!
//! Producers on any thread `post`; the owning thread collects everything with
//! `drain` at a point of its choosing (for example once per frame), so the
//! consumer never runs callbacks on a foreign thread.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Messages kept by [`Mailbox::new`] before the oldest are evicted.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 1024;

/// Bounded queue: once `capacity` messages are pending, posting evicts the
/// oldest one, so a consumer that stops draining cannot grow it without limit.
#[derive(Debug)]
pub struct Mailbox<M> {
    queue: Arc<Mutex<VecDeque<M>>>,
    capacity: usize,
}

impl<M> Clone for Mailbox<M> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            capacity: self.capacity,
        }
    }
}

impl<M> Default for Mailbox<M> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAILBOX_CAPACITY)
    }
}

impl<M> Mailbox<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capacity is clamped to at least one message.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(64)))),
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Queue `message`; returns the evicted oldest message when full.
    pub fn post(&self, message: M) -> Option<M> {
        let mut queue = self.lock();
        let evicted = if queue.len() >= self.capacity {
            queue.pop_front()
        } else {
            None
        };
        queue.push_back(message);
        evicted
    }

    /// All pending messages in posting order.
    pub fn drain(&self) -> Vec<M> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<M>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
