//! Bounded memory of recently applied message identifiers.
//!
//! The server delivers at least once: retries and duplicate fan-out can hand
//! the client the same message twice. Every inbound message ID is checked
//! against this cache before processing and recorded afterwards.

use std::collections::{HashSet, VecDeque};

/// Default number of identifiers remembered.
pub const DEFAULT_DEDUP_CAPACITY: usize = 1000;

/// Insertion-ordered set of message IDs with oldest-first eviction.
#[derive(Debug, Clone)]
pub struct DedupCache {
    capacity: usize,
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl DedupCache {
    /// Creates an empty cache holding at most `capacity` IDs.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// Reports whether `id` has been recorded and not yet evicted.
    pub fn has(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Records `id`, evicting the oldest entry first when full.
    ///
    /// Returns `false` if the ID was already present; its age is not
    /// refreshed in that case.
    pub fn add(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.seen.contains(&id) {
            return false;
        }
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.seen.insert(id.clone());
        self.order.push_back(id);
        true
    }

    /// Number of IDs currently remembered.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_CAPACITY)
    }
}
