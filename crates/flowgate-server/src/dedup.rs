//! Bounded, time-expiring set of seen webhook message ids.
//!
//! The platform retries notifications it considers undelivered, so the same
//! message id can arrive several times. The cache remembers ids for a TTL and
//! never holds more than `capacity` of them; the oldest id is forgotten first.

use std::{
    fmt,
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use lru::LruCache;

/// Recently seen message ids.
///
/// Lookups use `peek`, so a repeat never refreshes an id and the least
/// recently used entry is always the oldest sighting.
pub struct SeenCache {
    ttl: Duration,
    seen: LruCache<String, Instant>,
}

impl SeenCache {
    /// Cache keeping up to `capacity` ids (at least one) for `ttl`.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { ttl, seen: LruCache::new(capacity) }
    }

    /// Record `id`; returns `true` the first time it is seen within the TTL.
    #[allow(clippy::disallowed_methods)]
    pub fn first_sighting(&mut self, id: &str) -> bool {
        self.first_sighting_at(id, Instant::now())
    }

    /// [`Self::first_sighting`] against an explicit clock reading.
    pub fn first_sighting_at(&mut self, id: &str, now: Instant) -> bool {
        self.expire(now);
        if self.seen.peek(id).is_some_and(|seen_at| !self.expired(*seen_at, now)) {
            return false;
        }

        // At capacity, `put` drops the oldest sighting.
        self.seen.put(id.to_string(), now);
        true
    }

    /// Number of ids currently remembered.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// True when nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Most ids remembered at once.
    pub fn capacity(&self) -> usize {
        self.seen.cap().get()
    }

    fn expired(&self, seen_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(seen_at) >= self.ttl
    }

    fn expire(&mut self, now: Instant) {
        while let Some((_, seen_at)) = self.seen.peek_lru() {
            if !self.expired(*seen_at, now) {
                break;
            }
            self.seen.pop_lru();
        }
    }
}

impl fmt::Debug for SeenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeenCache")
            .field("ttl", &self.ttl)
            .field("len", &self.seen.len())
            .field("capacity", &self.seen.cap())
            .finish()
    }
}
