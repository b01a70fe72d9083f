//! Search result cache.
//!
//! Caches the full raw result list per (expression, order, unique) triple
//! in an in-memory LRU cache with TTL-based expiration, so repeated
//! searches inside the TTL window never touch the network.

use crate::models::{RawCard, SearchOrder, UniqueMode};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Cache key: one searchable request shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// The expression text.
    pub expression: String,
    /// Result ordering.
    pub order: SearchOrder,
    /// Uniqueness mode.
    pub unique: UniqueMode,
}

/// Entry in the search cache.
struct CacheEntry {
    /// The full unfiltered result list.
    cards: Vec<RawCard>,
    /// When this entry was captured.
    fetched_at: Instant,
}

/// TTL-bounded LRU cache of raw search results.
///
/// # Thread Safety
///
/// Uses a `Mutex` for interior mutability; a poisoned lock still holds a
/// valid cache, so poisoning is recovered by taking the inner value.
///
/// # Expiry
///
/// An entry older than the TTL is treated as absent and evicted lazily on
/// the lookup that finds it stale; the next fetch silently replaces it.
pub struct SearchCache {
    /// Key → entry, LRU-bounded.
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
    /// Time-to-live for cache entries.
    ttl: Duration,
}

impl SearchCache {
    /// Creates a new search cache.
    ///
    /// # Panics
    ///
    /// Panics if capacity is 0.
    #[must_use]
    #[allow(clippy::expect_used)] // Documented panic for invalid input
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity).expect("capacity must be > 0");
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            ttl,
        }
    }

    /// Returns the cached full result list for the key, if present and live.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Vec<RawCard>> {
        let mut entries = self.lock();

        let live = match entries.get(key) {
            Some(entry) if entry.fetched_at.elapsed() < self.ttl => Some(entry.cards.clone()),
            Some(_) => None,
            None => {
                metrics::counter!("card_search_cache", "result" => "miss").increment(1);
                return None;
            },
        };

        match live {
            Some(cards) => {
                metrics::counter!("card_search_cache", "result" => "hit").increment(1);
                tracing::debug!(expression = %key.expression, "Search cache hit");
                Some(cards)
            },
            None => {
                // Stale entry: treat as absent and evict now rather than
                // waiting for LRU pressure.
                entries.pop(key);
                metrics::counter!("card_search_cache", "result" => "expired").increment(1);
                tracing::debug!(expression = %key.expression, "Search cache entry expired");
                None
            },
        }
    }

    /// Stores the full result list for the key, replacing any prior entry.
    pub fn put(&self, key: CacheKey, cards: Vec<RawCard>) {
        let mut entries = self.lock();
        entries.put(
            key,
            CacheEntry {
                cards,
                fetched_at: Instant::now(),
            },
        );
        metrics::gauge!("card_search_cache_size").set(entries.len() as f64);
    }

    /// Returns the number of cached entries, including stale ones not yet
    /// evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn key(expression: &str) -> CacheKey {
        CacheKey {
            expression: expression.to_string(),
            order: SearchOrder::Edhrec,
            unique: UniqueMode::Cards,
        }
    }

    fn card(name: &str) -> RawCard {
        RawCard {
            name: name.to_string(),
            ..RawCard::default()
        }
    }

    #[test]
    fn test_put_and_get() {
        let cache = SearchCache::new(16, Duration::from_secs(60));
        cache.put(key("c:r t:goblin"), vec![card("Goblin Guide")]);

        let cards = cache.get(&key("c:r t:goblin")).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Goblin Guide");
    }

    #[test]
    fn test_miss_on_unseen_key() {
        let cache = SearchCache::new(16, Duration::from_secs(60));
        assert!(cache.get(&key("c:u t:merfolk")).is_none());
    }

    #[test]
    fn test_distinct_order_is_distinct_key() {
        let cache = SearchCache::new(16, Duration::from_secs(60));
        cache.put(key("c:r t:goblin"), vec![card("Goblin Guide")]);

        let other = CacheKey {
            expression: "c:r t:goblin".to_string(),
            order: SearchOrder::Name,
            unique: UniqueMode::Cards,
        };
        assert!(cache.get(&other).is_none());
    }

    #[test]
    fn test_expired_entry_treated_as_absent() {
        let cache = SearchCache::new(16, Duration::from_millis(20));
        cache.put(key("c:r t:goblin"), vec![card("Goblin Guide")]);

        thread::sleep(Duration::from_millis(50));

        assert!(cache.get(&key("c:r t:goblin")).is_none());
        // The stale entry was evicted on lookup.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_replacement_after_expiry() {
        let cache = SearchCache::new(16, Duration::from_millis(20));
        cache.put(key("c:r t:goblin"), vec![card("Old Result")]);

        thread::sleep(Duration::from_millis(50));
        cache.put(key("c:r t:goblin"), vec![card("New Result")]);

        let cards = cache.get(&key("c:r t:goblin")).unwrap();
        assert_eq!(cards[0].name, "New Result");
    }

    #[test]
    fn test_lru_eviction() {
        let cache = SearchCache::new(2, Duration::from_secs(60));
        cache.put(key("first query"), vec![card("A")]);
        cache.put(key("second query"), vec![card("B")]);
        cache.put(key("third query"), vec![card("C")]);

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("first query")).is_none());
        assert!(cache.get(&key("third query")).is_some());
    }
}
