//! Result caching (design §4.4 step 12 "Cache"): an LRU keyed by a hash
//! of the normalized query, filters, pagination, and the weighted
//! index's generation stamp — so a rebuild invalidates every cached
//! entry for free, without the cache needing to know why (design §8
//! "Cache transparency: a cache hit returns exactly what a miss would
//! have computed").

use std::time::{Duration, Instant};

use indexmap::IndexMap;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use swagger_mcp_foundation::Generation;

use crate::model::{SearchFilters, SearchResponse};

/// Default cache entry lifetime (design §4.4 step 12 "TTL default 5 min").
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Fraction of entries dropped once the cache is at capacity (design
/// §4.4 step 12 "evict LRU 20% at capacity").
const EVICTION_FRACTION: f64 = 0.2;

/// A cache key: the SHA-256 hex digest of the query's normalized shape.
pub type CacheKey = String;

/// Compute the cache key for a query (design §4.4 step 12). Two requests
/// that normalize, filter, and paginate identically against the same
/// index generation always collide, regardless of surface query text
/// (e.g. differing whitespace).
#[must_use]
pub fn cache_key(normalized_query: &str, filters: &SearchFilters, page: u32, per_page: u32, generation: Generation) -> CacheKey {
    let mut hasher = Sha256::new();
    hasher.update(normalized_query.as_bytes());
    hasher.update(
        serde_json::to_vec(filters)
            .unwrap_or_default(),
    );
    hasher.update(page.to_le_bytes());
    hasher.update(per_page.to_le_bytes());
    hasher.update(generation.as_u64().to_le_bytes());
    format!("{:x}", hasher.finalize())
}

struct Entry {
    response: SearchResponse,
    inserted_at: Instant,
}

/// An LRU response cache with a per-entry TTL (design §4.4 step 12).
pub struct QueryCache {
    capacity: usize,
    ttl: Duration,
    entries: Mutex<IndexMap<CacheKey, Entry>>,
}

impl QueryCache {
    /// Build a cache holding up to `capacity` entries for up to `ttl` each.
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self { capacity: capacity.max(1), ttl, entries: Mutex::new(IndexMap::new()) }
    }

    /// Look up `key`. A hit that has outlived the TTL is treated as a
    /// miss and evicted immediately.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<SearchResponse> {
        let mut entries = self.entries.lock();
        let Some(index) = entries.get_index_of(key) else { return None };
        let expired = entries[index].inserted_at.elapsed() >= self.ttl;
        if expired {
            entries.shift_remove(key);
            return None;
        }
        // Move the hit to the back (most-recently-used end).
        let (key, entry) = entries.shift_remove_index(index).expect("index just looked up");
        let response = entry.response.clone();
        entries.insert(key, entry);
        Some(response)
    }

    /// Insert `response` under `key`, evicting the least-recently-used
    /// 20% first if the cache is already at capacity.
    pub fn put(&self, key: CacheKey, response: SearchResponse) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            let to_evict = ((entries.len() as f64 * EVICTION_FRACTION).ceil() as usize).max(1);
            for _ in 0..to_evict.min(entries.len()) {
                entries.shift_remove_index(0);
            }
        }
        entries.insert(key, Entry { response, inserted_at: Instant::now() });
    }

    /// Drop every cached entry (design §4.4 step 12, invoked when a
    /// fresh generation swaps in and the caller wants an immediate
    /// clean slate rather than waiting for key misses to age entries out).
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of entries currently cached, for health/diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache currently holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Clusters, Pagination, ResultSummary};

    fn response() -> SearchResponse {
        SearchResponse {
            hits: Vec::new(),
            pagination: Pagination { page: 1, per_page: 10, total_results: 0, total_pages: 0, has_previous: false, has_next: false, previous_page: None, next_page: None },
            clusters: Clusters::default(),
            summary: ResultSummary::default(),
            suggestions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn key_changes_with_generation() {
        let filters = SearchFilters::default();
        let a = cache_key("widget", &filters, 1, 10, Generation::from_raw(1));
        let b = cache_key("widget", &filters, 1, 10, Generation::from_raw(2));
        assert_ne!(a, b);
    }

    #[test]
    fn stores_and_retrieves() {
        let cache = QueryCache::new(4, DEFAULT_TTL);
        let key = "k".to_string();
        cache.put(key.clone(), response());
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn expired_entries_are_treated_as_misses() {
        let cache = QueryCache::new(4, Duration::from_millis(0));
        let key = "k".to_string();
        cache.put(key.clone(), response());
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn evicts_at_capacity() {
        let cache = QueryCache::new(2, DEFAULT_TTL);
        cache.put("a".to_string(), response());
        cache.put("b".to_string(), response());
        cache.put("c".to_string(), response());
        assert!(cache.len() <= 2);
    }
}
