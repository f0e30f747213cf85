use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::Mutex;
use serde::{Serialize, Deserialize};
use crate::search::results::SearchResponse;

/// Query cache for avoiding recomputation. Entries are keyed by snapshot
/// version, so a publish makes older entries unreachable.
pub struct QueryCache {
    pub cache: Mutex<LruCache<QueryKey, SearchResponse>>,
    pub size_limit: usize,
    pub hit_count: AtomicUsize,
    pub miss_count: AtomicUsize,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct QueryKey {
    pub version: u64,
    pub request: String,
}

impl QueryCache {
    /// `None` when `size_limit` is zero, which disables caching.
    pub fn new(size_limit: usize) -> Option<Self> {
        let cap = NonZeroUsize::new(size_limit)?;
        Some(QueryCache {
            cache: Mutex::new(LruCache::new(cap)),
            size_limit,
            hit_count: AtomicUsize::new(0),
            miss_count: AtomicUsize::new(0),
        })
    }

    pub fn get(&self, key: &QueryKey) -> Option<SearchResponse> {
        let mut cache = self.cache.lock();
        if let Some(results) = cache.get(key) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            Some(results.clone())
        } else {
            self.miss_count.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    pub fn put(&self, key: QueryKey, results: SearchResponse) {
        self.cache.lock().put(key, results);
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            size: self.cache.lock().len(),
            capacity: self.size_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hit_count: usize,
    pub miss_count: usize,
    pub size: usize,
    pub capacity: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(query: &str) -> SearchResponse {
        SearchResponse {
            hits: vec![],
            offset: 0,
            limit: 20,
            nb_hits: 0,
            exhaustive_nb_hits: true,
            processing_time_ms: 0,
            query: query.to_string(),
            facets_distribution: None,
            exhaustive_facets_count: None,
        }
    }

    fn key(version: u64) -> QueryKey {
        QueryKey { version, request: "{\"q\":\"the\"}".to_string() }
    }

    #[test]
    fn test_hits_and_misses() {
        let cache = QueryCache::new(2).unwrap();
        assert!(cache.get(&key(1)).is_none());
        cache.put(key(1), response("the"));
        assert_eq!(cache.get(&key(1)).unwrap().query, "the");

        // A new snapshot version never sees old entries
        assert!(cache.get(&key(2)).is_none());

        let stats = cache.stats();
        assert_eq!((stats.hit_count, stats.miss_count, stats.size), (1, 2, 1));
    }

    #[test]
    fn test_zero_size_disables_cache() {
        assert!(QueryCache::new(0).is_none());
    }
}
