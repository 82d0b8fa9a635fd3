// =============================================================================
// Analysis Cache: time-limited memo of computed results
// =============================================================================
//
// Results are keyed by `(symbol, parameter fingerprint)` so that a config
// change never serves a report computed under different parameters. Entries
// older than the TTL are treated as absent and dropped by `purge_expired`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct CacheKey {
    pub symbol: String,
    /// Serialised parameters the value was computed with.
    pub params: String,
}

impl CacheKey {
    pub fn new(symbol: impl Into<String>, params: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            params: params.into(),
        }
    }

    /// Key whose fingerprint is the JSON form of `params`.
    pub fn for_params<P: Serialize>(symbol: impl Into<String>, params: &P) -> Self {
        let params = serde_json::to_string(params).unwrap_or_default();
        Self::new(symbol, params)
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{:016x}", self.symbol, fingerprint(&self.params))
    }
}

fn fingerprint(s: &str) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut h = std::collections::hash_map::DefaultHasher::new();
    s.hash(&mut h);
    h.finish()
}

// ---------------------------------------------------------------------------
// AnalysisCache
// ---------------------------------------------------------------------------

/// Thread-safe TTL cache. Values are cloned out on read.
pub struct AnalysisCache<V> {
    entries: RwLock<HashMap<CacheKey, (Instant, V)>>,
    ttl: Duration,
}

impl<V: Clone> AnalysisCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, or `None` when absent or expired.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let map = self.entries.read();
        let (stored_at, value) = map.get(key)?;
        (stored_at.elapsed() < self.ttl).then(|| value.clone())
    }

    pub fn insert(&self, key: CacheKey, value: V) {
        self.entries.write().insert(key, (Instant::now(), value));
    }

    /// Return the cached value or compute, store and return a new one.
    ///
    /// `compute` runs outside the lock, so two concurrent misses on the same
    /// key may both compute; the later insert wins.
    pub fn get_or_insert_with<E, F>(&self, key: CacheKey, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(&key) {
            debug!(key = %key, "cache hit");
            return Ok(hit);
        }
        debug!(key = %key, "cache miss");
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop expired entries, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut map = self.entries.write();
        let before = map.len();
        map.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
        let removed = before - map.len();
        if removed > 0 {
            debug!(removed, remaining = map.len(), "expired cache entries purged");
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let cache = AnalysisCache::new(Duration::from_secs(60));
        let key = CacheKey::new("SPY", "a");
        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), 7_u32);
        assert_eq!(cache.get(&key), Some(7));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn params_separate_entries() {
        let cache = AnalysisCache::new(Duration::from_secs(60));
        cache.insert(CacheKey::new("SPY", "window=252"), 1_u32);
        cache.insert(CacheKey::new("SPY", "window=126"), 2_u32);
        assert_eq!(cache.get(&CacheKey::new("SPY", "window=252")), Some(1));
        assert_eq!(cache.get(&CacheKey::new("SPY", "window=126")), Some(2));
        assert!(cache.get(&CacheKey::new("QQQ", "window=252")).is_none());
    }

    #[test]
    fn for_params_uses_json() {
        #[derive(Serialize)]
        struct P {
            w: usize,
        }
        let key = CacheKey::for_params("BTC", &P { w: 3 });
        assert_eq!(key.params, r#"{"w":3}"#);
        assert!(key.to_string().starts_with("BTC#"));
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let cache = AnalysisCache::new(Duration::ZERO);
        let key = CacheKey::new("SPY", "");
        cache.insert(key.clone(), 1_u32);
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn entries_expire_after_ttl() {
        let cache = AnalysisCache::new(Duration::from_millis(20));
        let key = CacheKey::new("SPY", "");
        cache.insert(key.clone(), 1_u32);
        assert_eq!(cache.get(&key), Some(1));
        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn get_or_insert_with_computes_once() {
        let cache = AnalysisCache::new(Duration::from_secs(60));
        let key = CacheKey::new("SPY", "");
        let mut calls = 0;
        let first: Result<u32, ()> = cache.get_or_insert_with(key.clone(), || {
            calls += 1;
            Ok(5)
        });
        let second: Result<u32, ()> = cache.get_or_insert_with(key, || {
            calls += 1;
            Ok(9)
        });
        assert_eq!(first, Ok(5));
        assert_eq!(second, Ok(5));
        assert_eq!(calls, 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache: AnalysisCache<u32> = AnalysisCache::new(Duration::from_secs(60));
        let key = CacheKey::new("SPY", "");
        let err: Result<u32, &str> = cache.get_or_insert_with(key.clone(), || Err("boom"));
        assert_eq!(err, Err("boom"));
        assert!(cache.is_empty());
        cache.clear();
    }
}
