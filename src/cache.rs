//! Bounded LRU cache for translation results.
//!
//! Repeated utterances skip the external translation engine entirely: the
//! cache is consulted before any network call and never blocks on engine I/O.
//! All access goes through an internal mutex that is distinct from the
//! pipeline queues and is never held across an engine call.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Cache key: normalized source text plus the language pair.
///
/// Normalization makes "Hello, world!" and "hello world" the same key, so
/// punctuation and casing differences in recognition output don't defeat the
/// cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    text: String,
    source_lang: String,
    target_lang: String,
}

impl CacheKey {
    /// Builds a key, normalizing the text component.
    pub fn new(text: &str, source_lang: &str, target_lang: &str) -> Self {
        Self {
            text: normalize_text(text),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        }
    }

    /// The normalized text component.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Normalize text for cache-key construction: trim, lowercase, strip
/// punctuation, collapse whitespace runs to a single space.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true;
    for ch in text.trim().chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_was_space = false;
        } else if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        }
        // Punctuation and symbols are dropped entirely.
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

/// Stored value plus the recency tick it was last touched at.
struct Slot {
    value: String,
    tick: u64,
}

/// Inner state guarded by the cache mutex.
///
/// Recency is tracked with a monotonic tick per access and a queue of
/// (tick, key) records. Stale records (whose tick no longer matches the
/// slot's) are skipped during eviction and cleared by periodic compaction,
/// giving O(1) amortized get/put/evict without scanning for the oldest entry.
struct LruInner {
    map: HashMap<CacheKey, Slot>,
    recency: VecDeque<(u64, CacheKey)>,
    tick: u64,
    capacity: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl LruInner {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Records an access. Must be called after the map reflects the access,
    /// since compaction drops records the map doesn't confirm.
    fn record(&mut self, tick: u64, key: CacheKey) {
        self.recency.push_back((tick, key));
        if self.recency.len() > self.capacity.saturating_mul(4).max(16) {
            self.compact();
        }
    }

    /// Drops recency records that no longer reflect an entry's latest access.
    fn compact(&mut self) {
        let map = &self.map;
        self.recency
            .retain(|(tick, key)| map.get(key).is_some_and(|slot| slot.tick == *tick));
    }

    fn evict_lru(&mut self) {
        while let Some((tick, key)) = self.recency.pop_front() {
            let is_current = self.map.get(&key).is_some_and(|slot| slot.tick == tick);
            if is_current {
                self.map.remove(&key);
                self.evictions += 1;
                return;
            }
            // Stale record: the entry was touched again later or already removed.
        }
    }
}

/// Thread-safe bounded LRU mapping (text, source lang, target lang) →
/// translated text.
pub struct ResultCache {
    inner: Mutex<LruInner>,
}

impl ResultCache {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero is clamped to one; configuration validation rejects
    /// it before a pipeline is ever built.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruInner {
                map: HashMap::new(),
                recency: VecDeque::new(),
                tick: 0,
                capacity: capacity.max(1),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
        }
    }

    /// Looks up a translation, marking the entry most-recently-used on hit.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        let mut inner = self.lock();
        let tick = inner.next_tick();

        let value = match inner.map.get_mut(key) {
            Some(slot) => {
                slot.tick = tick;
                Some(slot.value.clone())
            }
            None => None,
        };

        match value {
            Some(value) => {
                inner.hits += 1;
                inner.record(tick, key.clone());
                Some(value)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Stores a translation, evicting the least-recently-used entry if full.
    pub fn put(&self, key: CacheKey, value: String) {
        let mut inner = self.lock();
        let tick = inner.next_tick();

        if let Some(slot) = inner.map.get_mut(&key) {
            slot.value = value;
            slot.tick = tick;
            inner.record(tick, key);
            return;
        }

        if inner.map.len() >= inner.capacity {
            inner.evict_lru();
        }
        inner.map.insert(key.clone(), Slot { value, tick });
        inner.record(tick, key);
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of hit/miss/eviction counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            entries: inner.map.len(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruInner> {
        // A poisoned mutex means another thread panicked mid-operation; the
        // map itself is still structurally sound, so keep serving.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str) -> CacheKey {
        CacheKey::new(text, "en", "es")
    }

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize_text("  Hello World  "), "hello world");
    }

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize_text("Hello, world!"), "hello world");
        assert_eq!(normalize_text("What's up?"), "whats up");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_text("a  b\t\tc\n d"), "a b c d");
    }

    #[test]
    fn test_normalize_empty_and_punctuation_only() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("?!..."), "");
    }

    #[test]
    fn test_keys_with_same_normalized_text_are_equal() {
        assert_eq!(key("Hello, world!"), key("hello world"));
        assert_ne!(key("hello world"), key("goodbye world"));
        assert_ne!(
            CacheKey::new("hello", "en", "es"),
            CacheKey::new("hello", "en", "fr")
        );
    }

    #[test]
    fn test_put_then_get_returns_value() {
        let cache = ResultCache::new(10);
        cache.put(key("hello"), "hola".to_string());

        assert_eq!(cache.get(&key("hello")), Some("hola".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let cache = ResultCache::new(10);
        assert_eq!(cache.get(&key("hello")), None);
    }

    #[test]
    fn test_put_same_key_overwrites() {
        let cache = ResultCache::new(10);
        cache.put(key("hello"), "hola".to_string());
        cache.put(key("hello"), "buenas".to_string());

        assert_eq!(cache.get(&key("hello")), Some("buenas".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_eviction_removes_least_recently_used() {
        let cache = ResultCache::new(4);
        for (k, v) in [("k1", "v1"), ("k2", "v2"), ("k3", "v3"), ("k4", "v4")] {
            cache.put(key(k), v.to_string());
        }

        // Touch k1 so k2 becomes the least recently used.
        assert_eq!(cache.get(&key("k1")), Some("v1".to_string()));

        cache.put(key("k5"), "v5".to_string());

        assert_eq!(cache.len(), 4);
        assert_eq!(cache.get(&key("k1")), Some("v1".to_string()));
        assert_eq!(cache.get(&key("k2")), None);
        assert_eq!(cache.get(&key("k5")), Some("v5".to_string()));
    }

    #[test]
    fn test_eviction_order_without_access() {
        let cache = ResultCache::new(3);
        for (k, v) in [("k1", "v1"), ("k2", "v2"), ("k3", "v3"), ("k4", "v4")] {
            cache.put(key(k), v.to_string());
        }

        // k1 was inserted first and never touched again.
        assert_eq!(cache.get(&key("k1")), None);
        assert_eq!(cache.get(&key("k2")), Some("v2".to_string()));
        assert_eq!(cache.get(&key("k4")), Some("v4".to_string()));
    }

    #[test]
    fn test_at_most_one_entry_per_key() {
        let cache = ResultCache::new(5);
        cache.put(key("Hello, world!"), "hola mundo".to_string());
        cache.put(key("hello world"), "hola mundo otra vez".to_string());

        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stats_counters() {
        let cache = ResultCache::new(2);
        cache.put(key("a"), "1".to_string());
        cache.put(key("b"), "2".to_string());

        let _ = cache.get(&key("a")); // hit
        let _ = cache.get(&key("zzz")); // miss

        cache.put(key("c"), "3".to_string()); // evicts b (a was touched)

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.entries, 2);

        assert_eq!(cache.get(&key("b")), None);
        assert_eq!(cache.get(&key("a")), Some("1".to_string()));
    }

    #[test]
    fn test_capacity_stays_bounded_under_churn() {
        let cache = ResultCache::new(4);
        for i in 0..1000 {
            cache.put(key(&format!("phrase {}", i)), format!("frase {}", i));
        }
        assert_eq!(cache.len(), 4);

        let stats = cache.stats();
        assert_eq!(stats.evictions, 996);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache = ResultCache::new(0);
        cache.put(key("a"), "1".to_string());
        assert_eq!(cache.len(), 1);

        cache.put(key("b"), "2".to_string());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key("b")), Some("2".to_string()));
    }

    #[test]
    fn test_cache_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<ResultCache>();
        assert_sync::<ResultCache>();
    }
}
