//! Root caching with LRU eviction, shared across bulk root matching calls

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(n) => n,
    None => unreachable!(),
};

/// Word → computed root. Both Arabic and Turkish roots live here, keyed by
/// the caller's language tag so the two never collide.
pub struct RootCache {
    cache: Mutex<LruCache<(RootLanguage, String), String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootLanguage {
    Arabic,
    Turkish,
}

impl RootCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
        Self { cache: Mutex::new(LruCache::new(capacity)) }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<(RootLanguage, String), String>> {
        // a panic while holding the lock leaves plain strings behind, still usable
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached root for `word`, computing and storing it on a miss.
    pub fn get_or_insert_with<F>(&self, language: RootLanguage, word: &str, compute: F) -> String
    where
        F: FnOnce() -> String,
    {
        let key = (language, word.to_string());
        {
            let mut cache = self.lock();
            if let Some(root) = cache.get(&key) {
                return root.clone();
            }
        }

        // computed outside the lock; analyzers may block
        let root = compute();
        self.lock().put(key, root.clone());
        root
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// `(entries, capacity)`
    pub fn stats(&self) -> (usize, usize) {
        let cache = self.lock();
        (cache.len(), cache.cap().get())
    }
}

impl Default for RootCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY.get())
    }
}
