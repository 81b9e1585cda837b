//! The tier used when weak references are disabled.
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::*;

/// A [WeakMemoryCache] which holds nothing and always misses.
pub struct NullValueCache<K, T: ?Sized> {
    _marker: PhantomData<fn(K, Arc<T>)>,
}

impl<K, T: ?Sized> NullValueCache<K, T> {
    pub fn new() -> NullValueCache<K, T> {
        NullValueCache {
            _marker: PhantomData,
        }
    }
}

impl<K, T: ?Sized> Default for NullValueCache<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, T: ?Sized> WeakMemoryCache<K, T> for NullValueCache<K, T> {
    fn get(&self, _key: &K) -> Option<CacheValue<T>> {
        None
    }

    fn set(&self, _key: K, _buffer: &Arc<T>, _is_sampled: bool, _size: u64) {}

    fn remove_key(&self, _key: &K) -> bool {
        false
    }

    fn remove_buffer(&self, _buffer: &Arc<T>) -> bool {
        false
    }

    fn clear_memory(&self) {}

    fn trim_memory(&self, _level: TrimLevel) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_retains() {
        let cache = NullValueCache::<&str, Vec<u8>>::new();
        let buf = Arc::new(vec![1u8, 2, 3]);

        cache.set("a", &buf, false, 3);
        assert!(cache.get(&"a").is_none());
        assert!(!cache.remove_key(&"a"));
        assert!(!cache.remove_buffer(&buf));
        cache.trim_memory(TrimLevel::Complete);
        cache.clear_memory();

        // We must not have kept a reference of any kind.
        assert_eq!(Arc::strong_count(&buf), 1);
        assert_eq!(Arc::weak_count(&buf), 0);
    }
}
