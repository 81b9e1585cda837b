//! The [WeakMemoryCache] trait is the contract shared by the real and the null weak tier.
//!
//! The strong tier calls [WeakMemoryCache::set] when it evicts something; readers call [WeakMemoryCache::get] before
//! decoding again.
use std::hash::Hash;
use std::sync::{Arc, Weak};

use crate::*;

/// A value handed back from the weak tier.
#[derive(Debug)]
pub struct CacheValue<T: ?Sized> {
    pub buffer: Arc<T>,
    /// Whether the buffer is a downsampled variant of the full image.
    pub is_sampled: bool,
}

impl<T: ?Sized> Clone for CacheValue<T> {
    fn clone(&self) -> Self {
        CacheValue {
            buffer: self.buffer.clone(),
            is_sampled: self.is_sampled,
        }
    }
}

/// A non-owning reference to a buffer which may be reclaimed at any time.
///
/// [Weak] is the production implementation.  Anything holding a strong reference keeps the buffer alive; a handle
/// must never do so.
pub trait CollectibleHandle<T: ?Sized>: Send + Sync + 'static {
    fn from_strong(value: &Arc<T>) -> Self;

    /// Get the buffer back if something else is still keeping it alive.
    fn try_get(&self) -> Option<Arc<T>>;
}

impl<T: ?Sized + Send + Sync + 'static> CollectibleHandle<T> for Weak<T> {
    fn from_strong(value: &Arc<T>) -> Self {
        Arc::downgrade(value)
    }

    fn try_get(&self) -> Option<Arc<T>> {
        self.upgrade()
    }
}

/// A secondary cache which never extends the lifetime of what it holds.
///
/// Nothing here can fail: a dead or absent buffer is a plain miss.
pub trait WeakMemoryCache<K: Hash + Eq, T: ?Sized>: Send + Sync {
    /// Get the largest live buffer registered for `key`.
    fn get(&self, key: &K) -> Option<CacheValue<T>>;

    /// Register `buffer` as a candidate for `key`, without taking ownership of it.
    fn set(&self, key: K, buffer: &Arc<T>, is_sampled: bool, size: u64);

    /// Remove every candidate for `key`.  Returns whether the key was present.
    fn remove_key(&self, key: &K) -> bool;

    /// Remove the first candidate wrapping `buffer`, under any key.
    fn remove_buffer(&self, buffer: &Arc<T>) -> bool;

    /// Remove everything.
    fn clear_memory(&self);

    /// React to a memory pressure signal from the host.
    fn trim_memory(&self, level: TrimLevel);
}
