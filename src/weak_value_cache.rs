//! The [WeakValueCache] is the secondary tier behind a strong, budgeted cache.
//!
//! When the strong tier evicts a buffer, ownership passes to whoever is still using it (a view, say) and we only keep
//! a [CollectibleHandle] to it.  If the buffer is still alive when it is asked for again, we hand it back instead of
//! decoding it a second time.
//!
//! Each key maps to a short list of candidates, sorted by descending size, so that a full resolution buffer is
//! preferred over a sampled placeholder whenever both are alive.  Dead candidates are allowed to linger: every
//! operation bumps a counter, and once the counter reaches the configured interval we sweep the whole map.  A memory
//! pressure signal from the host forces the sweep early.
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::candidate::Candidate;
use crate::*;

type CacheHashMap<K, V> = HashMap<K, V, ahash::RandomState>;

/// Number of operations between two sweeps of dead handles.
pub const DEFAULT_CLEANUP_INTERVAL: usize = 10;

#[derive(Clone, Debug, derive_builder::Builder)]
pub struct WeakCacheConfig {
    /// Operations (`get`, `set`, removals) between sweeps of dead handles.
    #[builder(default = "DEFAULT_CLEANUP_INTERVAL")]
    pub cleanup_interval: usize,
    /// If false, [build_weak_cache] hands out a [NullValueCache].
    #[builder(default = "true")]
    pub weak_references_enabled: bool,
}

impl Default for WeakCacheConfig {
    fn default() -> Self {
        WeakCacheConfig {
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            weak_references_enabled: true,
        }
    }
}

/// Build the weak tier described by `config`.
pub fn build_weak_cache<K, T>(config: &WeakCacheConfig) -> Arc<dyn WeakMemoryCache<K, T>>
where
    K: Hash + Eq + Send + 'static,
    T: ?Sized + Send + Sync + 'static,
{
    if config.weak_references_enabled {
        Arc::new(WeakValueCache::<K, T, Weak<T>>::new(config))
    } else {
        Arc::new(NullValueCache::new())
    }
}

pub(crate) struct CacheState<K, T: ?Sized, H> {
    pub(crate) entries: CacheHashMap<K, Vec<Candidate<T, H>>>,
    operations_since_clean_up: usize,
}

impl<K: Hash + Eq, T: ?Sized, H: CollectibleHandle<T>> CacheState<K, T, H> {
    fn insert(&mut self, key: K, buffer: &Arc<T>, is_sampled: bool, size: u64) {
        let id = BufferId::of(buffer);
        let candidates = self.entries.entry(key).or_insert_with(Vec::new);
        let new = Candidate::new(buffer, is_sampled, size);

        // Keep the list sorted by descending size, landing in front of anything of the same size.
        match candidates.iter().position(|c| size >= c.size) {
            Some(i) if candidates[i].wraps(id, buffer) => {
                log::trace!("Replacing buffer {:?} in place", id);
                candidates[i] = new;
            }
            Some(i) => candidates.insert(i, new),
            None => candidates.push(new),
        }
    }

    fn remove_id(&mut self, id: BufferId) -> bool {
        let mut removed = false;
        self.entries.retain(|_, candidates| {
            if removed {
                return true;
            }

            match candidates.iter().position(|c| c.id == id) {
                Some(i) => {
                    candidates.remove(i);
                    removed = true;
                    !candidates.is_empty()
                }
                None => true,
            }
        });
        removed
    }

    /// Drop every dead candidate, and every key left without candidates.
    fn clean_up(&mut self) {
        self.operations_since_clean_up = 0;

        let keys_before = self.entries.len();
        let mut dead = 0;
        self.entries.retain(|_, candidates| {
            if candidates.len() <= 1 {
                // Almost every key has exactly one candidate, so don't bother filtering.
                let alive = candidates.first().map_or(false, |c| c.is_alive());
                if !alive {
                    dead += candidates.len();
                }
                return alive;
            }

            let before = candidates.len();
            candidates.retain(|c| c.is_alive());
            dead += before - candidates.len();
            !candidates.is_empty()
        });

        log::debug!(
            "Weak cache sweep dropped {} keys and {} dead candidates",
            keys_before - self.entries.len(),
            dead
        );
    }
}

/// A [WeakMemoryCache] which keeps handles of type `H` in a hash map behind a single lock.
///
/// `H` is [Weak] outside of tests.
pub struct WeakValueCache<K, T: ?Sized, H = Weak<T>> {
    cleanup_interval: usize,
    state: Mutex<CacheState<K, T, H>>,
}

impl<K: Hash + Eq, T: ?Sized, H: CollectibleHandle<T>> WeakValueCache<K, T, H> {
    pub fn new(config: &WeakCacheConfig) -> WeakValueCache<K, T, H> {
        WeakValueCache {
            cleanup_interval: config.cleanup_interval,
            state: Mutex::new(CacheState {
                entries: Default::default(),
                operations_since_clean_up: 0,
            }),
        }
    }

    /// Lock the state.
    ///
    /// Every mutation leaves the map valid between statements, so a panic elsewhere doesn't make it unusable.
    pub(crate) fn state(&self) -> MutexGuard<'_, CacheState<K, T, H>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn clean_up_if_necessary(&self, state: &mut CacheState<K, T, H>) {
        state.operations_since_clean_up += 1;
        if state.operations_since_clean_up >= self.cleanup_interval {
            state.clean_up();
        }
    }

    /// Remove the first candidate with the given identity, under any key.
    ///
    /// A key left without candidates is removed with it.
    pub fn remove_id(&self, id: BufferId) -> bool {
        let mut state = self.state();
        let removed = state.remove_id(id);
        self.clean_up_if_necessary(&mut state);
        removed
    }

    /// Sweep dead handles right now, regardless of the operation counter.
    pub fn clean_up(&self) {
        self.state().clean_up();
    }

    /// Number of keys with at least one candidate, dead or alive.
    pub fn key_count(&self) -> usize {
        self.state().entries.len()
    }

    /// Number of candidates across all keys, dead or alive.
    pub fn candidate_count(&self) -> usize {
        self.state().entries.values().map(Vec::len).sum()
    }
}

impl<K: Hash + Eq, T: ?Sized> Default for WeakValueCache<K, T>
where
    Weak<T>: CollectibleHandle<T>,
{
    fn default() -> Self {
        Self::new(&Default::default())
    }
}

impl<K, T, H> WeakMemoryCache<K, T> for WeakValueCache<K, T, H>
where
    K: Hash + Eq + Send,
    T: ?Sized,
    H: CollectibleHandle<T>,
{
    fn get(&self, key: &K) -> Option<CacheValue<T>> {
        let mut state = self.state();

        // Liveness is only known at the moment we upgrade, so the first upgrade that works wins.
        let value = state
            .entries
            .get(key)
            .and_then(|candidates| candidates.iter().find_map(|c| c.value()));

        self.clean_up_if_necessary(&mut state);
        value
    }

    fn set(&self, key: K, buffer: &Arc<T>, is_sampled: bool, size: u64) {
        let mut state = self.state();
        state.insert(key, buffer, is_sampled, size);
        self.clean_up_if_necessary(&mut state);
    }

    fn remove_key(&self, key: &K) -> bool {
        let mut state = self.state();
        let removed = state.entries.remove(key).is_some();
        self.clean_up_if_necessary(&mut state);
        removed
    }

    fn remove_buffer(&self, buffer: &Arc<T>) -> bool {
        self.remove_id(BufferId::of(buffer))
    }

    fn clear_memory(&self) {
        let mut state = self.state();
        state.operations_since_clean_up = 0;
        state.entries.clear();
    }

    fn trim_memory(&self, level: TrimLevel) {
        if level.requires_sweep() {
            log::debug!("Sweeping weak cache for trim level {:?}", level);
            self.state().clean_up();
        }
    }
}
