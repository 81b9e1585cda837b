//! A secondary cache of weak references to large decoded buffers, such as images.
//!
//! Decoding an image is expensive, and a strong, size-bounded cache in front of the decoder can only hold so much.
//! When that cache evicts a buffer, something else (a view, say) is often still using it.  Rather than forget it
//! entirely, the strong cache hands it to this crate, which keeps only a non-owning handle.  As long as anything
//! outside the cache keeps the buffer alive, asking for it again returns the same buffer instead of decoding it a
//! second time.
//!
//! [WeakValueCache] is the real implementation.  Each key can map to more than one buffer (a sampled placeholder and a
//! full-resolution result, for instance), and the largest live one wins.  Dead handles are swept every few operations,
//! or immediately when the host reports memory pressure through [WeakMemoryCache::trim_memory].
//!
//! [NullValueCache] is the same contract with nothing behind it, for when the tier is disabled.  Use
//! [build_weak_cache] with a [WeakCacheConfig] to get whichever one the configuration asks for.
mod candidate;
mod null_value_cache;
mod traits;
mod trim_level;
mod weak_value_cache;

pub use candidate::BufferId;
pub use null_value_cache::*;
pub use traits::*;
pub use trim_level::*;
pub use weak_value_cache::*;
