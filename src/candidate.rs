//! An internal cell holding one buffer registered under a key, plus the identity it had when registered.
use std::marker::PhantomData;
use std::sync::Arc;

use crate::*;

/// The identity of a buffer: the address of its shared allocation.
///
/// Captured at registration time so it stays comparable after the handle has been cleared.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BufferId(usize);

impl BufferId {
    pub fn of<T: ?Sized>(buffer: &Arc<T>) -> BufferId {
        BufferId(Arc::as_ptr(buffer) as *const () as usize)
    }
}

pub(crate) struct Candidate<T: ?Sized, H> {
    pub(crate) id: BufferId,
    pub(crate) handle: H,
    pub(crate) is_sampled: bool,
    pub(crate) size: u64,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized, H: CollectibleHandle<T>> Candidate<T, H> {
    pub(crate) fn new(buffer: &Arc<T>, is_sampled: bool, size: u64) -> Candidate<T, H> {
        Candidate {
            id: BufferId::of(buffer),
            handle: H::from_strong(buffer),
            is_sampled,
            size,
            _marker: PhantomData,
        }
    }

    /// Read the value out, if the buffer is still alive.
    pub(crate) fn value(&self) -> Option<CacheValue<T>> {
        self.handle.try_get().map(|buffer| CacheValue {
            buffer,
            is_sampled: self.is_sampled,
        })
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.handle.try_get().is_some()
    }

    /// Whether this candidate currently wraps exactly `buffer`.
    pub(crate) fn wraps(&self, id: BufferId, buffer: &Arc<T>) -> bool {
        self.id == id
            && self
                .handle
                .try_get()
                .map_or(false, |x| Arc::ptr_eq(&x, buffer))
    }
}
