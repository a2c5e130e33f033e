/*!
 * Scratch Buffer Pool
 * Reusable per-type buffers for the remove hot path
 */

use ahash::RandomState;
use crossbeam_queue::ArrayQueue;
use dashmap::DashMap;
use log::debug;
use std::any::{Any, TypeId};
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, OnceLock};

/// Max buffers retained per element type
const MAX_POOLED: usize = 16;
/// Buffers above this capacity are dropped instead of pooled
const MAX_POOLED_CAPACITY: usize = 4096;

/// One freelist per element type, created lazily on first rent
type Registry = DashMap<TypeId, Box<dyn Any + Send + Sync>, RandomState>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn freelist<T: Send + 'static>() -> Arc<ArrayQueue<Vec<T>>> {
    let registry = REGISTRY.get_or_init(|| DashMap::with_hasher(RandomState::new()));
    let entry = registry.entry(TypeId::of::<T>()).or_insert_with(|| {
        debug!(
            "creating scratch freelist for {}",
            std::any::type_name::<T>()
        );
        Box::new(Arc::new(ArrayQueue::<Vec<T>>::new(MAX_POOLED)))
    });
    // Entries are only ever inserted under their own TypeId, so the
    // downcast cannot fail.
    entry
        .downcast_ref::<Arc<ArrayQueue<Vec<T>>>>()
        .expect("scratch registry entry type mismatch")
        .clone()
}

/// Rent a cleared buffer with at least `min_capacity` slots
///
/// The returned guard hands the buffer back to its freelist when dropped,
/// on every exit path including unwinds.
pub(crate) fn rent<T: Send + 'static>(min_capacity: usize) -> Scratch<T> {
    let freelist = freelist::<T>();
    let mut buf = freelist.pop().unwrap_or_default();
    buf.reserve(min_capacity);
    Scratch {
        buf: Some(buf),
        freelist,
    }
}

/// Pooled scratch buffer that auto-returns on drop
///
/// Valid only for the duration of one call; the rent/return discipline is
/// enforced by scope, never by the caller.
pub(crate) struct Scratch<T: Send + 'static> {
    buf: Option<Vec<T>>,
    freelist: Arc<ArrayQueue<Vec<T>>>,
}

impl<T: Send + 'static> Deref for Scratch<T> {
    type Target = Vec<T>;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        self.buf.as_ref().unwrap()
    }
}

impl<T: Send + 'static> DerefMut for Scratch<T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buf.as_mut().unwrap()
    }
}

impl<T: Send + 'static> Drop for Scratch<T> {
    fn drop(&mut self) {
        if let Some(mut buf) = self.buf.take() {
            buf.clear();
            if buf.capacity() <= MAX_POOLED_CAPACITY {
                // Dropped on the floor if the freelist is already full
                let _ = self.freelist.push(buf);
            }
        }
    }
}
