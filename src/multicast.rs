/*!
 * Multicast Function Container
 * Immutable fan-out callables with combine/remove algebra
 */

use crate::algebra::{self, Difference, Removals};
use crate::errors::{InvokeError, InvokeResult};
use crate::handle::Handle;
use log::debug;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Multiplier for the polynomial sequence hash; part of the hash contract,
/// not an implementation detail.
const HASH_MULTIPLIER: u64 = 33;

/// An immutable, ordered sequence of callable handles
///
/// Every operation either returns a container sharing the receiver's
/// backing sequence (the no-op fast path) or allocates a new, exactly sized
/// one; a constructed sequence is never mutated. A container always holds
/// at least one handle — "nothing left to call" is `Option::None`, not a
/// zero-length instance.
///
/// # Performance
///
/// - **Clone**: reference-count bump, no copy
/// - **Remove**: one exact-size allocation at most; scratch comes from a
///   shared pool
/// - **Invoke**: zero allocations with a caller-supplied buffer
///
/// # Examples
///
/// ```
/// use multicast_fn::{Handle, MulticastFn};
///
/// let forty_one = Handle::new(|| 41);
/// let forty_two = Handle::new(|| 42);
///
/// let multicast = MulticastFn::new(forty_one.clone()).with(forty_two);
/// assert_eq!(multicast.invoke(()), vec![41, 42]);
///
/// let remaining = multicast.remove_handle(&forty_one).unwrap();
/// assert_eq!(remaining.invoke(()), vec![42]);
/// ```
pub struct MulticastFn<A: 'static, R: 'static> {
    handles: Arc<[Handle<A, R>]>,
}

impl<A: 'static, R: 'static> MulticastFn<A, R> {
    /// Wrap a single handle
    pub fn new(handle: Handle<A, R>) -> Self {
        Self {
            handles: vec![handle].into(),
        }
    }

    /// Build a container from a handle sequence, preserving order and
    /// multiplicity; an empty sequence collapses to `None`
    pub fn from_handles(handles: Vec<Handle<A, R>>) -> Option<Self> {
        if handles.is_empty() {
            None
        } else {
            Some(Self {
                handles: handles.into(),
            })
        }
    }

    /// Number of held handles, always at least one
    #[inline]
    pub fn count(&self) -> usize {
        self.handles.len()
    }

    /// The backing sequence, in invocation order
    #[inline]
    pub fn handles(&self) -> &[Handle<A, R>] {
        &self.handles
    }

    /// Iterate the held handles in invocation order
    pub fn iter(&self) -> std::slice::Iter<'_, Handle<A, R>> {
        self.handles.iter()
    }

    /// Whether both containers share one backing sequence
    ///
    /// True for clones and for the results of no-op removals.
    pub fn shares_backing(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.handles, &other.handles)
    }

    /// Concatenate, keeping `self`'s handles first in their original order,
    /// then `other`'s
    ///
    /// Duplicates stay as independent occurrences; neither input is mutated.
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            handles: algebra::concat(&self.handles, &other.handles),
        }
    }

    /// Append a single handle
    pub fn with(&self, handle: Handle<A, R>) -> Self {
        Self {
            handles: algebra::concat(&self.handles, std::slice::from_ref(&handle)),
        }
    }

    /// Multiset difference: cancel one occurrence of each of `other`'s
    /// handles against a matching occurrence in `self`
    ///
    /// Survivors keep their relative order. When nothing matches, the result
    /// shares `self`'s backing sequence; when everything is cancelled the
    /// container collapses to `None`.
    pub fn remove(&self, other: &Self) -> Option<Self> {
        self.apply(algebra::difference(
            &self.handles,
            Removals::Shared(&other.handles),
        ))
    }

    /// Multiset difference over a caller-owned removal sequence
    ///
    /// Taking the sequence by value grants destructive reuse of its buffer,
    /// saving one scratch copy on the hot path.
    pub fn remove_owned(&self, removals: Vec<Handle<A, R>>) -> Option<Self> {
        self.apply(algebra::difference(&self.handles, Removals::Owned(removals)))
    }

    /// Remove one occurrence of a single handle
    pub fn remove_handle(&self, handle: &Handle<A, R>) -> Option<Self> {
        self.apply(algebra::difference(
            &self.handles,
            Removals::Shared(std::slice::from_ref(handle)),
        ))
    }

    fn apply(&self, outcome: Difference<Handle<A, R>>) -> Option<Self> {
        match outcome {
            Difference::Unchanged => Some(self.clone()),
            Difference::Emptied => {
                debug!("every handle removed, collapsing to the empty state");
                None
            }
            Difference::Survivors(handles) => Some(Self { handles }),
        }
    }

    /// Concatenate two optional containers, treating `None` as empty
    pub fn combine_opt(a: Option<&Self>, b: Option<&Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.combine(b)),
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (None, None) => None,
        }
    }

    /// Multiset difference over optional containers, treating `None` as empty
    pub fn remove_opt(a: Option<&Self>, b: Option<&Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => a.remove(b),
            (a, None) => a.cloned(),
            (None, Some(_)) => None,
        }
    }

    /// Order-sensitive sequence hash
    ///
    /// A single-handle container returns the bare element hash; longer
    /// sequences fold left to right as `h = h * 33 + hash(e)` with wrapping
    /// arithmetic. Both the multiplier and the single-element bypass are
    /// contractual: callers may compare stored hashes against this exact
    /// formula.
    pub fn hash_value(&self) -> u64 {
        if self.handles.len() == 1 {
            return self.handles[0].hash_value();
        }
        let mut hash: u64 = 0;
        for handle in self.handles.iter() {
            hash = hash
                .wrapping_mul(HASH_MULTIPLIER)
                .wrapping_add(handle.hash_value());
        }
        hash
    }
}

impl<A: Clone + 'static, R: 'static> MulticastFn<A, R> {
    /// Call every handle in order, collecting results into a fresh,
    /// exactly sized buffer
    ///
    /// A panicking handle propagates immediately; results computed before
    /// the failure are discarded with the buffer.
    pub fn invoke(&self, args: A) -> Vec<R> {
        let mut results = Vec::with_capacity(self.handles.len());
        for handle in self.handles.iter() {
            results.push(handle.invoke(args.clone()));
        }
        results
    }

    /// Call every handle in order, writing result `i` into `buffer[i]`, and
    /// return the written prefix
    ///
    /// Fails with [`InvokeError::BufferTooSmall`] before any invocation if
    /// the buffer holds fewer than [`count()`](Self::count) slots. A
    /// panicking handle propagates immediately: slots before the failure
    /// hold their computed results, slots at and after it keep their prior
    /// contents. No rollback.
    pub fn invoke_into<'buf>(&self, args: A, buffer: &'buf mut [R]) -> InvokeResult<&'buf [R]> {
        let count = self.handles.len();
        if buffer.len() < count {
            return Err(InvokeError::BufferTooSmall {
                needed: count,
                available: buffer.len(),
            });
        }
        for (slot, handle) in buffer[..count].iter_mut().zip(self.handles.iter()) {
            *slot = handle.invoke(args.clone());
        }
        Ok(&buffer[..count])
    }
}

impl<A: 'static, R: 'static> Clone for MulticastFn<A, R> {
    fn clone(&self) -> Self {
        Self {
            handles: Arc::clone(&self.handles),
        }
    }
}

impl<A: 'static, R: 'static> From<Handle<A, R>> for MulticastFn<A, R> {
    fn from(handle: Handle<A, R>) -> Self {
        Self::new(handle)
    }
}

impl<A: 'static, R: 'static> PartialEq for MulticastFn<A, R> {
    fn eq(&self, other: &Self) -> bool {
        self.handles.len() == other.handles.len()
            && self
                .handles
                .iter()
                .zip(other.handles.iter())
                .all(|(a, b)| a == b)
    }
}

impl<A: 'static, R: 'static> Eq for MulticastFn<A, R> {}

impl<A: 'static, R: 'static> Hash for MulticastFn<A, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl<A: 'static, R: 'static> fmt::Debug for MulticastFn<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MulticastFn")
            .field("count", &self.count())
            .field("handles", &self.handles)
            .finish()
    }
}

impl<'a, A: 'static, R: 'static> IntoIterator for &'a MulticastFn<A, R> {
    type Item = &'a Handle<A, R>;
    type IntoIter = std::slice::Iter<'a, Handle<A, R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.iter()
    }
}
