/*!
 * Sequence Algebra
 * Concatenation and multiset difference over immutable sequences
 */

use crate::pool::{self, Scratch};
use std::sync::Arc;

/// Outcome of a multiset difference
pub(crate) enum Difference<T> {
    /// Nothing in the removal set matched; the caller keeps its original
    /// sequence by reference
    Unchanged,
    /// Every element was cancelled
    Emptied,
    /// The surviving elements, in their original relative order
    Survivors(Arc<[T]>),
}

/// Removal set handed to [`difference`]
///
/// `Owned` transfers ownership of the caller's buffer and consumes it in
/// place, saving the scratch copy; `Shared` copies the set into pooled
/// scratch first. A caller passing `Owned` forfeits the buffer's contents.
pub(crate) enum Removals<'a, T: Send + 'static> {
    Shared(&'a [T]),
    Owned(Vec<T>),
}

impl<T: Send + 'static> Removals<'_, T> {
    fn len(&self) -> usize {
        match self {
            Removals::Shared(slice) => slice.len(),
            Removals::Owned(vec) => vec.len(),
        }
    }
}

/// Working copy of the removal set, consumed in place during the scan
enum Working<T: Send + 'static> {
    Caller(Vec<T>),
    Pooled(Scratch<T>),
}

impl<T: Send + 'static> Working<T> {
    #[inline]
    fn as_mut_slice(&mut self) -> &mut [T] {
        match self {
            Working::Caller(vec) => vec,
            Working::Pooled(scratch) => scratch,
        }
    }
}

/// Concatenate `a` and `b` into a freshly allocated sequence, `a` first
///
/// Neither input is mutated; duplicates are kept as independent occurrences.
pub(crate) fn concat<T: Clone>(a: &[T], b: &[T]) -> Arc<[T]> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    merged.extend_from_slice(a);
    merged.extend_from_slice(b);
    merged.into()
}

/// Remove one occurrence per removal-set element from `a`, preserving the
/// relative order of the survivors
///
/// Two-pointer scan over a shrinking active region of the working copy:
/// each element of `a` is searched in the active region; a match consumes
/// one slot by swapping the last active element in and shrinking the
/// region, a miss survives into pooled output scratch. Once the region is
/// exhausted the rest of `a` is kept in one bulk copy.
pub(crate) fn difference<T>(a: &[T], removals: Removals<'_, T>) -> Difference<T>
where
    T: PartialEq + Clone + Send + 'static,
{
    if a.is_empty() || removals.len() == 0 {
        return Difference::Unchanged;
    }

    let mut working = match removals {
        Removals::Owned(vec) => Working::Caller(vec),
        Removals::Shared(slice) => {
            let mut scratch = pool::rent::<T>(slice.len());
            scratch.extend_from_slice(slice);
            Working::Pooled(scratch)
        }
    };

    let initial = working.as_mut_slice().len();
    let mut active = initial;
    let mut survivors = pool::rent::<T>(a.len());

    for (index, item) in a.iter().enumerate() {
        if active == 0 {
            // Nothing left to cancel; keep the rest of `a` in one copy.
            survivors.extend_from_slice(&a[index..]);
            break;
        }
        let working = working.as_mut_slice();
        match working[..active].iter().position(|candidate| candidate == item) {
            Some(matched) => {
                // Consume one occurrence: swap the last active element into
                // the matched slot and shrink the region. Order within the
                // working copy is scratch-only.
                active -= 1;
                working.swap(matched, active);
            }
            None => survivors.push(item.clone()),
        }
    }

    if active == initial {
        Difference::Unchanged
    } else if survivors.is_empty() {
        Difference::Emptied
    } else {
        Difference::Survivors(survivors.as_slice().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn survivors_of(outcome: Difference<i32>) -> Vec<i32> {
        match outcome {
            Difference::Survivors(seq) => seq.to_vec(),
            Difference::Unchanged => panic!("expected survivors, got Unchanged"),
            Difference::Emptied => panic!("expected survivors, got Emptied"),
        }
    }

    #[test]
    fn test_concat_length_and_order() {
        let merged = concat(&[1, 2], &[3, 4, 5]);
        assert_eq!(merged.as_ref(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_concat_keeps_duplicates() {
        let merged = concat(&[7, 7], &[7]);
        assert_eq!(merged.as_ref(), &[7, 7, 7]);
    }

    #[test]
    fn test_difference_removes_one_occurrence_per_entry() {
        let outcome = difference(&[1, 1, 2], Removals::Shared(&[1]));
        assert_eq!(survivors_of(outcome), vec![1, 2]);
    }

    #[test]
    fn test_difference_preserves_survivor_order() {
        let outcome = difference(&[5, 4, 3, 2, 1], Removals::Shared(&[4, 2]));
        assert_eq!(survivors_of(outcome), vec![5, 3, 1]);
    }

    #[test]
    fn test_difference_unmatched_is_unchanged() {
        let outcome = difference(&[1, 2, 3], Removals::Shared(&[9, 8]));
        assert!(matches!(outcome, Difference::Unchanged));
    }

    #[test]
    fn test_difference_empty_removals_is_unchanged() {
        let outcome = difference(&[1, 2, 3], Removals::Shared(&[]));
        assert!(matches!(outcome, Difference::Unchanged));
    }

    #[test]
    fn test_difference_cancelling_everything_empties() {
        let outcome = difference(&[1, 2], Removals::Shared(&[2, 1]));
        assert!(matches!(outcome, Difference::Emptied));
    }

    #[test]
    fn test_difference_excess_removals_still_empty() {
        let outcome = difference(&[1], Removals::Shared(&[1, 1, 1]));
        assert!(matches!(outcome, Difference::Emptied));
    }

    #[test]
    fn test_difference_bulk_tail_after_exhaustion() {
        // Removal set exhausted at index 1; the tail survives verbatim.
        let outcome = difference(&[9, 1, 2, 3, 1], Removals::Shared(&[1]));
        assert_eq!(survivors_of(outcome), vec![9, 2, 3, 1]);
    }

    #[test]
    fn test_difference_owned_matches_shared() {
        let shared = difference(&[1, 2, 2, 3], Removals::Shared(&[2, 3]));
        let owned = difference(&[1, 2, 2, 3], Removals::Owned(vec![2, 3]));
        assert_eq!(survivors_of(shared), survivors_of(owned));
    }
}
