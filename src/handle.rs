/*!
 * Callable Handles
 * Opaque function references with registration identity
 */

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Tuple calling convention for multicast targets
///
/// Blanket implementations adapt plain `Fn` closures and functions of
/// arities 0 through 8, so the container logic stays generic over a single
/// argument tuple type while callers write ordinary closures.
pub trait Call<A, R>: Send + Sync {
    fn call(&self, args: A) -> R;
}

impl<F, R> Call<(), R> for F
where
    F: Fn() -> R + Send + Sync,
{
    #[inline]
    fn call(&self, (): ()) -> R {
        self()
    }
}

macro_rules! impl_call_for_arity {
    ($(($($ty:ident $idx:tt),+))+) => {
        $(
            impl<F, R, $($ty),+> Call<($($ty,)+), R> for F
            where
                F: Fn($($ty),+) -> R + Send + Sync,
            {
                #[inline]
                fn call(&self, args: ($($ty,)+)) -> R {
                    (self)($(args.$idx),+)
                }
            }
        )+
    };
}

impl_call_for_arity! {
    (A1 0)
    (A1 0, A2 1)
    (A1 0, A2 1, A3 2)
    (A1 0, A2 1, A3 2, A4 3)
    (A1 0, A2 1, A3 2, A4 3, A5 4)
    (A1 0, A2 1, A3 2, A4 3, A5 4, A6 5)
    (A1 0, A2 1, A3 2, A4 3, A5 4, A6 5, A7 6)
    (A1 0, A2 1, A3 2, A4 3, A5 4, A6 5, A7 6, A8 7)
}

/// Opaque reference to one callable target plus its captured state
///
/// Handles are compared and hashed as indivisible units and never
/// introspected. Identity is per registration: clones of one handle compare
/// equal, while two separate `Handle::new` calls over textually identical
/// closures do not. Removing a target from a container therefore requires a
/// clone of the handle that was added.
pub struct Handle<A: 'static, R: 'static> {
    target: Arc<dyn Call<A, R>>,
}

impl<A: 'static, R: 'static> Handle<A, R> {
    /// Register a callable target
    pub fn new<F>(target: F) -> Self
    where
        F: Call<A, R> + 'static,
    {
        Self {
            target: Arc::new(target),
        }
    }

    /// Call the target with the given argument tuple
    #[inline]
    pub fn invoke(&self, args: A) -> R {
        self.target.call(args)
    }

    /// Hash of this handle as an indivisible unit
    ///
    /// Fed into the container's polynomial hash; stable for the lifetime of
    /// the registration.
    #[inline]
    pub fn hash_value(&self) -> u64 {
        self.address() as u64
    }

    #[inline]
    fn address(&self) -> usize {
        Arc::as_ptr(&self.target) as *const () as usize
    }
}

impl<A: 'static, R: 'static> Clone for Handle<A, R> {
    fn clone(&self) -> Self {
        Self {
            target: Arc::clone(&self.target),
        }
    }
}

impl<A: 'static, R: 'static> PartialEq for Handle<A, R> {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl<A: 'static, R: 'static> Eq for Handle<A, R> {}

impl<A: 'static, R: 'static> Hash for Handle<A, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl<A: 'static, R: 'static> fmt::Debug for Handle<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("target", &format_args!("{:#x}", self.address()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clones_share_identity() {
        let handle = Handle::new(|| 42);
        let clone = handle.clone();

        assert_eq!(handle, clone);
        assert_eq!(handle.hash_value(), clone.hash_value());
    }

    #[test]
    fn test_separate_registrations_are_distinct() {
        let first: Handle<(), i32> = Handle::new(|| 42);
        let second: Handle<(), i32> = Handle::new(|| 42);

        assert_ne!(first, second);
    }

    #[test]
    fn test_invoke_zero_arity() {
        let handle = Handle::new(|| 42);
        assert_eq!(handle.invoke(()), 42);
    }

    #[test]
    fn test_invoke_captured_state() {
        let offset = 10;
        let handle = Handle::new(move |value: i32| value + offset);
        assert_eq!(handle.invoke((32,)), 42);
    }

    #[test]
    fn test_invoke_two_args() {
        let handle = Handle::new(|a: i32, b: i32| a * b);
        assert_eq!(handle.invoke((6, 7)), 42);
    }

    #[test]
    fn test_invoke_eight_args() {
        let handle = Handle::new(
            |a: i32, b: i32, c: i32, d: i32, e: i32, f: i32, g: i32, h: i32| {
                a + b + c + d + e + f + g + h
            },
        );
        assert_eq!(handle.invoke((1, 2, 3, 4, 5, 6, 7, 8)), 36);
    }

    #[test]
    fn test_function_items_adapt() {
        fn double(value: u64) -> u64 {
            value * 2
        }

        let handle = Handle::new(double);
        assert_eq!(handle.invoke((21,)), 42);
    }
}
