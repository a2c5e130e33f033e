/*!
 * Multicast Function Containers
 * Immutable fan-out callables with combine/remove algebra
 */

mod algebra;
mod pool;

pub mod errors;
pub mod handle;
pub mod multicast;

// Re-exports
pub use errors::{InvokeError, InvokeResult};
pub use handle::{Call, Handle};
pub use multicast::MulticastFn;
