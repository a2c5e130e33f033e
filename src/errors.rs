/*!
 * Error Types
 * Invocation error taxonomy with thiserror and miette support
 */

use miette::Diagnostic;
use thiserror::Error;

/// Errors surfaced by fan-out invocation
///
/// A failing handle is not represented here: handles propagate their own
/// panics uncaught, with any results written so far left in the buffer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Diagnostic)]
pub enum InvokeError {
    #[error("result buffer too small: {needed} slots required, {available} available")]
    #[diagnostic(
        code(multicast::buffer_too_small),
        help("Retry with a buffer holding at least `count()` slots.")
    )]
    BufferTooSmall { needed: usize, available: usize },
}

/// Result type for invocation operations
pub type InvokeResult<T> = Result<T, InvokeError>;
