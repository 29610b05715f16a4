//! Error types for the Whirlwind engine.
//!
//! There is exactly one real error kind an engine call can surface, plus a
//! handful of silent-ignore cases that are not errors at all (they return
//! `0`/`()`, see `router` and the `randomize_range` implementation).

use core::fmt;

/// Errors an engine operation can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "whirlwind errors must be handled, not silently discarded"]
pub enum WhirlwindError {
    /// Copying generated bytes into a caller-supplied (user-space) buffer
    /// failed partway through. The partially generated block has already
    /// been zeroed before this is returned.
    AddressFault,
}

/// Result type alias for engine operations.
pub type WhirlwindResult<T> = Result<T, WhirlwindError>;

impl fmt::Display for WhirlwindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddressFault => write!(f, "fault while copying random bytes to destination"),
        }
    }
}
