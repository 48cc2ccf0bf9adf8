use alloc::collections::TryReserveError;
use core::fmt;

/// Errors reported by mutating tree operations.
///
/// Every variant is raised before the node graph is touched, so a failed call
/// leaves the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The insertion would grow the tree past its maximum element count
    CapacityExceeded {
        /// The maximum number of elements the tree accepts
        max_size: usize,
    },
    /// The node allocator could not provide storage for a new node
    AllocationFailed(TryReserveError),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { max_size } => {
                write!(f, "tree size would exceed the maximum of {max_size} elements")
            }
            Self::AllocationFailed(err) => write!(f, "node allocation failed: {err}"),
        }
    }
}

impl core::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::CapacityExceeded { .. } => None,
            Self::AllocationFailed(err) => Some(err),
        }
    }
}

impl From<TryReserveError> for TreeError {
    #[inline]
    fn from(err: TryReserveError) -> Self {
        Self::AllocationFailed(err)
    }
}

/// Unwraps an insertion made through an interface that cannot report errors,
/// such as [`Extend`], panicking the way `Vec::push` does on overflow.
pub(crate) fn insert_or_panic<T>(result: Result<T, TreeError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("insertion failed: {err}"),
    }
}
