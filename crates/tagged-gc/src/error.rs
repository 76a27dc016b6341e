//! Collector error types

use crate::object::ObjectRef;
use thiserror::Error;

/// Result type alias for collector operations
pub type GcResult<T> = Result<T, GcError>;

/// Errors reported by the collector context.
///
/// Every variant is a contract violation by the caller or the environment.
/// The collector never retries or partially recovers; the caller decides
/// whether to `collect()` and try again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GcError {
    /// Push onto a full root stack
    #[error("root stack overflow")]
    StackOverflow,

    /// Pop or pair construction with too few operands on the root stack
    #[error("root stack underflow")]
    StackUnderflow,

    /// The heap cannot satisfy an allocation request
    #[error("out of memory")]
    OutOfMemory,

    /// Handle to an object that was reclaimed or never allocated here
    #[error("invalid object reference {0}")]
    InvalidRef(ObjectRef),

    /// Child access on an object that is not a pair
    #[error("object {0} is not a pair")]
    NotAPair(ObjectRef),

    /// Heap invariant violation found by `verify`
    #[error("heap corrupted: {0}")]
    HeapCorrupted(String),

    /// Rejected collector configuration
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(GcError::StackOverflow.to_string(), "root stack overflow");
        assert_eq!(GcError::StackUnderflow.to_string(), "root stack underflow");
        assert_eq!(GcError::OutOfMemory.to_string(), "out of memory");

        let stale = ObjectRef::from_parts(3, 1);
        assert_eq!(
            GcError::InvalidRef(stale).to_string(),
            "invalid object reference #3.1"
        );
    }
}
