use thiserror::Error;

use crate::MutateKind;

/// Error returned by coordinated operations.
///
/// Load failures are not represented here: they are published as
/// `LoadState::Error` in the snapshot instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PagingError {
    /// The operation was preempted, rejected because another exclusive
    /// operation was running, or aborted by the data source.
    #[error("cancelled")]
    Cancelled,
    /// A coordinated operation was invoked from inside a block already
    /// running under the same mutator.
    #[error("nested invoke inside {0}")]
    Nested(MutateKind),
}

impl PagingError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PagingError::Cancelled)
    }
}
