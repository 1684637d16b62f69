use std::sync::Arc;

use crate::PagingState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg<V> {
    /// The list view was attached to the paging engine.
    Attached,
    /// The engine published a new snapshot.
    Snapshot(Arc<PagingState<V>>),
    /// A render pass drew the item at `index`.
    ItemRendered { index: usize },
    /// User asked for a refresh (pull-to-refresh).
    RefreshRequested,
    /// Fallback for placeholder wiring.
    NoOp,
}
