use crate::LoadError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingViewModel<V> {
    pub items: Vec<V>,
    pub is_refreshing: bool,
    pub is_appending: bool,
    pub is_empty: bool,
    /// Present only while there are no items to show.
    pub refresh_slot: Option<RefreshSlotView>,
    pub append_footer: AppendFooter,
    pub dirty: bool,
}

/// Placeholder shown instead of the list while it is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSlotView {
    pub loading: bool,
    /// Outcome of the last refresh that was not in flight.
    pub outcome: Option<RefreshOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Error(LoadError),
    Empty,
}

/// Row shown after the last item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendFooter {
    Idle,
    Loading,
    Error(LoadError),
    End,
}
