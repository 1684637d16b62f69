use std::sync::Arc;

use crate::view_model::{AppendFooter, PagingViewModel, RefreshOutcome, RefreshSlotView};
use crate::{LoadState, PagingState};

/// Presentation-side view of one paging engine.
///
/// Holds the latest published snapshot and derives read-only view models from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenterState<V> {
    snapshot: Arc<PagingState<V>>,
    attached: bool,
    last_settled_refresh: Option<LoadState>,
    dirty: bool,
}

impl<V> Default for PresenterState<V> {
    fn default() -> Self {
        Self {
            snapshot: Arc::new(PagingState::default()),
            attached: false,
            last_settled_refresh: None,
            dirty: false,
        }
    }
}

impl<V> PresenterState<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Returns true only for the first attach.
    pub(crate) fn attach(&mut self) -> bool {
        let first = !self.attached;
        self.attached = true;
        first
    }

    pub(crate) fn apply_snapshot(&mut self, snapshot: Arc<PagingState<V>>) {
        if !snapshot.refresh_load_state.is_loading() {
            self.last_settled_refresh = Some(snapshot.refresh_load_state.clone());
        }
        self.snapshot = snapshot;
        self.dirty = true;
    }

    /// Append is due when the last loaded item is rendered, no refresh is in
    /// flight and the append lane still expects more pages.
    pub fn should_append_at(&self, index: usize) -> bool {
        let Some(last_index) = self.snapshot.items.len().checked_sub(1) else {
            return false;
        };
        last_index == index
            && !self.snapshot.refresh_load_state.is_loading()
            && self.snapshot.append_load_state.is_incomplete()
    }

    /// Returns the dirty flag and clears it.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn refresh_slot(&self) -> Option<RefreshSlotView> {
        if !self.snapshot.is_empty() {
            return None;
        }
        let outcome = match &self.last_settled_refresh {
            Some(LoadState::Error(err)) => Some(RefreshOutcome::Error(err.clone())),
            Some(LoadState::NotLoading {
                end_of_pagination_reached: true,
            }) => Some(RefreshOutcome::Empty),
            _ => None,
        };
        Some(RefreshSlotView {
            loading: self.snapshot.refresh_load_state.is_loading(),
            outcome,
        })
    }

    fn append_footer(&self) -> AppendFooter {
        match &self.snapshot.append_load_state {
            LoadState::Loading => AppendFooter::Loading,
            LoadState::Error(err) => AppendFooter::Error(err.clone()),
            LoadState::NotLoading {
                end_of_pagination_reached: true,
            } => AppendFooter::End,
            LoadState::NotLoading {
                end_of_pagination_reached: false,
            } => AppendFooter::Idle,
        }
    }
}

impl<V: Clone> PresenterState<V> {
    pub fn view(&self) -> PagingViewModel<V> {
        PagingViewModel {
            items: self.snapshot.items.clone(),
            is_refreshing: self.snapshot.refresh_load_state.is_loading(),
            is_appending: self.snapshot.append_load_state.is_loading(),
            is_empty: self.snapshot.is_empty(),
            refresh_slot: self.refresh_slot(),
            append_footer: self.append_footer(),
            dirty: self.dirty,
        }
    }
}
