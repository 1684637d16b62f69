use crate::LoadState;

/// Immutable snapshot published by the paging engine.
///
/// Every mutation builds a new snapshot with one of the `with_*` helpers;
/// observers never see a partially updated value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingState<V> {
    pub items: Vec<V>,
    pub refresh_load_state: LoadState,
    pub append_load_state: LoadState,
}

impl<V> Default for PagingState<V> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            refresh_load_state: LoadState::default(),
            append_load_state: LoadState::default(),
        }
    }
}

impl<V: Clone> PagingState<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(&self, items: Vec<V>) -> Self {
        Self {
            items,
            refresh_load_state: self.refresh_load_state.clone(),
            append_load_state: self.append_load_state.clone(),
        }
    }

    pub fn with_refresh_load_state(&self, state: LoadState) -> Self {
        Self {
            items: self.items.clone(),
            refresh_load_state: state,
            append_load_state: self.append_load_state.clone(),
        }
    }

    pub fn with_append_load_state(&self, state: LoadState) -> Self {
        Self {
            items: self.items.clone(),
            refresh_load_state: self.refresh_load_state.clone(),
            append_load_state: state,
        }
    }

    pub fn with_lane(&self, lane: Lane, state: LoadState) -> Self {
        match lane {
            Lane::Refresh => self.with_refresh_load_state(state),
            Lane::Append => self.with_append_load_state(state),
        }
    }
}

impl<V> PagingState<V> {
    pub fn lane(&self, lane: Lane) -> &LoadState {
        match lane {
            Lane::Refresh => &self.refresh_load_state,
            Lane::Append => &self.append_load_state,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One of the two loading lanes of a paging engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    Refresh,
    Append,
}
