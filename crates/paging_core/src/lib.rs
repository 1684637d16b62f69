//! Paging core: snapshot types, list edits and the pure presentation adapter.
pub mod edit;
mod effect;
mod load;
mod load_state;
mod msg;
mod presenter;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use load::{LoadParams, LoadResult};
pub use load_state::{LoadError, LoadState};
pub use msg::Msg;
pub use presenter::PresenterState;
pub use state::{Lane, PagingState};
pub use update::update;
pub use view_model::{AppendFooter, PagingViewModel, RefreshOutcome, RefreshSlotView};
