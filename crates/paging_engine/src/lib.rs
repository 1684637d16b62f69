//! Paging engine: mutation coordinator and async paging state machine.
mod error;
mod handler;
mod modifier;
mod mutator;
mod paging;
mod source;

pub use error::PagingError;
pub use handler::{DefaultPagingDataHandler, PagingDataHandler};
pub use modifier::PagingModifier;
pub use mutator::{MutateKind, MutateScope, Mutator};
pub use paging::Paging;
pub use source::{IntKeyLoader, IntKeyPagingSource, PagingSource};

pub use paging_core::{LoadError, LoadParams, LoadResult, LoadState, PagingState};
