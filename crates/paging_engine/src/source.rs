use async_trait::async_trait;
use paging_core::{LoadError, LoadParams, LoadResult};

/// Asynchronous, cancellable page provider.
///
/// Invoked exactly once per refresh or append attempt. Cancellation drops the
/// returned future. Returning `LoadResult::None` aborts the load without any
/// state change.
#[async_trait]
pub trait PagingSource<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    async fn load(&self, params: LoadParams<K>) -> Result<LoadResult<K, V>, LoadError>;
}

/// Loads the items of one integer-keyed page.
#[async_trait]
pub trait IntKeyLoader<V>: Send + Sync
where
    V: Send + Sync,
{
    async fn load_page(&self, params: &LoadParams<u32>) -> Result<Vec<V>, LoadError>;
}

/// Adapts an [`IntKeyLoader`] into a [`PagingSource`] whose next key is
/// `key + 1` after a non-empty page and `None` after an empty one.
#[derive(Debug, Clone)]
pub struct IntKeyPagingSource<L> {
    loader: L,
}

impl<L> IntKeyPagingSource<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }
}

#[async_trait]
impl<V, L> PagingSource<u32, V> for IntKeyPagingSource<L>
where
    V: Send + Sync + 'static,
    L: IntKeyLoader<V>,
{
    async fn load(&self, params: LoadParams<u32>) -> Result<LoadResult<u32, V>, LoadError> {
        let key = *params.key();
        let data = self.loader.load_page(&params).await?;
        let next_key = if data.is_empty() {
            None
        } else {
            key.checked_add(1)
        };
        Ok(LoadResult::page(data, next_key))
    }
}
