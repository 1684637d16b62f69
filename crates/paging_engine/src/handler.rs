use async_trait::async_trait;
use paging_core::{LoadError, LoadParams};

/// Combines a freshly loaded page with the accumulated items.
#[async_trait]
pub trait PagingDataHandler<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    async fn handle_page(
        &self,
        total: Vec<V>,
        params: &LoadParams<K>,
        page: Vec<V>,
    ) -> Result<Vec<V>, LoadError>;
}

/// Refresh replaces the items, append concatenates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPagingDataHandler;

#[async_trait]
impl<K, V> PagingDataHandler<K, V> for DefaultPagingDataHandler
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    async fn handle_page(
        &self,
        mut total: Vec<V>,
        params: &LoadParams<K>,
        page: Vec<V>,
    ) -> Result<Vec<V>, LoadError> {
        match params {
            LoadParams::Refresh(_) => Ok(page),
            LoadParams::Append(_) => {
                total.extend(page);
                Ok(total)
            }
        }
    }
}
