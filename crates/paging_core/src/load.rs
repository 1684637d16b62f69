/// Direction and key of one load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadParams<K> {
    Refresh(K),
    Append(K),
}

impl<K> LoadParams<K> {
    pub fn key(&self) -> &K {
        match self {
            LoadParams::Refresh(key) | LoadParams::Append(key) => key,
        }
    }
}

/// Outcome of a data-source load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult<K, V> {
    /// A page of items. `next_key == None` means pagination is exhausted.
    Page { data: Vec<V>, next_key: Option<K> },
    /// Abort: the load is treated as if it never happened.
    None,
}

impl<K, V> LoadResult<K, V> {
    pub fn page(data: Vec<V>, next_key: Option<K>) -> Self {
        LoadResult::Page { data, next_key }
    }
}
