use std::fmt;

use paging_core::edit;

use crate::{Paging, PagingError};

/// Local edits applied to a [`Paging`] engine's items.
///
/// Every call is a single `modify`: serialized with loads, never cancelled
/// by them, and load states are left as they are.
pub struct PagingModifier<'a, K, V> {
    paging: &'a Paging<K, V>,
}

impl<'a, K, V> PagingModifier<'a, K, V>
where
    K: Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(paging: &'a Paging<K, V>) -> Self {
        Self { paging }
    }

    pub async fn replace_first(&self, old: &V, new: V) -> Result<(), PagingError>
    where
        V: PartialEq,
    {
        self.apply(|items| edit::replace_first(items, old, new)).await
    }

    pub async fn replace_last(&self, old: &V, new: V) -> Result<(), PagingError>
    where
        V: PartialEq,
    {
        self.apply(|items| edit::replace_last(items, old, new)).await
    }

    pub async fn replace_all(&self, old: &V, new: V) -> Result<(), PagingError>
    where
        V: PartialEq,
    {
        self.apply(|items| edit::replace_all(items, old, new)).await
    }

    pub async fn update_first(
        &self,
        predicate: impl Fn(&V) -> bool,
        update: impl FnOnce(&V) -> V,
    ) -> Result<(), PagingError> {
        self.apply(|items| edit::update_first(items, predicate, update))
            .await
    }

    pub async fn update_all(
        &self,
        predicate: impl Fn(&V) -> bool,
        update: impl Fn(&V) -> V,
    ) -> Result<(), PagingError> {
        self.apply(|items| edit::update_all(items, predicate, update))
            .await
    }

    pub async fn remove_first(&self, predicate: impl Fn(&V) -> bool) -> Result<(), PagingError> {
        self.apply(|items| edit::remove_first(items, predicate)).await
    }

    pub async fn remove_last(&self, predicate: impl Fn(&V) -> bool) -> Result<(), PagingError> {
        self.apply(|items| edit::remove_last(items, predicate)).await
    }

    pub async fn remove_all(&self, predicate: impl Fn(&V) -> bool) -> Result<(), PagingError> {
        self.apply(|items| edit::remove_all(items, predicate)).await
    }

    pub async fn insert(&self, index: usize, item: V) -> Result<(), PagingError> {
        self.apply(|items| edit::insert(items, index, item)).await
    }

    pub async fn insert_all(&self, index: usize, new_items: Vec<V>) -> Result<(), PagingError> {
        self.apply(|items| edit::insert_all(items, index, new_items))
            .await
    }

    async fn apply(&self, transform: impl FnOnce(Vec<V>) -> Vec<V>) -> Result<(), PagingError> {
        self.paging
            .modify(|items| async move { transform(items) })
            .await
    }
}
