use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use engine_logging::{engine_debug, engine_warn};
use futures_util::stream::{self, Stream};
use paging_core::{Lane, LoadError, LoadParams, LoadResult, LoadState, PagingState};
use tokio::sync::watch;

use crate::{
    DefaultPagingDataHandler, MutateScope, Mutator, PagingDataHandler, PagingError,
    PagingModifier, PagingSource,
};

type StateSender<V> = watch::Sender<Arc<PagingState<V>>>;

/// Paging engine: accumulates items from a [`PagingSource`] and publishes
/// immutable [`PagingState`] snapshots.
///
/// `refresh` preempts any in-flight load, `append` gives way to one, and
/// `modify` is serialized with both without cancelling or being cancelled.
pub struct Paging<K, V> {
    refresh_key: K,
    source: Box<dyn PagingSource<K, V>>,
    handler: Box<dyn PagingDataHandler<K, V>>,
    mutator: Mutator,
    state_tx: StateSender<V>,
    next_key: Mutex<Option<K>>,
}

impl<K, V> fmt::Debug for Paging<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paging")
            .field("refresh_key", &self.refresh_key)
            .field("mutator", &self.mutator)
            .field("state", &*self.state_tx.borrow())
            .finish_non_exhaustive()
    }
}

impl<K, V> Paging<K, V>
where
    K: Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates an engine that refreshes from `refresh_key` and merges pages
    /// with [`DefaultPagingDataHandler`].
    pub fn new(refresh_key: K, source: impl PagingSource<K, V> + 'static) -> Self {
        Self::with_handler(refresh_key, source, DefaultPagingDataHandler)
    }

    pub fn with_handler(
        refresh_key: K,
        source: impl PagingSource<K, V> + 'static,
        handler: impl PagingDataHandler<K, V> + 'static,
    ) -> Self {
        let (state_tx, _) = watch::channel(Arc::new(PagingState::new()));
        Self {
            refresh_key,
            source: Box::new(source),
            handler: Box::new(handler),
            mutator: Mutator::new(),
            state_tx,
            next_key: Mutex::new(None),
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> Arc<PagingState<V>> {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<PagingState<V>>> {
        self.state_tx.subscribe()
    }

    /// Yields the current snapshot, then every published snapshot until the
    /// engine is dropped. Intermediate values a slow consumer misses are skipped.
    pub fn states(&self) -> impl Stream<Item = Arc<PagingState<V>>> + Send + 'static {
        let receiver = self.state_tx.subscribe();
        stream::unfold((receiver, true), |(mut receiver, first)| async move {
            if !first && receiver.changed().await.is_err() {
                return None;
            }
            let snapshot = receiver.borrow_and_update().clone();
            Some((snapshot, (receiver, false)))
        })
    }

    /// True while a refresh or append holds the exclusive slot.
    pub async fn is_loading(&self) -> bool {
        self.mutator.is_mutating().await
    }

    /// Reloads from the refresh key, cancelling any in-flight refresh or append.
    ///
    /// Load failures are published as `LoadState::Error` and return `Ok`.
    pub async fn refresh(&self) -> Result<(), PagingError> {
        self.mutator.mutate(|scope| self.refresh_in(scope)).await
    }

    /// Loads the page after the last one, or refreshes when nothing is loaded yet.
    ///
    /// Fails with `Cancelled` without touching state if a refresh or append is
    /// already running.
    pub async fn append(&self) -> Result<(), PagingError> {
        self.mutator
            .try_mutate(|scope| async move {
                let state = self.state();
                if state.is_empty() {
                    engine_debug!("append on empty items redirected to refresh");
                    return self.refresh_in(scope).await;
                }
                if state.append_load_state.is_complete() {
                    engine_debug!("append skipped: end of pagination reached");
                    return Ok(());
                }
                let Some(key) = self.next_key() else {
                    engine_debug!("append skipped: no next key");
                    return Ok(());
                };
                self.append_in(scope, key).await
            })
            .await
    }

    /// Replaces the items with `transform(items)`, leaving both lanes untouched.
    pub async fn modify<F, Fut>(&self, transform: F) -> Result<(), PagingError>
    where
        F: FnOnce(Vec<V>) -> Fut,
        Fut: Future<Output = Vec<V>>,
    {
        self.mutator
            .effect(|| async move {
                let items = transform(self.state().items.clone()).await;
                self.publish(|state| state.with_items(items));
            })
            .await
    }

    /// Cancels any in-flight refresh or append and waits for it to roll back.
    pub async fn cancel(&self) -> Result<(), PagingError> {
        self.mutator.cancel_mutate().await
    }

    pub fn modifier(&self) -> PagingModifier<'_, K, V> {
        PagingModifier::new(self)
    }

    async fn refresh_in(&self, scope: MutateScope) -> Result<(), PagingError> {
        engine_debug!("refresh started key={:?}", self.refresh_key);
        let rollback = self.begin_load(Lane::Refresh);
        let params = LoadParams::Refresh(self.refresh_key.clone());
        match self.load_and_merge(&scope, params).await {
            Ok(Loaded { items, next_key }) => {
                rollback.disarm();
                let end_of_pagination_reached = next_key.is_none();
                engine_debug!(
                    "refresh finished items={} next_key={:?}",
                    items.len(),
                    next_key
                );
                self.set_next_key(next_key);
                self.publish(|_| PagingState {
                    items,
                    refresh_load_state: LoadState::not_loading(end_of_pagination_reached),
                    append_load_state: LoadState::not_loading(end_of_pagination_reached),
                });
                Ok(())
            }
            Err(LoadFailure::Interrupted(err)) => {
                engine_debug!("refresh interrupted: {}", err);
                drop(rollback);
                Err(err)
            }
            Err(LoadFailure::Failed(err)) => {
                rollback.disarm();
                engine_warn!("refresh failed: {}", err);
                self.publish(|state| state.with_refresh_load_state(LoadState::Error(err)));
                Ok(())
            }
        }
    }

    async fn append_in(&self, scope: MutateScope, key: K) -> Result<(), PagingError> {
        engine_debug!("append started key={:?}", key);
        let rollback = self.begin_load(Lane::Append);
        match self.load_and_merge(&scope, LoadParams::Append(key)).await {
            Ok(Loaded { items, next_key }) => {
                rollback.disarm();
                let end_of_pagination_reached = next_key.is_none();
                engine_debug!(
                    "append finished items={} next_key={:?}",
                    items.len(),
                    next_key
                );
                if next_key.is_some() {
                    self.set_next_key(next_key);
                }
                self.publish(|state| PagingState {
                    items,
                    refresh_load_state: state.refresh_load_state.clone(),
                    append_load_state: LoadState::not_loading(end_of_pagination_reached),
                });
                Ok(())
            }
            Err(LoadFailure::Interrupted(err)) => {
                engine_debug!("append interrupted: {}", err);
                drop(rollback);
                Err(err)
            }
            Err(LoadFailure::Failed(err)) => {
                rollback.disarm();
                engine_warn!("append failed: {}", err);
                self.publish(|state| state.with_append_load_state(LoadState::Error(err)));
                Ok(())
            }
        }
    }

    /// Marks `lane` as loading; the returned guard restores the previous
    /// value unless disarmed.
    fn begin_load(&self, lane: Lane) -> LaneRollback<'_, V> {
        let previous = self.state().lane(lane).clone();
        assert!(!previous.is_loading(), "{lane:?} lane is already loading");
        self.publish(|state| state.with_lane(lane, LoadState::Loading));
        LaneRollback {
            state_tx: &self.state_tx,
            lane,
            previous: Some(previous),
        }
    }

    async fn load_and_merge(
        &self,
        scope: &MutateScope,
        params: LoadParams<K>,
    ) -> Result<Loaded<K, V>, LoadFailure> {
        let total = self.state().items.clone();
        let result = scope.run(self.source.load(params.clone())).await??;
        scope.ensure_active()?;
        let (data, next_key) = match result {
            LoadResult::Page { data, next_key } => (data, next_key),
            LoadResult::None => {
                engine_debug!("load aborted by source params={:?}", params);
                return Err(LoadFailure::Interrupted(PagingError::Cancelled));
            }
        };
        let items = scope
            .run(self.handler.handle_page(total, &params, data))
            .await??;
        scope.ensure_active()?;
        Ok(Loaded { items, next_key })
    }

    fn next_key(&self) -> Option<K> {
        self.next_key
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_next_key(&self, key: Option<K>) {
        *self.next_key.lock().unwrap_or_else(PoisonError::into_inner) = key;
    }

    fn publish(&self, next: impl FnOnce(&PagingState<V>) -> PagingState<V>) {
        publish(&self.state_tx, next);
    }
}

fn publish<V>(state_tx: &StateSender<V>, next: impl FnOnce(&PagingState<V>) -> PagingState<V>) {
    state_tx.send_modify(|current| {
        let replacement = next(current.as_ref());
        *current = Arc::new(replacement);
    });
}

struct Loaded<K, V> {
    items: Vec<V>,
    next_key: Option<K>,
}

enum LoadFailure {
    /// Cancelled or aborted; the lane is rolled back and the error propagated.
    Interrupted(PagingError),
    /// Stored in the lane; not propagated.
    Failed(LoadError),
}

impl From<PagingError> for LoadFailure {
    fn from(err: PagingError) -> Self {
        LoadFailure::Interrupted(err)
    }
}

impl From<LoadError> for LoadFailure {
    fn from(err: LoadError) -> Self {
        LoadFailure::Failed(err)
    }
}

/// Restores a lane to its pre-load value when dropped armed, which covers
/// both cooperative cancellation and the caller dropping the future.
struct LaneRollback<'a, V: Clone> {
    state_tx: &'a StateSender<V>,
    lane: Lane,
    previous: Option<LoadState>,
}

impl<V: Clone> LaneRollback<'_, V> {
    fn disarm(mut self) {
        self.previous = None;
    }
}

impl<V: Clone> Drop for LaneRollback<'_, V> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            let lane = self.lane;
            engine_debug!("{:?} lane rolled back to {:?}", lane, previous);
            publish(self.state_tx, |state| state.with_lane(lane, previous));
        }
    }
}
