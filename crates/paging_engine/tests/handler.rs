mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::{
    init_logging, spawn_append, spawn_refresh, strings, ChannelSource, ScriptedSource, TestPaging,
};
use paging_engine::{LoadError, LoadParams, LoadState, PagingDataHandler, PagingError};
use pretty_assertions::assert_eq;
use tokio::sync::Notify;

type Totals = Arc<Mutex<Vec<Vec<String>>>>;

/// Default merge policy that also records the base it was handed.
#[derive(Default)]
struct RecordingHandler {
    totals: Totals,
}

#[async_trait]
impl PagingDataHandler<u32, String> for RecordingHandler {
    async fn handle_page(
        &self,
        mut total: Vec<String>,
        params: &LoadParams<u32>,
        page: Vec<String>,
    ) -> Result<Vec<String>, LoadError> {
        self.totals.lock().unwrap().push(total.clone());
        match params {
            LoadParams::Refresh(_) => Ok(page),
            LoadParams::Append(_) => {
                total.extend(page);
                Ok(total)
            }
        }
    }
}

struct FailingHandler;

#[async_trait]
impl PagingDataHandler<u32, String> for FailingHandler {
    async fn handle_page(
        &self,
        _total: Vec<String>,
        _params: &LoadParams<u32>,
        _page: Vec<String>,
    ) -> Result<Vec<String>, LoadError> {
        Err(LoadError::new("merge failed"))
    }
}

/// Never finishes merging; signals once it has been entered.
#[derive(Default)]
struct StuckHandler {
    entered: Arc<Notify>,
}

#[async_trait]
impl PagingDataHandler<u32, String> for StuckHandler {
    async fn handle_page(
        &self,
        _total: Vec<String>,
        _params: &LoadParams<u32>,
        _page: Vec<String>,
    ) -> Result<Vec<String>, LoadError> {
        self.entered.notify_one();
        std::future::pending().await
    }
}

#[tokio::test]
async fn append_merges_onto_modified_items() {
    init_logging();
    let handler = RecordingHandler::default();
    let totals = handler.totals.clone();
    let paging = TestPaging::with_handler(1, ScriptedSource::three_pages(), handler);

    paging.refresh().await.unwrap();
    paging
        .modifier()
        .insert(0, "local".to_string())
        .await
        .unwrap();
    paging.append().await.unwrap();

    let totals = totals.lock().unwrap().clone();
    assert_eq!(
        totals,
        vec![Vec::new(), strings(&["local", "1", "2", "3"])]
    );
    assert_eq!(
        paging.state().items,
        strings(&["local", "1", "2", "3", "1", "2", "3"])
    );
}

#[tokio::test]
async fn handler_failure_is_stored_in_lane() {
    init_logging();
    let paging = TestPaging::with_handler(1, ScriptedSource::three_pages(), FailingHandler);

    assert_eq!(paging.refresh().await, Ok(()));

    let state = paging.state();
    assert_eq!(
        state.refresh_load_state,
        LoadState::Error(LoadError::new("merge failed"))
    );
    assert!(state.items.is_empty());
    assert_eq!(state.append_load_state, LoadState::INCOMPLETE);
}

#[tokio::test]
async fn cancel_during_merge_rolls_back_lane() {
    init_logging();
    let handler = StuckHandler::default();
    let entered = handler.entered.clone();
    let paging = Arc::new(TestPaging::with_handler(
        1,
        ScriptedSource::three_pages(),
        handler,
    ));

    let refresh = spawn_refresh(&paging);
    entered.notified().await;
    assert_eq!(paging.state().refresh_load_state, LoadState::Loading);

    paging.cancel().await.unwrap();

    assert_eq!(refresh.await.unwrap(), Err(PagingError::Cancelled));
    assert_eq!(paging.state().refresh_load_state, LoadState::INCOMPLETE);
    assert!(paging.state().items.is_empty());
    assert!(!paging.is_loading().await);
}

#[tokio::test]
async fn refresh_preempts_refresh_stuck_in_merge() {
    init_logging();
    let handler = StuckHandler::default();
    let entered = handler.entered.clone();
    let paging = Arc::new(TestPaging::with_handler(
        1,
        ScriptedSource::three_pages(),
        handler,
    ));

    let first = spawn_refresh(&paging);
    entered.notified().await;
    let second = spawn_refresh(&paging);

    assert_eq!(first.await.unwrap(), Err(PagingError::Cancelled));
    entered.notified().await;
    assert_eq!(paging.state().refresh_load_state, LoadState::Loading);

    paging.cancel().await.unwrap();
    assert_eq!(second.await.unwrap(), Err(PagingError::Cancelled));
    assert_eq!(paging.state().refresh_load_state, LoadState::INCOMPLETE);
}

#[tokio::test]
async fn aborted_append_restores_append_lane() {
    init_logging();
    let (source, mut requests) = ChannelSource::new();
    let paging = Arc::new(TestPaging::new(1, source));

    let refresh = spawn_refresh(&paging);
    requests.recv().await.unwrap().page(&["a"], Some(2));
    refresh.await.unwrap().unwrap();

    let append = spawn_append(&paging);
    let request = requests.recv().await.unwrap();
    assert_eq!(paging.state().append_load_state, LoadState::Loading);
    request.abort();

    assert_eq!(append.await.unwrap(), Err(PagingError::Cancelled));
    let state = paging.state();
    assert_eq!(state.items, strings(&["a"]));
    assert_eq!(state.append_load_state, LoadState::INCOMPLETE);
    assert_eq!(state.refresh_load_state, LoadState::INCOMPLETE);
    assert!(!paging.is_loading().await);
}
