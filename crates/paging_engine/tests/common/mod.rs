#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use async_trait::async_trait;
use paging_engine::{LoadError, LoadParams, LoadResult, Paging, PagingError, PagingSource};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub type TestPaging = Paging<u32, String>;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// Lets spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// One pending `load` call, answered by the test.
pub struct LoadRequest {
    pub params: LoadParams<u32>,
    reply: oneshot::Sender<Result<LoadResult<u32, String>, LoadError>>,
}

impl LoadRequest {
    pub fn page(self, data: &[&str], next_key: Option<u32>) {
        let _ = self.reply.send(Ok(LoadResult::page(strings(data), next_key)));
    }

    pub fn fail(self, message: &str) {
        let _ = self.reply.send(Err(LoadError::new(message)));
    }

    pub fn abort(self) {
        let _ = self.reply.send(Ok(LoadResult::None));
    }

    /// True once the engine dropped the load (cancellation).
    pub fn is_abandoned(&self) -> bool {
        self.reply.is_closed()
    }
}

/// Source whose loads block until the test answers the matching request.
pub struct ChannelSource {
    requests: mpsc::UnboundedSender<LoadRequest>,
}

impl ChannelSource {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LoadRequest>) {
        let (requests, receiver) = mpsc::unbounded_channel();
        (Self { requests }, receiver)
    }
}

#[async_trait]
impl PagingSource<u32, String> for ChannelSource {
    async fn load(&self, params: LoadParams<u32>) -> Result<LoadResult<u32, String>, LoadError> {
        let (reply, response) = oneshot::channel();
        if self.requests.send(LoadRequest { params, reply }).is_err() {
            return Err(LoadError::new("request channel closed"));
        }
        response
            .await
            .unwrap_or_else(|_| Err(LoadError::new("request dropped without reply")))
    }
}

/// Deterministic source answering from a fixed key → page table.
#[derive(Default)]
pub struct ScriptedSource {
    pages: HashMap<u32, (Vec<String>, Option<u32>)>,
    loads: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, key: u32, data: &[&str], next_key: Option<u32>) -> Self {
        self.pages.insert(key, (strings(data), next_key));
        self
    }

    pub fn load_counter(&self) -> Arc<AtomicUsize> {
        self.loads.clone()
    }

    /// Pages 1, 2, 3 each holding "1", "2", "3"; page 3 is the last.
    pub fn three_pages() -> Self {
        Self::new()
            .with_page(1, &["1", "2", "3"], Some(2))
            .with_page(2, &["1", "2", "3"], Some(3))
            .with_page(3, &["1", "2", "3"], None)
    }
}

#[async_trait]
impl PagingSource<u32, String> for ScriptedSource {
    async fn load(&self, params: LoadParams<u32>) -> Result<LoadResult<u32, String>, LoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match self.pages.get(params.key()) {
            Some((data, next_key)) => Ok(LoadResult::page(data.clone(), *next_key)),
            None => Err(LoadError::new(format!("no page for key {}", params.key()))),
        }
    }
}

pub fn spawn_refresh(paging: &Arc<TestPaging>) -> JoinHandle<Result<(), PagingError>> {
    let paging = paging.clone();
    tokio::spawn(async move { paging.refresh().await })
}

pub fn spawn_append(paging: &Arc<TestPaging>) -> JoinHandle<Result<(), PagingError>> {
    let paging = paging.clone();
    tokio::spawn(async move { paging.append().await })
}
