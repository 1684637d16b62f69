use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use futures_util::StreamExt;
use paging_core::{Effect, Msg};
use paging_engine::{Paging, PagingError};
use tokio::sync::mpsc;

pub(crate) type DemoPaging = Paging<u32, String>;

/// Attempts after a rejected append. The snapshot that triggers an append can
/// arrive while the previous load is still unregistering.
const APPEND_RETRIES: u32 = 5;
const APPEND_RETRY_DELAY: Duration = Duration::from_millis(20);

/// Executes presenter effects against the engine and feeds its snapshots
/// back to the presenter as messages.
pub(crate) struct EffectRunner {
    paging: Arc<DemoPaging>,
}

impl EffectRunner {
    pub fn new(paging: Arc<DemoPaging>, msg_tx: mpsc::UnboundedSender<Msg<String>>) -> Self {
        let runner = Self { paging };
        runner.spawn_snapshot_forwarder(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            let paging = self.paging.clone();
            tokio::spawn(async move {
                let result = match effect {
                    Effect::Refresh => paging.refresh().await,
                    Effect::Append => append_with_retry(&paging).await,
                };
                report(effect, result);
            });
        }
    }

    fn spawn_snapshot_forwarder(&self, msg_tx: mpsc::UnboundedSender<Msg<String>>) {
        let mut states = Box::pin(self.paging.states());
        tokio::spawn(async move {
            while let Some(snapshot) = states.next().await {
                if msg_tx.send(Msg::Snapshot(snapshot)).is_err() {
                    break;
                }
            }
        });
    }
}

async fn append_with_retry(paging: &DemoPaging) -> Result<(), PagingError> {
    let mut attempt = 0;
    loop {
        match paging.append().await {
            Err(err) if err.is_cancelled() && attempt < APPEND_RETRIES => {
                attempt += 1;
                engine_debug!("append rejected, retry {}/{}", attempt, APPEND_RETRIES);
                tokio::time::sleep(APPEND_RETRY_DELAY).await;
            }
            result => return result,
        }
    }
}

fn report(effect: Effect, result: Result<(), PagingError>) {
    match result {
        Ok(()) => {}
        Err(err) if err.is_cancelled() => engine_debug!("{:?} cancelled", effect),
        Err(err) => engine_warn!("{:?} rejected: {}", effect, err),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, PoisonError};

    use async_trait::async_trait;
    use paging_engine::{LoadError, LoadParams, LoadResult, PagingSource};
    use tokio::sync::oneshot;

    use super::*;

    /// Holds its first load until the gate opens.
    struct GatedSource {
        gate: Mutex<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait]
    impl PagingSource<u32, String> for GatedSource {
        async fn load(
            &self,
            params: LoadParams<u32>,
        ) -> Result<LoadResult<u32, String>, LoadError> {
            let gate = self
                .gate
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            let key = *params.key();
            let next_key = (key < 3).then_some(key + 1);
            Ok(LoadResult::page(vec![format!("item {key}")], next_key))
        }
    }

    #[tokio::test]
    async fn append_rejected_by_running_load_is_retried() {
        let (open_gate, gate) = oneshot::channel();
        let source = GatedSource {
            gate: Mutex::new(Some(gate)),
        };
        let paging = Arc::new(DemoPaging::new(1, source));
        let (msg_tx, _msg_rx) = mpsc::unbounded_channel();
        let runner = EffectRunner::new(paging.clone(), msg_tx);
        let mut states = paging.subscribe();

        runner.enqueue(vec![Effect::Refresh]);
        while !paging.is_loading().await {
            tokio::task::yield_now().await;
        }
        runner.enqueue(vec![Effect::Append]);
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        open_gate.send(()).unwrap();

        let loaded = tokio::time::timeout(
            Duration::from_secs(5),
            states.wait_for(|state| state.items.len() == 2),
        )
        .await
        .map(|result| result.is_ok());
        assert!(matches!(loaded, Ok(true)));
        assert_eq!(
            paging.state().items,
            vec!["item 1".to_string(), "item 2".to_string()]
        );
    }
}
