use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use engine_logging::{engine_info, engine_warn};
use paging_core::{
    update, AppendFooter, Effect, Msg, PagingViewModel, PresenterState, RefreshOutcome,
};
use paging_engine::{IntKeyPagingSource, Paging};
use tokio::sync::mpsc;

use super::config::{self, DemoConfig, CONFIG_FILENAME};
use super::effects::{DemoPaging, EffectRunner};
use super::logging;
use super::source::DemoLoader;

/// Refreshes retried after a failed refresh before giving up.
const MAX_REFRESH_RETRIES: u32 = 1;

pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
    let (config, config_problem) = match config::load_config(&config_path) {
        Ok(config) => (config, None),
        Err(err) => (DemoConfig::default(), Some(err)),
    };

    logging::initialize(config.log_destination, config.level_filter());
    if let Some(err) = config_problem {
        engine_warn!("{:#}; using defaults", err);
    }
    engine_info!("paging demo starting with {:?}", config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(run_session(config))
}

async fn run_session(config: DemoConfig) -> anyhow::Result<()> {
    let source = IntKeyPagingSource::new(DemoLoader::from_config(&config));
    let paging: Arc<DemoPaging> = Arc::new(Paging::new(config.refresh_key, source));
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();
    let runner = EffectRunner::new(paging.clone(), msg_tx.clone());

    let mut state = PresenterState::new();
    let mut rendered = 0;
    let mut refresh_retries = 0;
    msg_tx.send(Msg::Attached)?;

    while let Some(msg) = msg_rx.recv().await {
        let (next, effects) = update(state, msg);
        state = next;
        runner.enqueue(effects);

        let view = state.view();
        if !state.consume_dirty() {
            continue;
        }
        log_view(&view);

        if let Some(slot) = &view.refresh_slot {
            if slot.loading {
                continue;
            }
            match &slot.outcome {
                Some(RefreshOutcome::Error(err)) => {
                    if refresh_retries >= MAX_REFRESH_RETRIES {
                        anyhow::bail!("refresh kept failing: {}", err);
                    }
                    refresh_retries += 1;
                    engine_info!("retrying refresh after: {}", err);
                    msg_tx.send(Msg::RefreshRequested)?;
                    continue;
                }
                Some(RefreshOutcome::Empty) => break,
                None => continue,
            }
        }

        if view.is_refreshing {
            continue;
        }
        match &view.append_footer {
            AppendFooter::End => break,
            AppendFooter::Error(err) => {
                engine_info!("retrying append after: {}", err);
                runner.enqueue(vec![Effect::Append]);
            }
            AppendFooter::Idle | AppendFooter::Loading => {}
        }

        // Scrolling: every newly shown item gets rendered once.
        if view.items.len() < rendered {
            rendered = 0;
        }
        for index in rendered..view.items.len() {
            msg_tx.send(Msg::ItemRendered { index })?;
        }
        rendered = view.items.len();
    }

    paging
        .modifier()
        .update_first(
            |item| item.ends_with(".0"),
            |item| format!("{item} (edited)"),
        )
        .await?;
    let (state, _) = update(state, Msg::Snapshot(paging.state()));
    let view = state.view();
    engine_info!(
        "session finished: {} items, first={:?} last={:?}",
        view.items.len(),
        view.items.first(),
        view.items.last()
    );
    Ok(())
}

fn log_view(view: &PagingViewModel<String>) {
    engine_info!(
        "view: items={} refreshing={} appending={} slot={:?} footer={:?}",
        view.items.len(),
        view.is_refreshing,
        view.is_appending,
        view.refresh_slot,
        view.append_footer
    );
}
