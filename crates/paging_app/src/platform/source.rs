use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use engine_logging::engine_debug;
use paging_engine::{IntKeyLoader, LoadError, LoadParams};

use super::config::DemoConfig;

/// Simulated remote list: `page_count` pages of `page_size` strings starting
/// at the refresh key, then empty pages.
pub(crate) struct DemoLoader {
    first_key: u32,
    page_size: usize,
    page_count: u32,
    delay: Duration,
    pending_failure: Mutex<Option<u32>>,
}

impl DemoLoader {
    pub fn from_config(config: &DemoConfig) -> Self {
        Self {
            first_key: config.refresh_key,
            page_size: config.page_size,
            page_count: config.page_count,
            delay: config.load_delay(),
            pending_failure: Mutex::new(config.fail_on_key),
        }
    }

    /// True once for the configured failing key.
    fn take_failure(&self, key: u32) -> bool {
        let mut pending = self
            .pending_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *pending == Some(key) {
            *pending = None;
            true
        } else {
            false
        }
    }

    fn has_page(&self, key: u32) -> bool {
        key >= self.first_key && key - self.first_key < self.page_count
    }
}

#[async_trait]
impl IntKeyLoader<String> for DemoLoader {
    async fn load_page(&self, params: &LoadParams<u32>) -> Result<Vec<String>, LoadError> {
        let key = *params.key();
        engine_debug!("demo source loading {:?}", params);
        tokio::time::sleep(self.delay).await;
        if self.take_failure(key) {
            return Err(LoadError::new(format!("simulated failure on page {key}")));
        }
        if !self.has_page(key) {
            return Ok(Vec::new());
        }
        Ok((0..self.page_size)
            .map(|index| format!("item {key}.{index}"))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader(fail_on_key: Option<u32>) -> DemoLoader {
        DemoLoader::from_config(&DemoConfig {
            refresh_key: 1,
            page_size: 2,
            page_count: 2,
            load_delay_ms: 0,
            fail_on_key,
            ..DemoConfig::default()
        })
    }

    #[tokio::test]
    async fn serves_configured_pages_then_runs_dry() {
        let loader = loader(None);

        assert_eq!(
            loader.load_page(&LoadParams::Refresh(1)).await.unwrap(),
            vec!["item 1.0".to_string(), "item 1.1".to_string()]
        );
        assert_eq!(
            loader.load_page(&LoadParams::Append(2)).await.unwrap().len(),
            2
        );
        assert!(loader
            .load_page(&LoadParams::Append(3))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn configured_key_fails_only_once() {
        let loader = loader(Some(2));

        let err = loader.load_page(&LoadParams::Append(2)).await.unwrap_err();
        assert_eq!(err.message(), "simulated failure on page 2");
        assert!(loader.load_page(&LoadParams::Append(2)).await.is_ok());
    }
}
