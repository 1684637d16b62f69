use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

pub(crate) const CONFIG_FILENAME: &str = "paging_app.ron";

/// Settings of the simulated paging session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct DemoConfig {
    /// Key of the first page.
    pub refresh_key: u32,
    pub page_size: usize,
    /// Number of non-empty pages the source serves before running dry.
    pub page_count: u32,
    pub load_delay_ms: u64,
    /// Page whose first load fails.
    pub fail_on_key: Option<u32>,
    pub log_level: String,
    pub log_destination: LogDestination,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            refresh_key: 1,
            page_size: 10,
            page_count: 5,
            load_delay_ms: 50,
            fail_on_key: None,
            log_level: "info".to_string(),
            log_destination: LogDestination::default(),
        }
    }
}

impl DemoConfig {
    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    /// Falls back to `Info` for unknown level names.
    pub fn level_filter(&self) -> LevelFilter {
        engine_logging::parse_level(&self.log_level).unwrap_or(LevelFilter::Info)
    }
}

/// Reads the config at `path`. A missing file yields the defaults.
pub(crate) fn load_config(path: &Path) -> anyhow::Result<DemoConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(DemoConfig::default()),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {:?}", path));
        }
    };
    ron::from_str(&content).with_context(|| format!("failed to parse config {:?}", path))
}
