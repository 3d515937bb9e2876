use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::sync::StaleDeletePolicy;
use crate::utils;

/// Sample feed used when no feed_url is configured.
pub const DEFAULT_FEED_URL: &str =
    "https://eksponent.com/sites/default/files/sample-api/events.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feed_url: String,
    pub database_path: Option<PathBuf>,
    pub media_root: Option<PathBuf>,
    pub delete_stale_on_feed_error: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            database_path: None,
            media_root: None,
            delete_stale_on_feed_error: false,
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        let path = utils::config_path();
        match read_config(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), "failed to read config: {err}");
                AppConfig::default()
            }
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(utils::database_path)
    }

    pub fn media_root(&self) -> PathBuf {
        self.media_root.clone().unwrap_or_else(utils::media_root)
    }

    pub fn stale_delete_policy(&self) -> StaleDeletePolicy {
        if self.delete_stale_on_feed_error {
            StaleDeletePolicy::RunOnFeedError
        } else {
            StaleDeletePolicy::SkipOnFeedError
        }
    }
}

fn read_config(path: &Path) -> anyhow::Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
