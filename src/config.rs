// Persistent client settings

use crate::error::{Error, Result};
use crate::protocol::constants::{DEFAULT_BATCH_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS, MAX_FILES};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Script execution URL the client posts to
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
    pub batch_size: usize,
    pub max_files: usize,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            bearer_token: None,
            batch_size: DEFAULT_BATCH_SIZE,
            max_files: MAX_FILES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Load settings from `dir/settings.json`, writing the defaults there on
    /// first run.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(SETTINGS_FILE);

        if !path.exists() {
            let settings = Settings::default();
            fs::create_dir_all(dir)?;
            settings.save(&path)?;
            info!(path = %path.display(), "wrote default settings");
            return Ok(settings);
        }

        let data = fs::read_to_string(&path)?;
        let settings: Settings = serde_json::from_str(&data)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batchSize must be at least 1".to_string()));
        }
        if self.max_files == 0 || self.max_files > MAX_FILES {
            return Err(Error::Config(format!(
                "maxFiles must be between 1 and {}",
                MAX_FILES
            )));
        }
        if self.request_timeout_secs == 0 {
            warn!("requestTimeoutSecs is 0, requests will never time out");
        }
        Ok(())
    }
}

/// Per-user application data directory, e.g. `~/.local/share/photo-collector`.
pub fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "photo-collector")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| Error::Config("could not resolve a home directory".to_string()))
}
