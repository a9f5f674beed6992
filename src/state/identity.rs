// Identity persisted on this device

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const IDENTITY_FILE: &str = "identity.json";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityFile {
    user_id: String,
}

/// The opaque user id the backend issued at registration, kept in
/// `identity.json` next to the settings.
#[derive(Debug)]
pub struct IdentityStore {
    path: PathBuf,
    user_id: Option<String>,
}

impl IdentityStore {
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(IDENTITY_FILE);

        let user_id = if path.exists() {
            let data = fs::read_to_string(&path)?;
            match serde_json::from_str::<IdentityFile>(&data) {
                Ok(file) if !file.user_id.trim().is_empty() => Some(file.user_id),
                Ok(_) => None,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring unreadable identity file");
                    None
                }
            }
        } else {
            None
        };

        debug!(registered = user_id.is_some(), "identity loaded");
        Ok(Self { path, user_id })
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn set(&mut self, user_id: String) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&IdentityFile {
            user_id: user_id.clone(),
        })?;
        fs::write(&self.path, json)?;

        self.user_id = Some(user_id);
        Ok(())
    }
}
