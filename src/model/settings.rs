//! Persisted narration preferences

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::NarratorError;
use crate::narration::PreferenceStore;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    pub speed: f32,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Speed preference stored as a small JSON file
#[derive(Clone, Debug)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<StoredSettings>, NarratorError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

impl PreferenceStore for JsonSettingsStore {
    fn load_speed(&self) -> Option<f32> {
        match self.read() {
            Ok(settings) => settings.map(|s| s.speed),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable settings file");
                None
            }
        }
    }

    fn save_speed(&self, speed: f32) -> Result<(), NarratorError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let settings = StoredSettings {
            speed,
            updated_at: Some(Utc::now().to_rfc3339()),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&settings)?)?;
        tracing::debug!(path = %self.path.display(), speed, "Settings saved");
        Ok(())
    }
}
