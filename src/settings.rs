//! Game settings
//!
//! Play area, RNG seed, local player identity and scoring policy. Loaded from
//! a JSON file; every field is optional and falls back to its default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sim::{PlayArea, ScoringPolicy};

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("play area must be positive, got {width}x{height}")]
    InvalidArea { width: f32, height: f32 },
}

/// Local player identity used for room score reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerProfile {
    /// Explicit ID (e.g. a connected account address)
    pub id: Option<String>,
    pub display_name: String,
}

impl PlayerProfile {
    /// Explicit ID, else the display name. None when both are blank.
    pub fn player_id(&self) -> Option<String> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .or_else(|| Some(self.display_name.trim()).filter(|name| !name.is_empty()))
            .map(str::to_string)
    }
}

/// Game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub area: PlayArea,
    /// Fixed RNG seed (random per run when absent)
    pub seed: Option<u64>,
    pub player: PlayerProfile,
    pub scoring: ScoringPolicy,
}

impl Settings {
    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let PlayArea { width, height } = self.area;
        if !(width > 0.0 && height > 0.0) {
            return Err(SettingsError::InvalidArea { width, height });
        }
        Ok(())
    }
}
