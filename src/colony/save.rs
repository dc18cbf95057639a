use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::colony::building::BuildingRecord;
use crate::colony::ledger::Amounts;
use crate::error::Error;

/// The save file. Every section is optional so older or hand-edited saves
/// still load; whatever is missing keeps its current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    #[serde(default)]
    pub resources: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buildings: Option<Vec<BuildingRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<SavedFlags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_prices: Option<BTreeMap<String, Amounts>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFlags {
    #[serde(default = "default_true")]
    pub first_goal: bool,
    #[serde(default = "default_true")]
    pub show_hint: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// A missing or unreadable save is the same as no save.
    pub fn load(&self) -> Option<SaveData> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No save at {}, nothing to load", self.path.display());
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to read save {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&text) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!("Ignoring corrupt save {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, data: &SaveData) -> Result<(), Error> {
        let text = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, text).map_err(|e| Error::Save {
            message: format!("writing {}: {}", self.path.display(), e),
        })?;
        tracing::info!("Game saved to {}", self.path.display());
        Ok(())
    }

    /// Delete the save file, if any.
    pub fn reset(&self) -> Result<(), Error> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Deleted save {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}
