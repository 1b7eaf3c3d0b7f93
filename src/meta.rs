//! Persistent sync metadata.
//!
//! A small record stored next to the quote list: the last-sync cursor
//! (advisory, used only to pick upload candidates) and the last category
//! filter the user selected.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sync metadata persisted to disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncMeta {
    /// When the last successful reconciliation finished.
    pub last_synced: Option<DateTime<Utc>>,
    /// Last category filter selected in the UI, restored on startup.
    pub last_category: Option<String>,
}

impl SyncMeta {
    /// Load metadata from a JSON file. Returns defaults if file doesn't exist.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse sync metadata: {} — using defaults", e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save metadata to a JSON file.
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
