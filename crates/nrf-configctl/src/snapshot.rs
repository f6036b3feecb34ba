//! JSON state snapshot
//!
//! Every stored document and recorded event in one file. The CLI loads it
//! into in-memory storage and writes it back after a successful write.

use anyhow::{Context, Result};
use nrf_document::ConfigurationDocument;
use nrf_model::NrfEventDetails;
use nrf_store::{EventLog, MemoryEventLog, MemoryStore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    #[serde(default)]
    pub documents: Vec<ConfigurationDocument>,
    #[serde(default)]
    pub events: Vec<NrfEventDetails>,
}

impl StateSnapshot {
    /// Read a snapshot; a missing file is an empty state
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No snapshot at {}, starting empty", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    /// Write the snapshot as pretty JSON
    ///
    /// # Errors
    /// Returns error if the file cannot be written
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).with_context(|| format!("writing {}", path.display()))
    }

    /// Load the snapshot into in-memory storage
    ///
    /// # Errors
    /// Returns error if the snapshot holds the same key twice
    pub fn into_stores(self) -> Result<(MemoryStore, MemoryEventLog)> {
        let mut keys = HashSet::new();
        for document in &self.documents {
            if !keys.insert(document.key()) {
                anyhow::bail!("snapshot holds {} more than once", document.key());
            }
        }
        Ok((
            MemoryStore::from_documents(self.documents),
            MemoryEventLog::from_events(self.events),
        ))
    }

    /// Capture the current storage contents
    ///
    /// # Errors
    /// Returns error if the event log cannot be read
    pub fn capture(store: &MemoryStore, events: &MemoryEventLog) -> Result<Self> {
        Ok(Self {
            documents: store.documents(),
            events: events.events()?,
        })
    }
}
