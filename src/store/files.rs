//! Flat-file JSON store for the composite snapshot and its history.
//!
//! The update command is the only writer; the API only reads. The
//! read-modify-write in `append_history` is not safe under concurrent
//! writers, so update runs must never overlap.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::types::CurrentState;

pub const MAX_HISTORY: usize = 1000;

#[derive(Clone, Debug)]
pub struct CompositeStore {
    data_dir: PathBuf,
}

impl CompositeStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    fn current_path(&self) -> PathBuf {
        self.data_dir.join("current.json")
    }

    fn history_path(&self) -> PathBuf {
        self.data_dir.join("history.json")
    }

    /// Returns the persisted singleton, or `None` if never written.
    pub fn read_current(&self) -> Result<Option<CurrentState>> {
        let path = self.current_path();
        if !path.exists() {
            warn!("current.json not found");
            return Ok(None);
        }
        let raw =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let state = serde_json::from_str(&raw).context("parsing current.json")?;
        Ok(Some(state))
    }

    pub fn write_current(&self, state: &CurrentState) -> Result<()> {
        self.write_json(&self.current_path(), state)?;
        info!("Updated current.json");
        Ok(())
    }

    /// Returns the persisted history, oldest first; empty if never written.
    pub fn read_history(&self) -> Result<Vec<CurrentState>> {
        let path = self.history_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let history = serde_json::from_str(&raw).context("parsing history.json")?;
        Ok(history)
    }

    /// Appends an entry and trims to the most recent `MAX_HISTORY`, dropping
    /// the oldest first.
    pub fn append_history(&self, entry: &CurrentState) -> Result<()> {
        let mut history = self.read_history()?;
        history.push(entry.clone());

        if history.len() > MAX_HISTORY {
            let excess = history.len() - MAX_HISTORY;
            history.drain(..excess);
        }

        self.write_json(&self.history_path(), &history)?;
        info!("Appended to history.json (total: {})", history.len());
        Ok(())
    }

    /// Writes a per-dataset derived summary, e.g. `epoch_models.json`.
    pub fn write_summary<T: Serialize>(&self, file_name: &str, summary: &T) -> Result<()> {
        self.write_json(&self.data_dir.join(file_name), summary)?;
        info!("Saved {}", file_name);
        Ok(())
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("creating {}", self.data_dir.display()))?;

        let json = serde_json::to_string_pretty(value).context("serializing json document")?;

        // Write-then-rename so a concurrent reader never sees a torn file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }
}
