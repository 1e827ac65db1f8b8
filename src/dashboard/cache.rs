use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing::{debug, info};

use super::dataset::NationalDataset;

/// Keeps one loaded copy of the national table, reloading it only when the
/// file's modification time changes.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    entry: Option<(SystemTime, NationalDataset)>,
    loads: usize,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entry: None,
            loads: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// How many times the file has been read.
    pub fn loads(&self) -> usize {
        self.loads
    }

    pub fn get(&mut self) -> Result<&NationalDataset> {
        let modified = fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .with_context(|| format!("reading modification time of {}", self.path.display()))?;

        let fresh = matches!(&self.entry, Some((seen, _)) if *seen == modified);
        if fresh {
            debug!(path = %self.path.display(), "dataset cache hit");
        } else {
            let dataset = NationalDataset::load(&self.path)?;
            self.loads += 1;
            info!(path = %self.path.display(), loads = self.loads, "dataset (re)loaded");
            self.entry = Some((modified, dataset));
        }

        self.entry
            .as_ref()
            .map(|(_, dataset)| dataset)
            .context("dataset cache is empty")
    }

    /// Drop the cached copy so the next `get` reads the file again.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
