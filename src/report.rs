//! Per-stage run reports.
//!
//! Every stage returns a [`StageReport`] instead of narrating to stdout: what
//! was discovered, what got written, and which files failed at which point of
//! the `Discovered → Read → Transformed → Written` lifecycle.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Lifecycle of one input file. Strictly linear, no retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum FileStage {
    Discovered,
    Read,
    Transformed,
    Written,
}

impl fmt::Display for FileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileStage::Discovered => "discovered",
            FileStage::Read => "read",
            FileStage::Transformed => "transformed",
            FileStage::Written => "written",
        };
        f.write_str(name)
    }
}

/// Tracks how far a single file got.
#[derive(Debug, Clone)]
pub struct FileProgress {
    pub path: PathBuf,
    pub stage: FileStage,
}

impl FileProgress {
    pub fn discovered(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stage: FileStage::Discovered,
        }
    }

    /// Move forward to `stage`. Going backwards is a logic error and ignored.
    pub fn advance(&mut self, stage: FileStage) {
        if stage > self.stage {
            self.stage = stage;
        }
    }
}

/// One file that dropped out of the batch.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    /// Last stage the file completed before the error.
    pub reached: FileStage,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub cnt_discovered: u64,
    pub cnt_written: u64,
    pub cnt_skipped: u64,
    pub outputs: Vec<PathBuf>,
    pub warnings: Vec<String>,
    pub failures: Vec<FileFailure>,
}

impl StageReport {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// No failures and no warnings.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.warnings.is_empty()
    }

    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_discovered".to_string(), self.cnt_discovered);
        dict_counts.insert("cnt_written".to_string(), self.cnt_written);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_failed".to_string(), self.failure_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// One-line summary, e.g. `[extract] discovered=3 written=2 ...`.
    pub fn format(&self) -> String {
        let dict_counts = self.to_dict();
        format!(
            "[{}] discovered={} written={} skipped={} failed={} warnings={}",
            self.stage,
            dict_counts["cnt_discovered"],
            dict_counts["cnt_written"],
            dict_counts["cnt_skipped"],
            dict_counts["cnt_failed"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Mutable accumulator, finished with [`StageReportBuilder::build`].
#[derive(Debug, Clone)]
pub struct StageReportBuilder {
    stage: String,
    started_at: DateTime<Utc>,
    cnt_discovered: u64,
    cnt_written: u64,
    cnt_skipped: u64,
    outputs: Vec<PathBuf>,
    warnings: Vec<String>,
    failures: Vec<FileFailure>,
}

impl StageReportBuilder {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            started_at: Utc::now(),
            cnt_discovered: 0,
            cnt_written: 0,
            cnt_skipped: 0,
            outputs: Vec::new(),
            warnings: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn add_discovered(&mut self, count: usize) {
        self.cnt_discovered += count as u64;
    }

    /// One input fully processed; `outputs` are the files it produced.
    pub fn add_written<I: IntoIterator<Item = PathBuf>>(&mut self, outputs: I) {
        self.cnt_written += 1;
        self.outputs.extend(outputs);
    }

    /// An input deliberately left alone. Not a warning.
    pub fn add_skipped(&mut self, path: &Path, reason: &str) {
        self.cnt_skipped += 1;
        debug!(stage = %self.stage, path = %path.display(), "skipped: {}", reason);
    }

    /// Record a non-fatal issue; also logged.
    pub fn add_warning(&mut self, warning: String) {
        warn!(stage = %self.stage, "{}", warning);
        self.warnings.push(warning);
    }

    /// Record a failed file with its full context chain; also logged.
    pub fn add_failure(&mut self, progress: &FileProgress, err: &anyhow::Error) {
        error!(
            stage = %self.stage,
            path = %progress.path.display(),
            reached = %progress.stage,
            "failed: {:#}",
            err
        );
        self.failures.push(FileFailure {
            path: progress.path.clone(),
            reached: progress.stage,
            error: format!("{:#}", err),
        });
    }

    pub fn build(self) -> StageReport {
        StageReport {
            stage: self.stage,
            started_at: self.started_at,
            finished_at: Utc::now(),
            cnt_discovered: self.cnt_discovered,
            cnt_written: self.cnt_written,
            cnt_skipped: self.cnt_skipped,
            outputs: self.outputs,
            warnings: self.warnings,
            failures: self.failures,
        }
    }
}
