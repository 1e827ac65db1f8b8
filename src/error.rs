use std::path::PathBuf;

use thiserror::Error;

/// Domain failures raised by the pipeline stages.
///
/// Everything else (I/O, CSV, workbook parsing) travels as `anyhow::Error`
/// with context attached at the call site.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("workbook {} has {found} sheet(s); at least two are required", path.display())]
    TooFewSheets { path: PathBuf, found: usize },

    #[error("table has {found} row(s); a two-row header is required")]
    TooFewRows { found: usize },

    #[error("table {} is empty", .0.display())]
    EmptyTable(PathBuf),

    #[error("missing required column: {0}")]
    MissingColumn(String),
}
