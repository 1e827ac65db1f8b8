// src/extract/mod.rs
//
// Stage 1: workbook → per-region folder of sub-table CSVs.
pub mod labels;
pub mod split;
pub mod workbook;

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

use crate::{
    config::PipelineConfig,
    error::PipelineError,
    report::{FileProgress, FileStage, StageReport, StageReportBuilder},
    utils::{list_files, sanitize_name},
};
pub use labels::LabelStats;
pub use split::{split_by_blank_rows, SubTable};

/// Source sheets carry a cover page first; the data lives on the second one.
pub const SHEET_INDEX: usize = 1;
/// Title and notes above the first table.
pub const SKIP_ROWS: usize = 6;

pub const WORKBOOK_PATTERNS: [&str; 2] = ["*.xlsx", "*.xls"];

#[derive(Debug, Clone)]
pub struct ExtractedWorkbook {
    pub sheet_name: String,
    /// `<out_root>/<Sheet>`
    pub folder: PathBuf,
    /// The whole processed sheet, `<folder>/<Sheet>.csv`.
    pub sheet_file: PathBuf,
    /// One file per sub-table, in sheet order.
    pub tables: Vec<PathBuf>,
    pub labels: LabelStats,
}

impl ExtractedWorkbook {
    pub fn outputs(&self) -> impl Iterator<Item = PathBuf> + '_ {
        std::iter::once(self.sheet_file.clone()).chain(self.tables.iter().cloned())
    }
}

/// Extract one workbook into `out_root/<Sheet>/`.
pub fn extract_workbook(path: &Path, out_root: &Path) -> Result<ExtractedWorkbook> {
    let mut progress = FileProgress::discovered(path);
    extract_tracked(&mut progress, out_root)
}

#[instrument(level = "info", skip(progress, out_root), fields(path = %progress.path.display()))]
fn extract_tracked(progress: &mut FileProgress, out_root: &Path) -> Result<ExtractedWorkbook> {
    let path = progress.path.clone();

    let sheet = workbook::read_sheet(&path, SHEET_INDEX)?;
    progress.advance(FileStage::Read);
    info!(sheet = %sheet.name, rows = sheet.grid.height(), "read sheet");

    let mut grid = sheet.grid.skip_rows(SKIP_ROWS);
    let stats = labels::apply_all(&mut grid);
    let tables = split_by_blank_rows(&grid);
    progress.advance(FileStage::Transformed);
    info!(?stats, tables = tables.len(), "relabelled and split");

    let folder_name = sanitize_name(&sheet.name);
    let folder = out_root.join(&folder_name);
    fs::create_dir_all(&folder)
        .with_context(|| format!("creating output folder {}", folder.display()))?;

    let sheet_file = folder.join(format!("{}.csv", folder_name));
    grid.write_csv(&sheet_file)?;

    let mut written = Vec::with_capacity(tables.len());
    for (i, table) in tables.iter().enumerate() {
        let mut file_name = sanitize_name(&table.name);
        if file_name.is_empty() {
            file_name = format!("table_{}", i + 1);
        }
        let table_path = folder.join(format!("{}.csv", file_name));
        table.grid.write_csv(&table_path)?;
        info!(table = %table.name, path = %table_path.display(), "wrote table");
        written.push(table_path);
    }
    progress.advance(FileStage::Written);

    Ok(ExtractedWorkbook {
        sheet_name: sheet.name,
        folder,
        sheet_file,
        tables: written,
        labels: stats,
    })
}

/// Extract every workbook in the input folder. Only a missing input folder is
/// fatal; a bad workbook is recorded and the batch moves on.
pub fn run(config: &PipelineConfig) -> Result<StageReport> {
    let mut report = StageReportBuilder::new("extract");

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating output directory {}", config.output_dir.display()))?;
    if !config.input_dir.is_dir() {
        return Err(PipelineError::MissingDirectory(config.input_dir.clone()).into());
    }

    let mut workbooks = Vec::new();
    for pattern in WORKBOOK_PATTERNS {
        workbooks.extend(list_files(&config.input_dir, pattern)?);
    }
    report.add_discovered(workbooks.len());
    if workbooks.is_empty() {
        report.add_warning(format!(
            "no workbooks found in {}",
            config.input_dir.display()
        ));
    }
    info!(count = workbooks.len(), dir = %config.input_dir.display(), "workbooks to extract");

    for path in workbooks {
        let mut progress = FileProgress::discovered(&path);
        match extract_tracked(&mut progress, &config.output_dir) {
            Ok(extracted) => {
                info!(
                    sheet = %extracted.sheet_name,
                    folder = %extracted.folder.display(),
                    tables = extracted.tables.len(),
                    "extracted"
                );
                report.add_written(extracted.outputs());
            }
            Err(err) => report.add_failure(&progress, &err),
        }
    }

    let report = report.build();
    info!("{}", report);
    Ok(report)
}
