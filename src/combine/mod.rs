// src/combine/mod.rs
//
// Stage 3: stack normalized tables into one file per region, then stack the
// region files into the national file.
pub mod header;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::{
    config::PipelineConfig,
    error::PipelineError,
    grid::Grid,
    report::{FileProgress, FileStage, StageReport, StageReportBuilder},
    utils::{file_stem, folder_name, list_files, list_subfolders},
};
pub use header::{check_header_consistency, HeaderCheck, HeaderMismatch, MismatchKind};

pub const REGION: &str = "Region";

/// A CSV read into memory, remembering where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTable {
    pub path: PathBuf,
    pub grid: Grid,
}

impl LoadedTable {
    pub fn load(path: &Path) -> Result<Self> {
        let grid = Grid::read_csv(path)?;
        if grid.is_empty() {
            return Err(PipelineError::EmptyTable(path.to_path_buf()).into());
        }
        Ok(Self {
            path: path.to_path_buf(),
            grid,
        })
    }

    pub fn header(&self) -> &[String] {
        self.grid.header().unwrap_or(&[])
    }
}

/// Outcome of combining one set of tables.
#[derive(Debug, Clone)]
pub struct Combined {
    pub output: PathBuf,
    pub grid: Grid,
    pub headers: HeaderCheck,
    /// Inputs that could not be read and were left out.
    pub unreadable: Vec<(PathBuf, String)>,
}

/// `*.csv` files in `dir` whose name starts with a digit (the per-year
/// tables), sorted.
pub fn numeric_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_files(dir, "*.csv")?
        .into_iter()
        .filter(|p| file_stem(p).starts_with(|c: char| c.is_ascii_digit()))
        .collect())
}

/// Stack tables: the first table's header is kept, every later header is
/// dropped, rows stay in file order then row order.
///
/// With `region` set a `Region` column is prepended first: header cell
/// `Region`, every other row the region name.
pub fn concatenate(tables: &[Grid], region: Option<&str>) -> Grid {
    let mut rows = Vec::with_capacity(tables.iter().map(Grid::height).sum());
    for (i, table) in tables.iter().enumerate() {
        let skip = usize::from(i > 0);
        for (r, row) in table.rows().iter().enumerate().skip(skip) {
            let mut out = Vec::with_capacity(row.len() + 1);
            if let Some(region) = region {
                out.push(if r == 0 { REGION } else { region }.to_string());
            }
            out.extend(row.iter().cloned());
            rows.push(out);
        }
    }
    Grid::new(rows)
}

/// Load, header-check, concatenate and write. Header mismatches and
/// unreadable inputs are reported back, never fatal.
pub fn combine_files(paths: &[PathBuf], region: Option<&str>, output: &Path) -> Result<Combined> {
    let mut tables = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for path in paths {
        match LoadedTable::load(path) {
            Ok(table) => {
                info!(path = %path.display(), rows = table.grid.height(), "loaded");
                tables.push(table);
            }
            Err(err) => {
                warn!(path = %path.display(), "skipping unreadable table: {:#}", err);
                unreadable.push((path.clone(), format!("{:#}", err)));
            }
        }
    }
    if tables.is_empty() {
        anyhow::bail!("no readable tables to combine into {}", output.display());
    }

    let mut headers = check_header_consistency(&tables);
    for (path, err) in &unreadable {
        headers.mismatches.push(HeaderMismatch {
            path: path.clone(),
            kind: MismatchKind::Unreadable(err.clone()),
        });
    }
    if !headers.is_consistent() {
        warn!(
            count = headers.mismatches.len(),
            "inconsistent headers; combining anyway"
        );
    }

    let grids: Vec<Grid> = tables.into_iter().map(|t| t.grid).collect();
    let grid = concatenate(&grids, region);
    grid.write_csv(output)?;
    info!(
        output = %output.display(),
        rows = grid.height(),
        cols = grid.width(),
        "combined"
    );

    Ok(Combined {
        output: output.to_path_buf(),
        grid,
        headers,
        unreadable,
    })
}

/// Combine one region folder into `<out_dir>/<folder>.csv`, tagging every
/// row with the folder name.
#[instrument(level = "info", skip(folder, out_dir), fields(folder = %folder.display()))]
pub fn combine_region(folder: &Path, out_dir: &Path) -> Result<Combined> {
    let region = folder_name(folder);
    let files = numeric_csv_files(folder)?;
    if files.is_empty() {
        anyhow::bail!("no numeric tables in {}", folder.display());
    }
    info!(region = %region, files = files.len(), "combining region");
    let output = out_dir.join(format!("{}.csv", region));
    combine_files(&files, Some(&region), &output)
        .with_context(|| format!("combining region {}", region))
}

/// Combine region files (already carrying their `Region` column) into the
/// national file.
#[instrument(level = "info", skip(region_files, output), fields(output = %output.display()))]
pub fn combine_national(region_files: &[PathBuf], output: &Path) -> Result<Combined> {
    combine_files(region_files, None, output).context("combining national table")
}

fn record_headers(report: &mut StageReportBuilder, combined: &Combined) {
    for mismatch in &combined.headers.mismatches {
        report.add_warning(format!("header mismatch: {}", mismatch));
    }
}

/// Every region folder → `processed_data/<Region>.csv`, then all of those →
/// `processed_data/England.csv`.
pub fn run(config: &PipelineConfig) -> Result<StageReport> {
    let mut report = StageReportBuilder::new("combine");
    let root = &config.output_dir;
    if !root.is_dir() {
        return Err(PipelineError::MissingDirectory(root.clone()).into());
    }

    let folders = list_subfolders(root)?;
    report.add_discovered(folders.len());
    if folders.is_empty() {
        report.add_warning(format!("no region folders in {}", root.display()));
    }

    let mut region_files = Vec::new();
    for folder in folders {
        let mut progress = FileProgress::discovered(&folder);
        match combine_region(&folder, root) {
            Ok(combined) => {
                progress.advance(FileStage::Written);
                record_headers(&mut report, &combined);
                region_files.push(combined.output.clone());
                report.add_written(Some(combined.output));
            }
            Err(err) => report.add_failure(&progress, &err),
        }
    }

    if region_files.is_empty() {
        report.add_warning("no region tables; national table not written".to_string());
    } else {
        let output = config.national_path();
        let mut progress = FileProgress::discovered(&output);
        match combine_national(&region_files, &output) {
            Ok(combined) => {
                progress.advance(FileStage::Written);
                record_headers(&mut report, &combined);
                info!(rows = combined.grid.height(), "national table written");
                report.add_written(Some(combined.output));
            }
            Err(err) => report.add_failure(&progress, &err),
        }
    }

    let report = report.build();
    info!("{}", report);
    Ok(report)
}
