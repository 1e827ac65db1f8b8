// src/normalize/mod.rs
//
// Stage 2: flatten each sub-table's two-row header and prepend the
// identifier columns.
pub mod year;

use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::PipelineConfig,
    error::PipelineError,
    grid::Grid,
    report::{FileProgress, FileStage, StageReport, StageReportBuilder},
    utils::{file_stem, folder_name, list_files, list_subfolders},
};
pub use year::{format_financial_year, year_start};

pub const FINANCIAL_YEAR: &str = "FinancialYear";
pub const REGIME: &str = "Regime";
pub const ORGANISATION: &str = "Organisation";

/// Placeholder organisation the sheets use for their aggregate row.
pub const TOTAL_ROW: &str = "Total_Count";
pub const UNKNOWN_ORGANISATION: &str = "unknown";

/// First and last metric columns; the zeroing step works on this span.
pub const METRIC_SPAN_START: &str = "All_ABI__Female_Count";
pub const METRIC_SPAN_END: &str = "Other_disorders_Total_Rate";

/// Number of leading identifier columns cut back at their first underscore.
const ID_COLUMNS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub grid: Grid,
    /// Rows whose aggregate placeholder was rewritten.
    pub zeroed_rows: usize,
    pub warnings: Vec<String>,
}

/// Flatten a two-row-header table into `FinancialYear, Regime, Organisation,
/// <metrics...>`.
pub fn normalize_table(mut grid: Grid) -> Result<Normalized> {
    if grid.height() < 2 {
        return Err(PipelineError::TooFewRows {
            found: grid.height(),
        }
        .into());
    }
    let mut warnings = Vec::new();

    merge_header_rows(&mut grid);

    let regime = grid
        .cell(1, 0)
        .ok_or_else(|| anyhow!("table has no columns"))?
        .replace(' ', "");
    grid.insert_column(0, |_| regime.clone());
    set_header(&mut grid, 0, REGIME);

    // the block's top-left cell holds the year it was published for
    let financial_year = grid.rows()[0][1].clone();
    grid.insert_column(0, |_| financial_year.clone());
    set_header(&mut grid, 0, FINANCIAL_YEAR);

    grid.remove_row(1);
    truncate_id_columns(&mut grid);
    if grid.width() > 2 {
        set_header(&mut grid, 2, ORGANISATION);
    }

    for row in grid.data_rows_mut() {
        row[0] = format_financial_year(&row[0]);
    }

    let zeroed_rows = match zero_total_rows(&mut grid) {
        Ok(n) => n,
        Err(warning) => {
            warn!("{}", warning);
            warnings.push(warning);
            0
        }
    };

    Ok(Normalized {
        grid,
        zeroed_rows,
        warnings,
    })
}

/// Underscores for spaces in row 0, then fold row 1 into row 0 from column 1
/// on: `<row0>_<row1>`, or whichever of the two is non-empty.
pub fn merge_header_rows(grid: &mut Grid) {
    let rows = grid.rows_mut();
    let Some(first) = rows.first_mut() else {
        return;
    };
    for cell in first.iter_mut() {
        *cell = cell.replace(' ', "_");
    }
    if rows.len() < 2 {
        return;
    }

    let (head, rest) = rows.split_at_mut(1);
    let (primary, secondary) = (&mut head[0], &rest[0]);
    for c in 1..primary.len() {
        let second = &secondary[c];
        if second.is_empty() {
            continue;
        }
        primary[c] = if primary[c].is_empty() {
            second.clone()
        } else {
            format!("{}_{}", primary[c], second)
        };
    }
}

/// Cut the identifier columns at their first underscore, header included.
pub fn truncate_id_columns(grid: &mut Grid) {
    for row in grid.rows_mut() {
        for cell in row.iter_mut().take(ID_COLUMNS) {
            if let Some(idx) = cell.find('_') {
                cell.truncate(idx);
            }
        }
    }
}

/// Rewrite aggregate rows: Organisation `Total_Count` becomes `unknown` and
/// every metric in the `All_ABI__Female_Count..=Other_disorders_Total_Rate`
/// span is zeroed.
///
/// Returns the number of rows rewritten, or a warning when the columns it
/// needs are not there.
pub fn zero_total_rows(grid: &mut Grid) -> std::result::Result<usize, String> {
    let org = grid
        .column_index(ORGANISATION)
        .ok_or_else(|| format!("no '{}' column; total rows left as-is", ORGANISATION))?;
    let start = grid.column_index(METRIC_SPAN_START).ok_or_else(|| {
        format!(
            "no '{}' column; total rows left as-is",
            METRIC_SPAN_START
        )
    })?;
    let end = grid
        .column_index(METRIC_SPAN_END)
        .ok_or_else(|| format!("no '{}' column; total rows left as-is", METRIC_SPAN_END))?;
    if end < start {
        return Err(format!(
            "'{}' comes before '{}'; total rows left as-is",
            METRIC_SPAN_END, METRIC_SPAN_START
        ));
    }

    let mut zeroed = 0;
    for row in grid.data_rows_mut() {
        if row[org] != TOTAL_ROW {
            continue;
        }
        row[org] = UNKNOWN_ORGANISATION.to_string();
        for cell in &mut row[start..=end] {
            *cell = "0".to_string();
        }
        zeroed += 1;
    }
    debug!(zeroed, "rewrote total rows");
    Ok(zeroed)
}

fn set_header(grid: &mut Grid, col: usize, name: &str) {
    if let Some(cell) = grid.cell_mut(0, col) {
        *cell = name.to_string();
    }
}

/// Normalize one CSV in place.
pub fn normalize_file(path: &Path) -> Result<Normalized> {
    let mut progress = FileProgress::discovered(path);
    normalize_tracked(&mut progress)
}

#[instrument(level = "info", skip(progress), fields(path = %progress.path.display()))]
fn normalize_tracked(progress: &mut FileProgress) -> Result<Normalized> {
    let path = progress.path.clone();
    let grid = Grid::read_csv(&path)?;
    progress.advance(FileStage::Read);

    let normalized = normalize_table(grid)?;
    progress.advance(FileStage::Transformed);

    normalized.grid.write_csv(&path)?;
    progress.advance(FileStage::Written);
    info!(
        rows = normalized.grid.height(),
        cols = normalized.grid.width(),
        zeroed = normalized.zeroed_rows,
        "normalized"
    );
    Ok(normalized)
}

/// Normalize every sub-table CSV of every region folder. The whole-sheet dump
/// (`<folder>/<folder>.csv`) is not a sub-table and is left alone.
pub fn run(config: &PipelineConfig) -> Result<StageReport> {
    let mut report = StageReportBuilder::new("normalize");
    let root = &config.output_dir;
    if !root.is_dir() {
        return Err(PipelineError::MissingDirectory(root.clone()).into());
    }

    let folders = list_subfolders(root)?;
    if folders.is_empty() {
        report.add_warning(format!("no region folders in {}", root.display()));
    }

    for folder in folders {
        let region = folder_name(&folder);
        let (sheet_copies, files): (Vec<_>, Vec<_>) = list_files(&folder, "*.csv")?
            .into_iter()
            .partition(|p| file_stem(p) == region);
        for path in &sheet_copies {
            report.add_skipped(path, "whole-sheet copy");
        }
        info!(region = %region, files = files.len(), "normalizing folder");
        if files.is_empty() {
            report.add_warning(format!("no tables in {}", folder.display()));
            continue;
        }
        report.add_discovered(files.len());

        for path in files {
            let mut progress = FileProgress::discovered(&path);
            match normalize_tracked(&mut progress) {
                Ok(normalized) => {
                    for warning in normalized.warnings {
                        report.add_warning(format!("{}: {}", path.display(), warning));
                    }
                    report.add_written(Some(path));
                }
                Err(err) => report.add_failure(&progress, &err),
            }
        }
    }

    let report = report.build();
    info!("{}", report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;
    use std::fs;
    use tempfile::TempDir;

    /// A sub-table as the extractor leaves it.
    fn extracted_table() -> Grid {
        Grid::from_strs(&[
            &[
                "2014-2015", "All ABI ", "All ABI ", "Other_disorders", "Other_disorders",
            ],
            &[
                "Clinical Commissioning Group",
                "Female_Count",
                "Total_Rate",
                "Female_Count",
                "Total_Rate",
            ],
            &["NHS Bristol", "5", "1.2", "10", "3.1"],
            &["Total_Count", "5", "1.2", "10", "3.1"],
        ])
    }

    #[test]
    fn header_is_flattened_and_ids_prepended() -> Result<()> {
        let normalized = normalize_table(extracted_table())?;
        let grid = &normalized.grid;

        assert_eq!(
            grid.header().unwrap(),
            [
                "FinancialYear",
                "Regime",
                "Organisation",
                "All_ABI__Female_Count",
                "All_ABI__Total_Rate",
                "Other_disorders_Female_Count",
                "Other_disorders_Total_Rate",
            ]
        );
        assert_eq!(grid.height(), 3);
        assert_eq!(
            grid.rows()[1],
            ["2014-15", "ClinicalCommissioningGroup", "NHS Bristol", "5", "1.2", "10", "3.1"]
        );
        Ok(())
    }

    #[test]
    fn total_row_is_zeroed_within_span() -> Result<()> {
        let normalized = normalize_table(extracted_table())?;
        assert_eq!(normalized.zeroed_rows, 1);
        assert!(normalized.warnings.is_empty());
        assert_eq!(
            normalized.grid.rows()[2][2..],
            ["unknown", "0", "0", "0", "0"]
        );
        // ordinary rows untouched
        assert_eq!(normalized.grid.rows()[1][3], "5");
        Ok(())
    }

    #[test]
    fn zeroing_leaves_columns_outside_span() {
        let mut grid = Grid::from_strs(&[
            &[
                "FinancialYear", "Regime", "Organisation", "Population",
                "All_ABI__Female_Count", "Stroke_Total_Count", "Other_disorders_Total_Rate",
            ],
            &["2014-15", "CCG", "Total_Count", "9000", "5", "10", "3"],
        ]);
        assert_eq!(zero_total_rows(&mut grid), Ok(1));
        assert_eq!(
            grid.rows()[1],
            ["2014-15", "CCG", "unknown", "9000", "0", "0", "0"]
        );
    }

    #[test]
    fn missing_span_is_a_warning_not_an_error() -> Result<()> {
        let grid = Grid::from_strs(&[
            &["2016-2017", "Stroke", "Stroke"],
            &["PCT", "Female_Count", "Male_Count"],
            &["Total_Count", "1", "2"],
        ]);
        let normalized = normalize_table(grid)?;
        assert_eq!(normalized.zeroed_rows, 0);
        assert_eq!(normalized.warnings.len(), 1);
        assert!(normalized.warnings[0].contains(METRIC_SPAN_START));
        assert_eq!(normalized.grid.rows()[1][2], "Total_Count");
        Ok(())
    }

    #[test]
    fn underscore_truncation_only_hits_id_columns() {
        let mut grid = Grid::from_strs(&[&["ABC_DEF", "ABC_DEF", "ABC_DEF", "x", "x", "ABC_DEF"]]);
        truncate_id_columns(&mut grid);
        assert_eq!(grid.rows()[0], ["ABC", "ABC", "ABC_DEF", "x", "x", "ABC_DEF"]);
    }

    #[test]
    fn header_merge_falls_back_to_non_empty_cell() {
        let mut grid = Grid::from_strs(&[
            &["Year label", "All ABI", "", "Stroke"],
            &["Regime", "", "Male_Count", "Total_Rate"],
        ]);
        merge_header_rows(&mut grid);
        assert_eq!(
            grid.rows()[0],
            ["Year_label", "All_ABI", "Male_Count", "Stroke_Total_Rate"]
        );
    }

    #[test]
    fn single_row_table_is_rejected() {
        let err = normalize_table(Grid::from_strs(&[&["2014-2015", "x"]])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::TooFewRows { found: 1 })
        ));
    }

    #[test]
    fn run_rewrites_tables_and_skips_sheet_dump() -> Result<()> {
        init_test_logging();
        let dir = TempDir::new()?;
        let folder = dir.path().join("South_West");
        fs::create_dir_all(&folder)?;
        extracted_table().write_csv(&folder.join("2014_2015.csv"))?;
        Grid::from_strs(&[&["only one row"]]).write_csv(&folder.join("2099_bad.csv"))?;
        let dump = Grid::from_strs(&[&["whole", "sheet"]]);
        dump.write_csv(&folder.join("South_West.csv"))?;

        let config = PipelineConfig::new(dir.path().join("in"), dir.path());
        let report = run(&config)?;

        assert_eq!(report.cnt_discovered, 2);
        assert_eq!(report.cnt_skipped, 1);
        assert_eq!(report.cnt_written, 1);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failures[0].reached, FileStage::Read);

        let rewritten = Grid::read_csv(&folder.join("2014_2015.csv"))?;
        assert_eq!(rewritten.cell(0, 0), Some(FINANCIAL_YEAR));
        assert_eq!(Grid::read_csv(&folder.join("South_West.csv"))?, dump);
        Ok(())
    }
}
