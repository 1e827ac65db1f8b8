// src/extract/workbook.rs
use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;

use crate::{error::PipelineError, grid::Grid, utils::format_number};

/// One worksheet pulled out of a workbook as plain text cells.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub grid: Grid,
}

/// Read the sheet at `index` (0-based) of the workbook at `path`.
///
/// Workbooks with fewer than `index + 1` sheets are rejected with
/// [`PipelineError::TooFewSheets`].
pub fn read_sheet(path: &Path, index: usize) -> Result<Sheet> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;

    let names = workbook.sheet_names();
    let name = names
        .get(index)
        .cloned()
        .ok_or_else(|| PipelineError::TooFewSheets {
            path: path.to_path_buf(),
            found: names.len(),
        })?;

    let range = workbook
        .worksheet_range(&name)
        .with_context(|| format!("reading sheet '{}' of {}", name, path.display()))?;

    Ok(Sheet {
        grid: range_to_grid(&range),
        name,
    })
}

/// Convert a calamine range to a grid anchored at A1.
///
/// calamine starts a range at the first used cell; leading empty rows and
/// columns are restored so row offsets match what the sheet shows.
pub fn range_to_grid(range: &Range<Data>) -> Grid {
    let (row0, col0) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<String>> = vec![Vec::new(); row0];
    for row in range.rows() {
        let mut cells = vec![String::new(); col0];
        cells.extend(row.iter().map(cell_text));
        rows.push(cells);
    }
    Grid::new(rows)
}

/// Text of one cell; empty and error cells become blank.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
        other => other.to_string(),
    }
}
