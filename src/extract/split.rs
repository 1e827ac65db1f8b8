// src/extract/split.rs
use crate::{grid::Grid, utils::is_blank};
use tracing::debug;

/// A blank-row-delimited block of the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubTable {
    /// Trimmed top-left cell, or `Table_<n>` when that cell is blank.
    pub name: String,
    pub grid: Grid,
}

/// Split `grid` at fully-blank rows. Runs of blank rows count as one
/// boundary; leading and trailing blanks produce nothing.
pub fn split_by_blank_rows(grid: &Grid) -> Vec<SubTable> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<String>> = Vec::new();
    let mut current_name: Option<String> = None;

    for row in grid.rows() {
        if row.iter().all(|cell| is_blank(cell)) {
            if let Some(name) = current_name.take() {
                debug!(table = %name, rows = current.len(), "found table");
                tables.push(SubTable {
                    name,
                    grid: Grid::new(std::mem::take(&mut current)),
                });
            }
            continue;
        }

        if current_name.is_none() {
            current_name = Some(match row.first().map(|c| c.trim()) {
                Some(first) if !first.is_empty() => first.to_string(),
                _ => format!("Table_{}", tables.len() + 1),
            });
        }
        current.push(row.clone());
    }

    if let Some(name) = current_name {
        debug!(table = %name, rows = current.len(), "found table");
        tables.push(SubTable {
            name,
            grid: Grid::new(current),
        });
    }

    tables
}
