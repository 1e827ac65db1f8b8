// src/extract/labels.rs
//
// Cell rewrites applied to the raw sheet before it is split. All of them are
// pure functions over a `Grid` and safe to re-run.

use crate::grid::Grid;
use serde::Serialize;

/// Category labels that head a block of columns in the source sheet.
pub const CATEGORIES: [&str; 9] = [
    "All ABI",
    "Head injuries",
    "Stroke",
    "Meningitis",
    "Brain tumour",
    "Abscess",
    "Anoxia",
    OTHER_DISORDERS,
    "CO poisoning",
];

/// Long-form label, e.g. "Other disorders (encephalitis, ...)".
pub const OTHER_DISORDERS_PREFIX: &str = "Other disorders";
pub const OTHER_DISORDERS: &str = "Other_disorders";

/// How many cells to the right of a category label receive a copy of it.
pub const PROPAGATION_SPAN: usize = 5;

pub const RATE: &str = "Rate";
pub const COUNT_TERMS: [&str; 3] = ["Female", "Male", "Total"];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelStats {
    pub other_disorders: usize,
    pub propagated: usize,
    pub rates: usize,
    pub counts: usize,
}

/// Run every rewrite in the order the sheet layout needs.
pub fn apply_all(grid: &mut Grid) -> LabelStats {
    LabelStats {
        other_disorders: rewrite_other_disorders(grid),
        propagated: propagate_categories(grid, &CATEGORIES),
        rates: suffix_rates(grid),
        counts: suffix_counts(grid),
    }
}

/// Collapse any cell starting with the long "Other disorders" label.
pub fn rewrite_other_disorders(grid: &mut Grid) -> usize {
    let mut changed = 0;
    for cell in grid.rows_mut().iter_mut().flatten() {
        if cell.trim().starts_with(OTHER_DISORDERS_PREFIX) {
            *cell = OTHER_DISORDERS.to_string();
            changed += 1;
        }
    }
    changed
}

/// Copy each category label into the `PROPAGATION_SPAN` cells to its right.
///
/// Sources are read from a snapshot taken before any copying, so a label that
/// only exists because it was propagated never propagates itself. A source is
/// skipped when its left neighbour already carries the same label (it is the
/// tail of an earlier run) or when any of its targets already does. Together
/// these make a second application a no-op.
///
/// Returns the number of labels copied.
pub fn propagate_categories(grid: &mut Grid, categories: &[&str]) -> usize {
    let snapshot = grid.rows().to_vec();
    let mut copied = 0;

    for (r, row) in snapshot.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let label = cell.trim();
            if !categories.contains(&label) {
                continue;
            }

            let live = &mut grid.rows_mut()[r];
            if c > 0 && live[c - 1].trim() == label {
                continue;
            }
            let end = (c + 1 + PROPAGATION_SPAN).min(live.len());
            let targets = &mut live[c + 1..end];
            if targets.is_empty() || targets.iter().any(|t| t.trim() == label) {
                continue;
            }
            for target in targets.iter_mut() {
                target.clone_from(cell);
            }
            copied += 1;
        }
    }
    copied
}

/// `Rate` becomes `<left>_Rate`, reading the left neighbour as already
/// rewritten.
pub fn suffix_rates(grid: &mut Grid) -> usize {
    let mut changed = 0;
    for row in grid.rows_mut() {
        for c in 1..row.len() {
            if row[c].trim() == RATE && !row[c - 1].is_empty() {
                row[c] = format!("{}_{}", row[c - 1], RATE);
                changed += 1;
            }
        }
    }
    changed
}

/// `Female`/`Male`/`Total` become `<term>_Count`.
pub fn suffix_counts(grid: &mut Grid) -> usize {
    let mut changed = 0;
    for cell in grid.rows_mut().iter_mut().flatten() {
        let term = cell.trim();
        if COUNT_TERMS.contains(&term) {
            *cell = format!("{}_Count", term);
            changed += 1;
        }
    }
    changed
}
