// src/combine/header.rs
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::LoadedTable;

/// How many differing columns a mismatch keeps for the report.
pub const MAX_LISTED_DIFFERENCES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDiff {
    pub column: usize,
    pub expected: String,
    pub found: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MismatchKind {
    ColumnCount { expected: usize, found: usize },
    Columns { differences: Vec<ColumnDiff>, total: usize },
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderMismatch {
    pub path: PathBuf,
    pub kind: MismatchKind,
}

impl fmt::Display for HeaderMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.path.display())?;
        match &self.kind {
            MismatchKind::ColumnCount { expected, found } => {
                write!(f, "column count mismatch ({} vs {})", expected, found)
            }
            MismatchKind::Columns { differences, total } => {
                let listed: Vec<String> = differences
                    .iter()
                    .map(|d| format!("column {}: '{}' vs '{}'", d.column, d.expected, d.found))
                    .collect();
                write!(f, "{}", listed.join("; "))?;
                if *total > differences.len() {
                    write!(f, "; ... and {} more", total - differences.len())?;
                }
                Ok(())
            }
            MismatchKind::Unreadable(err) => write!(f, "unreadable: {}", err),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderCheck {
    /// Header of the first table, the one every other table is held to.
    pub reference: Option<Vec<String>>,
    pub mismatches: Vec<HeaderMismatch>,
}

impl HeaderCheck {
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn inconsistent_files(&self) -> Vec<&PathBuf> {
        self.mismatches.iter().map(|m| &m.path).collect()
    }
}

/// Compare every table's header with the first one, cell by cell.
pub fn check_header_consistency(tables: &[LoadedTable]) -> HeaderCheck {
    let mut check = HeaderCheck::default();
    let Some((first, rest)) = tables.split_first() else {
        return check;
    };
    let reference = first.header().to_vec();

    for table in rest {
        let current = table.header();
        let kind = if current.len() != reference.len() {
            Some(MismatchKind::ColumnCount {
                expected: reference.len(),
                found: current.len(),
            })
        } else {
            let all: Vec<ColumnDiff> = reference
                .iter()
                .zip(current)
                .enumerate()
                .filter(|(_, (expected, found))| expected != found)
                .map(|(column, (expected, found))| ColumnDiff {
                    column,
                    expected: expected.clone(),
                    found: found.clone(),
                })
                .collect();
            (!all.is_empty()).then(|| MismatchKind::Columns {
                total: all.len(),
                differences: all.into_iter().take(MAX_LISTED_DIFFERENCES).collect(),
            })
        };

        if let Some(kind) = kind {
            check.mismatches.push(HeaderMismatch {
                path: table.path.clone(),
                kind,
            });
        }
    }

    check.reference = Some(reference);
    check
}
