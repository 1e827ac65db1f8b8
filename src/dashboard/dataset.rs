use anyhow::Result;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{info, warn};

use super::REGION;
use crate::{
    error::PipelineError,
    grid::Grid,
    normalize::{year_start, FINANCIAL_YEAR, ORGANISATION, REGIME},
};

/// Columns the dashboard reads numbers from.
pub fn is_metric_column(name: &str) -> bool {
    name.contains("Count") || name.contains("Rate")
}

/// One row of the national table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub region: String,
    pub financial_year: String,
    pub year_start: i32,
    pub organisation: String,
    /// `None` when the cell is empty.
    pub regime: Option<String>,
    /// Raw cells, aligned with `NationalDataset::columns`.
    #[serde(skip)]
    pub cells: Vec<String>,
    /// Metric columns that parsed as numbers.
    pub metrics: BTreeMap<String, f64>,
}

impl Record {
    /// Numeric value of a metric column; `None` if missing or not a number.
    pub fn metric(&self, column: &str) -> Option<f64> {
        self.metrics.get(column).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NationalDataset {
    /// Header names with outer whitespace trimmed.
    pub columns: Vec<String>,
    pub records: Vec<Record>,
    /// Rows dropped because their financial year had no leading year.
    pub dropped_rows: usize,
}

impl NationalDataset {
    pub fn load(path: &Path) -> Result<Self> {
        let grid = Grid::read_csv(path)?;
        if grid.is_empty() {
            return Err(PipelineError::EmptyTable(path.to_path_buf()).into());
        }
        let dataset = Self::from_grid(&grid)?;
        info!(
            path = %path.display(),
            records = dataset.records.len(),
            dropped = dataset.dropped_rows,
            "loaded national table"
        );
        Ok(dataset)
    }

    pub fn from_grid(grid: &Grid) -> Result<Self> {
        let columns: Vec<String> = grid
            .header()
            .unwrap_or(&[])
            .iter()
            .map(|c| c.trim().to_string())
            .collect();
        let find = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
        };
        let region = find(REGION)?;
        let year = find(FINANCIAL_YEAR)?;
        let organisation = find(ORGANISATION)?;
        let regime = find(REGIME)?;
        let metric_columns: Vec<usize> = (0..columns.len())
            .filter(|&i| is_metric_column(&columns[i]))
            .collect();

        let mut records = Vec::with_capacity(grid.height().saturating_sub(1));
        let mut dropped_rows = 0;
        for (i, row) in grid.data_rows().iter().enumerate() {
            let financial_year = row[year].clone();
            let Some(start) = year_start(&financial_year) else {
                warn!(row = i + 1, year = %financial_year, "no start year; row dropped");
                dropped_rows += 1;
                continue;
            };
            let metrics = metric_columns
                .iter()
                .filter_map(|&c| {
                    let value = row[c].trim().parse::<f64>().ok()?;
                    Some((columns[c].clone(), value))
                })
                .collect();
            records.push(Record {
                region: row[region].clone(),
                financial_year,
                year_start: start,
                organisation: row[organisation].clone(),
                regime: Some(row[regime].clone()).filter(|r| !r.is_empty()),
                cells: row.clone(),
                metrics,
            });
        }

        Ok(Self {
            columns,
            records,
            dropped_rows,
        })
    }

    pub fn regions(&self) -> Vec<&str> {
        distinct(self.records.iter().map(|r| r.region.as_str()))
    }

    pub fn regimes(&self) -> Vec<&str> {
        distinct(self.records.iter().filter_map(|r| r.regime.as_deref()))
    }

    /// Organisations under `regime`, optionally restricted to one region.
    pub fn organisations(&self, regime: &str, region: Option<&str>) -> Vec<&str> {
        distinct(
            self.records
                .iter()
                .filter(|r| r.regime.as_deref() == Some(regime))
                .filter(|r| region.map_or(true, |region| r.region == region))
                .map(|r| r.organisation.as_str()),
        )
    }

    pub fn years(&self) -> Vec<i32> {
        self.records
            .iter()
            .map(|r| r.year_start)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
