use anyhow::Result;
use std::io::Write;

use super::{
    dataset::{is_metric_column, NationalDataset, Record},
    YEAR_START,
};
use crate::{grid::Grid, utils::format_number};

/// Write a filtered view as CSV: the dataset's columns plus `Year_Start`.
/// Metric cells hold their coerced value and are empty where none parsed.
pub fn export_csv<W: Write>(dataset: &NationalDataset, records: &[&Record], writer: W) -> Result<()> {
    let mut header = dataset.columns.clone();
    header.push(YEAR_START.to_string());

    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(header);
    for record in records {
        let mut row: Vec<String> = dataset
            .columns
            .iter()
            .zip(&record.cells)
            .map(|(column, cell)| {
                if is_metric_column(column) {
                    record.metric(column).map(format_number).unwrap_or_default()
                } else {
                    cell.clone()
                }
            })
            .collect();
        row.push(record.year_start.to_string());
        rows.push(row);
    }
    Grid::new(rows).to_writer(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Filter;

    #[test]
    fn filtered_view_is_written_with_year_start() -> Result<()> {
        let dataset = NationalDataset::from_grid(&Grid::from_strs(&[
            &["Region", "FinancialYear", "Regime", "Organisation", "All_ABI__Total_Rate"],
            &["Yorkshire", "2014-15", "PCT", "Leeds PCT", "12.50"],
            &["London", "2015-16", "CCG", "NHS Camden", "n/a"],
        ]))?;
        let filter = Filter {
            regime: Some("CCG".to_string()),
            ..Default::default()
        };

        let mut out = Vec::new();
        export_csv(&dataset, &filter.filter(&dataset), &mut out)?;
        let text = String::from_utf8(out)?;
        assert_eq!(
            text,
            "Region,FinancialYear,Regime,Organisation,All_ABI__Total_Rate,Year_Start\n\
             London,2015-16,CCG,NHS Camden,,2015\n"
        );

        let mut all = Vec::new();
        let records: Vec<&Record> = dataset.records.iter().collect();
        export_csv(&dataset, &records, &mut all)?;
        assert!(String::from_utf8(all)?.contains("Leeds PCT,12.5,2014"));
        Ok(())
    }
}
