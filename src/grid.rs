// src/grid.rs
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

/// A rectangular 2-D grid of text cells.
///
/// Row 0 is treated as the header once a table has been flattened; before
/// that the grid is just position-addressed cells. Blank cells are empty
/// strings. Every row has the same width: short rows are padded on the way in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn new(mut rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { rows }
    }

    /// Convenience constructor, mostly for tests.
    pub fn from_strs(rows: &[&[&str]]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Mutable access to the cells. A slice, so rows can be edited but the
    /// grid cannot be made ragged.
    pub fn rows_mut(&mut self) -> &mut [Vec<String>] {
        &mut self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    pub fn header_mut(&mut self) -> Option<&mut [String]> {
        self.rows.first_mut().map(Vec::as_mut_slice)
    }

    /// Every row after the header.
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn data_rows_mut(&mut self) -> &mut [Vec<String>] {
        self.rows.get_mut(1..).unwrap_or(&mut [])
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut String> {
        self.rows.get_mut(row)?.get_mut(col)
    }

    /// Position of the first header cell exactly equal to `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header()?.iter().position(|cell| cell == name)
    }

    /// Insert a column at `index`; `fill` gets the row index and returns the
    /// new cell for that row.
    pub fn insert_column(&mut self, index: usize, mut fill: impl FnMut(usize) -> String) {
        let index = index.min(self.width());
        for (r, row) in self.rows.iter_mut().enumerate() {
            row.insert(index, fill(r));
        }
    }

    pub fn remove_row(&mut self, index: usize) -> Option<Vec<String>> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    pub fn push_row(&mut self, mut row: Vec<String>) {
        let width = self.width().max(row.len());
        if width > self.width() {
            for existing in &mut self.rows {
                existing.resize(width, String::new());
            }
        }
        row.resize(width, String::new());
        self.rows.push(row);
    }

    /// Drop the first `n` rows.
    pub fn skip_rows(mut self, n: usize) -> Self {
        let n = n.min(self.rows.len());
        self.rows.drain(..n);
        self
    }

    /// Parse headerless CSV; ragged records are padded to the widest one.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self::new(rows))
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("opening CSV file {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("reading CSV file {}", path.display()))
    }

    /// Write every row verbatim; no header handling, row 0 is just a row.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(writer);
        for row in &self.rows {
            wtr.write_record(row).context("writing CSV record")?;
        }
        wtr.flush().context("flushing CSV writer")?;
        Ok(())
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("creating CSV file {}", path.display()))?;
        self.to_writer(file)
            .with_context(|| format!("writing CSV file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn ragged_rows_are_padded() {
        let grid = Grid::from_strs(&[&["a", "b", "c"], &["d"]]);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.cell(1, 2), Some(""));
    }

    #[test]
    fn header_and_data_rows_split_at_row_zero() {
        let grid = Grid::from_strs(&[&["h1", "h2"], &["1", "2"], &["3", "4"]]);
        assert_eq!(grid.header().unwrap(), ["h1", "h2"]);
        assert_eq!(grid.data_rows().len(), 2);
        assert_eq!(grid.column_index("h2"), Some(1));
        assert_eq!(grid.column_index("nope"), None);
    }

    #[test]
    fn insert_column_fills_per_row() {
        let mut grid = Grid::from_strs(&[&["a"], &["b"]]);
        grid.insert_column(0, |r| format!("r{}", r));
        assert_eq!(grid.rows()[0], ["r0", "a"]);
        assert_eq!(grid.rows()[1], ["r1", "b"]);
    }

    #[test]
    fn csv_round_trip_keeps_quoting_and_blanks() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("t.csv");
        let grid = Grid::from_strs(&[&["Organisation", "x"], &["NHS Bristol, North", ""]]);
        grid.write_csv(&path)?;

        let text = std::fs::read_to_string(&path)?;
        assert_eq!(text, "Organisation,x\n\"NHS Bristol, North\",\n");
        assert_eq!(Grid::read_csv(&path)?, grid);
        Ok(())
    }

    #[test]
    fn skip_rows_past_end_empties_grid() {
        let grid = Grid::from_strs(&[&["a"], &["b"]]).skip_rows(6);
        assert!(grid.is_empty());
    }
}
