// 📥 Table Parser - Raw tabular input for the import pipeline
//
// The first row is the header, every following row is data. Input arrives
// either as an in-memory grid (rows already split into cells) or as CSV.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

// ============================================================================
// RAW TABLE
// ============================================================================

/// Header row plus data rows, as read from the source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let rows = rows.into_iter().filter(|r| !is_blank(r)).collect();
        RawTable { headers, rows }
    }

    /// Split a grid into header and data. Fully blank rows are skipped;
    /// an empty grid gives an empty table.
    pub fn from_grid<S: AsRef<str>>(grid: &[Vec<S>]) -> Self {
        let mut iter = grid
            .iter()
            .map(|row| row.iter().map(|c| c.as_ref().to_string()).collect::<Vec<_>>());

        let Some(headers) = iter.next() else {
            return RawTable::default();
        };

        RawTable::new(headers, iter.collect())
    }

    /// Parse CSV from any reader. Rows may have differing lengths.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut grid: Vec<Vec<String>> = Vec::new();
        for (line_num, result) in reader.records().enumerate() {
            let record =
                result.with_context(|| format!("Failed to parse CSV line {}", line_num + 1))?;
            grid.push(record.iter().map(str::to_string).collect());
        }

        let table = RawTable::from_grid(&grid);
        debug!(headers = table.headers.len(), rows = table.rows.len(), "csv table parsed");
        Ok(table)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        RawTable::from_csv_reader(file)
            .with_context(|| format!("Failed to read table from {}", path.display()))
    }

    /// Lenient entry: unparsable input gives an empty table instead of an error
    pub fn from_csv_str(text: &str) -> Self {
        match RawTable::from_csv_reader(text.as_bytes()) {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "unparsable table input, treating as empty");
                RawTable::default()
            }
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Cell at (row, column); missing cells read as ""
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
