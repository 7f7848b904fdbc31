//! Delimited-text loader for the two survey tables.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use tracing::debug;

/// Cell values treated as missing in addition to empty cells.
const MISSING_MARKERS: &[&str] = &["na", "nan", "n/a", "null", "none"];

/// A survey table as read from disk: headers plus raw string cells.
///
/// Rows are kept in file order. Short rows are allowed; absent trailing
/// cells read as missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Returns the cell at `(row, col)`, or `None` when it is missing.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .filter(|v| !is_missing(v))
    }

    /// Copies the rows for which `keep` returns true.
    pub fn retain_rows<F>(&self, mut keep: F) -> RawTable
    where
        F: FnMut(usize) -> bool,
    {
        RawTable {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, r)| r.clone())
                .collect(),
        }
    }
}

pub fn is_missing(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || MISSING_MARKERS.iter().any(|m| v.eq_ignore_ascii_case(m))
}

/// Reads a delimited table from `path`.
pub fn load_table(path: &str, delimiter: u8) -> Result<RawTable> {
    let file = File::open(path).with_context(|| format!("failed to open '{path}'"))?;
    let table = parse_table(file, delimiter).with_context(|| format!("failed to parse '{path}'"))?;
    debug!(
        path,
        rows = table.len(),
        columns = table.headers.len(),
        "Table loaded"
    );
    Ok(table)
}

/// Parses a delimited table from any reader.
pub fn parse_table<R: Read>(reader: R, delimiter: u8) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_semicolon_table() {
        let data = "NAMA;Asal Instansi;Q1\nAni;SD Negeri 1;4\nBudi;SMP 2;5\n";
        let table = parse_table(data.as_bytes(), b';').unwrap();

        assert_eq!(table.headers, vec!["NAMA", "Asal Instansi", "Q1"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, 2), Some("5"));
    }

    #[test]
    fn test_short_rows_and_markers_read_as_missing() {
        let data = "a;b;c\n1;NaN\n;2;3\n";
        let table = parse_table(data.as_bytes(), b';').unwrap();

        assert_eq!(table.cell(0, 0), Some("1"));
        assert_eq!(table.cell(0, 1), None);
        assert_eq!(table.cell(0, 2), None);
        assert_eq!(table.cell(1, 0), None);
    }

    #[test]
    fn test_decimal_commas_survive_semicolon_split() {
        let data = "S 1;S 2\n3,5;abc\n";
        let table = parse_table(data.as_bytes(), b';').unwrap();
        assert_eq!(table.cell(0, 0), Some("3,5"));
        assert_eq!(table.cell(0, 1), Some("abc"));
    }

    #[test]
    fn test_retain_rows_copies() {
        let data = "x\n1\n2\n3\n";
        let table = parse_table(data.as_bytes(), b';').unwrap();
        let filtered = table.retain_rows(|i| i != 1);

        assert_eq!(filtered.len(), 2);
        assert_eq!(table.len(), 3);
        assert_eq!(filtered.cell(1, 0), Some("3"));
    }

    #[test]
    fn test_load_missing_file_errors() {
        assert!(load_table("/nonexistent/ld_ct_rater.csv", b';').is_err());
    }
}
