//! Tabular input and output.
//!
//! Tables are read from CSV or Excel workbooks (first sheet) and written as
//! CSV or `.xlsx`. Every cell is carried as text.

mod reader;
mod writer;

use std::path::Path;

use tracing::warn;

use crate::error::{LookupError, Result};

pub use reader::{read_csv_from, read_table};
pub use writer::{write_csv_to, write_table};

/// File formats, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    /// Office Open XML workbook, readable and writable
    Xlsx,
    /// Other spreadsheet formats (xls, xlsm, xlsb, ods), read only
    Workbook,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(TableFormat::Csv),
            "xlsx" => Ok(TableFormat::Xlsx),
            "xls" | "xlsm" | "xlsb" | "ods" => Ok(TableFormat::Workbook),
            _ => Err(LookupError::table(format!(
                "unsupported table format for {} (expected .csv, .xlsx, .xlsm, .xls, .xlsb or .ods)",
                path.display()
            ))),
        }
    }
}

/// An in-memory table: one header row and rectangular text rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, padding short rows with blanks.
    ///
    /// Rows longer than the header are rejected: their extra cells would have no
    /// column to land in.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if headers.is_empty() {
            return Err(LookupError::table("table has no header row"));
        }

        let width = headers.len();
        let mut normalized = Vec::with_capacity(rows.len());
        for (i, mut row) in rows.into_iter().enumerate() {
            if row.len() > width {
                let extra = &row[width..];
                if extra.iter().any(|cell| !cell.trim().is_empty()) {
                    return Err(LookupError::table(format!(
                        "row {} has {} cells but the header has {} columns",
                        i + 1,
                        row.len(),
                        width
                    )));
                }
                row.truncate(width);
            }
            row.resize(width, String::new());
            normalized.push(row);
        }

        Ok(Self {
            headers,
            rows: normalized,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of a column that must exist
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| LookupError::MissingColumn {
                column: name.to_string(),
                available: self.headers.clone(),
            })
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
    }

    /// Append a column, suffixing its name if the header is already taken
    pub fn push_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(LookupError::table(format!(
                "column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        let mut header = name.to_string();
        while self.column_index(&header).is_some() {
            header.push_str("_enriched");
        }
        if header != name {
            warn!("Input already has a '{}' column, writing '{}'", name, header);
        }

        self.headers.push(header);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            TableFormat::from_path(Path::new("in.CSV")).unwrap(),
            TableFormat::Csv
        );
        assert_eq!(
            TableFormat::from_path(Path::new("out.xlsx")).unwrap(),
            TableFormat::Xlsx
        );
        assert_eq!(
            TableFormat::from_path(Path::new("legacy.xls")).unwrap(),
            TableFormat::Workbook
        );
        assert!(TableFormat::from_path(Path::new("notes.txt")).is_err());
        assert!(TableFormat::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_short_rows_padded() {
        let table = Table::new(strings(&["a", "b", "c"]), vec![strings(&["1"])]).unwrap();
        assert_eq!(table.rows[0], strings(&["1", "", ""]));
    }

    #[test]
    fn test_long_rows_rejected_unless_blank() {
        let table = Table::new(strings(&["a"]), vec![strings(&["1", "", " "])]).unwrap();
        assert_eq!(table.rows[0], strings(&["1"]));

        let err = Table::new(strings(&["a"]), vec![strings(&["1", "2"])]).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_require_column() {
        let table = Table::new(strings(&["OID", "facility_name"]), vec![]).unwrap();
        assert_eq!(table.require_column("facility_name").unwrap(), 1);

        let err = table.require_column("facility_url").unwrap_err();
        assert!(matches!(err, LookupError::MissingColumn { .. }));
    }

    #[test]
    fn test_push_column_suffixes_collisions() {
        let mut table =
            Table::new(strings(&["OID", "name"]), vec![strings(&["A1", "Clinic"])]).unwrap();
        table
            .push_column("name", strings(&["Example Clinic"]))
            .unwrap();

        assert_eq!(table.headers, strings(&["OID", "name", "name_enriched"]));
        assert_eq!(table.cell(0, 2), Some("Example Clinic"));

        assert!(table.push_column("phone", vec![]).is_err());
    }
}
