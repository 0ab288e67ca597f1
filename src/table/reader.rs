use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

use super::{Table, TableFormat};
use crate::error::{LookupError, Result};

/// Load a table from a CSV file or the first sheet of a workbook
pub fn read_table(path: &Path) -> Result<Table> {
    info!("Reading table from {}", path.display());

    let table = match TableFormat::from_path(path)? {
        TableFormat::Csv => {
            let file = File::open(path).map_err(|e| LookupError::io(path, e))?;
            read_csv_from(file)?
        }
        TableFormat::Xlsx | TableFormat::Workbook => read_workbook(path)?,
    };

    info!(
        "Loaded {} rows x {} columns",
        table.len(),
        table.headers.len()
    );
    Ok(table)
}

pub fn read_csv_from<R: Read>(reader: R) -> Result<Table> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        rows.push(record.iter().map(String::from).collect());
    }

    Table::new(headers, rows)
}

fn read_workbook(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LookupError::table(format!("{} has no sheets", path.display())))??;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| LookupError::table(format!("{} has an empty first sheet", path.display())))?
        .iter()
        .map(|cell| cell_text(cell).trim().to_string())
        .collect();

    let rows = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Table::new(headers, rows)
}

/// Render a workbook cell as text.
///
/// Whole-number floats drop their fractional part so numeric identifiers
/// survive unchanged ("1042", not "1042.0").
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv() {
        let input = "OID,facility_url,facility_name\nA1,https://example-clinic.com,Example Clinic\nA2,,Other Clinic\n";
        let table = read_csv_from(input.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["OID", "facility_url", "facility_name"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, 1), Some(""));
        assert_eq!(table.cell(1, 2), Some("Other Clinic"));
    }

    #[test]
    fn test_read_csv_ragged_rows() {
        let input = "OID,facility_url,facility_name\nA1\n";
        let table = read_csv_from(input.as_bytes()).unwrap();
        assert_eq!(table.rows[0], vec!["A1", "", ""]);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(1042.0)), "1042");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("A1".into())), "A1");
    }
}
