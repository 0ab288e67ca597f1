use rust_xlsxwriter::{Format, Workbook};
use std::io::Write;
use std::path::Path;
use tracing::info;

use super::{Table, TableFormat};
use crate::error::{LookupError, Result};

/// Write a table as CSV or `.xlsx`, depending on the extension
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => {
            let file = std::fs::File::create(path).map_err(|e| LookupError::io(path, e))?;
            write_csv_to(table, file)?;
        }
        TableFormat::Xlsx => write_xlsx(table, path)?,
        TableFormat::Workbook => {
            return Err(LookupError::table(format!(
                "cannot write {}: only .csv and .xlsx output is supported",
                path.display()
            )))
        }
    }

    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

pub fn write_csv_to<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&table.headers)?;
    for row in &table.rows {
        csv_writer.write_record(row)?;
    }
    csv_writer
        .flush()
        .map_err(|e| LookupError::table(format!("failed to flush CSV output: {}", e)))?;
    Ok(())
}

fn write_xlsx(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();

    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, column_number(col)?, header, &header_format)?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let row_number = u32::try_from(i + 1)
            .map_err(|_| LookupError::table("too many rows for an xlsx sheet"))?;
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            worksheet.write_string(row_number, column_number(col)?, value)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn column_number(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| LookupError::table("too many columns for an xlsx sheet"))
}
