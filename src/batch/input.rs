//! Facility records from an input table.

use std::collections::HashSet;

use tracing::warn;

use crate::config::ColumnNames;
use crate::error::Result;
use crate::models::FacilityRecord;
use crate::table::Table;

/// Resolved column positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacilityColumns {
    pub id: usize,
    /// The URL column is optional; without it every query uses the name
    pub url: Option<usize>,
    pub name: usize,
}

impl FacilityColumns {
    pub fn resolve(table: &Table, names: &ColumnNames) -> Result<Self> {
        let id = table.require_column(&names.id)?;
        let name = table.require_column(&names.name)?;
        let url = table.column_index(&names.url);
        if url.is_none() {
            warn!(
                "No '{}' column, queries will use '{}' only",
                names.url, names.name
            );
        }
        Ok(Self { id, url, name })
    }
}

/// One record per table row, in table order
pub fn facility_records(table: &Table, columns: &FacilityColumns) -> Vec<FacilityRecord> {
    let mut seen = HashSet::new();
    let mut duplicates = 0usize;

    let records: Vec<FacilityRecord> = table
        .rows
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            let id = cells[columns.id].trim();
            if id.is_empty() {
                warn!("Row {} has a blank identifier", row + 1);
            } else if !seen.insert(id.to_string()) {
                duplicates += 1;
            }
            FacilityRecord::new(
                row,
                id,
                columns.url.map(|c| cells[c].as_str()),
                Some(cells[columns.name].as_str()),
            )
        })
        .collect();

    if duplicates > 0 {
        warn!(
            "{} rows repeat an identifier; results are matched by row position",
            duplicates
        );
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_default_columns() {
        let t = table(&["facility_name", "OID", "facility_url"], &[]);
        let columns = FacilityColumns::resolve(&t, &ColumnNames::default()).unwrap();
        assert_eq!(
            columns,
            FacilityColumns {
                id: 1,
                url: Some(2),
                name: 0
            }
        );
    }

    #[test]
    fn test_url_column_optional() {
        let t = table(&["OID", "facility_name"], &[]);
        let columns = FacilityColumns::resolve(&t, &ColumnNames::default()).unwrap();
        assert_eq!(columns.url, None);
    }

    #[test]
    fn test_missing_id_is_fatal() {
        let t = table(&["facility_url", "facility_name"], &[]);
        let err = FacilityColumns::resolve(&t, &ColumnNames::default()).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, LookupError::MissingColumn { ref column, .. } if column == "OID"));
    }

    #[test]
    fn test_records_in_row_order() {
        let t = table(
            &["OID", "facility_url", "facility_name"],
            &[
                &["A1", "https://example-clinic.com", "Example Clinic"],
                &["A2", "", "Other Clinic"],
                &["A1", "", ""],
            ],
        );
        let columns = FacilityColumns::resolve(&t, &ColumnNames::default()).unwrap();
        let records = facility_records(&t, &columns);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].url.as_deref(), Some("https://example-clinic.com"));
        assert_eq!(records[1].url, None);
        assert_eq!(records[2].row, 2);
        assert_eq!(records[2].id, "A1");
        assert_eq!(records[2].name, None);
    }
}
