//! Output assembly: input columns plus enrichment columns.

use crate::error::{LookupError, Result};
use crate::models::{PlaceMatch, RowOutcome};
use crate::table::Table;

/// Columns appended to the input, in order
pub const ENRICHMENT_COLUMNS: [&str; 7] = [
    "name",
    "address",
    "phone",
    "url",
    "hours",
    "summary",
    "lookup_status",
];

/// Join each input row with its outcome.
///
/// Rows without a match get blank enrichment cells; the original cells are
/// copied unchanged.
pub fn merge_outcomes(input: &Table, outcomes: &[RowOutcome]) -> Result<Table> {
    if input.len() != outcomes.len() {
        return Err(LookupError::table(format!(
            "{} outcomes for {} input rows",
            outcomes.len(),
            input.len()
        )));
    }

    let mut columns: Vec<Vec<String>> = ENRICHMENT_COLUMNS
        .iter()
        .map(|_| Vec::with_capacity(outcomes.len()))
        .collect();

    let blank = PlaceMatch::default();
    for outcome in outcomes {
        let place = outcome.place().unwrap_or(&blank);
        let values = [
            &place.name,
            &place.address,
            &place.phone,
            &place.url,
            &place.hours,
            &place.summary,
        ];
        for (column, value) in columns.iter_mut().zip(values) {
            column.push(value.clone());
        }
        columns[6].push(outcome.status().to_string());
    }

    let mut output = input.clone();
    for (name, values) in ENRICHMENT_COLUMNS.iter().zip(columns) {
        output.push_column(name, values)?;
    }
    Ok(output)
}
