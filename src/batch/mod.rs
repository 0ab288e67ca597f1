//! Bulk enrichment: query derivation, concurrent dispatch, output assembly.

mod dispatcher;
mod input;
mod lookup;
mod output;
mod query;

pub use dispatcher::{BatchOutcome, BatchStats, Dispatcher, RowLimit, DEFAULT_WORKERS};
pub use input::{facility_records, FacilityColumns};
pub use lookup::PlaceLookup;
pub use output::{merge_outcomes, ENRICHMENT_COLUMNS};
pub use query::{derive_query, QuerySource, SearchQuery};
