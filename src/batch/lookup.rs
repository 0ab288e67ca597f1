use async_trait::async_trait;

use crate::error::Result;
use crate::models::PlaceMatch;

/// Single-record place lookup.
///
/// `Ok(None)` means the provider had no match, which is not an error.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<Option<PlaceMatch>>;
}
