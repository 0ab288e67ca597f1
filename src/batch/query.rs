//! Search query derivation for facility records.

use tracing::warn;
use url::Url;

use crate::models::FacilityRecord;

/// Where a query came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySource {
    /// Host of the facility URL
    Domain,
    /// Facility name
    Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub source: QuerySource,
}

/// Derive the search query for a record.
///
/// The URL's host wins when the URL is absolute and has one; otherwise the name
/// is used. Returns `None` (and logs) when neither yields any text.
pub fn derive_query(record: &FacilityRecord) -> Option<SearchQuery> {
    if let Some(host) = record.url.as_deref().and_then(url_host) {
        return Some(SearchQuery {
            text: host,
            source: QuerySource::Domain,
        });
    }

    if let Some(name) = record.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        return Some(SearchQuery {
            text: name.to_string(),
            source: QuerySource::Name,
        });
    }

    warn!(
        "Facility {} (row {}) has neither a usable URL nor a name, leaving it unresolved",
        record.id,
        record.row + 1
    );
    None
}

/// Host of an absolute URL. Scheme-less strings like "example.com" have none.
fn url_host(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;
    parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: Option<&str>, name: Option<&str>) -> FacilityRecord {
        FacilityRecord::new(0, "A1", url, name)
    }

    #[test]
    fn test_domain_from_url() {
        let query = derive_query(&record(
            Some("https://example-clinic.com"),
            Some("Example Clinic"),
        ))
        .unwrap();
        assert_eq!(query.text, "example-clinic.com");
        assert_eq!(query.source, QuerySource::Domain);
    }

    #[test]
    fn test_host_keeps_subdomain_drops_path_and_port() {
        let query = derive_query(&record(
            Some("http://WWW.Example-Clinic.com:8080/locations/downtown?x=1"),
            None,
        ))
        .unwrap();
        assert_eq!(query.text, "www.example-clinic.com");
    }

    #[test]
    fn test_scheme_less_url_falls_back_to_name() {
        let query = derive_query(&record(Some("example-clinic.com"), Some("Example Clinic"))).unwrap();
        assert_eq!(query.text, "Example Clinic");
        assert_eq!(query.source, QuerySource::Name);
    }

    #[test]
    fn test_hostless_url_falls_back_to_name() {
        let query = derive_query(&record(Some("mailto:info@example.com"), Some("Clinic"))).unwrap();
        assert_eq!(query.text, "Clinic");
    }

    #[test]
    fn test_nothing_to_query() {
        assert_eq!(derive_query(&record(None, None)), None);
        assert_eq!(derive_query(&record(Some("not a url"), None)), None);
    }
}
