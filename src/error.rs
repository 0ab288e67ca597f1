//! Error types shared by the lookup pipelines.
//!
//! Library code returns [`LookupError`]; the binaries wrap it with `anyhow`
//! context for reporting.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Missing or invalid credentials, endpoints or settings.
    #[error("config error: {0}")]
    Config(String),

    /// A required column is absent from the input table.
    #[error("missing required column '{column}' (available: {})", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// Transport-level failure talking to a provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered, but with an error status.
    #[error("{provider} returned {status}: {message}")]
    Api {
        provider: &'static str,
        status: String,
        message: String,
    },

    /// The provider response could not be interpreted.
    #[error("failed to decode {provider} response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    /// The provider had no match for the query.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    /// Malformed or unsupported tabular file.
    #[error("table error: {0}")]
    Table(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LookupError>;

impl LookupError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn table(msg: impl Into<String>) -> Self {
        Self::Table(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must halt a run before any row is processed.
    ///
    /// Configuration problems and unreadable input are fatal. Everything a
    /// single provider call can produce is recoverable and is recorded against
    /// the row that triggered it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::MissingColumn { .. }
                | Self::Table(_)
                | Self::Csv(_)
                | Self::Workbook(_)
                | Self::Xlsx(_)
                | Self::Io { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_lists_available() {
        let err = LookupError::MissingColumn {
            column: "OID".to_string(),
            available: vec!["facility_name".to_string(), "facility_url".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "missing required column 'OID' (available: facility_name, facility_url)"
        );
    }

    #[test]
    fn test_fatal_classification() {
        assert!(LookupError::config("GOOGLE_MAPS_API_KEY not set").is_fatal());
        assert!(LookupError::table("empty sheet").is_fatal());

        assert!(!LookupError::NotFound("nowhere".into()).is_fatal());
        assert!(!LookupError::Timeout(Duration::from_secs(5)).is_fatal());
        assert!(!LookupError::Api {
            provider: "Google Places",
            status: "OVER_QUERY_LIMIT".into(),
            message: String::new(),
        }
        .is_fatal());
    }
}
