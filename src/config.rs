//! Provider credentials and batch settings.
//!
//! Credentials come from the environment (a `.env` file is honoured). Batch
//! settings come from an optional TOML file and are overridden by CLI flags.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{LookupError, Result};

pub const DEFAULT_GOOGLE_BASE_URL: &str = "https://maps.googleapis.com";
pub const DEFAULT_AZURE_BASE_URL: &str = "https://atlas.microsoft.com";

/// Google Maps Places credentials
#[derive(Clone)]
pub struct GoogleConfig {
    pub api_key: String,
    pub base_url: String,
}

impl GoogleConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = required(&var, &["GOOGLE_MAPS_API_KEY"])?;
        let base_url = base_url(&var, "GOOGLE_MAPS_BASE_URL", DEFAULT_GOOGLE_BASE_URL)?;

        tracing::debug!("Google Places endpoint: {}", base_url);
        Ok(Self { api_key, base_url })
    }
}

impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Azure Maps credentials
#[derive(Clone)]
pub struct AzureConfig {
    pub subscription_key: String,
    pub base_url: String,
}

impl AzureConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let subscription_key =
            required(&var, &["SUBSCRIPTION_KEY", "AZURE_MAPS_SUBSCRIPTION_KEY"])?;
        let base_url = base_url(&var, "AZURE_MAPS_BASE_URL", DEFAULT_AZURE_BASE_URL)?;

        tracing::debug!("Azure Maps endpoint: {}", base_url);
        Ok(Self {
            subscription_key,
            base_url,
        })
    }
}

impl std::fmt::Debug for AzureConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureConfig")
            .field("subscription_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// First non-blank value among `keys`
fn required<F>(var: &F, keys: &[&str]) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|key| var(key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .ok_or_else(|| {
            LookupError::config(format!(
                "{} environment variable required",
                keys.join(" or ")
            ))
        })
}

fn base_url<F>(var: &F, key: &str, default: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(default.to_string()),
        Some(url) => {
            let url = url.trim().trim_end_matches('/').to_string();
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(LookupError::config(format!(
                    "{} must start with http:// or https://",
                    key
                )));
            }
            Ok(url)
        }
    }
}

/// Batch enrichment settings, as read from a TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnrichSettings {
    pub enrich: BatchSettings,
    pub columns: ColumnNames,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Worker pool width
    pub workers: usize,
    /// Per-lookup timeout; 0 leaves only the HTTP client's own timeout
    pub lookup_timeout_secs: u64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            workers: 4,
            lookup_timeout_secs: 30,
        }
    }
}

/// Input column names
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub id: String,
    pub url: String,
    pub name: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            id: "OID".to_string(),
            url: "facility_url".to_string(),
            name: "facility_name".to_string(),
        }
    }
}

impl EnrichSettings {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| LookupError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: EnrichSettings = toml::from_str(content)
            .map_err(|e| LookupError::config(format!("failed to parse settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.enrich.workers == 0 {
            return Err(LookupError::config("workers must be at least 1"));
        }
        for (label, column) in [
            ("id", &self.columns.id),
            ("url", &self.columns.url),
            ("name", &self.columns.name),
        ] {
            if column.trim().is_empty() {
                return Err(LookupError::config(format!(
                    "{} column name cannot be empty",
                    label
                )));
            }
        }
        Ok(())
    }

    pub fn lookup_timeout(&self) -> Option<Duration> {
        match self.enrich.lookup_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
