//! HTTP client for Azure Maps Search.

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::types::{ErrorResponse, GeocodeResponse, PoiSearchResponse};
use crate::config::AzureConfig;
use crate::error::{LookupError, Result};
use crate::models::{Coords, PoiRecord};

const PROVIDER: &str = "Azure Maps";
const USER_AGENT: &str = concat!("facility-lookup/", env!("CARGO_PKG_VERSION"));
const GEOCODE_API_VERSION: &str = "2023-06-01";
const SEARCH_API_VERSION: &str = "1.0";

/// POI search parameters
#[derive(Debug, Clone, Default)]
pub struct PoiQuery {
    pub query: String,
    /// ISO 3166-1 alpha-2 country codes
    pub countries: Vec<String>,
    /// Bias point for the search
    pub coords: Option<Coords>,
    /// Request opening hours for the next seven days
    pub opening_hours: bool,
    /// Maximum number of results (provider caps this at 100)
    pub limit: Option<u32>,
}

#[derive(Clone)]
pub struct AzureMapsClient {
    client: Client,
    base_url: String,
    subscription_key: String,
}

impl AzureMapsClient {
    pub fn new(config: &AzureConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LookupError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            subscription_key: config.subscription_key.clone(),
        })
    }

    /// Resolve a free-text address or place name to coordinates.
    ///
    /// Returns [`LookupError::NotFound`] when the provider has no match.
    pub async fn geocode(&self, address: &str) -> Result<Coords> {
        let response: GeocodeResponse = self
            .get_json(
                "/geocode",
                &[
                    ("api-version", GEOCODE_API_VERSION.to_string()),
                    ("query", address.to_string()),
                ],
            )
            .await?;

        let feature = response.features.into_iter().next().ok_or_else(|| {
            warn!("No geocoding results for '{}'", address);
            LookupError::NotFound(address.to_string())
        })?;

        let coords = feature.geometry.coords().ok_or_else(|| LookupError::Decode {
            provider: PROVIDER,
            message: "geocoding feature has no [lon, lat] coordinates".to_string(),
        })?;

        info!("Geocoded '{}' -> {}", address, coords);
        Ok(coords)
    }

    /// Search for points of interest.
    ///
    /// Country and coordinates both narrow the search; without them the
    /// provider returns globally scattered, low-relevance matches.
    pub async fn search_poi(&self, query: &PoiQuery) -> Result<Vec<PoiRecord>> {
        if query.countries.is_empty() {
            warn!("POI search for '{}' has no country filter", query.query);
        }
        if query.coords.is_none() {
            warn!("POI search for '{}' has no coordinates", query.query);
        }

        let mut params = vec![
            ("api-version", SEARCH_API_VERSION.to_string()),
            ("query", query.query.clone()),
        ];
        if !query.countries.is_empty() {
            params.push(("countrySet", query.countries.join(",")));
        }
        if let Some(coords) = query.coords {
            params.push(("lat", coords.lat.to_string()));
            params.push(("lon", coords.lon.to_string()));
        }
        if query.opening_hours {
            params.push(("openingHours", "nextSevenDays".to_string()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.min(100).to_string()));
        }

        let response: PoiSearchResponse = self.get_json("/search/poi/json", &params).await?;
        let pois: Vec<PoiRecord> = response
            .results
            .into_iter()
            .filter_map(|r| r.into_poi())
            .collect();

        info!("POI search for '{}' returned {} places", query.query, pois.len());
        Ok(pois)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = Url::parse_with_params(&format!("{}{}", self.base_url, path), params)
            .map_err(|e| LookupError::config(format!("invalid Azure Maps URL: {}", e)))?;

        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("subscription-key", &self.subscription_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (code, message) = match serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|r| r.error)
            {
                Some(detail) => (
                    detail.code.unwrap_or_else(|| status.to_string()),
                    detail.message.unwrap_or_default(),
                ),
                None => (status.to_string(), body),
            };
            error!("{} error code {}: {}", PROVIDER, code, message);
            return Err(LookupError::Api {
                provider: PROVIDER,
                status: code,
                message,
            });
        }

        response.json::<T>().await.map_err(|e| LookupError::Decode {
            provider: PROVIDER,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AzureMapsClient {
        AzureMapsClient::new(&AzureConfig {
            subscription_key: "sub-key".to_string(),
            base_url: server.uri(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_geocode_returns_first_feature() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode"))
            .and(query_param("query", "Vans, Seattle"))
            .and(query_param("api-version", GEOCODE_API_VERSION))
            .and(header("subscription-key", "sub-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "FeatureCollection",
                "features": [
                    {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-122.3365, 47.6113]}},
                    {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}}
                ]
            })))
            .mount(&server)
            .await;

        let coords = client_for(&server).geocode("Vans, Seattle").await.unwrap();
        assert_eq!(coords.lat, 47.6113);
        assert_eq!(coords.lon, -122.3365);
    }

    #[tokio::test]
    async fn test_geocode_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "FeatureCollection",
                "features": []
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .geocode("zzqx nowhere 000")
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::NotFound(ref q) if q == "zzqx nowhere 000"));
    }

    #[tokio::test]
    async fn test_geocode_auth_error_carries_provider_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"code": "401 Unauthorized", "message": "Invalid subscription key."}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).geocode("Seattle").await.unwrap_err();
        match err {
            LookupError::Api { status, message, .. } => {
                assert_eq!(status, "401 Unauthorized");
                assert_eq!(message, "Invalid subscription key.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_poi_with_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/poi/json"))
            .and(query_param("query", "Vans"))
            .and(query_param("countrySet", "US"))
            .and(query_param("lat", "47.6113"))
            .and(query_param("lon", "-122.3365"))
            .and(query_param("openingHours", "nextSevenDays"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "summary": {"query": "vans", "numResults": 2},
                "results": [
                    {
                        "type": "POI",
                        "dist": 120.5,
                        "poi": {
                            "name": "Vans",
                            "phone": "+1 206-555-0100",
                            "url": "www.vans.com",
                            "categories": ["shop"],
                            "openingHours": {
                                "mode": "nextSevenDays",
                                "timeRanges": [{
                                    "startTime": {"date": "2019-02-07", "hour": 10, "minute": 0},
                                    "endTime": {"date": "2019-02-07", "hour": 20, "minute": 0}
                                }]
                            }
                        },
                        "address": {"freeformAddress": "1 Pine St, Seattle, WA 98101"},
                        "position": {"lat": 47.61, "lon": -122.34}
                    },
                    {
                        "type": "Street",
                        "address": {"freeformAddress": "Vans Ave"}
                    }
                ]
            })))
            .mount(&server)
            .await;

        let pois = client_for(&server)
            .search_poi(&PoiQuery {
                query: "Vans".into(),
                countries: vec!["US".into()],
                coords: Some(Coords {
                    lat: 47.6113,
                    lon: -122.3365,
                }),
                opening_hours: true,
                limit: None,
            })
            .await
            .unwrap();

        assert_eq!(pois.len(), 1);
        let vans = &pois[0];
        assert_eq!(vans.name, "Vans");
        assert_eq!(vans.address.as_deref(), Some("1 Pine St, Seattle, WA 98101"));
        assert_eq!(vans.distance_m, Some(120.5));
        assert_eq!(
            vans.opening_hours.as_ref().unwrap().daily_lines(),
            vec!["Thursday 10:00-20:00".to_string()]
        );
    }

    #[tokio::test]
    async fn test_search_poi_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/poi/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;

        let pois = client_for(&server)
            .search_poi(&PoiQuery {
                query: "nothing".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(pois.is_empty());
    }
}
