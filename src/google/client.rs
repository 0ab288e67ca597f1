//! HTTP client for the Places API.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

use super::types::{DetailsResponse, FindPlaceResponse, PlaceDetails};
use crate::batch::PlaceLookup;
use crate::config::GoogleConfig;
use crate::error::{LookupError, Result};
use crate::models::PlaceMatch;

const PROVIDER: &str = "Google Places";
const USER_AGENT: &str = concat!("facility-lookup/", env!("CARGO_PKG_VERSION"));

/// Fields requested from Place Details
const DETAIL_FIELDS: &str =
    "name,formatted_address,formatted_phone_number,opening_hours,url,editorial_summary";

#[derive(Clone)]
pub struct GooglePlacesClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GooglePlacesClient {
    pub fn new(config: &GoogleConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LookupError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Resolve a free-text query to the first candidate's place ID
    pub async fn find_place(&self, query: &str) -> Result<Option<String>> {
        let response: FindPlaceResponse = self
            .get_json(
                "/maps/api/place/findplacefromtext/json",
                &[
                    ("input", query),
                    ("inputtype", "textquery"),
                    ("fields", "place_id"),
                ],
            )
            .await?;

        if !check_status(&response.status, response.error_message)? {
            return Ok(None);
        }

        Ok(response.candidates.into_iter().next().map(|c| c.place_id))
    }

    pub async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>> {
        let response: DetailsResponse = self
            .get_json(
                "/maps/api/place/details/json",
                &[("place_id", place_id), ("fields", DETAIL_FIELDS)],
            )
            .await?;

        if !check_status(&response.status, response.error_message)? {
            return Ok(None);
        }

        Ok(response.result)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = Url::parse_with_params(
            &format!("{}{}", self.base_url, path),
            params
                .iter()
                .copied()
                .chain(std::iter::once(("key", self.api_key.as_str()))),
        )
        .map_err(|e| LookupError::config(format!("invalid Places URL: {}", e)))?;

        // The key travels in the query string, so never log the full URL.
        debug!("GET {}{} {:?}", self.base_url, path, params);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("{} returned HTTP {}: {}", PROVIDER, status, body);
            return Err(LookupError::Api {
                provider: PROVIDER,
                status: status.to_string(),
                message: body,
            });
        }

        response.json::<T>().await.map_err(|e| LookupError::Decode {
            provider: PROVIDER,
            message: e.without_url().to_string(),
        })
    }
}

#[async_trait]
impl PlaceLookup for GooglePlacesClient {
    async fn lookup(&self, query: &str) -> Result<Option<PlaceMatch>> {
        let Some(place_id) = self.find_place(query).await? else {
            debug!("No candidates for '{}'", query);
            return Ok(None);
        };

        Ok(self
            .place_details(&place_id)
            .await?
            .map(PlaceDetails::into_match))
    }
}

/// Map a Places API status to "has results" or an error.
///
/// See https://developers.google.com/maps/documentation/places/web-service/search-find-place#PlacesSearchStatus
fn check_status(status: &str, error_message: Option<String>) -> Result<bool> {
    match status {
        "OK" => Ok(true),
        "ZERO_RESULTS" | "NOT_FOUND" => Ok(false),
        other => {
            let message = error_message.unwrap_or_default();
            error!("{} status {}: {}", PROVIDER, other, message);
            Err(LookupError::Api {
                provider: PROVIDER,
                status: other.to_string(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GooglePlacesClient {
        GooglePlacesClient::new(&GoogleConfig {
            api_key: "test-key".to_string(),
            base_url: server.uri(),
        })
        .unwrap()
    }

    async fn mount_find(server: &MockServer, query: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/maps/api/place/findplacefromtext/json"))
            .and(query_param("input", query))
            .and(query_param("inputtype", "textquery"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_lookup_success() {
        let server = MockServer::start().await;
        mount_find(
            &server,
            "example-clinic.com",
            json!({"candidates": [{"place_id": "ChIJ123"}], "status": "OK"}),
        )
        .await;

        Mock::given(method("GET"))
            .and(path("/maps/api/place/details/json"))
            .and(query_param("place_id", "ChIJ123"))
            .and(query_param("fields", DETAIL_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "result": {
                    "name": "Example Clinic",
                    "formatted_address": "1 Main St, Springfield, IL 62701, USA",
                    "formatted_phone_number": "(217) 555-0100",
                    "url": "https://maps.google.com/?cid=42",
                    "opening_hours": {
                        "open_now": true,
                        "weekday_text": ["Monday: 8:00 AM – 6:00 PM"]
                    },
                    "editorial_summary": {"overview": "Walk-in clinic."}
                }
            })))
            .mount(&server)
            .await;

        let place = client_for(&server)
            .lookup("example-clinic.com")
            .await
            .unwrap()
            .expect("match");

        assert_eq!(place.name, "Example Clinic");
        assert_eq!(place.phone, "(217) 555-0100");
        assert_eq!(place.url, "https://maps.google.com/?cid=42");
        assert_eq!(place.summary, "Walk-in clinic.");
        assert!(place.hours.contains("Monday: 8:00 AM"));
    }

    #[tokio::test]
    async fn test_zero_results_is_not_an_error() {
        let server = MockServer::start().await;
        mount_find(
            &server,
            "nowhere",
            json!({"candidates": [], "status": "ZERO_RESULTS"}),
        )
        .await;

        let result = client_for(&server).lookup("nowhere").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_request_denied_is_an_error() {
        let server = MockServer::start().await;
        mount_find(
            &server,
            "clinic",
            json!({
                "candidates": [],
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid."
            }),
        )
        .await;

        let err = client_for(&server).lookup("clinic").await.unwrap_err();
        assert!(!err.is_fatal());
        match err {
            LookupError::Api {
                status, message, ..
            } => {
                assert_eq!(status, "REQUEST_DENIED");
                assert!(message.contains("invalid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_error_does_not_leak_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
            .mount(&server)
            .await;

        let err = client_for(&server).lookup("clinic").await.unwrap_err();
        assert!(matches!(err, LookupError::Api { .. }));
        assert!(!err.to_string().contains("test-key"));
    }
}
