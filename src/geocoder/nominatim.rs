//! Forward geocoding against a Nominatim-compatible search API.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::GeocoderConfig;
use crate::error::{MapError, MapResult};

/// A resolved coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
    pub display_name: Option<String>,
}

impl GeoLocation {
    pub fn point(&self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}

/// Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

/// Resolves free-text place names to coordinates
pub struct Geocoder {
    client: Client,
    config: GeocoderConfig,
}

impl Geocoder {
    pub fn new(config: GeocoderConfig) -> MapResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MapError::Geocoder(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// `"{place}, {admin1}, {country}"`
    pub fn query_for(&self, place: &str, admin1: &str) -> String {
        format!("{}, {}, {}", place, admin1, self.config.country)
    }

    fn search_url(&self, query: &str) -> MapResult<Url> {
        let endpoint = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        Url::parse_with_params(
            &endpoint,
            &[("q", query), ("format", "json"), ("limit", "1")],
        )
        .map_err(|e| MapError::Geocoder(format!("invalid geocoder URL: {}", e)))
    }

    /// Geocode a place within an admin-1 region of the configured country.
    pub async fn geocode(&self, place: &str, admin1: &str) -> MapResult<GeoLocation> {
        let query = self.query_for(place, admin1);
        match self.search(&query).await? {
            Some(location) => {
                info!(
                    "Geocoded '{}' to ({}, {}) [{}]",
                    query,
                    location.lat,
                    location.lon,
                    location.display_name.as_deref().unwrap_or("unnamed")
                );
                Ok(location)
            }
            None => Err(MapError::LocationNotFound(query)),
        }
    }

    /// Run a search, retrying transport errors and 5xx responses.
    async fn search(&self, query: &str) -> MapResult<Option<GeoLocation>> {
        let url = self.search_url(query)?;
        let max_attempts = self.config.max_attempts.max(1);
        let backoff = Duration::from_millis(self.config.retry_backoff_ms);
        let mut attempts = 0;

        loop {
            attempts += 1;

            let response = match self.client.get(url.clone()).send().await {
                Ok(r) => r,
                Err(e) => {
                    warn!(
                        "Geocoder request failed (attempt {}/{}): {}",
                        attempts, max_attempts, e
                    );
                    if attempts < max_attempts {
                        tokio::time::sleep(backoff).await;
                        continue;
                    }
                    return Err(MapError::Geocoder(e.to_string()));
                }
            };

            let status = response.status();
            if status.is_server_error() && attempts < max_attempts {
                warn!(
                    "Geocoder returned {} (attempt {}/{})",
                    status, attempts, max_attempts
                );
                tokio::time::sleep(backoff).await;
                continue;
            }
            if !status.is_success() {
                return Err(MapError::Geocoder(format!("geocoder returned {}", status)));
            }

            let body = response
                .text()
                .await
                .map_err(|e| MapError::Geocoder(e.to_string()))?;
            debug!("Geocoder response: {} bytes", body.len());
            return parse_results(&body);
        }
    }
}

/// Parse a Nominatim `format=json` body; `None` when there are no hits.
pub fn parse_results(body: &str) -> MapResult<Option<GeoLocation>> {
    let places: Vec<NominatimPlace> = serde_json::from_str(body)
        .map_err(|e| MapError::Geocoder(format!("unexpected geocoder response: {}", e)))?;

    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let lat: f64 = place
        .lat
        .parse()
        .map_err(|_| MapError::Geocoder(format!("invalid latitude '{}'", place.lat)))?;
    let lon: f64 = place
        .lon
        .parse()
        .map_err(|_| MapError::Geocoder(format!("invalid longitude '{}'", place.lon)))?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(MapError::Geocoder(format!(
            "coordinates out of range: ({}, {})",
            lat, lon
        )));
    }

    Ok(Some(GeoLocation {
        lat,
        lon,
        display_name: place.display_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Query, State},
        http::{HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::get,
        Json, Router,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_parse_first_hit() {
        let body = r#"[
            {"place_id": 1, "lat": "-31.2503", "lon": "-61.4867", "display_name": "Rafaela, Castellanos, Santa Fe, Argentina"},
            {"place_id": 2, "lat": "0", "lon": "0"}
        ]"#;
        let location = parse_results(body).unwrap().unwrap();
        assert_eq!(location.lat, -31.2503);
        assert_eq!(location.lon, -61.4867);
        assert_eq!(location.point().x(), -61.4867);
        assert!(location.display_name.unwrap().starts_with("Rafaela"));
    }

    #[test]
    fn test_parse_no_hits() {
        assert_eq!(parse_results("[]").unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_results("{}"), Err(MapError::Geocoder(_))));
        assert!(matches!(
            parse_results(r#"[{"lat": "north", "lon": "1"}]"#),
            Err(MapError::Geocoder(_))
        ));
        assert!(matches!(
            parse_results(r#"[{"lat": "95", "lon": "1"}]"#),
            Err(MapError::Geocoder(_))
        ));
    }

    #[test]
    fn test_query_and_url() {
        let geocoder = Geocoder::new(GeocoderConfig {
            base_url: "https://geo.example.org/".to_string(),
            ..GeocoderConfig::default()
        })
        .unwrap();

        let query = geocoder.query_for("Rafaela", "Santa Fe");
        assert_eq!(query, "Rafaela, Santa Fe, Argentina");

        let url = geocoder.search_url(&query).unwrap();
        assert_eq!(url.path(), "/search");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("q".to_string(), query.clone())));
        assert!(pairs.contains(&("limit".to_string(), "1".to_string())));
    }

    #[tokio::test]
    async fn test_unreachable_geocoder_is_service_error() {
        let geocoder = Geocoder::new(GeocoderConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            max_attempts: 2,
            retry_backoff_ms: 10,
            ..GeocoderConfig::default()
        })
        .unwrap();

        let err = geocoder.geocode("Rafaela", "Santa Fe").await.unwrap_err();
        assert!(matches!(err, MapError::Geocoder(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    /// Serve `app` on an ephemeral local port and return its base URL.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn local_geocoder(base_url: String) -> Geocoder {
        Geocoder::new(GeocoderConfig {
            base_url,
            user_agent: "georadius-test".to_string(),
            timeout_secs: 5,
            max_attempts: 2,
            retry_backoff_ms: 10,
            ..GeocoderConfig::default()
        })
        .unwrap()
    }

    /// Answers 503 to the first request and a single hit afterwards.
    async fn flaky_search(
        State(hits): State<Arc<AtomicUsize>>,
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> Response {
        assert_eq!(params.get("q").map(String::as_str), Some("Rafaela, Santa Fe, Argentina"));
        assert_eq!(params.get("format").map(String::as_str), Some("json"));
        assert_eq!(
            headers.get("user-agent").and_then(|v| v.to_str().ok()),
            Some("georadius-test")
        );
        if hits.fetch_add(1, Ordering::SeqCst) == 0 {
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
        Json(serde_json::json!([
            {"lat": "-31.2503", "lon": "-61.4867", "display_name": "Rafaela, Santa Fe, Argentina"}
        ]))
        .into_response()
    }

    async fn rejecting_search(State(hits): State<Arc<AtomicUsize>>) -> StatusCode {
        hits.fetch_add(1, Ordering::SeqCst);
        StatusCode::FORBIDDEN
    }

    async fn empty_search(State(hits): State<Arc<AtomicUsize>>) -> Json<serde_json::Value> {
        hits.fetch_add(1, Ordering::SeqCst);
        Json(serde_json::json!([]))
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/search", get(flaky_search))
            .with_state(Arc::clone(&hits));
        let geocoder = local_geocoder(serve(app).await);

        let location = geocoder.geocode("Rafaela", "Santa Fe").await.unwrap();
        assert_eq!(location.lat, -31.2503);
        assert_eq!(location.lon, -61.4867);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/search", get(rejecting_search))
            .with_state(Arc::clone(&hits));
        let geocoder = local_geocoder(serve(app).await);

        let err = geocoder.geocode("Rafaela", "Santa Fe").await.unwrap_err();
        assert!(matches!(err, MapError::Geocoder(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_results_is_location_not_found() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/search", get(empty_search))
            .with_state(Arc::clone(&hits));
        let geocoder = local_geocoder(serve(app).await);

        let err = geocoder.geocode("Atlantida", "Santa Fe").await.unwrap_err();
        assert!(matches!(err, MapError::LocationNotFound(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
