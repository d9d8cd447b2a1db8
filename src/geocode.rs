// src/geocode.rs

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::config::NearbyConfig;
use crate::error::NearbyError;
use crate::geopoint::GeoPoint;

/// A search hit from the geocoder.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub location: GeoPoint,
}

// Nominatim reports coordinates as strings.
#[derive(Deserialize, Debug)]
struct SearchHit {
    display_name: String,
    lat: String,
    lon: String,
}

/// Forward geocoding against a Nominatim-compatible `/search` endpoint, used by the map's
/// place search.
///
/// A query that matches nothing is `Ok(vec![])`. Anything that prevented an answer
/// (transport failure, non-2xx status, a body that is not a result list) is an `Err`, so
/// callers can tell "no such place" apart from "search is broken".
#[derive(Debug, Clone)]
pub struct Geocoder {
    base_url: Url,
    http_client: Client,
}

impl Geocoder {
    pub fn new(base_url: &str) -> Result<Self, NearbyError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(NearbyError::InvalidUrl(format!(
                "Geocoder URL '{}' cannot be a base URL",
                base_url
            )));
        }
        // Public Nominatim instances reject requests without an identifying agent.
        let http_client = Client::builder()
            .user_agent(concat!("nearby-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(NearbyError::ReqwestError)?;
        Ok(Geocoder {
            base_url,
            http_client,
        })
    }

    pub fn from_config(config: &NearbyConfig) -> Result<Self, NearbyError> {
        Self::new(&config.geocoder_url)
    }

    pub(crate) fn search_url(&self, query: &str, limit: usize) -> Result<Url, NearbyError> {
        let path = format!("{}/search", self.base_url.path().trim_end_matches('/'));
        let mut url = self.base_url.join(&path)?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "jsonv2")
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }

    /// Looks up places matching `query`, best match first.
    ///
    /// # Errors
    /// * [`NearbyError::InvalidArgument`] for a blank query or a zero limit.
    /// * [`NearbyError::ReqwestError`] when the request could not be sent.
    /// * [`NearbyError::GeocodingFailed`] for a non-2xx status or an unreadable body.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, NearbyError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(NearbyError::InvalidArgument(
                "Geocoding query cannot be empty".to_string(),
            ));
        }
        if limit == 0 {
            return Err(NearbyError::InvalidArgument(
                "Geocoding limit must be at least 1".to_string(),
            ));
        }

        let url = self.search_url(query, limit)?;
        log::debug!("Geocoding request: {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(NearbyError::ReqwestError)?;

        let status = response.status();
        let body = response.bytes().await.map_err(NearbyError::ReqwestError)?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&body);
            log::warn!("Geocoding failed with status {}: {}", status, body);
            return Err(NearbyError::GeocodingFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let places = parse_search_response(&body)?;
        log::debug!("Geocoding '{}' returned {} place(s)", query, places.len());
        Ok(places)
    }
}

pub(crate) fn parse_search_response(body: &[u8]) -> Result<Vec<Place>, NearbyError> {
    let hits: Vec<SearchHit> = serde_json::from_slice(body).map_err(|e| {
        NearbyError::GeocodingFailed(format!(
            "Unexpected response: {}, Body: {}",
            e,
            String::from_utf8_lossy(body)
        ))
    })?;

    hits.into_iter()
        .map(|hit| -> Result<Place, NearbyError> {
            let coordinate = |value: &str| {
                value.parse::<f64>().map_err(|_| {
                    NearbyError::GeocodingFailed(format!(
                        "Non-numeric coordinate '{}' for '{}'",
                        value, hit.display_name
                    ))
                })
            };
            let location = GeoPoint::new(coordinate(&hit.lat)?, coordinate(&hit.lon)?)?;
            Ok(Place {
                name: hit.display_name.clone(),
                location,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hits_in_order() {
        let body = br#"[
            {"place_id": 1, "display_name": "Connaught Place, New Delhi", "lat": "28.6314", "lon": "77.2166"},
            {"place_id": 2, "display_name": "Connaught Place Metro", "lat": "28.6328", "lon": "77.2197"}
        ]"#;
        let places = parse_search_response(body).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Connaught Place, New Delhi");
        assert_eq!(places[1].location.longitude(), 77.2197);
    }

    #[test]
    fn no_match_is_empty_not_error() {
        assert!(parse_search_response(b"[]").unwrap().is_empty());
    }

    #[test]
    fn error_bodies_are_failures() {
        let err = parse_search_response(br#"{"error": "rate limited"}"#).unwrap_err();
        assert!(matches!(err, NearbyError::GeocodingFailed(_)));

        let err = parse_search_response(
            br#"[{"display_name": "x", "lat": "north", "lon": "1"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, NearbyError::GeocodingFailed(_)));
    }

    #[test]
    fn builds_search_url() {
        let geocoder = Geocoder::new("https://nominatim.example.org/").unwrap();
        let url = geocoder.search_url("India Gate", 3).unwrap();
        assert_eq!(
            url.as_str(),
            "https://nominatim.example.org/search?q=India+Gate&format=jsonv2&limit=3"
        );
    }

    #[tokio::test]
    async fn blank_query_is_rejected_without_a_request() {
        let geocoder = Geocoder::new("http://127.0.0.1:9").unwrap();
        let err = geocoder.search("   ", 5).await.unwrap_err();
        assert!(matches!(err, NearbyError::InvalidArgument(_)));
    }

    // Answers the first request on a local port with a fixed status and body.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn server_error_is_a_geocoding_failure() {
        let url = serve_once("503 Service Unavailable", r#"{"error": "overloaded"}"#).await;
        let geocoder = Geocoder::new(&url).unwrap();
        let err = geocoder.search("India Gate", 5).await.unwrap_err();
        assert!(
            matches!(&err, NearbyError::GeocodingFailed(msg) if msg.contains("503")),
            "unexpected error: {:?}",
            err
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let geocoder = Geocoder::new("http://127.0.0.1:9").unwrap();
        let err = geocoder.search("India Gate", 5).await.unwrap_err();
        assert!(matches!(err, NearbyError::ReqwestError(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn successful_search_returns_places() {
        let url = serve_once(
            "200 OK",
            r#"[{"display_name": "India Gate, New Delhi", "lat": "28.6129", "lon": "77.2295"}]"#,
        )
        .await;
        let geocoder = Geocoder::new(&url).unwrap();
        let places = geocoder.search("India Gate", 1).await.unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].location.latitude(), 28.6129);
    }
}
