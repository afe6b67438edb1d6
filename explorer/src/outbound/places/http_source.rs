//! Reqwest-backed Places Nearby Search adapter.
//!
//! This adapter owns transport details only: query building, timeout and
//! HTTP error mapping, and JSON decoding into domain POIs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::dto::{NearbySearchResponseDto, STATUS_OK, STATUS_ZERO_RESULTS};
use crate::domain::ports::{NearbySearchRequest, PoiSource, PoiSourceError};
use crate::domain::{Poi, PoiCategory};
use crate::outbound::http::{build_client, map_status_error, map_transport_error};

/// Public Nearby Search endpoint.
pub const DEFAULT_PLACES_ENDPOINT: &str =
    "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

const MAX_RADIUS_METERS: f64 = 50_000.0;

/// Places source adapter that performs one GET per category lookup.
pub struct PlacesHttpSource {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl PlacesHttpSource {
    /// Build an adapter; `timeout` of `None` leaves requests unbounded.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint,
            api_key: api_key.into(),
        })
    }

    fn request_url(&self, request: &NearbySearchRequest) -> Result<Url, PoiSourceError> {
        let radius = request.radius_meters;
        if !radius.is_finite() || radius <= 0.0 || radius > MAX_RADIUS_METERS {
            return Err(PoiSourceError::invalid_request(format!(
                "radius must be within (0, {MAX_RADIUS_METERS}] meters, got {radius}"
            )));
        }

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair(
                "location",
                &format!(
                    "{},{}",
                    request.center.latitude(),
                    request.center.longitude()
                ),
            )
            .append_pair("radius", &radius.to_string())
            .append_pair("type", request.category.as_str())
            .append_pair("key", &self.api_key);
        Ok(url)
    }
}

#[async_trait]
impl PoiSource for PlacesHttpSource {
    async fn nearby_search(&self, request: &NearbySearchRequest) -> Result<Vec<Poi>, PoiSourceError> {
        let url = self.request_url(request)?;
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error::<PoiSourceError>)?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(map_transport_error::<PoiSourceError>)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_places(body.as_ref(), request.category)
    }
}

fn parse_places(body: &[u8], category: PoiCategory) -> Result<Vec<Poi>, PoiSourceError> {
    let decoded: NearbySearchResponseDto = serde_json::from_slice(body).map_err(|error| {
        PoiSourceError::decode(format!("invalid Nearby Search JSON payload: {error}"))
    })?;

    match decoded.status.as_str() {
        STATUS_OK => Ok(decoded.into_domain_pois(category)),
        STATUS_ZERO_RESULTS => Ok(Vec::new()),
        _ => {
            let status = match &decoded.error_message {
                Some(message) => format!("{} ({message})", decoded.status),
                None => decoded.status,
            };
            Err(PoiSourceError::rejected(status))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network Places mapping helpers.

    use super::*;
    use crate::domain::PoiIdentity;
    use crate::test_support::point;

    fn source() -> PlacesHttpSource {
        let endpoint = Url::parse(DEFAULT_PLACES_ENDPOINT).expect("endpoint parses");
        PlacesHttpSource::new(endpoint, "test-key", None).expect("client builds")
    }

    fn request(radius_meters: f64) -> NearbySearchRequest {
        NearbySearchRequest {
            center: point(40.7128, -74.006),
            radius_meters,
            category: PoiCategory::ShoppingMall,
        }
    }

    #[test]
    fn builds_nearby_search_query() {
        let url = source().request_url(&request(2_000.0)).expect("valid request");
        let query = url.query().expect("query present");

        assert!(query.contains("location=40.7128%2C-74.006"));
        assert!(query.contains("radius=2000"));
        assert!(query.contains("type=shopping_mall"));
        assert!(query.contains("key=test-key"));
    }

    #[test]
    fn rejects_out_of_range_radius_before_sending() {
        for radius in [0.0, -5.0, f64::NAN, 60_000.0] {
            let error = source().request_url(&request(radius)).expect_err("radius must fail");
            assert!(matches!(error, PoiSourceError::InvalidRequest { .. }));
        }
    }

    #[test]
    fn parses_results_into_domain_pois() {
        let body = r#"{
            "status": "OK",
            "results": [
                {
                    "place_id": "ChIJ-katz",
                    "name": "Katz's Delicatessen",
                    "geometry": { "location": { "lat": 40.7223, "lng": -73.9874 } },
                    "rating": 4.5,
                    "price_level": 2,
                    "types": ["restaurant", "food", "establishment"],
                    "photos": [{ "photo_reference": "photo-1" }]
                },
                {
                    "name": "Unnamed cart",
                    "geometry": { "location": { "lat": 40.72, "lng": -73.99 } },
                    "rating": 7.0,
                    "price_level": 0
                },
                { "place_id": "no-geometry", "name": "Nowhere" }
            ]
        }"#;

        let pois = parse_places(body.as_bytes(), PoiCategory::Restaurant).expect("JSON decodes");

        assert_eq!(pois.len(), 2);
        assert_eq!(pois[0].identity, PoiIdentity::provider("ChIJ-katz"));
        assert_eq!(pois[0].price_label().as_deref(), Some("$$"));
        assert_eq!(pois[0].photo_refs, vec!["photo-1".to_owned()]);
        assert_eq!(
            pois[1].identity,
            PoiIdentity::Positional {
                category: PoiCategory::Restaurant,
                index: 1,
            }
        );
        assert_eq!(pois[1].rating, None);
        assert_eq!(pois[1].price_level, None);
    }

    #[test]
    fn partial_entries_do_not_fail_the_batch() {
        let body = r#"{
            "status": "OK",
            "results": [
                {
                    "place_id": "bank-1",
                    "name": "Chase",
                    "geometry": { "location": { "lat": 40.71, "lng": -74.0 } },
                    "photos": [{ "height": 300 }, { "photo_reference": "photo-2" }]
                },
                {
                    "place_id": "bank-2",
                    "name": "Half a location",
                    "geometry": { "location": { "lat": 40.72 } }
                },
                { "place_id": "bank-3", "name": "No location", "geometry": {} },
                {
                    "place_id": "bank-4",
                    "name": "Citibank",
                    "geometry": { "location": { "lat": 40.73, "lng": -73.99 } }
                }
            ]
        }"#;

        let pois = parse_places(body.as_bytes(), PoiCategory::Bank).expect("JSON decodes");

        let names: Vec<_> = pois.iter().map(|poi| poi.name.as_str()).collect();
        assert_eq!(names, vec!["Chase", "Citibank"]);
        assert_eq!(pois[0].photo_refs, vec!["photo-2".to_owned()]);
    }

    #[test]
    fn zero_results_is_an_empty_batch() {
        let pois = parse_places(br#"{"status":"ZERO_RESULTS","results":[]}"#, PoiCategory::Spa)
            .expect("zero results is not an error");
        assert!(pois.is_empty());
    }

    #[test]
    fn non_ok_status_is_rejected() {
        let body = br#"{"status":"REQUEST_DENIED","error_message":"The provided API key is invalid."}"#;
        let error = parse_places(body, PoiCategory::Bank).expect_err("denied must fail");
        assert_eq!(
            error,
            PoiSourceError::rejected("REQUEST_DENIED (The provided API key is invalid.)")
        );
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let error = parse_places(b"<html>", PoiCategory::Gym).expect_err("not JSON");
        assert!(matches!(error, PoiSourceError::Decode { .. }));
    }
}
