//! Reqwest-backed Solar building insights adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::BuildingInsightsDto;
use crate::domain::ports::{OverlaySource, OverlaySourceError};
use crate::domain::{GeoPoint, SolarInsight};
use crate::outbound::http::{build_client, map_status_error, map_transport_error};

/// Public closest-building endpoint.
pub const DEFAULT_SOLAR_ENDPOINT: &str =
    "https://solar.googleapis.com/v1/buildingInsights:findClosest";

/// Solar overlay source looking up the building closest to a position.
pub struct SolarHttpSource {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl SolarHttpSource {
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

    fn request_url(&self, position: GeoPoint) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("location.latitude", &position.latitude().to_string())
            .append_pair("location.longitude", &position.longitude().to_string())
            .append_pair("key", &self.api_key);
        url
    }
}

#[async_trait]
impl OverlaySource<SolarInsight> for SolarHttpSource {
    async fn fetch(&self, position: GeoPoint) -> Result<Option<SolarInsight>, OverlaySourceError> {
        let response = self
            .client
            .get(self.request_url(position))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error::<OverlaySourceError>)?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(map_transport_error::<OverlaySourceError>)?;
        if status == StatusCode::NOT_FOUND {
            debug!(?position, "no building with solar data near position");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_insight(body.as_ref())
    }
}

fn parse_insight(body: &[u8]) -> Result<Option<SolarInsight>, OverlaySourceError> {
    let decoded: BuildingInsightsDto = serde_json::from_slice(body).map_err(|error| {
        OverlaySourceError::decode(format!("invalid solar JSON payload: {error}"))
    })?;
    Ok(decoded.into_insight())
}
