//! Reqwest-backed OpenWeatherMap adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::dto::CurrentWeatherDto;
use crate::domain::ports::{OverlaySource, OverlaySourceError};
use crate::domain::{GeoPoint, WeatherReading};
use crate::outbound::http::{build_client, map_status_error, map_transport_error};

/// Public current-weather endpoint.
pub const DEFAULT_WEATHER_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Weather overlay source querying current conditions in metric units.
pub struct WeatherHttpSource {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl WeatherHttpSource {
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
            .append_pair("lat", &position.latitude().to_string())
            .append_pair("lon", &position.longitude().to_string())
            .append_pair("appid", &self.api_key)
            .append_pair("units", "metric");
        url
    }
}

#[async_trait]
impl OverlaySource<WeatherReading> for WeatherHttpSource {
    async fn fetch(&self, position: GeoPoint) -> Result<Option<WeatherReading>, OverlaySourceError> {
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
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_weather(body.as_ref()).map(Some)
    }
}

fn parse_weather(body: &[u8]) -> Result<WeatherReading, OverlaySourceError> {
    let decoded: CurrentWeatherDto = serde_json::from_slice(body).map_err(|error| {
        OverlaySourceError::decode(format!("invalid weather JSON payload: {error}"))
    })?;
    Ok(decoded.into_reading())
}
