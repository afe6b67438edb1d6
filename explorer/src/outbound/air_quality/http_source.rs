//! Reqwest-backed Air Quality adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::dto::{LookupRequestDto, LookupResponseDto};
use crate::domain::ports::{OverlaySource, OverlaySourceError};
use crate::domain::{AirQualityReading, GeoPoint};
use crate::outbound::http::{build_client, map_status_error, map_transport_error};

/// Public current-conditions endpoint.
pub const DEFAULT_AIR_QUALITY_ENDPOINT: &str =
    "https://airquality.googleapis.com/v1/currentConditions:lookup";

/// Air quality overlay source posting one lookup per position.
pub struct AirQualityHttpSource {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl AirQualityHttpSource {
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
}

#[async_trait]
impl OverlaySource<AirQualityReading> for AirQualityHttpSource {
    async fn fetch(
        &self,
        position: GeoPoint,
    ) -> Result<Option<AirQualityReading>, OverlaySourceError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("key", &self.api_key);
        let payload = LookupRequestDto::new(position.latitude(), position.longitude());

        let response = self
            .client
            .post(url)
            .json(&payload)
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

        parse_air_quality(body.as_ref())
    }
}

fn parse_air_quality(body: &[u8]) -> Result<Option<AirQualityReading>, OverlaySourceError> {
    let decoded: LookupResponseDto = serde_json::from_slice(body).map_err(|error| {
        OverlaySourceError::decode(format!("invalid air quality JSON payload: {error}"))
    })?;
    Ok(decoded.into_reading())
}

#[cfg(test)]
mod tests {
    //! Index selection and pollutant extraction.

    use super::*;
    use crate::domain::AqiBand;

    #[test]
    fn prefers_the_universal_index() {
        let body = r#"{
            "indexes": [
                { "code": "usa_epa", "aqi": 61, "category": "Moderate" },
                { "code": "uaqi", "aqi": 72, "category": "Good air quality" }
            ],
            "pollutants": [
                { "code": "pm25", "concentration": { "value": 8.4, "units": "MICROGRAMS_PER_CUBIC_METER" } },
                { "code": "o3", "concentration": { "value": 31.2 } },
                { "code": "co" }
            ]
        }"#;

        let reading = parse_air_quality(body.as_bytes())
            .expect("JSON decodes")
            .expect("index present");
        assert_eq!(reading.aqi, 72);
        assert_eq!(reading.category, "Good air quality");
        assert_eq!(reading.pm25, 8.4);
        assert_eq!(reading.o3, 31.2);
        assert_eq!(reading.pm10, 0.0);
        assert_eq!(reading.no2, 0.0);
        assert_eq!(reading.band(), AqiBand::Moderate);
    }

    #[test]
    fn falls_back_to_the_first_index() {
        let body = br#"{ "indexes": [ { "code": "gbr_defra", "aqi": 3, "category": "Low" } ] }"#;
        let reading = parse_air_quality(body).expect("JSON decodes").expect("index present");
        assert_eq!(reading.aqi, 3);
        assert_eq!(reading.band(), AqiBand::Good);
    }

    #[test]
    fn no_indexes_means_no_reading() {
        let reading = parse_air_quality(br#"{ "regionCode": "us" }"#).expect("JSON decodes");
        assert!(reading.is_none());
    }

    #[test]
    fn request_asks_for_pollutant_concentrations() {
        let payload = serde_json::to_value(LookupRequestDto::new(40.7, -74.0)).expect("serializes");
        assert_eq!(
            payload,
            serde_json::json!({
                "location": { "latitude": 40.7, "longitude": -74.0 },
                "extraComputations": ["POLLUTANT_CONCENTRATION"]
            })
        );
    }
}
