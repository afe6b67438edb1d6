//! Explorer configuration loaded via OrthoConfig.
//!
//! Every value is optional at load time; accessors apply defaults and
//! validate, so a missing key only fails the commands that need it.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::{DiscoverySettings, GeoPoint, GeoValidationError};
use crate::outbound::air_quality::DEFAULT_AIR_QUALITY_ENDPOINT;
use crate::outbound::places::DEFAULT_PLACES_ENDPOINT;
use crate::outbound::solar::DEFAULT_SOLAR_ENDPOINT;
use crate::outbound::weather::DEFAULT_WEATHER_ENDPOINT;

const DEFAULT_SEARCH_RADIUS_METERS: f64 = 2_000.0;
const DEFAULT_INITIAL_LATITUDE: f64 = 40.7128;
const DEFAULT_INITIAL_LONGITUDE: f64 = -74.0060;

/// Errors raised while validating [`ExplorerSettings`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    /// No usable API key was configured.
    #[error("missing API key: set {variable}")]
    MissingApiKey {
        /// Environment variable that would provide it.
        variable: &'static str,
    },
    /// The search radius is not a positive number of meters.
    #[error("search radius must be positive, got {value}")]
    InvalidRadius {
        /// Rejected value.
        value: f64,
    },
    /// The per-category limit is zero.
    #[error("per-category limit must be at least 1")]
    InvalidLimit,
    /// An endpoint override does not parse as a URL.
    #[error("invalid {name} endpoint: {message}")]
    InvalidEndpoint {
        /// Provider the endpoint belongs to.
        name: &'static str,
        /// Parser message.
        message: String,
    },
    /// The initial map center is out of range.
    #[error("invalid initial position: {0}")]
    InvalidInitialPosition(#[from] GeoValidationError),
}

/// Provider credentials, discovery knobs and endpoint overrides.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EXPLORER")]
pub struct ExplorerSettings {
    /// Google key used for places, air quality and solar.
    pub api_key: Option<String>,
    /// OpenWeatherMap key; falls back to `api_key`.
    pub weather_api_key: Option<String>,
    /// Lookup radius around the drawn rectangle's center.
    pub search_radius_meters: Option<f64>,
    /// Places kept per category.
    #[ortho_config(default = 5)]
    pub per_category_limit: usize,
    /// Whole-request timeout; unset leaves requests unbounded.
    pub request_timeout_secs: Option<u64>,
    /// Nearby Search endpoint override.
    pub places_endpoint: Option<String>,
    /// Current weather endpoint override.
    pub weather_endpoint: Option<String>,
    /// Air quality endpoint override.
    pub air_quality_endpoint: Option<String>,
    /// Solar endpoint override.
    pub solar_endpoint: Option<String>,
    /// Initial map center latitude.
    pub initial_latitude: Option<f64>,
    /// Initial map center longitude.
    pub initial_longitude: Option<f64>,
}

impl ExplorerSettings {
    /// Google API key.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingApiKey`] when unset or blank.
    pub fn api_key(&self) -> Result<&str, SettingsError> {
        non_blank(self.api_key.as_deref()).ok_or(SettingsError::MissingApiKey {
            variable: "EXPLORER_API_KEY",
        })
    }

    /// Weather API key, falling back to the Google key.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingApiKey`] when neither key is set.
    pub fn weather_api_key(&self) -> Result<&str, SettingsError> {
        non_blank(self.weather_api_key.as_deref())
            .or_else(|| non_blank(self.api_key.as_deref()))
            .ok_or(SettingsError::MissingApiKey {
                variable: "EXPLORER_WEATHER_API_KEY",
            })
    }

    /// Discovery settings with defaults applied.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive radius or a zero limit.
    pub fn discovery(&self) -> Result<DiscoverySettings, SettingsError> {
        let search_radius_meters = self
            .search_radius_meters
            .unwrap_or(DEFAULT_SEARCH_RADIUS_METERS);
        if !search_radius_meters.is_finite() || search_radius_meters <= 0.0 {
            return Err(SettingsError::InvalidRadius {
                value: search_radius_meters,
            });
        }
        let per_category_limit = self.per_category_limit;
        if per_category_limit == 0 {
            return Err(SettingsError::InvalidLimit);
        }

        Ok(DiscoverySettings {
            search_radius_meters,
            per_category_limit,
            ..DiscoverySettings::default()
        })
    }

    /// Request timeout, if configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Initial map center.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidInitialPosition`] when out of range.
    pub fn initial_position(&self) -> Result<GeoPoint, SettingsError> {
        let latitude = self.initial_latitude.unwrap_or(DEFAULT_INITIAL_LATITUDE);
        let longitude = self.initial_longitude.unwrap_or(DEFAULT_INITIAL_LONGITUDE);
        Ok(GeoPoint::new(latitude, longitude)?)
    }

    /// Nearby Search endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidEndpoint`] for a malformed override.
    pub fn places_endpoint(&self) -> Result<Url, SettingsError> {
        endpoint("places", self.places_endpoint.as_deref(), DEFAULT_PLACES_ENDPOINT)
    }

    /// Current weather endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidEndpoint`] for a malformed override.
    pub fn weather_endpoint(&self) -> Result<Url, SettingsError> {
        endpoint("weather", self.weather_endpoint.as_deref(), DEFAULT_WEATHER_ENDPOINT)
    }

    /// Air quality endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidEndpoint`] for a malformed override.
    pub fn air_quality_endpoint(&self) -> Result<Url, SettingsError> {
        endpoint(
            "air quality",
            self.air_quality_endpoint.as_deref(),
            DEFAULT_AIR_QUALITY_ENDPOINT,
        )
    }

    /// Solar endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidEndpoint`] for a malformed override.
    pub fn solar_endpoint(&self) -> Result<Url, SettingsError> {
        endpoint("solar", self.solar_endpoint.as_deref(), DEFAULT_SOLAR_ENDPOINT)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn endpoint(name: &'static str, configured: Option<&str>, default: &str) -> Result<Url, SettingsError> {
    Url::parse(configured.unwrap_or(default)).map_err(|error| SettingsError::InvalidEndpoint {
        name,
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    //! Unit tests for explorer configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARIABLES: [&str; 11] = [
        "EXPLORER_API_KEY",
        "EXPLORER_WEATHER_API_KEY",
        "EXPLORER_SEARCH_RADIUS_METERS",
        "EXPLORER_PER_CATEGORY_LIMIT",
        "EXPLORER_REQUEST_TIMEOUT_SECS",
        "EXPLORER_PLACES_ENDPOINT",
        "EXPLORER_WEATHER_ENDPOINT",
        "EXPLORER_AIR_QUALITY_ENDPOINT",
        "EXPLORER_SOLAR_ENDPOINT",
        "EXPLORER_INITIAL_LATITUDE",
        "EXPLORER_INITIAL_LONGITUDE",
    ];

    fn environment(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARIABLES
            .iter()
            .map(|&name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| (*value).to_owned());
                (name, value)
            })
            .collect()
    }

    fn load_from_empty_args() -> ExplorerSettings {
        ExplorerSettings::load_from_iter([OsString::from("area-explorer")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(environment(&[]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.api_key(),
            Err(SettingsError::MissingApiKey {
                variable: "EXPLORER_API_KEY"
            })
        );
        let discovery = settings.discovery().expect("defaults are valid");
        assert_eq!(discovery, DiscoverySettings::default());
        assert!(settings.request_timeout().is_none());
        assert_eq!(
            settings.initial_position().expect("default center"),
            GeoPoint::new(40.7128, -74.0060).expect("valid point")
        );
        assert_eq!(
            settings.places_endpoint().expect("default endpoint").as_str(),
            DEFAULT_PLACES_ENDPOINT
        );
    }

    #[rstest]
    fn empty_environment_loads_and_reports_missing_keys() {
        let _guard = lock_env(environment(&[]));

        let settings = ExplorerSettings::load_from_iter([OsString::from("area-explorer")]);
        let settings = settings.expect("an empty environment still loads");
        assert_eq!(settings.per_category_limit, 5);
        assert_eq!(
            settings.weather_api_key(),
            Err(SettingsError::MissingApiKey {
                variable: "EXPLORER_WEATHER_API_KEY"
            })
        );
        let error = settings.api_key().expect_err("no key configured");
        assert_eq!(error.to_string(), "missing API key: set EXPLORER_API_KEY");
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(environment(&[
            ("EXPLORER_API_KEY", "google-key"),
            ("EXPLORER_SEARCH_RADIUS_METERS", "750.5"),
            ("EXPLORER_PER_CATEGORY_LIMIT", "3"),
            ("EXPLORER_REQUEST_TIMEOUT_SECS", "12"),
            ("EXPLORER_SOLAR_ENDPOINT", "http://localhost:8080/solar"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(settings.api_key(), Ok("google-key"));
        assert_eq!(settings.weather_api_key(), Ok("google-key"));
        let discovery = settings.discovery().expect("overrides are valid");
        assert_eq!(discovery.search_radius_meters, 750.5);
        assert_eq!(discovery.per_category_limit, 3);
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(12)));
        assert_eq!(
            settings.solar_endpoint().expect("override parses").as_str(),
            "http://localhost:8080/solar"
        );
    }

    #[rstest]
    fn weather_key_takes_precedence_over_the_google_key() {
        let _guard = lock_env(environment(&[
            ("EXPLORER_API_KEY", "google-key"),
            ("EXPLORER_WEATHER_API_KEY", "owm-key"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(settings.weather_api_key(), Ok("owm-key"));
    }

    #[rstest]
    #[case("EXPLORER_PER_CATEGORY_LIMIT", "0", SettingsError::InvalidLimit)]
    #[case(
        "EXPLORER_SEARCH_RADIUS_METERS",
        "-10.5",
        SettingsError::InvalidRadius { value: -10.5 }
    )]
    fn invalid_discovery_values_are_rejected(
        #[case] variable: &str,
        #[case] value: &str,
        #[case] expected: SettingsError,
    ) {
        let _guard = lock_env(environment(&[(variable, value)]));

        let settings = load_from_empty_args();
        assert_eq!(settings.discovery(), Err(expected));
    }

    #[rstest]
    fn malformed_endpoint_is_reported() {
        let _guard = lock_env(environment(&[("EXPLORER_WEATHER_ENDPOINT", "not a url")]));

        let settings = load_from_empty_args();
        let error = settings.weather_endpoint().expect_err("must fail");
        assert!(matches!(error, SettingsError::InvalidEndpoint { name: "weather", .. }));
    }
}
