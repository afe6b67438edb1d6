//! Outbound adapters implementing domain ports over HTTP.
//!
//! - **places**: Google Places Nearby Search behind `PoiSource`
//! - **weather**: OpenWeatherMap current conditions
//! - **air_quality**: Google Air Quality current conditions
//! - **solar**: Google Solar building insights
//!
//! Adapters translate between provider JSON and domain values. They contain
//! no discovery or synchronization logic.

pub mod air_quality;
mod http;
pub mod places;
pub mod solar;
pub mod weather;

pub use air_quality::AirQualityHttpSource;
pub use places::PlacesHttpSource;
pub use solar::SolarHttpSource;
pub use weather::WeatherHttpSource;
