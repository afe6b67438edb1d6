//! OpenWeatherMap outbound adapter.

mod dto;
mod http_source;

pub use http_source::{DEFAULT_WEATHER_ENDPOINT, WeatherHttpSource};
