//! Google Air Quality outbound adapter.

mod dto;
mod http_source;

pub use http_source::{AirQualityHttpSource, DEFAULT_AIR_QUALITY_ENDPOINT};
