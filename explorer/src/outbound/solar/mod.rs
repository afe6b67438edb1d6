//! Google Solar outbound adapter.

mod dto;
mod http_source;

pub use http_source::{DEFAULT_SOLAR_ENDPOINT, SolarHttpSource};
