//! Position-keyed overlays: weather, air quality and solar potential.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

mod fetcher;
mod readings;
mod synchronizer;

pub use fetcher::{FetchCompletion, OverlayState};
pub(crate) use readings::round_half_up;
pub use readings::{AirQualityReading, AqiBand, SolarInsight, SolarPotentialTier, WeatherReading};
pub use synchronizer::{
    OverlayCompletion, OverlayListener, OverlaySources, OverlaySynchronizer, OverlayView,
    PendingOverlay,
};

/// The overlays kept in sync with the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayKind {
    /// Current weather.
    Weather,
    /// Current air quality.
    AirQuality,
    /// Rooftop solar potential.
    Solar,
}

impl OverlayKind {
    /// Every overlay in panel order.
    pub const ALL: [Self; 3] = [Self::Weather, Self::AirQuality, Self::Solar];

    /// Stable label used in logs and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::AirQuality => "air-quality",
            Self::Solar => "solar",
        }
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unrecognised overlay label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown overlay: {0}")]
pub struct UnknownOverlayKind(pub String);

impl FromStr for OverlayKind {
    type Err = UnknownOverlayKind;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| UnknownOverlayKind(raw.to_owned()))
    }
}
