//! DTOs for the Air Quality `currentConditions:lookup` call.

use serde::{Deserialize, Serialize};

use crate::domain::AirQualityReading;
use crate::domain::overlay::round_half_up;

const PREFERRED_INDEX: &str = "uaqi";
const POLLUTANT_CONCENTRATION: &str = "POLLUTANT_CONCENTRATION";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LookupRequestDto {
    pub(super) location: LocationDto,
    pub(super) extra_computations: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub(super) struct LocationDto {
    pub(super) latitude: f64,
    pub(super) longitude: f64,
}

impl LookupRequestDto {
    pub(super) fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            location: LocationDto {
                latitude,
                longitude,
            },
            extra_computations: vec![POLLUTANT_CONCENTRATION],
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct LookupResponseDto {
    #[serde(default)]
    pub(super) indexes: Vec<IndexDto>,
    #[serde(default)]
    pub(super) pollutants: Vec<PollutantDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct IndexDto {
    #[serde(default)]
    pub(super) code: String,
    pub(super) aqi: Option<f64>,
    #[serde(default)]
    pub(super) category: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct PollutantDto {
    #[serde(default)]
    pub(super) code: String,
    pub(super) concentration: Option<ConcentrationDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ConcentrationDto {
    pub(super) value: Option<f64>,
}

impl LookupResponseDto {
    /// Prefer the universal index; fall back to the first one reported.
    /// No indexes means no reading.
    pub(super) fn into_reading(self) -> Option<AirQualityReading> {
        let preferred = self
            .indexes
            .iter()
            .position(|index| index.code == PREFERRED_INDEX)
            .unwrap_or(0);
        let index = self.indexes.into_iter().nth(preferred)?;
        let concentration = |code: &str| {
            self.pollutants
                .iter()
                .find(|pollutant| pollutant.code == code)
                .and_then(|pollutant| pollutant.concentration.as_ref())
                .and_then(|concentration| concentration.value)
                .unwrap_or(0.0)
        };

        Some(AirQualityReading {
            aqi: index.aqi.map_or(0, round_half_up),
            category: index.category,
            pm25: concentration("pm25"),
            pm10: concentration("pm10"),
            no2: concentration("no2"),
            o3: concentration("o3"),
        })
    }
}
