//! Display-ready overlay payloads.
//!
//! Outbound adapters normalize provider JSON into these shapes; the
//! synchronizer and rendering collaborators never see provider schemas.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current conditions at one coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    /// Air temperature in whole degrees Celsius.
    pub temperature_c: i32,
    /// Relative humidity percentage.
    pub humidity_pct: i32,
    /// Wind speed in whole kilometres per hour.
    pub wind_kph: i32,
    /// Visibility in whole kilometres.
    pub visibility_km: i32,
    /// Provider condition description, e.g. `light rain`.
    pub condition_text: String,
    /// Provider icon code, empty when absent.
    pub icon: String,
}

/// Coarse air quality bands used to colour the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiBand {
    /// AQI up to 50.
    Good,
    /// AQI up to 100.
    Moderate,
    /// AQI up to 150.
    UnhealthyForSensitiveGroups,
    /// AQI above 150.
    Unhealthy,
}

impl AqiBand {
    /// Classifies an index value.
    pub fn classify(aqi: i32) -> Self {
        match aqi {
            i32::MIN..=50 => Self::Good,
            51..=100 => Self::Moderate,
            101..=150 => Self::UnhealthyForSensitiveGroups,
            _ => Self::Unhealthy,
        }
    }
}

/// Current air quality at one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityReading {
    /// Index value.
    pub aqi: i32,
    /// Provider category label, e.g. `Good air quality`.
    pub category: String,
    /// PM2.5 concentration.
    pub pm25: f64,
    /// PM10 concentration.
    pub pm10: f64,
    /// Nitrogen dioxide concentration.
    pub no2: f64,
    /// Ozone concentration.
    pub o3: f64,
}

impl AirQualityReading {
    /// Band used for colouring.
    pub fn band(&self) -> AqiBand {
        AqiBand::classify(self.aqi)
    }
}

/// Rooftop solar suitability tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SolarPotentialTier {
    /// Strong candidate for panels.
    High,
    /// Moderate candidate.
    Medium,
    /// Weak candidate.
    Low,
}

impl SolarPotentialTier {
    /// Parses the provider's upper-case tier label.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }

    /// Tier implied by an estimated yearly yield when the provider does not
    /// report one.
    pub fn from_yearly_energy(kwh: f64) -> Self {
        if kwh >= 10_000.0 {
            Self::High
        } else if kwh >= 5_000.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for SolarPotentialTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        })
    }
}

/// Solar potential of the building closest to a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarInsight {
    /// Suitability tier.
    pub potential_tier: SolarPotentialTier,
    /// Largest panel array that fits the roof.
    pub max_panel_count: u32,
    /// Estimated DC energy per year for the largest array.
    pub estimated_yearly_energy_kwh: f64,
    /// Capacity of one panel.
    pub panel_capacity_watts: f64,
    /// Grid carbon intensity used for offset estimates.
    pub carbon_offset_kg_per_mwh: f64,
}

/// Rounds half-up to the nearest integer.
///
/// Float-to-int `as` casts saturate and map NaN to zero.
pub(crate) fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

#[cfg(test)]
mod tests {
    //! Classification and rounding helpers.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(12, AqiBand::Good)]
    #[case(50, AqiBand::Good)]
    #[case(51, AqiBand::Moderate)]
    #[case(150, AqiBand::UnhealthyForSensitiveGroups)]
    #[case(151, AqiBand::Unhealthy)]
    fn classifies_aqi_bands(#[case] aqi: i32, #[case] expected: AqiBand) {
        assert_eq!(AqiBand::classify(aqi), expected);
    }

    #[rstest]
    #[case(15.3, 15)]
    #[case(15.5, 16)]
    #[case(-2.5, -2)]
    #[case(-2.6, -3)]
    #[case(f64::NAN, 0)]
    fn rounds_half_up(#[case] value: f64, #[case] expected: i32) {
        assert_eq!(round_half_up(value), expected);
    }

    #[test]
    fn parses_tiers_case_insensitively() {
        assert_eq!(SolarPotentialTier::parse("high"), Some(SolarPotentialTier::High));
        assert_eq!(SolarPotentialTier::parse("VERY_HIGH"), None);
        assert_eq!(SolarPotentialTier::Medium.to_string(), "MEDIUM");
    }
}
