//! DTOs for decoding OpenWeatherMap current-weather responses.

use serde::Deserialize;

use crate::domain::WeatherReading;
use crate::domain::overlay::round_half_up;

const METERS_PER_SECOND_TO_KPH: f64 = 3.6;

#[derive(Debug, Deserialize)]
pub(super) struct CurrentWeatherDto {
    #[serde(default)]
    pub(super) main: MainDto,
    pub(super) wind: Option<WindDto>,
    pub(super) visibility: Option<f64>,
    #[serde(default)]
    pub(super) weather: Vec<ConditionDto>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct MainDto {
    pub(super) temp: Option<f64>,
    pub(super) humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WindDto {
    pub(super) speed: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct ConditionDto {
    #[serde(default)]
    pub(super) description: String,
    #[serde(default)]
    pub(super) icon: String,
}

impl CurrentWeatherDto {
    pub(super) fn into_reading(self) -> WeatherReading {
        let condition = self.weather.into_iter().next();
        let (condition_text, icon) = condition
            .map(|condition| (condition.description, condition.icon))
            .unwrap_or_default();

        WeatherReading {
            temperature_c: self.main.temp.map_or(0, round_half_up),
            humidity_pct: self.main.humidity.map_or(0, round_half_up),
            wind_kph: self
                .wind
                .map_or(0, |wind| round_half_up(wind.speed * METERS_PER_SECOND_TO_KPH)),
            visibility_km: self
                .visibility
                .map_or(0, |meters| round_half_up(meters / 1_000.0)),
            condition_text,
            icon,
        }
    }
}
