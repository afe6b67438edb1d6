//! DTOs for Solar `buildingInsights:findClosest` responses.
//!
//! The potential may arrive as a tier label or as the detailed
//! `solarPotential` object; numeric fields are read from the top level first,
//! then from the nested object.

use serde::Deserialize;

use crate::domain::{SolarInsight, SolarPotentialTier};

const KWH_PER_SQUARE_METER_ESTIMATE: f64 = 150.0;
const DEFAULT_CARBON_OFFSET_KG_PER_MWH: f64 = 400.0;
const DEFAULT_PANEL_CAPACITY_WATTS: f64 = 250.0;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BuildingInsightsDto {
    pub(super) solar_potential: Option<SolarPotentialDto>,
    #[serde(flatten)]
    pub(super) figures: SolarFiguresDto,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum SolarPotentialDto {
    Tier(String),
    Details(SolarFiguresDto),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SolarFiguresDto {
    pub(super) max_array_panels_count: Option<u32>,
    pub(super) max_array_area_meters2: Option<f64>,
    pub(super) yearly_energy_dc_kwh: Option<f64>,
    pub(super) carbon_offset_factor_kg_per_mwh: Option<f64>,
    pub(super) panel_capacity_watts: Option<f64>,
    #[serde(default)]
    pub(super) solar_panel_configs: Vec<PanelConfigDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PanelConfigDto {
    pub(super) yearly_energy_dc_kwh: Option<f64>,
}

impl BuildingInsightsDto {
    /// Without a `solarPotential` entry the building has no solar data.
    pub(super) fn into_insight(self) -> Option<SolarInsight> {
        let potential = self.solar_potential?;
        let top = self.figures;
        let (label, nested) = match potential {
            SolarPotentialDto::Tier(label) => (Some(label), SolarFiguresDto::default()),
            SolarPotentialDto::Details(details) => (None, details),
        };

        let yearly = top
            .yearly_energy_dc_kwh
            .or(nested.yearly_energy_dc_kwh)
            .or_else(|| last_config_yield(&top.solar_panel_configs))
            .or_else(|| last_config_yield(&nested.solar_panel_configs))
            .or_else(|| {
                top.max_array_area_meters2
                    .or(nested.max_array_area_meters2)
                    .map(|area| area * KWH_PER_SQUARE_METER_ESTIMATE)
            })
            .filter(|kwh| kwh.is_finite())
            .unwrap_or(0.0);
        let potential_tier = label
            .as_deref()
            .and_then(SolarPotentialTier::parse)
            .unwrap_or_else(|| SolarPotentialTier::from_yearly_energy(yearly));

        Some(SolarInsight {
            potential_tier,
            max_panel_count: top
                .max_array_panels_count
                .or(nested.max_array_panels_count)
                .unwrap_or(0),
            estimated_yearly_energy_kwh: yearly,
            panel_capacity_watts: top
                .panel_capacity_watts
                .or(nested.panel_capacity_watts)
                .unwrap_or(DEFAULT_PANEL_CAPACITY_WATTS),
            carbon_offset_kg_per_mwh: top
                .carbon_offset_factor_kg_per_mwh
                .or(nested.carbon_offset_factor_kg_per_mwh)
                .unwrap_or(DEFAULT_CARBON_OFFSET_KG_PER_MWH),
        })
    }
}

fn last_config_yield(configs: &[PanelConfigDto]) -> Option<f64> {
    configs.last().and_then(|config| config.yearly_energy_dc_kwh)
}
