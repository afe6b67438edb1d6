//! DTOs for decoding Places Nearby Search responses.
//!
//! The adapter decodes into these transport DTOs first, then maps into domain
//! [`Poi`] values in one pass.

use serde::Deserialize;
use tracing::debug;

use crate::domain::poi::{sanitize_price_level, sanitize_rating};
use crate::domain::{GeoPoint, Poi, PoiCategory, PoiIdentity};

pub(super) const STATUS_OK: &str = "OK";
pub(super) const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

#[derive(Debug, Deserialize)]
pub(super) struct NearbySearchResponseDto {
    pub(super) status: String,
    #[serde(default)]
    pub(super) error_message: Option<String>,
    #[serde(default)]
    pub(super) results: Vec<PlaceDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PlaceDto {
    pub(super) place_id: Option<String>,
    #[serde(default)]
    pub(super) name: String,
    pub(super) geometry: Option<GeometryDto>,
    pub(super) rating: Option<f64>,
    pub(super) price_level: Option<i64>,
    #[serde(default)]
    pub(super) types: Vec<String>,
    #[serde(default)]
    pub(super) photos: Vec<PhotoDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeometryDto {
    pub(super) location: Option<LatLngDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LatLngDto {
    pub(super) lat: Option<f64>,
    pub(super) lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PhotoDto {
    pub(super) photo_reference: Option<String>,
}

impl NearbySearchResponseDto {
    /// Map provider results, skipping entries without a usable location.
    pub(super) fn into_domain_pois(self, category: PoiCategory) -> Vec<Poi> {
        self.results
            .into_iter()
            .enumerate()
            .filter_map(|(index, place)| place.into_domain_poi(category, index))
            .collect()
    }
}

impl PlaceDto {
    fn into_domain_poi(self, category: PoiCategory, index: usize) -> Option<Poi> {
        let Some(location) = self.location() else {
            debug!(%category, index, name = %self.name, "skipping place without valid geometry");
            return None;
        };
        let identity = match self.place_id {
            Some(id) if !id.is_empty() => PoiIdentity::Provider { id },
            _ => PoiIdentity::Positional { category, index },
        };

        Some(Poi {
            identity,
            name: self.name,
            location,
            rating: sanitize_rating(self.rating),
            price_level: sanitize_price_level(self.price_level),
            tags: self.types,
            photo_refs: self
                .photos
                .into_iter()
                .filter_map(|photo| photo.photo_reference)
                .filter(|reference| !reference.is_empty())
                .collect(),
            found_by: category,
        })
    }

    fn location(&self) -> Option<GeoPoint> {
        let location = self.geometry.as_ref()?.location.as_ref()?;
        GeoPoint::new(location.lat?, location.lng?).ok()
    }
}
