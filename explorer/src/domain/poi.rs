//! Points of interest and the closed category vocabulary used to find them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::GeoPoint;

/// Category queried by one branch of a discovery fan-out.
///
/// The declaration order of [`PoiCategory::ALL`] is the merge order used when
/// a session publishes its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    /// Restaurants and other places to eat.
    Restaurant,
    /// Hotels and other lodging.
    Lodging,
    /// Tourist attractions.
    TouristAttraction,
    /// Banks.
    Bank,
    /// Hospitals.
    Hospital,
    /// Pharmacies.
    Pharmacy,
    /// Fuel stations.
    GasStation,
    /// Shopping malls.
    ShoppingMall,
    /// Cinemas.
    MovieTheater,
    /// Gyms.
    Gym,
    /// Spas.
    Spa,
}

impl PoiCategory {
    /// Every category in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Restaurant,
        Self::Lodging,
        Self::TouristAttraction,
        Self::Bank,
        Self::Hospital,
        Self::Pharmacy,
        Self::GasStation,
        Self::ShoppingMall,
        Self::MovieTheater,
        Self::Gym,
        Self::Spa,
    ];

    /// Provider tag for this category.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Restaurant => "restaurant",
            Self::Lodging => "lodging",
            Self::TouristAttraction => "tourist_attraction",
            Self::Bank => "bank",
            Self::Hospital => "hospital",
            Self::Pharmacy => "pharmacy",
            Self::GasStation => "gas_station",
            Self::ShoppingMall => "shopping_mall",
            Self::MovieTheater => "movie_theater",
            Self::Gym => "gym",
            Self::Spa => "spa",
        }
    }
}

impl fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unknown category tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown POI category: {0}")]
pub struct UnknownPoiCategory(pub String);

impl FromStr for PoiCategory {
    type Err = UnknownPoiCategory;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == raw)
            .ok_or_else(|| UnknownPoiCategory(raw.to_owned()))
    }
}

/// Identity of a discovered POI.
///
/// Providers normally assign stable ids. When one is missing the POI is
/// identified by its position within the category batch that returned it, so
/// such entries never collide with entries from other batches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum PoiIdentity {
    /// Provider-assigned identifier.
    Provider {
        /// Raw provider id.
        id: String,
    },
    /// Index within the category batch that returned the POI.
    Positional {
        /// Category batch.
        category: PoiCategory,
        /// Zero-based provider position.
        index: usize,
    },
}

impl PoiIdentity {
    /// Builds a provider identity.
    pub fn provider(id: impl Into<String>) -> Self {
        Self::Provider { id: id.into() }
    }
}

/// A point of interest returned by a category query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    /// Stable identity used for deduplication and selection.
    pub identity: PoiIdentity,
    /// Display name.
    pub name: String,
    /// Location of the place.
    pub location: GeoPoint,
    /// Average rating in `[0, 5]`.
    pub rating: Option<f64>,
    /// Price level in `[1, 4]`.
    pub price_level: Option<u8>,
    /// Raw provider type tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Opaque photo references, resolved lazily by detail views.
    #[serde(default)]
    pub photo_refs: Vec<String>,
    /// Category query that surfaced the place.
    pub found_by: PoiCategory,
}

impl Poi {
    /// First tag that names a known category, falling back to the category
    /// that found the place.
    pub fn primary_category(&self) -> PoiCategory {
        self.tags
            .iter()
            .find_map(|tag| tag.parse::<PoiCategory>().ok())
            .unwrap_or(self.found_by)
    }

    /// Price level rendered as repeated currency symbols (`$` to `$$$$`).
    pub fn price_label(&self) -> Option<String> {
        self.price_level
            .filter(|level| (1..=4).contains(level))
            .map(|level| "$".repeat(usize::from(level)))
    }
}

/// Accepts ratings in `[0, 5]` only.
pub(crate) fn sanitize_rating(rating: Option<f64>) -> Option<f64> {
    rating.filter(|value| value.is_finite() && (0.0..=5.0).contains(value))
}

/// Accepts price levels in `[1, 4]` only; providers use `0` for "free".
pub(crate) fn sanitize_price_level(level: Option<i64>) -> Option<u8> {
    level
        .filter(|value| (1..=4).contains(value))
        .and_then(|value| u8::try_from(value).ok())
}

#[cfg(test)]
mod tests {
    //! Category parsing and POI display helpers.

    use super::*;
    use rstest::rstest;

    fn poi(tags: &[&str], price_level: Option<u8>) -> Poi {
        Poi {
            identity: PoiIdentity::provider("abc"),
            name: "Corner Cafe".to_owned(),
            location: GeoPoint::new(40.71, -74.0).expect("valid point"),
            rating: Some(4.5),
            price_level,
            tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
            photo_refs: Vec::new(),
            found_by: PoiCategory::Bank,
        }
    }

    #[test]
    fn categories_round_trip_through_provider_tags() {
        for category in PoiCategory::ALL {
            assert_eq!(category.as_str().parse::<PoiCategory>(), Ok(category));
        }
        assert!("bakery".parse::<PoiCategory>().is_err());
    }

    #[test]
    fn primary_category_prefers_first_known_tag() {
        let place = poi(&["point_of_interest", "spa", "gym"], None);
        assert_eq!(place.primary_category(), PoiCategory::Spa);
        assert_eq!(poi(&["establishment"], None).primary_category(), PoiCategory::Bank);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(1), Some("$"))]
    #[case(Some(4), Some("$$$$"))]
    #[case(Some(5), None)]
    fn price_label_repeats_currency_symbol(#[case] level: Option<u8>, #[case] expected: Option<&str>) {
        assert_eq!(poi(&[], level).price_label().as_deref(), expected);
    }

    #[rstest]
    #[case(Some(0), None)]
    #[case(Some(2), Some(2))]
    #[case(Some(7), None)]
    fn price_levels_outside_range_are_dropped(#[case] raw: Option<i64>, #[case] expected: Option<u8>) {
        assert_eq!(sanitize_price_level(raw), expected);
    }

    #[test]
    fn ratings_outside_range_are_dropped() {
        assert_eq!(sanitize_rating(Some(4.2)), Some(4.2));
        assert_eq!(sanitize_rating(Some(5.5)), None);
        assert_eq!(sanitize_rating(Some(f64::NAN)), None);
    }
}
