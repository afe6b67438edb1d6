//! Multi-category POI discovery fan-out.
//!
//! One lookup per category runs concurrently through `join_all`; each branch
//! isolates its own failure. The merged list is produced once, after every
//! branch has reported, in category declaration order.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use super::ports::{NearbySearchRequest, PoiSource, PoiSourceError};
use super::{GeoBounds, Poi, PoiCategory};

const DEFAULT_PER_CATEGORY_LIMIT: usize = 5;
const DEFAULT_SEARCH_RADIUS_METERS: f64 = 2_000.0;

/// Knobs applied to every discovery session.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverySettings {
    /// Categories queried per session, in merge order.
    pub categories: Vec<PoiCategory>,
    /// Maximum places kept per category, in provider order.
    pub per_category_limit: usize,
    /// Radius around the bounds center passed to each lookup.
    pub search_radius_meters: f64,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            categories: PoiCategory::ALL.to_vec(),
            per_category_limit: DEFAULT_PER_CATEGORY_LIMIT,
            search_radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
        }
    }
}

/// Input of one fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryRequest {
    /// Drawn rectangle.
    pub bounds: GeoBounds,
    /// Categories to query, in merge order.
    pub categories: Vec<PoiCategory>,
    /// Maximum places kept per category.
    pub per_category_limit: usize,
    /// Lookup radius around the bounds center.
    pub search_radius_meters: f64,
}

impl DiscoveryRequest {
    /// Builds a request for `bounds` using session-wide settings.
    pub fn from_settings(bounds: GeoBounds, settings: &DiscoverySettings) -> Self {
        Self {
            bounds,
            categories: settings.categories.clone(),
            per_category_limit: settings.per_category_limit,
            search_radius_meters: settings.search_radius_meters,
        }
    }
}

/// Result of one category branch.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryOutcome {
    /// Category that was queried.
    pub category: PoiCategory,
    /// Capped places, or the error that silenced this branch.
    pub result: Result<Vec<Poi>, PoiSourceError>,
}

/// Merged result published once per session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryOutcome {
    /// Rectangle that triggered the session.
    pub bounds: GeoBounds,
    /// Deduplicated places in category declaration order.
    pub pois: Vec<Poi>,
    /// Categories whose lookup failed. Not part of the rendering contract.
    pub failed_categories: Vec<PoiCategory>,
}

impl DiscoveryOutcome {
    /// Human-readable count shown when the session completes.
    pub fn summary(&self) -> String {
        match self.pois.len() {
            1 => "Found 1 place in your area!".to_owned(),
            count => format!("Found {count} places in your area!"),
        }
    }

    /// Fold branch outcomes, already in declaration order, into the merged
    /// list. The first occurrence of an identity wins.
    pub fn merge(bounds: GeoBounds, outcomes: Vec<CategoryOutcome>) -> Self {
        let mut seen = HashSet::new();
        let mut pois = Vec::new();
        let mut failed_categories = Vec::new();

        for outcome in outcomes {
            match outcome.result {
                Ok(batch) => {
                    for poi in batch {
                        if seen.insert(poi.identity.clone()) {
                            pois.push(poi);
                        } else {
                            debug!(category = %outcome.category, name = %poi.name, "dropping duplicate place");
                        }
                    }
                }
                Err(_) => failed_categories.push(outcome.category),
            }
        }

        Self {
            bounds,
            pois,
            failed_categories,
        }
    }
}

/// Fan-out over a [`PoiSource`].
#[derive(Clone)]
pub struct CategorySearch {
    source: Arc<dyn PoiSource>,
}

impl CategorySearch {
    /// Wraps a lookup port.
    pub fn new(source: Arc<dyn PoiSource>) -> Self {
        Self { source }
    }

    /// Query every category concurrently and merge once all have finished.
    ///
    /// Never fails: a failing category contributes no places and is listed in
    /// [`DiscoveryOutcome::failed_categories`].
    pub async fn discover(&self, request: DiscoveryRequest) -> DiscoveryOutcome {
        let center = request.bounds.center();
        let branches = request.categories.iter().map(|&category| {
            let lookup = NearbySearchRequest {
                center,
                radius_meters: request.search_radius_meters,
                category,
            };
            self.search_category(lookup, request.per_category_limit)
        });
        let outcomes = join_all(branches).await;
        DiscoveryOutcome::merge(request.bounds, outcomes)
    }

    async fn search_category(&self, lookup: NearbySearchRequest, limit: usize) -> CategoryOutcome {
        let category = lookup.category;
        let result = match self.source.nearby_search(&lookup).await {
            Ok(mut batch) => {
                batch.truncate(limit);
                Ok(batch)
            }
            Err(error) => {
                warn!(%category, kind = error.kind(), %error, "category lookup failed; contributing no places");
                Err(error)
            }
        };
        CategoryOutcome { category, result }
    }
}
