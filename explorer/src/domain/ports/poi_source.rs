//! Driven port for per-category POI lookups.
//!
//! The domain owns the request shape so the fan-out stays provider-agnostic.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{GeoPoint, Poi, PoiCategory};

/// One category query issued by a discovery fan-out branch.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbySearchRequest {
    /// Search origin, normally the center of the drawn bounds.
    pub center: GeoPoint,
    /// Search radius around `center`.
    pub radius_meters: f64,
    /// Category to look up.
    pub category: PoiCategory,
}

define_port_error! {
    /// Errors surfaced while looking up POIs.
    pub enum PoiSourceError {
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "poi lookup transport failed: {message}",
        /// The lookup exceeded its timeout.
        Timeout { message: String } =>
            "poi lookup timed out: {message}",
        /// The provider rate-limited the request.
        RateLimited { message: String } =>
            "poi lookup rate limited: {message}",
        /// The provider answered with a non-OK status.
        Rejected { status: String } =>
            "poi lookup rejected with status {status}",
        /// The response could not be decoded.
        Decode { message: String } =>
            "poi lookup response decode failed: {message}",
        /// The adapter refused the request before sending it.
        InvalidRequest { message: String } =>
            "poi lookup request invalid: {message}",
    }
}

/// Port for looking up POIs of one category around a point.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoiSource: Send + Sync {
    /// Return places for one category in provider order.
    ///
    /// Implementations return every place the provider yields; the fan-out
    /// applies the per-category cap.
    async fn nearby_search(&self, request: &NearbySearchRequest) -> Result<Vec<Poi>, PoiSourceError>;
}

/// Fixture implementation that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixturePoiSource;

#[async_trait]
impl PoiSource for FixturePoiSource {
    async fn nearby_search(
        &self,
        _request: &NearbySearchRequest,
    ) -> Result<Vec<Poi>, PoiSourceError> {
        Ok(Vec::new())
    }
}
