//! Driven port for coordinate-keyed overlay datasets.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::GeoPoint;

define_port_error! {
    /// Errors surfaced while fetching an overlay dataset.
    pub enum OverlaySourceError {
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "overlay transport failed: {message}",
        /// The request exceeded its timeout.
        Timeout { message: String } =>
            "overlay request timed out: {message}",
        /// The provider rate-limited the request.
        RateLimited { message: String } =>
            "overlay request rate limited: {message}",
        /// The response could not be decoded.
        Decode { message: String } =>
            "overlay response decode failed: {message}",
        /// The provider refused the request.
        InvalidRequest { message: String } =>
            "overlay request invalid: {message}",
    }
}

/// Port fetching one overlay dataset for a coordinate.
///
/// `Ok(None)` means the provider answered but had nothing usable for the
/// coordinate (for example no building with solar data nearby).
#[async_trait]
pub trait OverlaySource<T: Send + 'static>: Send + Sync {
    /// Fetch and normalize the dataset for `position`.
    async fn fetch(&self, position: GeoPoint) -> Result<Option<T>, OverlaySourceError>;
}

/// Fixture implementation that never has data.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureOverlaySource;

#[async_trait]
impl<T: Send + 'static> OverlaySource<T> for FixtureOverlaySource {
    async fn fetch(&self, _position: GeoPoint) -> Result<Option<T>, OverlaySourceError> {
        Ok(None)
    }
}
