//! Caller-facing errors raised by engine operations.
//!
//! Provider failures never surface here: they degrade to empty or stale state
//! inside the fan-out and the overlay fetchers.

use thiserror::Error;

use super::PoiIdentity;

/// Errors returned to the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExplorerError {
    /// Drawing was requested before the map surface finished loading.
    #[error("map surface is not ready for drawing")]
    MapNotReady,
    /// Selection referenced a place outside the current POI set.
    #[error("no discovered place matches {identity:?}")]
    UnknownPoi {
        /// Identity that was requested.
        identity: PoiIdentity,
    },
}
