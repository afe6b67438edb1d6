//! Domain model for area discovery and overlay aggregation.
//!
//! Purpose: hold the value objects (coordinates, bounds, places), the
//! discovery fan-out, the overlay fetchers and the engine that owns them.
//! Provider access goes through [`ports`] so adapters stay swappable.

pub mod category_search;
pub mod discovery_session;
pub mod engine;
pub mod error;
pub mod geo;
pub mod overlay;
pub mod poi;
pub mod ports;

pub use self::category_search::{
    CategoryOutcome, CategorySearch, DiscoveryOutcome, DiscoveryRequest, DiscoverySettings,
};
pub use self::discovery_session::{
    DiscoverySessionController, DrawingState, SessionApplied, SessionCompletion, SessionListener,
};
pub use self::engine::{EngineEvent, ExplorerEngine, ExplorerOptions, ExplorerPorts};
pub use self::error::ExplorerError;
pub use self::geo::{GeoBounds, GeoPoint, GeoValidationError};
pub use self::overlay::{
    AirQualityReading, AqiBand, OverlayKind, OverlayListener, OverlaySources, OverlayState,
    OverlaySynchronizer, OverlayView, SolarInsight, SolarPotentialTier, UnknownOverlayKind,
    WeatherReading,
};
pub use self::poi::{Poi, PoiCategory, PoiIdentity, UnknownPoiCategory};
