//! Single-owner event loop tying discovery sessions and overlays together.
//!
//! The engine is the only writer of session and overlay state. Operations
//! update state synchronously and queue the provider work they start; callers
//! drive that work with [`ExplorerEngine::next_event`], which applies one
//! completion at a time in arrival order.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use tracing::debug;

use super::category_search::{CategorySearch, DiscoverySettings};
use super::discovery_session::{
    DiscoverySessionController, DrawingState, SessionApplied, SessionCompletion, SessionListener,
};
use super::error::ExplorerError;
use super::overlay::{
    OverlayCompletion, OverlayKind, OverlayListener, OverlaySources, OverlaySynchronizer,
    PendingOverlay,
};
use super::ports::{DrawingSurface, PoiSource};
use super::{GeoBounds, GeoPoint, Poi, PoiIdentity};

const INITIAL_LATITUDE: f64 = 40.7128;
const INITIAL_LONGITUDE: f64 = -74.0060;

/// Collaborators the engine drives.
#[derive(Clone)]
pub struct ExplorerPorts {
    /// Map surface that owns rectangle drawing.
    pub surface: Arc<dyn DrawingSurface>,
    /// Per-category place lookups.
    pub poi_source: Arc<dyn PoiSource>,
    /// Overlay datasets.
    pub overlays: OverlaySources,
}

/// Start-up configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerOptions {
    /// Settings applied to each discovery session.
    pub discovery: DiscoverySettings,
    /// Position set at start-up; overlays fetch for it immediately.
    pub initial_position: Option<GeoPoint>,
    /// Overlays switched on at start-up.
    pub enabled_overlays: Vec<OverlayKind>,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self {
            discovery: DiscoverySettings::default(),
            initial_position: GeoPoint::new(INITIAL_LATITUDE, INITIAL_LONGITUDE).ok(),
            enabled_overlays: OverlayKind::ALL.to_vec(),
        }
    }
}

/// Observable result of applying one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// A session finished and replaced the POI set.
    SessionPublished {
        /// Number of places published.
        place_count: usize,
    },
    /// A superseded or cleared session finished and was dropped.
    SessionDiscarded,
    /// An overlay response updated its overlay.
    OverlayApplied(OverlayKind),
    /// An overlay response for a stale position was dropped.
    OverlayDiscarded(OverlayKind),
}

enum Completion {
    Session(SessionCompletion),
    Overlay(OverlayCompletion),
}

/// Discovery and overlay state behind one owner.
pub struct ExplorerEngine {
    discovery: DiscoverySessionController,
    overlays: OverlaySynchronizer,
    in_flight: FuturesUnordered<BoxFuture<'static, Completion>>,
}

impl ExplorerEngine {
    /// Builds the engine and queues overlay fetches for the initial position.
    pub fn new(ports: ExplorerPorts, options: ExplorerOptions) -> Self {
        let discovery = DiscoverySessionController::new(
            ports.surface,
            CategorySearch::new(ports.poi_source),
            options.discovery,
        );
        let overlays = OverlaySynchronizer::new(ports.overlays, &options.enabled_overlays);

        let mut engine = Self {
            discovery,
            overlays,
            in_flight: FuturesUnordered::new(),
        };
        if let Some(position) = options.initial_position {
            engine.set_position(position);
        }
        engine
    }

    /// Arm rectangle drawing.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::MapNotReady`] while the map is loading.
    pub fn start_drawing(&mut self) -> Result<(), ExplorerError> {
        self.discovery.start_drawing()
    }

    /// Disarm rectangle drawing.
    pub fn stop_drawing(&mut self) {
        self.discovery.stop_drawing();
    }

    /// Flip draw mode.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::MapNotReady`] when arming a loading map.
    pub fn toggle_drawing(&mut self) -> Result<(), ExplorerError> {
        self.discovery.toggle_drawing()
    }

    /// Start a discovery session for a drawn rectangle.
    pub fn complete_rectangle(&mut self, bounds: GeoBounds) {
        let pending = self.discovery.complete_rectangle(bounds);
        self.in_flight.push(pending.map(Completion::Session).boxed());
    }

    /// Wipe discovered places and invalidate any running session.
    pub fn clear(&mut self) {
        self.discovery.clear();
    }

    /// Move the current position and refetch enabled overlays.
    pub fn set_position(&mut self, position: GeoPoint) {
        let pending = self.overlays.set_position(position);
        self.queue_overlays(pending);
    }

    /// Switch one overlay on or off.
    pub fn set_overlay_enabled(&mut self, kind: OverlayKind, enabled: bool) {
        let pending = self.overlays.set_enabled(kind, enabled);
        self.queue_overlays(pending);
    }

    /// Select a discovered place, or clear the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::UnknownPoi`] for places outside the current set.
    pub fn select_poi(&mut self, identity: Option<&PoiIdentity>) -> Result<Option<&Poi>, ExplorerError> {
        self.discovery.select_poi(identity)
    }

    /// Register a listener for published sessions.
    pub fn on_session_complete(&mut self, listener: SessionListener) {
        self.discovery.on_session_complete(listener);
    }

    /// Register a listener for one overlay.
    pub fn on_overlay_update(&mut self, kind: OverlayKind, listener: OverlayListener) {
        self.overlays.on_overlay_update(kind, listener);
    }

    /// Draw-mode state.
    pub fn drawing_state(&self) -> DrawingState {
        self.discovery.state()
    }

    /// Places published by the last completed session.
    pub fn pois(&self) -> &[Poi] {
        self.discovery.pois()
    }

    /// Currently selected place.
    pub fn selected_poi(&self) -> Option<&Poi> {
        self.discovery.selected_poi()
    }

    /// Canonical current position.
    pub fn position(&self) -> Option<GeoPoint> {
        self.overlays.position()
    }

    /// Session controller, read-only.
    pub fn discovery(&self) -> &DiscoverySessionController {
        &self.discovery
    }

    /// Overlay synchronizer, read-only.
    pub fn overlays(&self) -> &OverlaySynchronizer {
        &self.overlays
    }

    /// Number of provider calls still outstanding, superseded ones included.
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether nothing is outstanding.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Wait for the next completion and apply it.
    ///
    /// Returns `None` once nothing is outstanding.
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        let completion = self.in_flight.next().await?;
        let event = match completion {
            Completion::Session(completion) => match self.discovery.apply(completion) {
                SessionApplied::Published { place_count } => EngineEvent::SessionPublished { place_count },
                SessionApplied::Discarded => EngineEvent::SessionDiscarded,
            },
            Completion::Overlay(completion) => {
                let kind = completion.kind();
                if self.overlays.apply(completion) {
                    EngineEvent::OverlayApplied(kind)
                } else {
                    EngineEvent::OverlayDiscarded(kind)
                }
            }
        };
        debug!(?event, remaining = self.in_flight.len(), "engine applied completion");
        Some(event)
    }

    /// Drain every outstanding completion.
    pub async fn run_until_idle(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }

    fn queue_overlays(&mut self, pending: impl IntoIterator<Item = PendingOverlay>) {
        for future in pending {
            self.in_flight.push(future.map(Completion::Overlay).boxed());
        }
    }
}
