//! Draw-mode state machine and ownership of the discovered POI set.
//!
//! The controller hands completed rectangles to [`CategorySearch`] and keeps
//! a generation token per session. A completion is applied only when its
//! token still matches the active session; anything else is a superseded
//! session and is dropped.

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::Serialize;
use tracing::{debug, info};

use super::category_search::{CategorySearch, DiscoveryOutcome, DiscoveryRequest, DiscoverySettings};
use super::error::ExplorerError;
use super::ports::DrawingSurface;
use super::{GeoBounds, Poi, PoiIdentity};

/// Draw-mode lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingState {
    /// Nothing armed and no session running.
    Idle,
    /// The map is waiting for the user to draw a rectangle.
    ArmedForDrawing,
    /// A discovery fan-out is running.
    SessionInFlight,
}

/// Finished fan-out tagged with the generation that started it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCompletion {
    /// Token of the session that produced `outcome`.
    pub generation: u64,
    /// Merged fan-out result.
    pub outcome: DiscoveryOutcome,
}

/// What happened to a completion when it reached the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionApplied {
    /// Results replaced the POI set and listeners were notified.
    Published {
        /// Number of places published.
        place_count: usize,
    },
    /// The session had been superseded or cleared.
    Discarded,
}

/// Callback invoked with each published session.
pub type SessionListener = Box<dyn Fn(&DiscoveryOutcome) + Send>;

struct ActiveSession {
    generation: u64,
    bounds: GeoBounds,
}

/// Owner of draw mode, the active session, the POI set and the selection.
pub struct DiscoverySessionController {
    surface: Arc<dyn DrawingSurface>,
    search: CategorySearch,
    settings: DiscoverySettings,
    state: DrawingState,
    generation: u64,
    active: Option<ActiveSession>,
    pois: Vec<Poi>,
    selected: Option<PoiIdentity>,
    listeners: Vec<SessionListener>,
}

impl DiscoverySessionController {
    /// Builds an idle controller.
    pub fn new(
        surface: Arc<dyn DrawingSurface>,
        search: CategorySearch,
        settings: DiscoverySettings,
    ) -> Self {
        Self {
            surface,
            search,
            settings,
            state: DrawingState::Idle,
            generation: 0,
            active: None,
            pois: Vec::new(),
            selected: None,
            listeners: Vec::new(),
        }
    }

    /// Arm rectangle drawing.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::MapNotReady`] while the map surface is still
    /// loading.
    pub fn start_drawing(&mut self) -> Result<(), ExplorerError> {
        if !self.surface.is_ready() {
            return Err(ExplorerError::MapNotReady);
        }
        self.surface.set_rectangle_mode(true);
        self.state = DrawingState::ArmedForDrawing;
        Ok(())
    }

    /// Disarm rectangle drawing without producing a session.
    pub fn stop_drawing(&mut self) {
        if self.state != DrawingState::ArmedForDrawing {
            return;
        }
        self.surface.set_rectangle_mode(false);
        self.state = self.resting_state();
    }

    /// Flip draw mode the way the toolbar button does.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::start_drawing`] failures.
    pub fn toggle_drawing(&mut self) -> Result<(), ExplorerError> {
        if self.state == DrawingState::ArmedForDrawing {
            self.stop_drawing();
            Ok(())
        } else {
            self.start_drawing()
        }
    }

    /// Start a session for a completed rectangle.
    ///
    /// Always disarms drawing and supersedes any running session. The returned
    /// future performs the fan-out; feed its output to [`Self::apply`].
    pub fn complete_rectangle(&mut self, bounds: GeoBounds) -> BoxFuture<'static, SessionCompletion> {
        self.surface.set_rectangle_mode(false);
        if bounds.is_degenerate() {
            debug!(?bounds, "zero-area rectangle; running discovery anyway");
        }

        self.generation += 1;
        let generation = self.generation;
        self.active = Some(ActiveSession { generation, bounds });
        self.state = DrawingState::SessionInFlight;
        self.pois.clear();
        self.selected = None;

        let search = self.search.clone();
        let request = DiscoveryRequest::from_settings(bounds, &self.settings);
        async move {
            let outcome = search.discover(request).await;
            SessionCompletion {
                generation,
                outcome,
            }
        }
        .boxed()
    }

    /// Apply a finished fan-out if it belongs to the active session.
    pub fn apply(&mut self, completion: SessionCompletion) -> SessionApplied {
        let is_current = self
            .active
            .as_ref()
            .is_some_and(|active| active.generation == completion.generation);
        if !is_current {
            debug!(
                generation = completion.generation,
                current = self.generation,
                "dropping results of superseded session"
            );
            return SessionApplied::Discarded;
        }

        self.active = None;
        if self.state == DrawingState::SessionInFlight {
            self.state = DrawingState::Idle;
        }

        let outcome = completion.outcome;
        let place_count = outcome.pois.len();
        info!(
            generation = completion.generation,
            place_count,
            failed_categories = outcome.failed_categories.len(),
            "{}",
            outcome.summary()
        );
        for listener in &self.listeners {
            listener(&outcome);
        }
        self.pois = outcome.pois;
        SessionApplied::Published { place_count }
    }

    /// Wipe the POI set and selection, invalidating any running session.
    pub fn clear(&mut self) {
        self.pois.clear();
        self.selected = None;
        self.active = None;
        if self.state == DrawingState::SessionInFlight {
            self.state = DrawingState::Idle;
        }
    }

    /// Point the selection at a discovered place, or clear it with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::UnknownPoi`] when `identity` is not in the
    /// current POI set.
    pub fn select_poi(&mut self, identity: Option<&PoiIdentity>) -> Result<Option<&Poi>, ExplorerError> {
        let Some(identity) = identity else {
            self.selected = None;
            return Ok(None);
        };
        let poi = self
            .pois
            .iter()
            .find(|poi| &poi.identity == identity)
            .ok_or_else(|| ExplorerError::UnknownPoi {
                identity: identity.clone(),
            })?;
        self.selected = Some(identity.clone());
        Ok(Some(poi))
    }

    /// Register a listener for published sessions.
    pub fn on_session_complete(&mut self, listener: SessionListener) {
        self.listeners.push(listener);
    }

    /// Current draw-mode state.
    pub fn state(&self) -> DrawingState {
        self.state
    }

    /// Places published by the last completed session.
    pub fn pois(&self) -> &[Poi] {
        &self.pois
    }

    /// Currently selected place.
    pub fn selected_poi(&self) -> Option<&Poi> {
        let selected = self.selected.as_ref()?;
        self.pois.iter().find(|poi| &poi.identity == selected)
    }

    /// Bounds of the running session, if any.
    pub fn active_bounds(&self) -> Option<GeoBounds> {
        self.active.as_ref().map(|active| active.bounds)
    }

    fn resting_state(&self) -> DrawingState {
        if self.active.is_some() {
            DrawingState::SessionInFlight
        } else {
            DrawingState::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    //! State-machine coverage for the session controller.

    use super::*;
    use crate::domain::PoiCategory;
    use crate::domain::ports::{FixturePoiSource, MockDrawingSurface};
    use crate::test_support::{bounds_around, poi};
    use mockall::predicate::eq;

    fn controller(surface: MockDrawingSurface) -> DiscoverySessionController {
        DiscoverySessionController::new(
            Arc::new(surface),
            CategorySearch::new(Arc::new(FixturePoiSource)),
            DiscoverySettings::default(),
        )
    }

    fn ready_surface() -> MockDrawingSurface {
        let mut surface = MockDrawingSurface::new();
        surface.expect_is_ready().return_const(true);
        surface.expect_set_rectangle_mode().return_const(());
        surface
    }

    #[test]
    fn drawing_cannot_be_armed_before_the_map_is_ready() {
        let mut surface = MockDrawingSurface::new();
        surface.expect_is_ready().return_const(false);
        surface.expect_set_rectangle_mode().never();
        let mut controller = controller(surface);

        let error = controller.start_drawing().expect_err("map not ready");
        assert_eq!(error, ExplorerError::MapNotReady);
        assert_eq!(controller.state(), DrawingState::Idle);
    }

    #[test]
    fn toggling_arms_and_disarms_the_surface() {
        let mut surface = MockDrawingSurface::new();
        surface.expect_is_ready().return_const(true);
        surface
            .expect_set_rectangle_mode()
            .with(eq(true))
            .times(1)
            .return_const(());
        surface
            .expect_set_rectangle_mode()
            .with(eq(false))
            .times(1)
            .return_const(());
        let mut controller = controller(surface);

        controller.toggle_drawing().expect("arm");
        assert_eq!(controller.state(), DrawingState::ArmedForDrawing);
        controller.toggle_drawing().expect("disarm");
        assert_eq!(controller.state(), DrawingState::Idle);
    }

    #[test]
    fn completing_a_rectangle_disarms_and_starts_a_session() {
        let mut controller = controller(ready_surface());
        controller.start_drawing().expect("arm");

        let _pending = controller.complete_rectangle(bounds_around(40.7128, -74.0060));
        assert_eq!(controller.state(), DrawingState::SessionInFlight);
        assert!(controller.active_bounds().is_some());
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut controller = controller(ready_surface());
        let _first = controller.complete_rectangle(bounds_around(40.0, -74.0));
        let _second = controller.complete_rectangle(bounds_around(41.0, -74.0));

        let stale = SessionCompletion {
            generation: 1,
            outcome: DiscoveryOutcome {
                bounds: bounds_around(40.0, -74.0),
                pois: vec![poi("stale", "Stale Diner", PoiCategory::Restaurant)],
                failed_categories: Vec::new(),
            },
        };
        assert_eq!(controller.apply(stale), SessionApplied::Discarded);
        assert!(controller.pois().is_empty());
        assert_eq!(controller.state(), DrawingState::SessionInFlight);
    }

    #[test]
    fn clear_invalidates_the_running_session() {
        let mut controller = controller(ready_surface());
        let _pending = controller.complete_rectangle(bounds_around(40.0, -74.0));
        controller.clear();
        assert_eq!(controller.state(), DrawingState::Idle);

        let late = SessionCompletion {
            generation: 1,
            outcome: DiscoveryOutcome {
                bounds: bounds_around(40.0, -74.0),
                pois: vec![poi("late", "Late Bank", PoiCategory::Bank)],
                failed_categories: Vec::new(),
            },
        };
        assert_eq!(controller.apply(late), SessionApplied::Discarded);
        assert!(controller.pois().is_empty());
    }

    #[test]
    fn selection_requires_a_known_place() {
        let mut controller = controller(ready_surface());
        let _pending = controller.complete_rectangle(bounds_around(40.0, -74.0));
        let published = SessionCompletion {
            generation: 1,
            outcome: DiscoveryOutcome {
                bounds: bounds_around(40.0, -74.0),
                pois: vec![poi("p-1", "Harbor Spa", PoiCategory::Spa)],
                failed_categories: Vec::new(),
            },
        };
        assert_eq!(
            controller.apply(published),
            SessionApplied::Published { place_count: 1 }
        );

        let known = PoiIdentity::provider("p-1");
        let selected = controller.select_poi(Some(&known)).expect("known place");
        assert_eq!(selected.map(|poi| poi.name.as_str()), Some("Harbor Spa"));

        let unknown = PoiIdentity::provider("nope");
        assert!(controller.select_poi(Some(&unknown)).is_err());
        assert!(controller.selected_poi().is_some());

        controller.clear();
        assert!(controller.selected_poi().is_none());
    }
}
