//! Test utilities shared by unit tests (in `src/`) and integration tests (in
//! `tests/`).
//!
//! Compiled for unit tests and when the `test-support` feature is enabled.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::ports::{
    NearbySearchRequest, OverlaySource, OverlaySourceError, PoiSource, PoiSourceError,
};
use crate::domain::{GeoBounds, GeoPoint, Poi, PoiCategory, PoiIdentity};

/// Valid coordinate for tests.
///
/// # Panics
///
/// Panics when the coordinate is out of range.
pub fn point(latitude: f64, longitude: f64) -> GeoPoint {
    GeoPoint::new(latitude, longitude).expect("valid test coordinate")
}

/// Small rectangle centred on a coordinate.
///
/// # Panics
///
/// Panics when the coordinate is too close to a pole.
pub fn bounds_around(latitude: f64, longitude: f64) -> GeoBounds {
    GeoBounds::new(
        point(latitude - 0.01, longitude - 0.01),
        point(latitude + 0.01, longitude + 0.01),
    )
    .expect("valid test bounds")
}

/// Place with a provider identity, located in lower Manhattan.
pub fn poi(id: &str, name: &str, category: PoiCategory) -> Poi {
    Poi {
        identity: PoiIdentity::provider(id),
        name: name.to_owned(),
        location: point(40.7128, -74.0060),
        rating: Some(4.2),
        price_level: Some(2),
        tags: vec![category.as_str().to_owned(), "establishment".to_owned()],
        photo_refs: Vec::new(),
        found_by: category,
    }
}

/// Latch that holds scripted lookups until it is opened.
///
/// Opening is sticky, so waiters that arrive late pass straight through.
#[derive(Debug, Clone)]
pub struct Gate {
    open: Arc<watch::Sender<bool>>,
}

impl Gate {
    /// Closed gate.
    pub fn new() -> Self {
        let (open, _) = watch::channel(false);
        Self {
            open: Arc::new(open),
        }
    }

    /// Let every current and future waiter through.
    pub fn open(&self) {
        self.open.send_replace(true);
    }

    async fn wait(&self) {
        let mut receiver = self.open.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = receiver.wait_for(|open| *open).await;
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

struct Route {
    center: Option<GeoPoint>,
    category: PoiCategory,
    result: Result<Vec<Poi>, PoiSourceError>,
}

/// [`PoiSource`] answering from per-category routes.
///
/// Routes pinned to a center win over category-wide ones; categories without
/// a route answer with no places. Every request is recorded.
#[derive(Default)]
pub struct ScriptedPoiSource {
    routes: Vec<Route>,
    gates: Vec<(Option<GeoPoint>, Option<PoiCategory>, Gate)>,
    calls: Mutex<Vec<NearbySearchRequest>>,
}

impl ScriptedPoiSource {
    /// Source with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `category` with `result` wherever it is searched.
    #[must_use]
    pub fn with(mut self, category: PoiCategory, result: Result<Vec<Poi>, PoiSourceError>) -> Self {
        self.routes.push(Route {
            center: None,
            category,
            result,
        });
        self
    }

    /// Answer `category` with `result` only for lookups around `center`.
    #[must_use]
    pub fn with_at(
        mut self,
        center: GeoPoint,
        category: PoiCategory,
        result: Result<Vec<Poi>, PoiSourceError>,
    ) -> Self {
        self.routes.push(Route {
            center: Some(center),
            category,
            result,
        });
        self
    }

    /// Hold lookups around `center` until `gate` opens.
    #[must_use]
    pub fn gated_at(mut self, center: GeoPoint, gate: Gate) -> Self {
        self.gates.push((Some(center), None, gate));
        self
    }

    /// Hold lookups for `category` until `gate` opens.
    #[must_use]
    pub fn gated_category(mut self, category: PoiCategory, gate: Gate) -> Self {
        self.gates.push((None, Some(category), gate));
        self
    }

    /// Requests seen so far, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the recording mutex is poisoned.
    pub fn calls(&self) -> Vec<NearbySearchRequest> {
        self.calls.lock().expect("calls mutex").clone()
    }

    fn route(&self, request: &NearbySearchRequest) -> Result<Vec<Poi>, PoiSourceError> {
        let pinned = self
            .routes
            .iter()
            .find(|route| route.category == request.category && route.center == Some(request.center));
        let general = || {
            self.routes
                .iter()
                .find(|route| route.category == request.category && route.center.is_none())
        };
        pinned
            .or_else(general)
            .map_or_else(|| Ok(Vec::new()), |route| route.result.clone())
    }
}

#[async_trait]
impl PoiSource for ScriptedPoiSource {
    async fn nearby_search(&self, request: &NearbySearchRequest) -> Result<Vec<Poi>, PoiSourceError> {
        self.calls.lock().expect("calls mutex").push(request.clone());
        let gates: Vec<Gate> = self
            .gates
            .iter()
            .filter(|(center, category, _)| {
                center.is_none_or(|center| center == request.center)
                    && category.is_none_or(|category| category == request.category)
            })
            .map(|(_, _, gate)| gate.clone())
            .collect();
        for gate in gates {
            gate.wait().await;
        }
        self.route(request)
    }
}

type OverlayResult<T> = Result<Option<T>, OverlaySourceError>;

/// [`OverlaySource`] replaying scripted answers and recording positions.
pub struct ScriptedOverlaySource<T> {
    fallback: Option<OverlayResult<T>>,
    scripted: Mutex<VecDeque<OverlayResult<T>>>,
    requests: Mutex<Vec<GeoPoint>>,
    gate: Option<Gate>,
}

impl<T: Clone> ScriptedOverlaySource<T> {
    /// Answer every request with `result`.
    pub fn always(result: OverlayResult<T>) -> Self {
        Self {
            fallback: Some(result),
            scripted: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Answer requests with `results` in order, then fail.
    pub fn scripted(results: Vec<OverlayResult<T>>) -> Self {
        Self {
            fallback: None,
            scripted: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Hold every request until `gate` opens.
    #[must_use]
    pub fn gated(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Positions requested so far, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the recording mutex is poisoned.
    pub fn requests(&self) -> Vec<GeoPoint> {
        self.requests.lock().expect("requests mutex").clone()
    }
}

#[async_trait]
impl<T> OverlaySource<T> for ScriptedOverlaySource<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn fetch(&self, position: GeoPoint) -> OverlayResult<T> {
        self.requests.lock().expect("requests mutex").push(position);
        let answer = self
            .scripted
            .lock()
            .expect("script mutex")
            .pop_front()
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| {
                Err(OverlaySourceError::invalid_request(
                    "overlay script exhausted unexpectedly",
                ))
            });
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        answer
    }
}
