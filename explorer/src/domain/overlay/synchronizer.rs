//! Single owner of the current position and the three overlay fetchers.

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use super::fetcher::{FetchCompletion, OverlayFetcher, OverlayState};
use super::{AirQualityReading, OverlayKind, SolarInsight, WeatherReading};
use crate::domain::GeoPoint;
use crate::domain::ports::OverlaySource;

/// Overlay sources consumed by the synchronizer.
#[derive(Clone)]
pub struct OverlaySources {
    /// Weather by coordinate.
    pub weather: Arc<dyn OverlaySource<WeatherReading>>,
    /// Air quality by coordinate.
    pub air_quality: Arc<dyn OverlaySource<AirQualityReading>>,
    /// Solar potential by coordinate.
    pub solar: Arc<dyn OverlaySource<SolarInsight>>,
}

/// A response from any overlay, routed back to its fetcher.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayCompletion {
    /// Weather response.
    Weather(FetchCompletion<WeatherReading>),
    /// Air quality response.
    AirQuality(FetchCompletion<AirQualityReading>),
    /// Solar response.
    Solar(FetchCompletion<SolarInsight>),
}

impl OverlayCompletion {
    /// Overlay the response belongs to.
    pub fn kind(&self) -> OverlayKind {
        match self {
            Self::Weather(_) => OverlayKind::Weather,
            Self::AirQuality(_) => OverlayKind::AirQuality,
            Self::Solar(_) => OverlayKind::Solar,
        }
    }
}

/// Borrowed state of one overlay handed to listeners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayView<'a> {
    /// Weather overlay state.
    Weather(&'a OverlayState<WeatherReading>),
    /// Air quality overlay state.
    AirQuality(&'a OverlayState<AirQualityReading>),
    /// Solar overlay state.
    Solar(&'a OverlayState<SolarInsight>),
}

impl OverlayView<'_> {
    /// Overlay this view describes.
    pub fn kind(&self) -> OverlayKind {
        match self {
            Self::Weather(_) => OverlayKind::Weather,
            Self::AirQuality(_) => OverlayKind::AirQuality,
            Self::Solar(_) => OverlayKind::Solar,
        }
    }

    /// Whether the overlay is switched on.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Weather(state) => state.is_enabled(),
            Self::AirQuality(state) => state.is_enabled(),
            Self::Solar(state) => state.is_enabled(),
        }
    }

    /// Whether a request for the current position is outstanding.
    pub fn is_loading(&self) -> bool {
        match self {
            Self::Weather(state) => state.is_loading(),
            Self::AirQuality(state) => state.is_loading(),
            Self::Solar(state) => state.is_loading(),
        }
    }
}

/// Callback invoked whenever an overlay's state changes.
pub type OverlayListener = Box<dyn Fn(OverlayView<'_>) + Send>;

/// Pending request produced by a synchronizer operation.
pub type PendingOverlay = BoxFuture<'static, OverlayCompletion>;

/// Owns the canonical position and fans position changes out to enabled
/// overlays.
pub struct OverlaySynchronizer {
    position: Option<GeoPoint>,
    weather: OverlayFetcher<WeatherReading>,
    air_quality: OverlayFetcher<AirQualityReading>,
    solar: OverlayFetcher<SolarInsight>,
    listeners: Vec<(OverlayKind, OverlayListener)>,
}

impl OverlaySynchronizer {
    /// Builds a synchronizer with no position; only the `enabled` overlays
    /// fetch once a position arrives.
    pub fn new(sources: OverlaySources, enabled: &[OverlayKind]) -> Self {
        let on = |kind: OverlayKind| enabled.contains(&kind);
        Self {
            position: None,
            weather: OverlayFetcher::new(OverlayKind::Weather, sources.weather, on(OverlayKind::Weather)),
            air_quality: OverlayFetcher::new(
                OverlayKind::AirQuality,
                sources.air_quality,
                on(OverlayKind::AirQuality),
            ),
            solar: OverlayFetcher::new(OverlayKind::Solar, sources.solar, on(OverlayKind::Solar)),
            listeners: Vec::new(),
        }
    }

    /// Record a move and refetch every enabled overlay.
    ///
    /// Setting the position it already holds is a no-op.
    pub fn set_position(&mut self, position: GeoPoint) -> Vec<PendingOverlay> {
        if self.position == Some(position) {
            return Vec::new();
        }
        self.position = Some(position);
        let was_loading = OverlayKind::ALL.map(|kind| self.view(kind).is_loading());

        let pending = [
            self.weather
                .position_changed(position)
                .map(|future| future.map(OverlayCompletion::Weather).boxed()),
            self.air_quality
                .position_changed(position)
                .map(|future| future.map(OverlayCompletion::AirQuality).boxed()),
            self.solar
                .position_changed(position)
                .map(|future| future.map(OverlayCompletion::Solar).boxed()),
        ]
        .into_iter()
        .flatten()
        .collect();

        for (kind, was_loading) in OverlayKind::ALL.into_iter().zip(was_loading) {
            let view = self.view(kind);
            if view.is_enabled() || was_loading != view.is_loading() {
                self.notify(kind);
            }
        }
        pending
    }

    /// Switch one overlay on or off.
    pub fn set_enabled(&mut self, kind: OverlayKind, enabled: bool) -> Option<PendingOverlay> {
        let position = self.position;
        let pending = match kind {
            OverlayKind::Weather => self
                .weather
                .set_enabled(enabled, position)
                .map(|future| future.map(OverlayCompletion::Weather).boxed()),
            OverlayKind::AirQuality => self
                .air_quality
                .set_enabled(enabled, position)
                .map(|future| future.map(OverlayCompletion::AirQuality).boxed()),
            OverlayKind::Solar => self
                .solar
                .set_enabled(enabled, position)
                .map(|future| future.map(OverlayCompletion::Solar).boxed()),
        };
        self.notify(kind);
        pending
    }

    /// Route a response to its fetcher; returns whether it was applied.
    pub fn apply(&mut self, completion: OverlayCompletion) -> bool {
        let kind = completion.kind();
        let applied = match completion {
            OverlayCompletion::Weather(inner) => self.weather.apply(inner),
            OverlayCompletion::AirQuality(inner) => self.air_quality.apply(inner),
            OverlayCompletion::Solar(inner) => self.solar.apply(inner),
        };
        if applied {
            self.notify(kind);
        }
        applied
    }

    /// Register a listener for one overlay.
    pub fn on_overlay_update(&mut self, kind: OverlayKind, listener: OverlayListener) {
        self.listeners.push((kind, listener));
    }

    /// Canonical current position.
    pub fn position(&self) -> Option<GeoPoint> {
        self.position
    }

    /// Weather overlay state.
    pub fn weather(&self) -> &OverlayState<WeatherReading> {
        self.weather.state()
    }

    /// Air quality overlay state.
    pub fn air_quality(&self) -> &OverlayState<AirQualityReading> {
        self.air_quality.state()
    }

    /// Solar overlay state.
    pub fn solar(&self) -> &OverlayState<SolarInsight> {
        self.solar.state()
    }

    /// Borrowed state of any overlay.
    pub fn view(&self, kind: OverlayKind) -> OverlayView<'_> {
        match kind {
            OverlayKind::Weather => OverlayView::Weather(self.weather.state()),
            OverlayKind::AirQuality => OverlayView::AirQuality(self.air_quality.state()),
            OverlayKind::Solar => OverlayView::Solar(self.solar.state()),
        }
    }

    /// Swallowed failures for one overlay since start-up.
    pub fn failure_count(&self, kind: OverlayKind) -> u64 {
        match kind {
            OverlayKind::Weather => self.weather.failures(),
            OverlayKind::AirQuality => self.air_quality.failures(),
            OverlayKind::Solar => self.solar.failures(),
        }
    }

    fn notify(&self, kind: OverlayKind) {
        let view = self.view(kind);
        for (_, listener) in self.listeners.iter().filter(|(wanted, _)| *wanted == kind) {
            listener(view);
        }
    }
}
