//! Per-overlay fetch state with stale-while-revalidate semantics.

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::Serialize;
use tracing::{debug, warn};

use super::OverlayKind;
use crate::domain::GeoPoint;
use crate::domain::ports::{OverlaySource, OverlaySourceError};

/// Render-facing view of one overlay.
///
/// While `loading` is set, `data` still holds the previous successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayState<T> {
    data: Option<T>,
    loading: bool,
    enabled: bool,
    fetched_for: Option<GeoPoint>,
}

impl<T> OverlayState<T> {
    fn new(enabled: bool) -> Self {
        Self {
            data: None,
            loading: false,
            enabled,
            fetched_for: None,
        }
    }

    /// Last successfully fetched data.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Whether a request for the current position is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the overlay is switched on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Position the data was fetched for.
    pub fn fetched_for(&self) -> Option<GeoPoint> {
        self.fetched_for
    }

    /// Data to draw: nothing while the overlay is switched off.
    pub fn renderable(&self) -> Option<&T> {
        self.data.as_ref().filter(|_| self.enabled)
    }
}

/// Response of one overlay request, tagged for supersession checks.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCompletion<T> {
    /// Generation the request was issued under.
    pub generation: u64,
    /// Position the request was issued for.
    pub position: GeoPoint,
    /// Normalized provider answer.
    pub result: Result<Option<T>, OverlaySourceError>,
}

/// Owns one overlay's state, source and generation counter.
pub(crate) struct OverlayFetcher<T: Send + 'static> {
    kind: OverlayKind,
    source: Arc<dyn OverlaySource<T>>,
    state: OverlayState<T>,
    generation: u64,
    pending_for: Option<GeoPoint>,
    failures: u64,
}

impl<T: Send + 'static> OverlayFetcher<T> {
    pub(crate) fn new(kind: OverlayKind, source: Arc<dyn OverlaySource<T>>, enabled: bool) -> Self {
        Self {
            kind,
            source,
            state: OverlayState::new(enabled),
            generation: 0,
            pending_for: None,
            failures: 0,
        }
    }

    pub(crate) fn state(&self) -> &OverlayState<T> {
        &self.state
    }

    pub(crate) fn failures(&self) -> u64 {
        self.failures
    }

    /// Invalidate outstanding requests and refetch when enabled.
    pub(crate) fn position_changed(
        &mut self,
        position: GeoPoint,
    ) -> Option<BoxFuture<'static, FetchCompletion<T>>> {
        self.generation += 1;
        self.pending_for = None;
        if self.state.enabled {
            Some(self.issue(position))
        } else {
            self.state.loading = false;
            None
        }
    }

    /// Switch the overlay; enabling fetches unless the cache or an in-flight
    /// request already covers `position`.
    pub(crate) fn set_enabled(
        &mut self,
        enabled: bool,
        position: Option<GeoPoint>,
    ) -> Option<BoxFuture<'static, FetchCompletion<T>>> {
        if self.state.enabled == enabled {
            return None;
        }
        self.state.enabled = enabled;
        if !enabled {
            return None;
        }

        let position = position?;
        let covered = self.state.fetched_for == Some(position) || self.pending_for == Some(position);
        if covered {
            return None;
        }
        self.generation += 1;
        Some(self.issue(position))
    }

    /// Apply a response; returns whether it matched the current generation.
    pub(crate) fn apply(&mut self, completion: FetchCompletion<T>) -> bool {
        if completion.generation != self.generation {
            debug!(
                kind = %self.kind,
                generation = completion.generation,
                current = self.generation,
                "dropping superseded overlay response"
            );
            return false;
        }

        self.state.loading = false;
        self.pending_for = None;
        match completion.result {
            Ok(Some(data)) => {
                self.state.data = Some(data);
                self.state.fetched_for = Some(completion.position);
            }
            Ok(None) => {
                debug!(kind = %self.kind, "provider had no data for position; keeping previous");
            }
            Err(error) => {
                self.failures += 1;
                warn!(
                    kind = %self.kind,
                    error_kind = error.kind(),
                    %error,
                    failures = self.failures,
                    "overlay fetch failed; keeping previous data"
                );
            }
        }
        true
    }

    fn issue(&mut self, position: GeoPoint) -> BoxFuture<'static, FetchCompletion<T>> {
        self.state.loading = true;
        self.pending_for = Some(position);
        let generation = self.generation;
        let source = Arc::clone(&self.source);
        async move {
            let result = source.fetch(position).await;
            FetchCompletion {
                generation,
                position,
                result,
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    //! Generation and cache rules for a single overlay.

    use super::*;
    use crate::test_support::{ScriptedOverlaySource, point};

    fn fetcher(enabled: bool) -> OverlayFetcher<u32> {
        OverlayFetcher::new(
            OverlayKind::Weather,
            Arc::new(ScriptedOverlaySource::<u32>::always(Ok(Some(7)))),
            enabled,
        )
    }

    #[tokio::test]
    async fn loading_keeps_previous_data_until_the_response_lands() {
        let mut fetcher = fetcher(true);
        let first = fetcher.position_changed(point(1.0, 1.0)).expect("enabled fetch");
        assert!(fetcher.apply(first.await));
        assert_eq!(fetcher.state().data(), Some(&7));

        let second = fetcher.position_changed(point(2.0, 2.0)).expect("enabled fetch");
        assert!(fetcher.state().is_loading());
        assert_eq!(fetcher.state().data(), Some(&7));
        assert_eq!(fetcher.state().fetched_for(), Some(point(1.0, 1.0)));

        assert!(fetcher.apply(second.await));
        assert!(!fetcher.state().is_loading());
        assert_eq!(fetcher.state().fetched_for(), Some(point(2.0, 2.0)));
    }

    #[tokio::test]
    async fn superseded_response_is_dropped() {
        let mut fetcher = fetcher(true);
        let stale = fetcher.position_changed(point(1.0, 1.0)).expect("enabled fetch");
        let fresh = fetcher.position_changed(point(2.0, 2.0)).expect("enabled fetch");

        assert!(!fetcher.apply(stale.await));
        assert!(fetcher.state().is_loading());
        assert!(fetcher.apply(fresh.await));
        assert_eq!(fetcher.state().fetched_for(), Some(point(2.0, 2.0)));
    }

    #[test]
    fn failures_clear_loading_and_keep_data() {
        let mut fetcher = fetcher(true);
        let _pending = fetcher.position_changed(point(1.0, 1.0));
        let applied = fetcher.apply(FetchCompletion {
            generation: 1,
            position: point(1.0, 1.0),
            result: Err(OverlaySourceError::transport("connection reset")),
        });

        assert!(applied);
        assert!(!fetcher.state().is_loading());
        assert!(fetcher.state().data().is_none());
        assert_eq!(fetcher.failures(), 1);
    }

    #[test]
    fn disabled_overlay_does_not_fetch_on_move() {
        let mut fetcher = fetcher(false);
        assert!(fetcher.position_changed(point(1.0, 1.0)).is_none());
        assert!(!fetcher.state().is_loading());
        assert!(fetcher.set_enabled(true, Some(point(1.0, 1.0))).is_some());
    }
}
