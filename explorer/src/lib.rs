//! Area discovery and environmental overlay engine.
//!
//! A drawn rectangle fans out into concurrent per-category place lookups that
//! merge into one published result. Weather, air quality and solar overlays
//! follow a single current position, with stale responses dropped.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
