//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod drawing_surface;
mod overlay_source;
mod poi_source;

#[cfg(test)]
pub use drawing_surface::MockDrawingSurface;
pub use drawing_surface::{DrawingSurface, HeadlessDrawingSurface};
pub use overlay_source::{FixtureOverlaySource, OverlaySource, OverlaySourceError};
#[cfg(test)]
pub use poi_source::MockPoiSource;
pub use poi_source::{FixturePoiSource, NearbySearchRequest, PoiSource, PoiSourceError};
