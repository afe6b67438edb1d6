//! Driven port for the map widget's rectangle-drawing capability.

/// Map surface able to enter and leave rectangle-drawing mode.
///
/// The widget reports completed rectangles by calling
/// [`crate::domain::ExplorerEngine::complete_rectangle`].
#[cfg_attr(test, mockall::automock)]
pub trait DrawingSurface: Send + Sync {
    /// Whether the map has finished loading and can draw.
    fn is_ready(&self) -> bool;

    /// Enter (`true`) or leave (`false`) rectangle-drawing mode.
    fn set_rectangle_mode(&self, enabled: bool);
}

/// Surface that is always ready and ignores mode changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessDrawingSurface;

impl DrawingSurface for HeadlessDrawingSurface {
    fn is_ready(&self) -> bool {
        true
    }

    fn set_rectangle_mode(&self, _enabled: bool) {}
}
