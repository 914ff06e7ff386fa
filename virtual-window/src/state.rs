use crate::Window;

/// Real and virtual scroll positions plus the ratio between them.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub real_offset: f64,
    pub virtual_offset: f64,
    /// `virtual_total / min(virtual_total, platform_max)`, never below `1`.
    pub ratio: f64,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            real_offset: 0.0,
            virtual_offset: 0.0,
            ratio: 1.0,
        }
    }
}

/// A combined snapshot of viewport, scroll position and window.
///
/// Useful for restoring a list across frames or sessions without coupling the engine to a UI
/// framework. The window is informational; restoring recomputes it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameState {
    pub container_extent: Option<f64>,
    pub scroll: ScrollState,
    pub window: Window,
}
