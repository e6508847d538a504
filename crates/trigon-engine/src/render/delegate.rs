use crate::coords::ViewportSize;

use super::DrawableSurface;

/// Result of one render tick.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    /// Commands were submitted and the drawable presented.
    Presented,
    /// Submitted and presented with a zero-area viewport; no draw call.
    Degenerate,
    /// No drawable this tick; nothing submitted.
    Skipped,
    /// The core is not ready (never initialized, or initialization failed).
    NotReady,
    /// The surface can no longer produce drawables; stop rendering.
    Fatal,
}

impl FrameOutcome {
    /// Whether GPU work was submitted for this tick.
    #[inline]
    pub fn submitted(self) -> bool {
        matches!(self, FrameOutcome::Presented | FrameOutcome::Degenerate)
    }
}

/// Callbacks a view delivers to whatever renders into it.
///
/// Calls arrive serially from one thread; `&mut self` is the only
/// synchronization the implementor gets.
pub trait ViewDelegate {
    /// Drawable type the delegate can render into.
    type Drawable;

    /// The drawable size changed. Zero-sized input is valid.
    fn on_resize(&mut self, size: ViewportSize);

    /// Called once per display tick.
    fn on_render<S>(&mut self, surface: &mut S) -> FrameOutcome
    where
        S: DrawableSurface<Drawable = Self::Drawable>;
}
