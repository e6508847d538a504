use winit::dpi::PhysicalSize;

/// Viewport size in physical pixels.
///
/// Written by resize notifications, read once per rendered frame. A zero
/// width or height is a valid, degenerate viewport: frames still present but
/// nothing is drawn.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` when the viewport covers no pixels.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the size as the `[width, height]` float pair the shader expects.
    #[inline]
    pub fn to_f32(self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

impl From<PhysicalSize<u32>> for ViewportSize {
    #[inline]
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}
