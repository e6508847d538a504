use crate::coords::ViewportSize;

/// Drawable for one frame of a [`super::WindowSurface`].
///
/// Short-lived: holding it blocks acquisition of the next frame. Presented by
/// handing it back to the surface after submission.
pub struct SurfaceFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

impl SurfaceFrame {
    /// Size of the backing texture, which lags a resize until the surface is reconfigured.
    pub fn extent(&self) -> ViewportSize {
        let texture = &self.surface_texture.texture;
        ViewportSize::new(texture.width(), texture.height())
    }
}
