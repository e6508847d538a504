use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::coords::ViewportSize;
use crate::render::DrawableSurface;

use super::{SurfaceErrorAction, SurfaceFrame};

/// Swapchain surface bound to a window.
///
/// Implements [`DrawableSurface`] for the render core. Surface lifetime is
/// tied to the window via `'w`.
pub struct WindowSurface<'w> {
    window: &'w Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels. May be zero while minimized.
    size: PhysicalSize<u32>,
}

impl<'w> WindowSurface<'w> {
    pub(crate) fn new(
        window: &'w Window,
        surface: wgpu::Surface<'w>,
        device: wgpu::Device,
        config: wgpu::SurfaceConfiguration,
        size: PhysicalSize<u32>,
    ) -> Self {
        surface.configure(&device, &config);
        Self {
            window,
            surface,
            device,
            config,
            size,
        }
    }

    /// Reconfigures the surface after a resize.
    ///
    /// wgpu does not support configuring a surface with a 0x0 size; in that case,
    /// only internal state is updated and configuration is deferred.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn handle_surface_error(&self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        let action = classify_surface_error(&err);
        if action == SurfaceErrorAction::Reconfigured && self.size.width > 0 && self.size.height > 0 {
            self.surface.configure(&self.device, &self.config);
        }
        log::debug!("surface error {err:?} -> {action:?}");
        action
    }
}

impl DrawableSurface for WindowSurface<'_> {
    type Drawable = SurfaceFrame;

    fn pixel_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn drawable_size(&self) -> ViewportSize {
        self.size.into()
    }

    fn next_drawable(&mut self) -> Result<SurfaceFrame, SurfaceErrorAction> {
        let surface_texture = self
            .surface
            .get_current_texture()
            .map_err(|err| self.handle_surface_error(err))?;

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Ok(SurfaceFrame {
            surface_texture,
            view,
        })
    }

    fn present(&mut self, frame: SurfaceFrame) {
        let SurfaceFrame {
            surface_texture,
            view,
        } = frame;
        drop(view);
        self.window.pre_present_notify();
        surface_texture.present();
    }
}

/// Maps an acquisition failure to the action the render loop should take.
pub(crate) fn classify_surface_error(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = preferred.into_iter().find(|f| formats.contains(f)) {
            return Some(f);
        }
    }

    formats.first().copied()
}

pub(crate) fn choose_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| supported.contains(m))
        .or_else(|| supported.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}
