use crate::coords::{ColorRgba, ViewportSize};
use crate::device::SurfaceErrorAction;

use super::{
    DrawCall, DrawableSurface, FrameEncoding, FrameOutcome, Geometry, GpuBackend, PipelineDesc,
    RenderError, ShaderArtifact, ViewDelegate,
};

/// Render core configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Color the drawable is cleared to before the draw call.
    pub clear_color: ColorRgba,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: ColorRgba::black(),
        }
    }
}

/// Lifecycle state as seen from outside the core.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CoreStatus {
    Uninitialized,
    Ready,
    /// Initialization failed; the core never renders.
    Failed,
}

enum CoreState<B: GpuBackend> {
    Uninitialized,
    Ready {
        pipeline: B::Pipeline,
        resources: B::Resources,
        vertex_count: u32,
    },
    Failed,
}

/// Draws one fixed vertex list into a surface every frame.
///
/// The core owns the GPU backend, the compiled pipeline and the vertex and
/// viewport buffers. It is the only writer of GPU state and of the stored
/// viewport:
/// - [`initialize`](Self::initialize) compiles the pipeline and uploads geometry once
/// - [`ViewDelegate::on_resize`] replaces the viewport, no GPU work
/// - [`ViewDelegate::on_render`] binds both slots, draws, submits and presents
pub struct RenderCore<B: GpuBackend> {
    backend: B,
    shader: ShaderArtifact,
    geometry: Geometry,
    config: RenderConfig,

    viewport: ViewportSize,
    state: CoreState<B>,

    frames_submitted: u64,
    warned_not_ready: bool,
}

impl<B: GpuBackend> RenderCore<B> {
    /// Creates an uninitialized core using the bundled shader.
    pub fn new(backend: B, geometry: Geometry) -> Self {
        Self {
            backend,
            shader: ShaderArtifact::vertex_color(),
            geometry,
            config: RenderConfig::default(),
            viewport: ViewportSize::default(),
            state: CoreState::Uninitialized,
            frames_submitted: 0,
            warned_not_ready: false,
        }
    }

    pub fn with_shader(mut self, shader: ShaderArtifact) -> Self {
        self.shader = shader;
        self
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the pipeline for the surface's pixel format, uploads the
    /// geometry and adopts the surface's current size.
    ///
    /// On failure the core moves to [`CoreStatus::Failed`] and stays there.
    pub fn initialize<S>(&mut self, surface: &S) -> Result<(), RenderError>
    where
        S: DrawableSurface<Drawable = B::Drawable>,
    {
        match self.state {
            CoreState::Uninitialized => {}
            CoreState::Ready { .. } => return Err(RenderError::AlreadyInitialized),
            CoreState::Failed => return Err(RenderError::Unusable),
        }

        let format = surface.pixel_format();
        match self.build(format) {
            Ok((pipeline, resources, vertex_count)) => {
                self.viewport = surface.drawable_size();
                self.state = CoreState::Ready {
                    pipeline,
                    resources,
                    vertex_count,
                };
                log::info!(
                    "render core ready: {} vertices ({:?}), format {:?}, viewport {}x{}",
                    self.geometry.vertex_count(),
                    self.geometry.topology(),
                    format,
                    self.viewport.width,
                    self.viewport.height,
                );
                Ok(())
            }
            Err(err) => {
                log::error!("render core initialization failed: {err}");
                self.state = CoreState::Failed;
                Err(err)
            }
        }
    }

    fn build(
        &self,
        format: wgpu::TextureFormat,
    ) -> Result<(B::Pipeline, B::Resources, u32), RenderError> {
        let vertex_count = draw_vertex_count(self.geometry.vertex_count())?;
        check_pixel_format(format)?;
        self.shader.check_interface()?;

        let pipeline = self.backend.create_pipeline(&PipelineDesc {
            shader: &self.shader,
            format,
            topology: self.geometry.topology(),
        })?;
        let resources = self
            .backend
            .create_resources(&pipeline, self.geometry.vertices())?;

        Ok((pipeline, resources, vertex_count))
    }

    fn encode_frame(&self, vertex_count: u32) -> FrameEncoding {
        let draw = (!self.viewport.is_empty()).then(|| DrawCall {
            topology: self.geometry.topology(),
            vertices: 0..vertex_count,
        });

        FrameEncoding {
            viewport: self.viewport,
            clear_color: self.config.clear_color,
            draw,
        }
    }

    pub fn status(&self) -> CoreStatus {
        match self.state {
            CoreState::Uninitialized => CoreStatus::Uninitialized,
            CoreState::Ready { .. } => CoreStatus::Ready,
            CoreState::Failed => CoreStatus::Failed,
        }
    }

    /// Viewport the next frame will upload.
    #[inline]
    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[inline]
    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: GpuBackend> ViewDelegate for RenderCore<B> {
    type Drawable = B::Drawable;

    fn on_resize(&mut self, size: ViewportSize) {
        log::debug!("viewport resized to {}x{}", size.width, size.height);
        self.viewport = size;
    }

    fn on_render<S>(&mut self, surface: &mut S) -> FrameOutcome
    where
        S: DrawableSurface<Drawable = Self::Drawable>,
    {
        let CoreState::Ready {
            pipeline,
            resources,
            vertex_count,
        } = &self.state
        else {
            if !self.warned_not_ready {
                log::debug!("render requested before the core is ready; ignored");
                self.warned_not_ready = true;
            }
            return FrameOutcome::NotReady;
        };

        let drawable = match surface.next_drawable() {
            Ok(d) => d,
            Err(SurfaceErrorAction::Fatal) => {
                log::error!("surface can no longer provide drawables");
                return FrameOutcome::Fatal;
            }
            Err(action) => {
                log::debug!("no drawable this frame ({action:?}); skipped");
                return FrameOutcome::Skipped;
            }
        };

        let frame = self.encode_frame(*vertex_count);
        self.backend.submit(pipeline, resources, &drawable, &frame);
        surface.present(drawable);

        self.frames_submitted += 1;
        log::trace!(
            "frame {} submitted, viewport {}x{}",
            self.frames_submitted,
            frame.viewport.width,
            frame.viewport.height,
        );

        if frame.draw.is_some() {
            FrameOutcome::Presented
        } else {
            FrameOutcome::Degenerate
        }
    }
}

/// Rejects formats that cannot take the fragment stage's `vec4<f32>` output:
/// depth/stencil, non-renderable and integer formats.
pub fn check_pixel_format(format: wgpu::TextureFormat) -> Result<(), RenderError> {
    let features = format.guaranteed_format_features(wgpu::Features::empty());
    let float_target = matches!(
        format.sample_type(None, None),
        Some(wgpu::TextureSampleType::Float { .. })
    );
    if format.is_depth_stencil_format()
        || !float_target
        || !features
            .allowed_usages
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
    {
        return Err(RenderError::UnsupportedPixelFormat(format));
    }
    Ok(())
}

/// Vertex count of a single draw call, which wgpu addresses with `u32`.
fn draw_vertex_count(len: usize) -> Result<u32, RenderError> {
    match u32::try_from(len) {
        Ok(0) => Err(RenderError::EmptyGeometry),
        Ok(count) => Ok(count),
        Err(_) => Err(RenderError::GeometryTooLarge(len)),
    }
}
