use std::ops::Range;

use crate::coords::{ColorRgba, ViewportSize};
use crate::device::SurfaceErrorAction;

use super::{RenderError, ShaderArtifact, Vertex};

/// Inputs needed to compile the pipeline state.
#[derive(Debug, Clone, Copy)]
pub struct PipelineDesc<'a> {
    pub shader: &'a ShaderArtifact,
    pub format: wgpu::TextureFormat,
    pub topology: wgpu::PrimitiveTopology,
}

/// One draw call over a contiguous range of the vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub topology: wgpu::PrimitiveTopology,
    pub vertices: Range<u32>,
}

/// Backend-neutral description of everything recorded for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameEncoding {
    /// Value written to the `ViewportSize` slot.
    pub viewport: ViewportSize,
    pub clear_color: ColorRgba,
    /// `None` when the viewport is degenerate: the frame is cleared and
    /// presented but nothing is drawn.
    pub draw: Option<DrawCall>,
}

/// GPU operations the render core is written against.
///
/// Implemented by [`crate::device::GpuContext`] for wgpu. The core owns its
/// backend; dropping the core releases the device and queue.
pub trait GpuBackend {
    /// Compiled pipeline for one pixel format.
    type Pipeline;
    /// Vertex storage buffer, viewport uniform and the bind group over both.
    type Resources;
    /// Render target handed out by the matching [`DrawableSurface`].
    type Drawable;

    fn create_pipeline(&self, desc: &PipelineDesc<'_>) -> Result<Self::Pipeline, RenderError>;

    /// Allocates the vertex buffer filled from `vertices` and the viewport
    /// uniform, bound at their [`super::BufferIndex`] slots.
    fn create_resources(
        &self,
        pipeline: &Self::Pipeline,
        vertices: &[Vertex],
    ) -> Result<Self::Resources, RenderError>;

    /// Uploads the viewport, records `frame` into `target` and submits it.
    ///
    /// Returns without waiting for the GPU.
    fn submit(
        &self,
        pipeline: &Self::Pipeline,
        resources: &Self::Resources,
        target: &Self::Drawable,
        frame: &FrameEncoding,
    );
}

/// The view/surface side of the render core.
pub trait DrawableSurface {
    type Drawable;

    /// Pixel format of the drawables this surface hands out.
    fn pixel_format(&self) -> wgpu::TextureFormat;

    /// Current drawable size in physical pixels.
    fn drawable_size(&self) -> ViewportSize;

    /// Acquires the target for this frame.
    ///
    /// `Err(SkipFrame | Reconfigured)` means no drawable is available this
    /// tick; `Err(Fatal)` means no drawable will ever be available again.
    fn next_drawable(&mut self) -> Result<Self::Drawable, SurfaceErrorAction>;

    /// Schedules presentation of a drawable whose commands were submitted.
    fn present(&mut self, drawable: Self::Drawable);
}
