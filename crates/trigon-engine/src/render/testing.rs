//! Test doubles for the render core (no GPU required).
//!
//! `RecordingBackend` keeps what would have been sent to the GPU;
//! `ScriptedSurface` hands out numbered drawables and can be told to fail.

use std::cell::{Cell, RefCell};

use crate::coords::ViewportSize;
use crate::device::SurfaceErrorAction;

use super::{
    DrawableSurface, FrameEncoding, GpuBackend, PipelineDesc, RenderError, ShaderArtifact, Vertex,
};

/// Valid WGSL around caller-supplied resource declarations.
///
/// Declares the `Vertex` and `ViewportUniform` structs and entry points that
/// do not touch any global, so `declarations` may omit or misnumber them.
pub fn shader_with_bindings(label: &'static str, declarations: &str) -> ShaderArtifact {
    let source = format!(
        "struct Vertex {{ position: vec2<f32>, color: vec4<f32> }}
         struct ViewportUniform {{ size: vec2<f32>, _pad: vec2<f32> }}

         {declarations}

         @vertex
         fn vs_main(@builtin(vertex_index) i: u32) -> @builtin(position) vec4<f32> {{
             return vec4<f32>(f32(i), 0.0, 0.0, 1.0);
         }}

         @fragment
         fn fs_main() -> @location(0) vec4<f32> {{
             return vec4<f32>(1.0);
         }}"
    );
    ShaderArtifact::from_wgsl(label, source)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPipeline {
    pub format: wgpu::TextureFormat,
    pub topology: wgpu::PrimitiveTopology,
    pub vertex_entry: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedResources {
    pub vertex_bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedFrame {
    pub target: u64,
    pub vertex_bytes: Vec<u8>,
    pub frame: FrameEncoding,
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    fail_pipeline: bool,
    pipelines: RefCell<Vec<RecordedPipeline>>,
    resources_created: Cell<usize>,
    submissions: RefCell<Vec<SubmittedFrame>>,
}

impl RecordingBackend {
    pub fn failing_pipeline() -> Self {
        Self {
            fail_pipeline: true,
            ..Self::default()
        }
    }

    pub fn pipelines(&self) -> Vec<RecordedPipeline> {
        self.pipelines.borrow().clone()
    }

    pub fn resources_created(&self) -> usize {
        self.resources_created.get()
    }

    pub fn submissions(&self) -> Vec<SubmittedFrame> {
        self.submissions.borrow().clone()
    }
}

impl GpuBackend for RecordingBackend {
    type Pipeline = RecordedPipeline;
    type Resources = RecordedResources;
    type Drawable = FakeDrawable;

    fn create_pipeline(&self, desc: &PipelineDesc<'_>) -> Result<Self::Pipeline, RenderError> {
        if self.fail_pipeline {
            return Err(RenderError::Pipeline {
                format: desc.format,
                reason: "scripted failure".to_string(),
            });
        }
        let pipeline = RecordedPipeline {
            format: desc.format,
            topology: desc.topology,
            vertex_entry: desc.shader.vertex_entry,
        };
        self.pipelines.borrow_mut().push(pipeline.clone());
        Ok(pipeline)
    }

    fn create_resources(
        &self,
        _pipeline: &Self::Pipeline,
        vertices: &[Vertex],
    ) -> Result<Self::Resources, RenderError> {
        self.resources_created.set(self.resources_created.get() + 1);
        Ok(RecordedResources {
            vertex_bytes: bytemuck::cast_slice(vertices).to_vec(),
        })
    }

    fn submit(
        &self,
        _pipeline: &Self::Pipeline,
        resources: &Self::Resources,
        target: &Self::Drawable,
        frame: &FrameEncoding,
    ) {
        self.submissions.borrow_mut().push(SubmittedFrame {
            target: target.id,
            vertex_bytes: resources.vertex_bytes.clone(),
            frame: frame.clone(),
        });
    }
}

#[derive(Debug)]
pub struct FakeDrawable {
    pub id: u64,
}

#[derive(Debug)]
pub struct ScriptedSurface {
    format: wgpu::TextureFormat,
    size: ViewportSize,
    next_failure: Option<SurfaceErrorAction>,
    acquired: u64,
    presented: Vec<u64>,
}

impl ScriptedSurface {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;

    pub fn new(size: ViewportSize) -> Self {
        Self {
            format: Self::FORMAT,
            size,
            next_failure: None,
            acquired: 0,
            presented: Vec::new(),
        }
    }

    pub fn with_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.format = format;
        self
    }

    /// Makes the next acquisition fail with `action`.
    pub fn fail_next(&mut self, action: SurfaceErrorAction) {
        self.next_failure = Some(action);
    }

    pub fn acquired(&self) -> u64 {
        self.acquired
    }

    pub fn presented(&self) -> &[u64] {
        &self.presented
    }
}

impl DrawableSurface for ScriptedSurface {
    type Drawable = FakeDrawable;

    fn pixel_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    fn drawable_size(&self) -> ViewportSize {
        self.size
    }

    fn next_drawable(&mut self) -> Result<FakeDrawable, SurfaceErrorAction> {
        if let Some(action) = self.next_failure.take() {
            return Err(action);
        }
        self.acquired += 1;
        Ok(FakeDrawable { id: self.acquired })
    }

    fn present(&mut self, drawable: FakeDrawable) {
        self.presented.push(drawable.id);
    }
}
