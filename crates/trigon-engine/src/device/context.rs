use std::num::NonZeroU64;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::coords::ViewportSize;
use crate::render::{
    BufferIndex, FrameEncoding, GpuBackend, PipelineDesc, RenderError, Vertex, ViewportUniform,
};

use super::surface::{choose_alpha_mode, choose_surface_format};
use super::{GpuInit, SurfaceFrame, WindowSurface};

/// Owns the wgpu core objects.
///
/// This is the render core's GPU backend:
/// - creates and stores Instance/Adapter/Device/Queue
/// - compiles the pipeline and allocates the vertex/viewport buffers
/// - records and submits one render pass per frame
///
/// Dropping it releases the device and queue.
pub struct GpuContext {
    /// wgpu instance used to create the adapter and surface.
    _instance: wgpu::Instance,

    /// Selected adapter.
    _adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,
}

/// Compiled pipeline plus the layout its bind group must follow.
pub struct PipelineState {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

/// Per-core GPU buffers, bound at their [`BufferIndex`] slots.
pub struct GpuResources {
    _vertex_buffer: wgpu::Buffer,
    viewport_ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuContext {
    /// Acquires a device able to present to `window` and configures its surface.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn for_window<'w>(
        window: &'w Window,
        init: GpuInit,
    ) -> Result<(Self, WindowSurface<'w>), RenderError> {
        let size = window.inner_size();

        let GpuInit {
            prefer_srgb,
            power_preference,
            present_mode,
            alpha_mode,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let info = adapter.get_info();
        log::info!("using adapter `{}` ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("trigon device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format =
            choose_surface_format(&caps.formats, prefer_srgb).ok_or(RenderError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: choose_alpha_mode(&caps.alpha_modes, alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency,
        };

        let window_surface = WindowSurface::new(window, surface, device.clone(), config, size);

        let ctx = Self {
            _instance: instance,
            _adapter: adapter,
            device,
            queue,
        };
        Ok((ctx, window_surface))
    }

    /// Records one frame into `view` and submits it.
    ///
    /// `extent` is the size of the texture behind `view`. Both the viewport
    /// uniform and `set_viewport` use the part of `frame.viewport` that fits
    /// inside it, so geometry is never stretched while the texture lags a resize.
    fn encode_and_submit(
        &self,
        pipeline: &PipelineState,
        resources: &GpuResources,
        view: &wgpu::TextureView,
        extent: ViewportSize,
        frame: &FrameEncoding,
    ) {
        let region = draw_region(frame.viewport, extent);
        let uniform = ViewportUniform::from(region);
        self.queue
            .write_buffer(&resources.viewport_ubo, 0, bytemuck::bytes_of(&uniform));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("trigon frame encoder"),
            });

        // Render pass is dropped before the encoder is finished.
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("trigon pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.clear_color.into()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(draw) = &frame.draw {
                if !region.is_empty() {
                    rpass.set_viewport(0.0, 0.0, region.width as f32, region.height as f32, 0.0, 1.0);
                    rpass.set_pipeline(&pipeline.pipeline);
                    rpass.set_bind_group(0, &resources.bind_group, &[]);
                    rpass.draw(draw.vertices.clone(), 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl GpuBackend for GpuContext {
    type Pipeline = PipelineState;
    type Resources = GpuResources;
    type Drawable = SurfaceFrame;

    fn create_pipeline(&self, desc: &PipelineDesc<'_>) -> Result<PipelineState, RenderError> {
        let shader = desc.shader;

        // Validation errors land here instead of the device's uncaptured-error handler.
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.label),
            source: wgpu::ShaderSource::Wgsl(shader.source.clone()),
        });

        let bind_group_layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("trigon bgl"),
                entries: &binding_layout_entries(),
            });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("trigon pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("trigon pipeline"),
                layout: Some(&pipeline_layout),

                // Vertices are pulled from the storage buffer by index; no vertex buffers.
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some(shader.vertex_entry),
                    compilation_options: Default::default(),
                    buffers: &[],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some(shader.fragment_entry),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: desc.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: desc.topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(RenderError::Pipeline {
                format: desc.format,
                reason: err.to_string(),
            });
        }

        log::debug!(
            "compiled `{}` for {:?} ({:?})",
            shader.label,
            desc.format,
            desc.topology
        );

        Ok(PipelineState {
            pipeline,
            bind_group_layout,
        })
    }

    fn create_resources(
        &self,
        pipeline: &PipelineState,
        vertices: &[Vertex],
    ) -> Result<GpuResources, RenderError> {
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("trigon vertex storage"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::STORAGE,
            });

        let viewport_ubo = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("trigon viewport ubo"),
            size: ViewportUniform::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("trigon bind group"),
            layout: &pipeline.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: BufferIndex::Vertices.binding(),
                    resource: vertex_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: BufferIndex::ViewportSize.binding(),
                    resource: viewport_ubo.as_entire_binding(),
                },
            ],
        });

        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(RenderError::Resources(err.to_string()));
        }

        log::debug!(
            "uploaded {} vertices ({} bytes)",
            vertices.len(),
            std::mem::size_of_val(vertices)
        );

        Ok(GpuResources {
            _vertex_buffer: vertex_buffer,
            viewport_ubo,
            bind_group,
        })
    }

    fn submit(
        &self,
        pipeline: &PipelineState,
        resources: &GpuResources,
        target: &SurfaceFrame,
        frame: &FrameEncoding,
    ) {
        self.encode_and_submit(pipeline, resources, &target.view, target.extent(), frame);
    }
}

/// Bind group 0 layout: one entry per [`BufferIndex`] slot, both read by the vertex stage.
pub(crate) fn binding_layout_entries() -> [wgpu::BindGroupLayoutEntry; 2] {
    [
        wgpu::BindGroupLayoutEntry {
            binding: BufferIndex::Vertices.binding(),
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(Vertex::STRIDE),
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: BufferIndex::ViewportSize.binding(),
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(ViewportUniform::SIZE),
            },
            count: None,
        },
    ]
}

/// Part of the viewport that fits inside the drawable texture.
///
/// The texture lags a resize until the surface is reconfigured, and wgpu
/// rejects viewports extending past the attachment.
pub(crate) fn draw_region(viewport: ViewportSize, extent: ViewportSize) -> ViewportSize {
    ViewportSize::new(
        viewport.width.min(extent.width),
        viewport.height.min(extent.height),
    )
}
