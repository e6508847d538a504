use super::BufferIndex;

/// Fatal setup errors.
///
/// Any of these leaves the render core unable to produce a frame. Per-frame
/// surface problems are not errors; see [`crate::device::SurfaceErrorAction`].
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create wgpu surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create wgpu device/queue: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    #[error("geometry has no vertices")]
    EmptyGeometry,

    #[error("geometry has {0} vertices, more than a single draw call can address")]
    GeometryTooLarge(usize),

    #[error("pixel format {0:?} cannot be used as a color render target")]
    UnsupportedPixelFormat(wgpu::TextureFormat),

    #[error("shader `{label}` is not valid WGSL:\n{reason}")]
    InvalidShader { label: &'static str, reason: String },

    #[error("shader has no {stage:?} entry point named `{name}`")]
    MissingEntryPoint {
        name: &'static str,
        stage: wgpu::naga::ShaderStage,
    },

    #[error("shader does not declare `{name}` for slot {slot:?}")]
    MissingBinding { slot: BufferIndex, name: &'static str },

    #[error(
        "shader binds `{name}` at @group({found_group}) @binding({found}), expected @group(0) @binding({expected})"
    )]
    BindingMismatch {
        name: &'static str,
        expected: u32,
        found_group: u32,
        found: u32,
    },

    #[error("shader declares `{name}` in address space `{found}`, expected `{expected}`")]
    BindingKind {
        name: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("failed to create GPU buffers: {0}")]
    Resources(String),

    #[error("pipeline creation failed for {format:?}: {reason}")]
    Pipeline {
        format: wgpu::TextureFormat,
        reason: String,
    },

    #[error("render core is already initialized")]
    AlreadyInitialized,

    #[error("render core failed to initialize and is unusable")]
    Unusable,
}
