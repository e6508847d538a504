//! GPU rendering core.
//!
//! [`RenderCore`] draws one fixed [`Geometry`] per frame into a
//! [`DrawableSurface`], driven through the [`ViewDelegate`] callbacks. GPU
//! access goes through [`GpuBackend`], implemented for wgpu by
//! [`crate::device::GpuContext`].
//!
//! Convention:
//! - CPU geometry is in pixels, origin at the viewport center, +Y up.
//! - The vertex shader converts to NDC using the viewport uniform.
//! - Binding numbers come from [`BufferIndex`] only.

mod backend;
mod delegate;
mod error;
mod geometry;
mod render_core;
mod shader;
mod shader_types;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{DrawCall, DrawableSurface, FrameEncoding, GpuBackend, PipelineDesc};
pub use delegate::{FrameOutcome, ViewDelegate};
pub use error::RenderError;
pub use geometry::{Geometry, QuadGrid};
pub use render_core::{check_pixel_format, CoreStatus, RenderConfig, RenderCore};
pub use shader::{DeclaredBinding, ShaderArtifact};
pub use shader_types::{BufferIndex, Vertex, ViewportUniform};
