//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue ([`GpuContext`])
//! - creating & configuring the window Surface ([`WindowSurface`])
//! - compiling the render pipeline and encoding frames for the render core

mod context;
mod error;
mod frame;
mod init;
mod surface;

pub use context::{GpuContext, GpuResources, PipelineState};
pub use error::SurfaceErrorAction;
pub use frame::SurfaceFrame;
pub use init::GpuInit;
pub use surface::WindowSurface;
