//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the window, creates the GPU context and the
//! render core for it, and delivers resize and redraw events to the core.

mod runtime;

pub use runtime::{RenderSetup, Runtime, RuntimeConfig};
