//! Coordinate and color value types shared by the render core and geometry builders.
//!
//! Canonical CPU space for vertex positions:
//! - physical pixels
//! - origin at the center of the viewport
//! - +X right, +Y up
//!
//! The vertex shader converts to NDC by dividing by half the viewport size.

mod color;
mod vec2;
mod viewport;

pub use color::ColorRgba;
pub use vec2::Vec2;
pub use viewport::ViewportSize;
