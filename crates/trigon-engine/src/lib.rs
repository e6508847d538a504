//! Trigon engine crate.
//!
//! A minimal 2D render core: uploads a fixed vertex set once, then draws it
//! into a window surface every display tick, tracking the viewport size.

pub mod coords;
pub mod device;
pub mod logging;
pub mod render;
pub mod window;
