//! Small value types shared by the device, renderer, and capture layers.
//!
//! Sizes are physical pixels; colors are linear `[0, 1]` floats.

mod color;
mod viewport;

pub use color::ColorRgba;
pub use viewport::Viewport;
