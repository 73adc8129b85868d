//! Tumble engine crate.
//!
//! Platform + GPU runtime for a single-window model viewer: device setup,
//! the winit event loop, input, timing, the mesh renderer, and frame capture.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod capture;
