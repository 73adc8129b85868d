//! GPU device + surface management.
//!
//! Creates the wgpu device for the viewer window, configures the swapchain
//! (optionally copyable for frame capture), and hands out one frame at a time.

mod context;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use frame::{GpuFrame, SurfaceErrorAction};
pub use init::GpuInit;
