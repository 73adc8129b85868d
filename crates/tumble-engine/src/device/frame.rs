/// One acquired swapchain image plus the encoder recording into it.
///
/// Hand it back to [`Gpu::submit`](super::Gpu::submit) within the frame;
/// while it is alive no further image can be acquired.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// What the frame loop should do after `get_current_texture` fails.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Lost/outdated: the surface was reconfigured, drop this frame.
    Reconfigured,
    /// Timeout or other transient failure; try again next frame.
    SkipFrame,
    /// Out of memory; the loop should quit.
    Fatal,
}
