use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::coords::Viewport;

use super::{GpuFrame, GpuInit, SurfaceErrorAction};
use super::surface;

/// The viewer's GPU: device, queue, and the window's configured surface.
///
/// Borrows the window for `'w`; the runtime keeps both in one
/// self-referencing entry so the surface never outlives its window.
pub struct Gpu<'w> {
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    /// Last window size, capped at the device's texture limit; may be 0x0
    /// while minimized.
    size: PhysicalSize<u32>,

    /// Whether surface textures carry `COPY_SRC`.
    readback: bool,
}

impl<'w> Gpu<'w> {
    /// Picks an adapter compatible with `window` and configures its surface.
    ///
    /// Requested readback and present modes are downgraded with a warning when
    /// the surface cannot honour them. A window larger than the device's
    /// texture limit is rendered at the limit.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let GpuInit {
            prefer_srgb,
            present_mode,
            alpha_mode,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
            readback,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("adapter:  {} ({:?}, vendor 0x{:04x})", info.name, info.device_type, info.vendor);
        log::info!("backend:  {:?}", info.backend);
        log::info!("driver:   {} {}", info.driver, info.driver_info);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("tumble device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let size = surface::clamp_to_limit(size, device.limits().max_texture_dimension_2d);

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&surface_caps, prefer_srgb)
            .context("no supported surface formats")?;

        let alpha_mode = surface::choose_alpha_mode(&surface_caps, alpha_mode);

        let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
        let readback = if !readback {
            false
        } else if surface_caps.usages.contains(wgpu::TextureUsages::COPY_SRC) {
            usage |= wgpu::TextureUsages::COPY_SRC;
            true
        } else {
            log::warn!("surface does not support COPY_SRC; frame capture is unavailable");
            false
        };

        let present_mode = if surface_caps.present_modes.contains(&present_mode)
            || matches!(
                present_mode,
                wgpu::PresentMode::AutoVsync | wgpu::PresentMode::AutoNoVsync
            )
        {
            present_mode
        } else {
            log::warn!("present mode {present_mode:?} unsupported; using Fifo");
            wgpu::PresentMode::Fifo
        };

        let config = wgpu::SurfaceConfiguration {
            usage,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);
        log::debug!("surface configured: {format:?} {}x{} {present_mode:?}", size.width, size.height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            readback,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Drawable area in physical pixels, as configured on the surface.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.size.width, self.size.height)
    }

    /// Whether acquired frames can be copied back to the host.
    pub fn supports_readback(&self) -> bool {
        self.readback
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Reconfigures the surface; a zero size is recorded but not applied.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            new_size,
        );
    }

    /// Acquires the next surface texture and creates an encoder.
    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tumble frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands for the given frame.
    ///
    /// The returned texture is still owned by the caller; work that must see
    /// the finished image (readback) runs before calling `present()` on it.
    pub fn submit(&self, frame: GpuFrame) -> wgpu::SurfaceTexture {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture
    }

    /// Recovers from a failed acquire where possible.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        surface::map_surface_error(&self.surface, &self.device, &self.config, self.size, err)
    }
}
