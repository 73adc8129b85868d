use std::time::Instant;

use winit::window::{Fullscreen, Window};

use crate::capture::FrameCapture;
use crate::coords::ColorRgba;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::InputFrame;
use crate::render::{RenderCtx, RenderTarget};

use super::app::AppControl;

/// Window handle exposed to the app.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    /// Switches between a borderless fullscreen window on the current
    /// monitor and the regular windowed mode.
    pub fn set_fullscreen(&self, on: bool) {
        let mode = on.then_some(Fullscreen::Borderless(None));
        self.window.set_fullscreen(mode);
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window:      WindowCtx<'a>,
    pub gpu:         &'a mut Gpu<'w>,
    pub input_frame: &'a InputFrame,
    /// When the runtime started the loop iteration, before input dispatch.
    pub frame_start: Instant,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Clears the surface with `clear`, calls `draw` with a ready [`RenderCtx`]
    /// and [`RenderTarget`], optionally captures the result, then presents.
    ///
    /// Capture runs synchronously after submission and before presentation,
    /// so the saved image is exactly the presented one. Capture failures are
    /// logged by [`FrameCapture`] and never abort the frame.
    pub fn render<F>(
        &mut self,
        clear: ColorRgba,
        mut capture: Option<&mut FrameCapture>,
        draw: F,
    ) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                log::debug!("surface error: {err}");
                let action = self.gpu.handle_surface_error(err);
                if action == SurfaceErrorAction::Fatal {
                    log::error!("surface is unrecoverable; exiting");
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        // Clear pass — dropped before the encoder is borrowed again.
        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tumble clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view:           &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load:  wgpu::LoadOp::Clear(clear.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes:         None,
                occlusion_query_set:      None,
                multiview_mask:           None,
            });
        }

        let rctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            self.gpu.viewport(),
        );

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&rctx, &mut target);
        }

        let pending = match capture.as_deref_mut() {
            Some(c) => c.record(
                self.gpu.device(),
                &mut frame.encoder,
                &frame.surface_texture.texture,
                self.gpu.surface_format(),
                self.gpu.supports_readback(),
            ),
            None => None,
        };

        let surface_texture = self.gpu.submit(frame);

        if let (Some(c), Some(p)) = (capture, pending) {
            c.complete(self.gpu.device(), p);
        }

        self.window.window.pre_present_notify();
        surface_texture.present();

        AppControl::Continue
    }
}
