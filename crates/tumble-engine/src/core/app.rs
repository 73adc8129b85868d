use winit::event::WindowEvent;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called for every raw window event, before the runtime handles it.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per frame, after pending input has been folded into
    /// `ctx.input_frame`.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called once before the GPU context and window are destroyed.
    ///
    /// GPU resources owned by the app should be released here. An error is
    /// returned from `Runtime::run` unless startup already failed.
    fn on_exit(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
