use tumble_engine::capture::FrameCapture;
use tumble_engine::coords::ColorRgba;
use tumble_engine::core::{App, AppControl, FrameCtx};
use tumble_engine::input::{InputFrame, Key};
use tumble_engine::render::{Camera, MeshRenderer, ShaderError, TransformUniform};
use tumble_engine::time::{RenderTimer, SimClock};

pub const CLEAR_COLOR: ColorRgba = ColorRgba::new(0.2, 0.4, 0.8, 1.0);

/// Title bar text: the base title plus the smoothed frame time.
pub fn format_title(base: &str, avg_ms: f32) -> String {
    format!("{base} [Update: {avg_ms:3.0} ms]")
}

/// What a frame's input asks the loop to do.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct InputActions {
    pub quit: bool,
    pub toggle_fullscreen: bool,
}

impl InputActions {
    /// Escape and `F` act on release, so holding them does nothing.
    pub fn from_frame(frame: &InputFrame) -> Self {
        Self {
            quit: frame.released(Key::Escape),
            toggle_fullscreen: frame.released(Key::Char('f')),
        }
    }
}

/// Mutable state of the render loop.
pub struct LoopState {
    pub clock: SimClock,
    pub timer: RenderTimer,
    pub fullscreen: bool,
    pub quitting: bool,
    /// `Some` while frames are being written to disk.
    pub capture: Option<FrameCapture>,
}

impl LoopState {
    /// Capture runs on a fixed time step so the written sequence plays back
    /// at a stable rate; otherwise animation follows the wall clock.
    pub fn new(capture: Option<FrameCapture>, time_step: f32) -> Self {
        let clock = if capture.is_some() {
            SimClock::fixed_step(time_step)
        } else {
            SimClock::wall_clock()
        };
        log::debug!("animation clock: {:?}", clock.mode());
        Self {
            clock,
            timer: RenderTimer::new(),
            fullscreen: false,
            quitting: false,
            capture,
        }
    }

    /// Applies input actions. Returns the new fullscreen flag when it changed.
    pub fn apply(&mut self, actions: InputActions) -> Option<bool> {
        if actions.quit && !self.quitting {
            log::info!("escape released; quitting");
            self.quitting = true;
        }
        if actions.toggle_fullscreen {
            self.fullscreen = !self.fullscreen;
            return Some(self.fullscreen);
        }
        None
    }
}

pub struct ViewerApp {
    title: String,
    camera: Camera,
    renderer: Option<MeshRenderer>,
    state: LoopState,
    /// Set when a fail-fast shader error stops the loop.
    failure: Option<ShaderError>,
}

impl ViewerApp {
    pub fn new(title: String, renderer: MeshRenderer, state: LoopState) -> Self {
        Self {
            title,
            camera: Camera::default(),
            renderer: Some(renderer),
            state,
            failure: None,
        }
    }
}

impl App for ViewerApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.state.timer.begin_at(ctx.frame_start);

        if let Some(on) = self.state.apply(InputActions::from_frame(ctx.input_frame)) {
            log::debug!("fullscreen: {on}");
            ctx.window.set_fullscreen(on);
        }

        let now = self.state.clock.tick();
        let aspect = ctx.gpu.viewport().aspect();
        let transforms = TransformUniform::at(now.seconds, &self.camera, aspect);
        log::trace!("frame {} t={:.3}s", now.frame, now.seconds);

        let renderer = &mut self.renderer;
        let mut failure = None;
        let control = ctx.render(CLEAR_COLOR, self.state.capture.as_mut(), |rctx, target| {
            if let Some(r) = renderer.as_mut() {
                failure = r.render(rctx, target, &transforms).err();
            }
        });
        if let Some(e) = failure {
            self.failure = Some(e);
            return AppControl::Exit;
        }

        let avg = self.state.timer.end();
        ctx.window.set_title(&format_title(&self.title, avg));

        if self.state.quitting {
            return AppControl::Exit;
        }
        control
    }

    fn on_exit(&mut self) -> anyhow::Result<()> {
        if let Some(c) = &self.state.capture {
            log::info!("captured {} frames into {}", c.written(), c.dir().display());
        }
        self.renderer = None;
        match self.failure.take() {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tumble_engine::capture::CaptureFormat;
    use tumble_engine::input::{InputEvent, KeyState};
    use tumble_engine::render::ShaderFailurePolicy;
    use tumble_engine::time::TimeMode;

    fn key(frame: &mut InputFrame, key: Key, state: KeyState) {
        frame.apply_event(InputEvent::Key { key, state });
    }

    // ── title ─────────────────────────────────────────────────────────────

    #[test]
    fn title_pads_to_three_columns() {
        assert_eq!(format_title("My OpenGL Program", 4.4), "My OpenGL Program [Update:   4 ms]");
        assert_eq!(format_title("t", 16.6), "t [Update:  17 ms]");
        assert_eq!(format_title("t", 1234.0), "t [Update: 1234 ms]");
    }

    // ── input ─────────────────────────────────────────────────────────────

    #[test]
    fn escape_acts_on_release_only() {
        let mut frame = InputFrame::default();
        key(&mut frame, Key::Escape, KeyState::Pressed);
        assert!(!InputActions::from_frame(&frame).quit);

        frame.clear();
        key(&mut frame, Key::Escape, KeyState::Released);
        assert!(InputActions::from_frame(&frame).quit);
    }

    #[test]
    fn escape_release_without_press_quits() {
        let mut frame = InputFrame::default();
        key(&mut frame, Key::Escape, KeyState::Released);
        let mut state = LoopState::new(None, 0.07);
        state.apply(InputActions::from_frame(&frame));
        assert!(state.quitting);
    }

    #[test]
    fn f_release_toggles_fullscreen() {
        let mut state = LoopState::new(None, 0.07);
        let toggle = InputActions { toggle_fullscreen: true, ..Default::default() };
        assert_eq!(state.apply(toggle), Some(true));
        assert_eq!(state.apply(toggle), Some(false));
        assert_eq!(state.apply(InputActions::default()), None);
        assert!(!state.quitting);
    }

    #[test]
    fn uppercase_f_is_the_same_key() {
        let mut frame = InputFrame::default();
        key(&mut frame, Key::Char('f'), KeyState::Pressed);
        key(&mut frame, Key::Char('f'), KeyState::Released);
        assert!(InputActions::from_frame(&frame).toggle_fullscreen);
    }

    #[test]
    fn quit_is_sticky() {
        let mut state = LoopState::new(None, 0.07);
        state.apply(InputActions { quit: true, ..Default::default() });
        state.apply(InputActions::default());
        assert!(state.quitting);
    }

    // ── clock ─────────────────────────────────────────────────────────────

    #[test]
    fn capturing_uses_fixed_step() {
        let capture = FrameCapture::new("out", "image_", CaptureFormat::Ppm);
        let mut state = LoopState::new(Some(capture), 0.07);
        assert!(state.capture.is_some());
        assert_eq!(state.clock.mode(), TimeMode::FixedStep { step: 0.07 });
        for n in 1..=5u64 {
            let t = state.clock.tick();
            assert_eq!(t.frame, n);
            assert_eq!(t.seconds, 0.07 * n as f32);
        }
    }

    #[test]
    fn interactive_uses_wall_clock() {
        let state = LoopState::new(None, 0.07);
        assert_eq!(state.clock.mode(), TimeMode::WallClock);
    }

    // ── shutdown ──────────────────────────────────────────────────────────

    fn viewer() -> ViewerApp {
        let renderer = MeshRenderer::new(
            tumble_asset::ModelData::from_floats(vec![0.0; 24]),
            None,
            ShaderFailurePolicy::FailFast,
        );
        ViewerApp::new("t".into(), renderer, LoopState::new(None, 0.07))
    }

    #[test]
    fn clean_exit_is_ok() {
        assert!(viewer().on_exit().is_ok());
    }

    #[test]
    fn rejected_pipeline_is_reported_on_exit() {
        let mut app = viewer();
        app.failure = Some(ShaderError::Pipeline {
            label: "custom.wgsl".into(),
            diagnostic: "Validation Error".into(),
        });
        let e = app.on_exit().unwrap_err();
        assert!(e.to_string().contains("custom.wgsl"));
        assert!(app.renderer.is_none());
    }

    #[test]
    fn clear_color_quantizes_to_expected_bytes() {
        assert_eq!(CLEAR_COLOR.to_rgb8(), [51, 102, 204]);
    }
}
