//! `tumble`: spins a lit triangle mesh and optionally records every frame.
//!
//! Settings come from `tumble.toml` (or the file named by `TUMBLE_CONFIG`).

mod app;
mod config;

use std::process::ExitCode;

use anyhow::Result;
use winit::dpi::PhysicalSize;

use tumble_asset::{load_model, ModelData};
use tumble_engine::capture::FrameCapture;
use tumble_engine::device::GpuInit;
use tumble_engine::logging::{init_logging, LoggingConfig};
use tumble_engine::render::{MeshRenderer, ShaderFailurePolicy, ShaderProgram};
use tumble_engine::window::{GraphicsInitError, Runtime, RuntimeConfig};

use app::{LoopState, ViewerApp};
use config::ViewerConfig;

/// `-1` as seen by the parent process.
const EXIT_GRAPHICS_INIT: u8 = 255;
const EXIT_STARTUP: u8 = 1;

fn main() -> ExitCode {
    let path = ViewerConfig::path_from_env();
    let config = match ViewerConfig::load_from(&path) {
        Ok(c) => c,
        Err(e) => {
            init_logging(LoggingConfig::default());
            log::error!("{e:#}");
            return ExitCode::from(EXIT_STARTUP);
        }
    };

    init_logging(LoggingConfig {
        env_filter: config.logging.filter.clone(),
        ..Default::default()
    });
    log::debug!("config: {}", path.display());

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::from(exit_status(&e))
        }
    }
}

fn exit_status(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<GraphicsInitError>().is_some() {
        EXIT_GRAPHICS_INIT
    } else {
        EXIT_STARTUP
    }
}

/// Logs what the loaded data will look like on screen.
fn check_model(model: &ModelData) {
    let Some(first) = model.vertex(0) else {
        log::warn!("model has no complete vertices; nothing will be drawn");
        return;
    };
    log::debug!("first vertex: position {:?} normal {:?}", first.position, first.normal);

    let unlit = model.zero_normal_count();
    if unlit > 0 {
        log::warn!("{unlit} of {} vertices have a zero normal and cannot be lit", model.vertex_count());
    }
}

fn run(config: ViewerConfig) -> Result<()> {
    let model = load_model(&config.model.path)?;
    log::info!(
        "model {}: {} floats, {} vertices",
        config.model.path.display(),
        model.declared_len(),
        model.vertex_count()
    );
    check_model(&model);

    let shader_path = config.shader.path.as_deref();
    match shader_path {
        Some(p) => log::info!("shader: {}", p.display()),
        None => log::info!("shader: built-in"),
    }
    let policy = ShaderFailurePolicy::from(config.shader.on_error);
    let program = policy.resolve(ShaderProgram::load(shader_path))?;

    let capture = config.capture.enabled.then(|| {
        let c = &config.capture;
        FrameCapture::new(&c.dir, c.prefix.clone(), c.format.into())
    });
    if let Some(c) = &capture {
        log::info!(
            "capturing {:?} frames to {} every {} simulated s",
            c.format(),
            c.next_path().display(),
            config.capture.time_step
        );
        if !c.dir().is_dir() {
            log::warn!("capture directory {} does not exist; frames will fail to save", c.dir().display());
        }
    }

    let gpu_init = GpuInit {
        present_mode: if config.window.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        },
        readback: capture.is_some(),
        ..Default::default()
    };

    let runtime = RuntimeConfig {
        title: config.window.title.clone(),
        initial_size: PhysicalSize::new(config.window.width, config.window.height),
    };

    let app = ViewerApp::new(
        config.window.title,
        MeshRenderer::new(model, program, policy),
        LoopState::new(capture, config.capture.time_step),
    );

    Runtime::run(runtime, gpu_init, app)
}
