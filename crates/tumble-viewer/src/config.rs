//! `tumble.toml` loading.
//!
//! Every key is optional; a missing file means all defaults. Unknown keys
//! are rejected so typos do not silently fall back to defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use tumble_engine::capture::CaptureFormat;
use tumble_engine::render::ShaderFailurePolicy;

/// Default config file, relative to the working directory.
pub const DEFAULT_PATH: &str = "tumble.toml";

/// Environment variable overriding [`DEFAULT_PATH`].
pub const PATH_ENV: &str = "TUMBLE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub model: ModelConfig,
    pub shader: ShaderConfig,
    pub capture: CaptureConfig,
    pub logging: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Cap the frame rate to the display refresh.
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "My OpenGL Program".to_string(),
            width: 1800,
            height: 1600,
            vsync: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/triangle.txt"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShaderConfig {
    /// WGSL override; the built-in shader is used when unset.
    pub path: Option<PathBuf>,
    pub on_error: OnShaderError,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnShaderError {
    #[default]
    FailFast,
    LogAndContinue,
}

impl From<OnShaderError> for ShaderFailurePolicy {
    fn from(v: OnShaderError) -> Self {
        match v {
            OnShaderError::FailFast => ShaderFailurePolicy::FailFast,
            OnShaderError::LogAndContinue => ShaderFailurePolicy::LogAndContinue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    pub prefix: String,
    pub format: ImageFormat,
    /// Simulated seconds per captured frame.
    pub time_step: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from("out"),
            prefix: "image_".to_string(),
            format: ImageFormat::Ppm,
            time_step: 0.07,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Ppm,
    Png,
}

impl From<ImageFormat> for CaptureFormat {
    fn from(v: ImageFormat) -> Self {
        match v {
            ImageFormat::Ppm => CaptureFormat::Ppm,
            ImageFormat::Png => CaptureFormat::Png,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `env_logger` filter; `RUST_LOG` applies when unset.
    pub filter: Option<String>,
}

impl ViewerConfig {
    pub fn from_toml(src: &str) -> Result<Self> {
        let config: Self = toml::from_str(src).context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(src) => Self::from_toml(&src).with_context(|| format!("in {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    /// Path chosen by [`PATH_ENV`], else [`DEFAULT_PATH`].
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(PATH_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PATH))
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.window.width > 0 && self.window.height > 0,
            "window size must be non-zero, got {}x{}",
            self.window.width,
            self.window.height
        );
        anyhow::ensure!(
            self.capture.time_step.is_finite() && self.capture.time_step > 0.0,
            "capture.time_step must be positive, got {}",
            self.capture.time_step
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_defaults() {
        let c = ViewerConfig::from_toml("").unwrap();
        assert_eq!(c, ViewerConfig::default());
        assert_eq!(c.window.title, "My OpenGL Program");
        assert_eq!((c.window.width, c.window.height), (1800, 1600));
        assert_eq!(c.model.path, Path::new("models/triangle.txt"));
        assert!(!c.capture.enabled);
        assert_eq!(c.capture.dir, Path::new("out"));
        assert_eq!(c.capture.prefix, "image_");
        assert_eq!(c.capture.time_step, 0.07);
        assert_eq!(c.shader.on_error, OnShaderError::FailFast);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let c = ViewerConfig::from_toml(
            r#"
            [capture]
            enabled = true
            format = "png"

            [shader]
            on_error = "log-and-continue"
            "#,
        )
        .unwrap();
        assert!(c.capture.enabled);
        assert_eq!(CaptureFormat::from(c.capture.format), CaptureFormat::Png);
        assert_eq!(c.capture.prefix, "image_");
        assert_eq!(
            ShaderFailurePolicy::from(c.shader.on_error),
            ShaderFailurePolicy::LogAndContinue
        );
        assert_eq!(c.window, WindowConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ViewerConfig::from_toml("[window]\nwidht = 10\n").is_err());
        assert!(ViewerConfig::from_toml("[camera]\nfov = 1.0\n").is_err());
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(ViewerConfig::from_toml("[window]\nwidth = 0\n").is_err());
        assert!(ViewerConfig::from_toml("[capture]\ntime_step = -1.0\n").is_err());
        assert!(ViewerConfig::from_toml("[capture]\nformat = \"bmp\"\n").is_err());
    }

    #[test]
    fn missing_file_is_defaults() {
        let c = ViewerConfig::load_from(Path::new("no/such/tumble.toml")).unwrap();
        assert_eq!(c, ViewerConfig::default());
    }

    #[test]
    fn load_error_names_the_file() {
        let dir = std::env::temp_dir().join(format!("tumble-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tumble.toml");
        std::fs::write(&path, "[window]\nbogus = 1\n").unwrap();

        let e = ViewerConfig::load_from(&path).unwrap_err();
        assert!(format!("{e:#}").contains("tumble.toml"));
        std::fs::remove_dir_all(dir).unwrap();
    }
}
