use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("surface format {0:?} cannot be converted to RGB8")]
    UnsupportedFormat(wgpu::TextureFormat),

    #[error("failed to map readback buffer: {0}")]
    Map(String),

    #[error("device poll failed during readback: {0}")]
    Poll(String),

    #[error("readback is {actual} bytes, expected {expected}")]
    Size { expected: usize, actual: usize },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
