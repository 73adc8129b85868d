//! Frame capture: copies the rendered surface to host memory and writes it
//! as a numbered image file.
//!
//! Capture is split in two so that the copy rides in the frame's own command
//! buffer:
//! - [`FrameCapture::record`] appends a texture-to-buffer copy to the encoder
//!   before submission;
//! - [`FrameCapture::complete`] maps the buffer after submission, converts
//!   it to RGB8 and writes the file, all before the frame is presented.
//!
//! Failures are logged and the frame is skipped. The file counter only
//! advances after a successful write.

mod error;
pub mod readback;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tumble_asset::{write_ppm, FrameSequence, RowOrder};

pub use error::CaptureError;

/// On-disk image format.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum CaptureFormat {
    #[default]
    Ppm,
    Png,
}

impl CaptureFormat {
    pub fn extension(self) -> &'static str {
        match self {
            CaptureFormat::Ppm => "ppm",
            CaptureFormat::Png => "png",
        }
    }
}

/// A copy recorded into a frame encoder, awaiting submission.
pub struct PendingCapture {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    padded_row: u32,
    swizzle: [usize; 3],
}

pub struct FrameCapture {
    sequence: FrameSequence,
    format: CaptureFormat,
    warned_unreadable: bool,
}

impl FrameCapture {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, format: CaptureFormat) -> Self {
        Self {
            sequence: FrameSequence::new(dir, prefix, format.extension()),
            format,
            warned_unreadable: false,
        }
    }

    pub fn format(&self) -> CaptureFormat {
        self.format
    }

    pub fn dir(&self) -> &Path {
        self.sequence.dir()
    }

    /// Number of frames written so far.
    pub fn written(&self) -> u32 {
        self.sequence.counter()
    }

    /// Path the next successful capture will be written to.
    pub fn next_path(&self) -> PathBuf {
        self.sequence.next_path()
    }

    /// Records a copy of `texture` into `encoder`.
    ///
    /// `readable` is false when the surface was configured without
    /// `COPY_SRC`. Returns `None` when the texture cannot be read back; this
    /// is reported once and never stops the frame.
    pub fn record(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        texture: &wgpu::Texture,
        format: wgpu::TextureFormat,
        readable: bool,
    ) -> Option<PendingCapture> {
        if !readable {
            self.warn_once("surface texture is not copyable; frames are not captured");
            return None;
        }
        let Some(swizzle) = readback::rgb_swizzle(format) else {
            self.warn_once(&CaptureError::UnsupportedFormat(format).to_string());
            return None;
        };

        let size = texture.size();
        let (width, height) = (size.width, size.height);
        let padded_row = readback::padded_bytes_per_row(width);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tumble capture readback"),
            size: u64::from(padded_row) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        Some(PendingCapture {
            buffer,
            width,
            height,
            padded_row,
            swizzle,
        })
    }

    /// Finishes a recorded copy. Must run after the frame is submitted.
    pub fn complete(&mut self, device: &wgpu::Device, pending: PendingCapture) {
        match self.write(device, &pending) {
            Ok(path) => {
                log::debug!("captured {}", path.display());
                self.sequence.advance();
            }
            Err(e) => log::error!("frame capture skipped: {e}"),
        }
        pending.buffer.destroy();
    }

    fn write(&self, device: &wgpu::Device, p: &PendingCapture) -> Result<PathBuf, CaptureError> {
        let data = readback::read_buffer(device, &p.buffer)?;
        let rgb = readback::to_rgb8(&data, p.width, p.height, p.padded_row, p.swizzle)?;
        let path = self.sequence.next_path();

        match self.format {
            CaptureFormat::Ppm => write_ppm_file(&path, p.width, p.height, &rgb)?,
            CaptureFormat::Png => write_png_file(&path, p.width, p.height, rgb)?,
        }
        Ok(path)
    }

    fn warn_once(&mut self, msg: &str) {
        if !self.warned_unreadable {
            log::warn!("{msg}");
            self.warned_unreadable = true;
        }
    }
}

/// Readback rows are already top-down, so no flip is applied.
fn write_ppm_file(path: &Path, width: u32, height: u32, rgb: &[u8]) -> Result<(), CaptureError> {
    let io_err = |source| CaptureError::Io { path: path.to_path_buf(), source };

    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    write_ppm(&mut out, width, height, rgb, RowOrder::TopDown).map_err(io_err)?;
    out.flush().map_err(io_err)
}

fn write_png_file(path: &Path, width: u32, height: u32, rgb: Vec<u8>) -> Result<(), CaptureError> {
    let actual = rgb.len();
    let img = image::RgbImage::from_raw(width, height, rgb).ok_or(CaptureError::Size {
        expected: width as usize * height as usize * 3,
        actual,
    })?;
    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| CaptureError::Encode { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAR: [u8; 3] = [51, 102, 204];

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tumble-capture-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn solid(w: u32, h: u32) -> Vec<u8> {
        CLEAR.iter().copied().cycle().take((w * h * 3) as usize).collect()
    }

    #[test]
    fn extensions_follow_format() {
        assert_eq!(CaptureFormat::Ppm.extension(), "ppm");
        assert_eq!(CaptureFormat::Png.extension(), "png");
        let c = FrameCapture::new("out", "image_", CaptureFormat::Png);
        assert!(c.next_path().ends_with("image_0000.png"));
        assert_eq!(c.written(), 0);
    }

    #[test]
    fn ppm_file_is_written_top_down() {
        let dir = temp_dir("ppm");
        let path = dir.join("a.ppm");
        write_ppm_file(&path, 3, 2, &solid(3, 2)).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let header = b"P6\n3 2\n255\n";
        assert!(bytes.starts_with(header));
        assert!(bytes[header.len()..].chunks_exact(3).all(|p| p == CLEAR));
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn png_file_round_trips_pixels() {
        let dir = temp_dir("png");
        let path = dir.join("a.png");
        write_png_file(&path, 4, 4, solid(4, 4)).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (4, 4));
        assert!(img.pixels().all(|p| p.0 == CLEAR));
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_dir_is_io_error() {
        let path = Path::new("no/such/dir/frame.ppm");
        let e = write_ppm_file(path, 1, 1, &CLEAR).unwrap_err();
        assert!(matches!(e, CaptureError::Io { .. }));
        assert!(e.to_string().contains("frame.ppm"));
    }

    #[test]
    fn png_size_mismatch_is_error() {
        let e = write_png_file(Path::new("unused.png"), 2, 2, vec![0; 5]).unwrap_err();
        assert!(matches!(e, CaptureError::Size { expected: 12, actual: 5 }));
    }
}
