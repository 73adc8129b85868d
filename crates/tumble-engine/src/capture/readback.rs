//! Host-side handling of copied surface texels.

use super::CaptureError;

const BYTES_PER_PIXEL: u32 = 4;

/// Row pitch of the staging buffer, rounded up to wgpu's copy alignment.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Channel order of a 4-byte surface format, as indices of R, G, B.
pub fn rgb_swizzle(format: wgpu::TextureFormat) -> Option<[usize; 3]> {
    use wgpu::TextureFormat as F;
    match format {
        F::Bgra8Unorm | F::Bgra8UnormSrgb => Some([2, 1, 0]),
        F::Rgba8Unorm | F::Rgba8UnormSrgb => Some([0, 1, 2]),
        _ => None,
    }
}

/// Strips row padding and alpha, producing tightly packed RGB8.
pub fn to_rgb8(
    padded: &[u8],
    width: u32,
    height: u32,
    padded_row: u32,
    swizzle: [usize; 3],
) -> Result<Vec<u8>, CaptureError> {
    let expected = padded_row as usize * height as usize;
    if padded.len() < expected {
        return Err(CaptureError::Size { expected, actual: padded.len() });
    }

    let row_px = (width * BYTES_PER_PIXEL) as usize;
    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for row in padded.chunks_exact(padded_row as usize).take(height as usize) {
        for px in row[..row_px].chunks_exact(BYTES_PER_PIXEL as usize) {
            rgb.extend_from_slice(&[px[swizzle[0]], px[swizzle[1]], px[swizzle[2]]]);
        }
    }
    Ok(rgb)
}

/// Blocks until `buffer` is mapped and returns a copy of its contents.
///
/// The buffer is unmapped before returning on every path that mapped it.
pub fn read_buffer(device: &wgpu::Device, buffer: &wgpu::Buffer) -> Result<Vec<u8>, CaptureError> {
    let slice = buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |r| {
        let _ = tx.send(r);
    });

    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| CaptureError::Poll(e.to_string()))?;

    rx.recv()
        .map_err(|_| CaptureError::Map("map callback was dropped".to_owned()))?
        .map_err(|e| CaptureError::Map(e.to_string()))?;

    let data = slice.get_mapped_range().to_vec();
    buffer.unmap();
    Ok(data)
}
