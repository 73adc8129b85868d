//! Binary PPM (`P6`) encoding.

use std::io::{self, Write};

use crate::error::PpmError;

/// Row order of the source pixel buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RowOrder {
    /// First row in memory is the top of the image.
    TopDown,
    /// First row in memory is the bottom of the image (OpenGL readback).
    BottomUp,
}

fn check_len(width: u32, height: u32, rgb: &[u8]) -> Result<usize, PpmError> {
    let expected = width as usize * height as usize * 3;
    if rgb.len() != expected {
        return Err(PpmError { width, height, expected, actual: rgb.len() });
    }
    Ok(expected)
}

fn header(width: u32, height: u32) -> String {
    format!("P6\n{width} {height}\n255\n")
}

/// Rows of `rgb` in output order (top row first).
fn rows_top_first(width: u32, rgb: &[u8], order: RowOrder) -> Vec<&[u8]> {
    let row_len = width as usize * 3;
    if row_len == 0 {
        return Vec::new();
    }
    let rows = rgb.chunks_exact(row_len);
    match order {
        RowOrder::TopDown => rows.collect(),
        RowOrder::BottomUp => rows.rev().collect(),
    }
}

/// Writes a `P6` image. Output is always top row first.
///
/// `rgb` is tightly packed 8-bit RGB, `width * height * 3` bytes.
pub fn write_ppm<W: Write>(
    out: &mut W,
    width: u32,
    height: u32,
    rgb: &[u8],
    order: RowOrder,
) -> io::Result<()> {
    check_len(width, height, rgb).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    out.write_all(header(width, height).as_bytes())?;
    for row in rows_top_first(width, rgb, order) {
        out.write_all(row)?;
    }
    Ok(())
}

/// Encodes a `P6` image into memory.
pub fn encode_ppm(width: u32, height: u32, rgb: &[u8], order: RowOrder) -> Result<Vec<u8>, PpmError> {
    let len = check_len(width, height, rgb)?;
    let header = header(width, height);

    let mut out = Vec::with_capacity(header.len() + len);
    out.extend_from_slice(header.as_bytes());
    for row in rows_top_first(width, rgb, order) {
        out.extend_from_slice(row);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAR: [u8; 3] = [51, 102, 204];

    fn solid(w: u32, h: u32, px: [u8; 3]) -> Vec<u8> {
        px.iter().copied().cycle().take((w * h * 3) as usize).collect()
    }

    #[test]
    fn header_bytes() {
        let out = encode_ppm(4, 3, &solid(4, 3, CLEAR), RowOrder::TopDown).unwrap();
        assert!(out.starts_with(b"P6\n4 3\n255\n"));
        assert_eq!(out.len(), b"P6\n4 3\n255\n".len() + 4 * 3 * 3);
    }

    #[test]
    fn solid_frame_is_all_clear_color() {
        let out = encode_ppm(5, 2, &solid(5, 2, CLEAR), RowOrder::BottomUp).unwrap();
        let body = &out[b"P6\n5 2\n255\n".len()..];
        assert!(body.chunks_exact(3).all(|p| p == CLEAR));
    }

    #[test]
    fn bottom_up_rows_are_flipped() {
        // 1x3 image: bottom row red, middle green, top blue (GL order).
        let rgb = [255, 0, 0, 0, 255, 0, 0, 0, 255];
        let out = encode_ppm(1, 3, &rgb, RowOrder::BottomUp).unwrap();
        let body = &out[b"P6\n1 3\n255\n".len()..];
        assert_eq!(body, &[0, 0, 255, 0, 255, 0, 255, 0, 0]);
    }

    #[test]
    fn top_down_rows_pass_through() {
        let rgb = [1, 2, 3, 4, 5, 6];
        let out = encode_ppm(1, 2, &rgb, RowOrder::TopDown).unwrap();
        assert_eq!(&out[b"P6\n1 2\n255\n".len()..], &rgb);
    }

    #[test]
    fn wrong_length_is_error() {
        let e = encode_ppm(2, 2, &[0; 11], RowOrder::TopDown).unwrap_err();
        assert_eq!(e.expected, 12);
        assert_eq!(e.actual, 11);
    }

    #[test]
    fn zero_sized_image_is_header_only() {
        let out = encode_ppm(0, 0, &[], RowOrder::BottomUp).unwrap();
        assert_eq!(out, b"P6\n0 0\n255\n");
    }
}
