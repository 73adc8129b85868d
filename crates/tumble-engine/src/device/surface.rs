use winit::dpi::PhysicalSize;

use super::SurfaceErrorAction;

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let preferred: [wgpu::TextureFormat; 2] = if prefer_srgb {
        [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ]
    } else {
        [
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Rgba8Unorm,
        ]
    };

    pick_format(&caps.formats, &preferred, prefer_srgb)
}

fn pick_format(
    formats: &[wgpu::TextureFormat],
    preferred: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if let Some(f) = preferred.iter().find(|f| formats.contains(*f)) {
        return Some(*f);
    }

    formats
        .iter()
        .find(|f| f.is_srgb() == prefer_srgb)
        .or_else(|| formats.first())
        .copied()
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Caps each side at the device's `max_texture_dimension_2d`. Zero sides
/// are kept so a minimized window stays unconfigured.
pub(crate) fn clamp_to_limit(size: PhysicalSize<u32>, max_dim: u32) -> PhysicalSize<u32> {
    let clamped = PhysicalSize::new(size.width.min(max_dim), size.height.min(max_dim));
    if clamped != size {
        log::warn!(
            "{}x{} exceeds the device limit of {max_dim}; rendering at {}x{}",
            size.width,
            size.height,
            clamped.width,
            clamped.height
        );
    }
    clamped
}

pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    let new_size = clamp_to_limit(new_size, device.limits().max_texture_dimension_2d);
    *size = new_size;

    // wgpu rejects 0x0 configurations; defer until the window has area again.
    if new_size.width == 0 || new_size.height == 0 {
        return;
    }

    config.width = new_size.width;
    config.height = new_size.height;

    surface.configure(device, config);
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if size.width > 0 && size.height > 0 {
                surface.configure(device, config);
            }
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat as F;

    const LINEAR: [F; 2] = [F::Bgra8Unorm, F::Rgba8Unorm];
    const SRGB: [F; 2] = [F::Bgra8UnormSrgb, F::Rgba8UnormSrgb];

    #[test]
    fn linear_preferred_when_available() {
        let formats = [F::Bgra8UnormSrgb, F::Bgra8Unorm];
        assert_eq!(pick_format(&formats, &LINEAR, false), Some(F::Bgra8Unorm));
    }

    #[test]
    fn srgb_preferred_when_requested() {
        let formats = [F::Rgba8Unorm, F::Rgba8UnormSrgb];
        assert_eq!(pick_format(&formats, &SRGB, true), Some(F::Rgba8UnormSrgb));
    }

    #[test]
    fn falls_back_to_matching_encoding() {
        let formats = [F::Rgba16Float, F::Rgb10a2Unorm];
        assert_eq!(pick_format(&formats, &LINEAR, false), Some(F::Rgba16Float));
    }

    #[test]
    fn falls_back_to_first() {
        let formats = [F::Bgra8UnormSrgb];
        assert_eq!(pick_format(&formats, &LINEAR, false), Some(F::Bgra8UnormSrgb));
        assert_eq!(pick_format(&[], &LINEAR, false), None);
    }

    // ── size limits ───────────────────────────────────────────────────────

    #[test]
    fn oversized_window_is_clamped_to_limit() {
        let max = wgpu::Limits::default().max_texture_dimension_2d;
        assert_eq!(max, 8192);
        assert_eq!(
            clamp_to_limit(PhysicalSize::new(9000, 1600), max),
            PhysicalSize::new(8192, 1600)
        );
        assert_eq!(
            clamp_to_limit(PhysicalSize::new(20000, 20000), max),
            PhysicalSize::new(8192, 8192)
        );
    }

    #[test]
    fn sizes_within_limit_are_unchanged() {
        let size = PhysicalSize::new(1800, 1600);
        assert_eq!(clamp_to_limit(size, 8192), size);
        assert_eq!(clamp_to_limit(PhysicalSize::new(8192, 8192), 8192), PhysicalSize::new(8192, 8192));
    }

    #[test]
    fn minimized_size_stays_zero() {
        assert_eq!(clamp_to_limit(PhysicalSize::new(0, 0), 8192), PhysicalSize::new(0, 0));
        assert_eq!(clamp_to_limit(PhysicalSize::new(0, 9000), 8192), PhysicalSize::new(0, 8192));
    }
}
