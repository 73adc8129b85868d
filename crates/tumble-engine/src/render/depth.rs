use crate::coords::Viewport;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Depth attachment sized to the drawable.
pub struct DepthTarget {
    size: Viewport,
    view: wgpu::TextureView,
}

impl DepthTarget {
    /// Sides are clamped to `1..=max_texture_dimension_2d`.
    pub fn new(device: &wgpu::Device, size: Viewport) -> Self {
        let (width, height) = texture_extent(size, device.limits().max_texture_dimension_2d);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tumble depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { size, view }
    }

    /// True when the target no longer matches `viewport` and must be rebuilt.
    pub fn is_stale(&self, viewport: Viewport) -> bool {
        self.size != viewport
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

fn texture_extent(size: Viewport, max_dim: u32) -> (u32, u32) {
    (size.width.clamp(1, max_dim), size.height.clamp(1, max_dim))
}

/// Depth test used by the mesh pipeline: nearer fragments win.
pub fn depth_stencil_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_stays_within_device_limit() {
        assert_eq!(texture_extent(Viewport::new(9000, 1600), 8192), (8192, 1600));
        assert_eq!(texture_extent(Viewport::new(0, 0), 8192), (1, 1));
        assert_eq!(texture_extent(Viewport::new(1800, 1600), 8192), (1800, 1600));
    }
}
