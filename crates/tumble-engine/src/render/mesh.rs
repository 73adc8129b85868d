use wgpu::util::DeviceExt;

use tumble_asset::model::{
    FLOATS_PER_VERTEX, NORMAL_OFFSET_BYTES, POSITION_OFFSET_BYTES, VERTEX_STRIDE_BYTES,
};
use tumble_asset::ModelData;

use crate::render::{RenderCtx, RenderTarget};

use super::depth::{self, DepthTarget};
use super::shader::{
    ShaderError, ShaderFailurePolicy, ShaderInterface, ShaderProgram, FRAGMENT_ENTRY, VERTEX_ENTRY,
};
use super::transform::TransformUniform;

/// Position and normal attributes over the 8-float vertex record.
pub fn vertex_attributes(interface: &ShaderInterface) -> [wgpu::VertexAttribute; 2] {
    [
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: POSITION_OFFSET_BYTES,
            shader_location: interface.position_location,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: NORMAL_OFFSET_BYTES,
            shader_location: interface.normal_location,
        },
    ]
}

/// Draws a single non-indexed triangle list with depth testing.
///
/// GPU objects are created lazily on first use and rebuilt when the surface
/// format or drawable size changes. Without a shader program the renderer
/// draws nothing and frames show only the clear color.
///
/// Pipeline creation runs inside a validation error scope; a rejected
/// pipeline is handled by the same [`ShaderFailurePolicy`] as a shader that
/// failed to load.
pub struct MeshRenderer {
    model: ModelData,
    program: Option<ShaderProgram>,
    policy: ShaderFailurePolicy,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    transform_ubo: Option<wgpu::Buffer>,

    vertex_buffer: Option<wgpu::Buffer>,
    depth: Option<DepthTarget>,

    warned_no_program: bool,
}

impl MeshRenderer {
    pub fn new(model: ModelData, program: Option<ShaderProgram>, policy: ShaderFailurePolicy) -> Self {
        Self {
            model,
            program,
            policy,
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            bind_group: None,
            transform_ubo: None,
            vertex_buffer: None,
            depth: None,
            warned_no_program: false,
        }
    }

    /// Draws the model over the already-cleared color target.
    ///
    /// Returns an error only when the device rejects the pipeline under
    /// [`ShaderFailurePolicy::FailFast`].
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        transforms: &TransformUniform,
    ) -> Result<(), ShaderError> {
        if !ctx.viewport.is_valid() {
            return Ok(());
        }

        if let Err(e) = self.ensure_pipeline(ctx) {
            self.drop_program();
            self.policy.resolve(Err(e))?;
        }
        if self.program.is_none() {
            if !self.warned_no_program {
                log::warn!("MeshRenderer: no shader program; skipping draw");
                self.warned_no_program = true;
            }
            return Ok(());
        }

        self.ensure_vertex_buffer(ctx);
        self.ensure_bindings(ctx);
        self.ensure_depth(ctx);

        let Some(ubo) = self.transform_ubo.as_ref() else { return Ok(()) };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(transforms));

        let Some(pipeline) = self.pipeline.as_ref() else { return Ok(()) };
        let Some(bind_group) = self.bind_group.as_ref() else { return Ok(()) };
        let Some(depth) = self.depth.as_ref() else { return Ok(()) };
        let Some(program) = self.program.as_ref() else { return Ok(()) };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tumble mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth.view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let vertex_count = self.model.vertex_count() as u32;
        if vertex_count == 0 {
            return Ok(());
        }
        let Some(vbo) = self.vertex_buffer.as_ref() else { return Ok(()) };

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(program.interface().transforms_group, bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.draw(0..vertex_count, 0..1);
        Ok(())
    }

    /// Releases the program and every object derived from it.
    fn drop_program(&mut self) {
        self.program = None;
        self.pipeline = None;
        self.pipeline_format = None;
        self.bind_group_layout = None;
        self.bind_group = None;
        self.transform_ubo = None;
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) -> Result<(), ShaderError> {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return Ok(());
        }
        let Some(program) = self.program.as_ref() else { return Ok(()) };
        let interface = program.interface();

        let scope = ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(program.label()),
            source: wgpu::ShaderSource::Wgsl(program.source().into()),
        });

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("tumble transforms bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: interface.transforms_binding,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(TransformUniform::SIZE),
                        },
                        count: None,
                    }],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("tumble mesh pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        let attributes = vertex_attributes(&interface);

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tumble mesh pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: VERTEX_STRIDE_BYTES,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Both faces are lit; the model tumbles through 360°.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(depth::depth_stencil_state()),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(ShaderError::Pipeline {
                label: program.label().to_owned(),
                diagnostic: err.to_string(),
            });
        }

        log::debug!("mesh pipeline built for {:?}", ctx.surface_format);

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);

        self.bind_group = None;
        self.transform_ubo = None;
        Ok(())
    }

    fn ensure_vertex_buffer(&mut self, ctx: &RenderCtx<'_>) {
        if self.vertex_buffer.is_some() || self.model.is_empty() {
            return;
        }
        // Only whole vertices are uploaded.
        let floats = &self.model.floats()[..self.model.vertex_count() * FLOATS_PER_VERTEX];

        self.vertex_buffer = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tumble model vbo"),
            contents: bytemuck::cast_slice(floats),
            usage: wgpu::BufferUsages::VERTEX,
        }));

        log::info!(
            "uploaded {} vertices ({} triangles)",
            self.model.vertex_count(),
            self.model.triangle_count()
        );
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.transform_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };
        let Some(program) = self.program.as_ref() else { return };

        let transform_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tumble transforms ubo"),
            size: TransformUniform::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tumble transforms bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: program.interface().transforms_binding,
                resource: transform_ubo.as_entire_binding(),
            }],
        });

        self.transform_ubo = Some(transform_ubo);
        self.bind_group = Some(bind_group);
    }

    fn ensure_depth(&mut self, ctx: &RenderCtx<'_>) {
        if self.depth.as_ref().is_some_and(|d| !d.is_stale(ctx.viewport)) {
            return;
        }
        log::debug!("depth target {}x{}", ctx.viewport.width, ctx.viewport.height);
        self.depth = Some(DepthTarget::new(ctx.device, ctx.viewport));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interface(position: u32, normal: u32) -> ShaderInterface {
        ShaderInterface {
            position_location: position,
            normal_location: normal,
            transforms_group: 0,
            transforms_binding: 0,
        }
    }

    #[test]
    fn attributes_skip_the_two_unused_floats() {
        let [pos, nrm] = vertex_attributes(&interface(0, 1));
        assert_eq!(pos.offset, 0);
        assert_eq!(nrm.offset, 5 * 4);
        assert_eq!(pos.format, wgpu::VertexFormat::Float32x3);
        assert_eq!(nrm.format, wgpu::VertexFormat::Float32x3);
    }

    #[test]
    fn attributes_use_reflected_locations() {
        let [pos, nrm] = vertex_attributes(&interface(4, 2));
        assert_eq!(pos.shader_location, 4);
        assert_eq!(nrm.shader_location, 2);
    }

    #[test]
    fn stride_covers_one_record() {
        assert_eq!(VERTEX_STRIDE_BYTES, 8 * 4);
        let [_, nrm] = vertex_attributes(&interface(0, 1));
        assert!(nrm.offset + nrm.format.size() <= VERTEX_STRIDE_BYTES);
    }
}
