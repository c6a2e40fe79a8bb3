use crate::render::camera::FrameMatrices;
use crate::render::common::{
    instance_layout, FrameUniform, PointParams, QuadBuffers, QuadVertex,
    UniformBinding, COLOR_AT_2, POSITION_AT_1,
};
use crate::render::program::{compile_program, ProgramDesc, ProgramSlot};
use crate::render::shaders::{self, ProgramSource};
use crate::render::{RenderCtx, RenderTarget};

use super::DisplayMode;

/// Fixed-size screen-space points, white or colored per particle.
///
/// Points are unsorted; they are depth tested and write depth like the
/// other modes.
pub(super) struct PointsPass {
    frame: UniformBinding<FrameUniform>,
    white: ProgramSlot,
    colored: ProgramSlot,
}

impl PointsPass {
    pub(super) fn new(device: &wgpu::Device) -> Self {
        Self {
            frame: UniformBinding::new(device, "sphaera points frame ubo", wgpu::ShaderStages::VERTEX),
            white: ProgramSlot::default(),
            colored: ProgramSlot::default(),
        }
    }

    /// Compiles the white and the colored program for the current surface format.
    pub(super) fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        let frame = &self.frame;
        self.white.get_or_compile(ctx.surface_format, || {
            compile_points(ctx, frame, "sphaera points", shaders::POINTS, false)
        });
        self.colored.get_or_compile(ctx.surface_format, || {
            compile_points(ctx, frame, "sphaera colored points", shaders::POINTS_COLORED, true)
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        quad: &QuadBuffers,
        matrices: &FrameMatrices,
        point_size: f32,
        positions: &wgpu::Buffer,
        colors: Option<&wgpu::Buffer>,
        count: u32,
    ) {
        self.ensure_pipelines(ctx);
        let slot = if colors.is_some() { &self.colored } else { &self.white };
        let Some(pipeline) = slot.get(ctx.surface_format) else { return };

        let params = PointParams {
            size: point_size,
            ..Default::default()
        };
        self.frame.write(ctx.queue, &FrameUniform::new(matrices, ctx.viewport, params));

        let mut rpass = target.begin_pass("sphaera points pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &self.frame.bind_group, &[]);
        rpass.set_vertex_buffer(0, quad.vbo.slice(..));
        rpass.set_vertex_buffer(1, positions.slice(..));
        if let Some(colors) = colors {
            rpass.set_vertex_buffer(2, colors.slice(..));
        }
        rpass.set_index_buffer(quad.ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..6, 0, 0..count);
    }
}

fn compile_points(
    ctx: &RenderCtx<'_>,
    frame: &UniformBinding<FrameUniform>,
    label: &str,
    source: ProgramSource,
    colored: bool,
) -> Option<wgpu::RenderPipeline> {
    let white_buffers = [QuadVertex::layout(), instance_layout(&POSITION_AT_1)];
    let colored_buffers = [
        QuadVertex::layout(),
        instance_layout(&POSITION_AT_1),
        instance_layout(&COLOR_AT_2),
    ];

    compile_program(
        ctx.device,
        &ProgramDesc {
            label,
            vertex_source: source.vertex,
            fragment_source: source.fragment,
            bind_group_layouts: &[&frame.layout],
            vertex_buffers: if colored { &colored_buffers } else { &white_buffers },
            color_format: ctx.surface_format,
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            depth: Some(DisplayMode::Points.depth_state()),
        },
    )
}
