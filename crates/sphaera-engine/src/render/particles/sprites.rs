use crate::render::camera::{point_scale, FrameMatrices};
use crate::render::common::{
    instance_layout, texture_bind_group, texture_layout, FrameUniform, PointParams,
    QuadBuffers, QuadVertex, UniformBinding, POSITION_AT_1,
};
use crate::render::program::{compile_program, ProgramDesc, ProgramSlot};
use crate::render::shaders;
use crate::render::texture::Texture2d;
use crate::render::{RenderCtx, RenderTarget};

use super::DisplayMode;

/// Sprite sizing state, in the units the host works in.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(super) struct SpriteSizing {
    pub radius: f32,
    pub fov_degrees: f32,
    pub window_height: f32,
}

impl SpriteSizing {
    pub(super) fn params(self) -> PointParams {
        PointParams {
            size: 0.0,
            scale: point_scale(self.window_height, self.fov_degrees),
            radius: self.radius,
        }
    }
}

/// Textured, lit sphere impostors with depth test and depth write.
pub(super) struct SpritePass {
    frame: UniformBinding<FrameUniform>,
    texture_layout: wgpu::BindGroupLayout,
    texture_bind_group: wgpu::BindGroup,
    program: ProgramSlot,
}

impl SpritePass {
    pub(super) fn new(device: &wgpu::Device, texture: &Texture2d) -> Self {
        let texture_layout =
            texture_layout(device, "sphaera sprite texture bgl", wgpu::TextureViewDimension::D2);
        let texture_bind_group = texture_bind_group(
            device,
            "sphaera sprite texture bind group",
            &texture_layout,
            &texture.view,
            &texture.sampler,
        );

        Self {
            frame: UniformBinding::new(device, "sphaera sprite frame ubo", wgpu::ShaderStages::VERTEX),
            texture_layout,
            texture_bind_group,
            program: ProgramSlot::default(),
        }
    }

    pub(super) fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        let (frame, texture_layout) = (&self.frame, &self.texture_layout);
        self.program.get_or_compile(ctx.surface_format, || {
            compile_program(
                ctx.device,
                &ProgramDesc {
                    label: "sphaera sphere sprites",
                    vertex_source: shaders::SPHERE_SPRITE.vertex,
                    fragment_source: shaders::SPHERE_SPRITE.fragment,
                    bind_group_layouts: &[&frame.layout, texture_layout],
                    vertex_buffers: &[QuadVertex::layout(), instance_layout(&POSITION_AT_1)],
                    color_format: ctx.surface_format,
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    depth: Some(DisplayMode::Sprites.depth_state()),
                },
            )
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        quad: &QuadBuffers,
        matrices: &FrameMatrices,
        sizing: SpriteSizing,
        positions: &wgpu::Buffer,
        count: u32,
    ) {
        self.ensure_pipeline(ctx);
        let Some(pipeline) = self.program.get(ctx.surface_format) else { return };

        self.frame.write(
            ctx.queue,
            &FrameUniform::new(matrices, ctx.viewport, sizing.params()),
        );

        let mut rpass = target.begin_pass("sphaera sprite pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &self.frame.bind_group, &[]);
        rpass.set_bind_group(1, &self.texture_bind_group, &[]);
        rpass.set_vertex_buffer(0, quad.vbo.slice(..));
        rpass.set_vertex_buffer(1, positions.slice(..));
        rpass.set_index_buffer(quad.ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..6, 0, 0..count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizing_feeds_point_scale_and_radius() {
        let sizing = SpriteSizing {
            radius: 0.0625,
            fov_degrees: 90.0,
            window_height: 600.0,
        };
        let params = sizing.params();
        assert!((params.scale - 600.0).abs() < 1e-3);
        assert_eq!(params.radius, 0.0625);
        assert_eq!(params.size, 0.0);
    }
}
