use wgpu::util::DeviceExt;

use crate::render::{RenderCtx, RenderTarget};

use super::camera::FrameMatrices;
use super::common::{
    self, texture_bind_group, texture_layout, FrameUniform, PointParams, UniformBinding,
};
use super::mesh::{skybox_layout, SKYBOX_CUBE};
use super::program::{compile_program, ProgramDesc, ProgramSlot};
use super::shaders;
use super::texture::Cubemap;

/// Background pass: a unit cube sampled from the cubemap.
///
/// Draw it after opaque geometry. It only covers pixels still at the far
/// plane (`LessEqual`, no depth write).
pub struct SkyboxRenderer {
    frame: UniformBinding<FrameUniform>,
    cubemap_layout: wgpu::BindGroupLayout,
    cubemap_bind_group: wgpu::BindGroup,
    cube_vbo: wgpu::Buffer,
    program: ProgramSlot,
}

impl SkyboxRenderer {
    pub fn new(device: &wgpu::Device, cubemap: &Cubemap) -> Self {
        let frame = UniformBinding::new(device, "sphaera skybox frame ubo", wgpu::ShaderStages::VERTEX);

        let cubemap_layout =
            texture_layout(device, "sphaera skybox cubemap bgl", wgpu::TextureViewDimension::Cube);
        let cubemap_bind_group = texture_bind_group(
            device,
            "sphaera skybox cubemap bind group",
            &cubemap_layout,
            &cubemap.view,
            &cubemap.sampler,
        );

        let cube_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphaera skybox vbo"),
            contents: bytemuck::cast_slice(&SKYBOX_CUBE),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            frame,
            cubemap_layout,
            cubemap_bind_group,
            cube_vbo,
            program: ProgramSlot::default(),
        }
    }

    /// Only pixels still at the far plane pass; the cube never writes depth.
    pub(crate) fn depth_state() -> wgpu::DepthStencilState {
        common::depth_state(false, wgpu::CompareFunction::LessEqual)
    }

    /// Compiles the skybox program for the current surface format.
    pub fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        let (frame, cubemap_layout) = (&self.frame, &self.cubemap_layout);
        self.program.get_or_compile(ctx.surface_format, || {
            compile_program(
                ctx.device,
                &ProgramDesc {
                    label: "sphaera skybox",
                    vertex_source: shaders::SKYBOX.vertex,
                    fragment_source: shaders::SKYBOX.fragment,
                    bind_group_layouts: &[&frame.layout, cubemap_layout],
                    vertex_buffers: &[skybox_layout()],
                    color_format: ctx.surface_format,
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    depth: Some(Self::depth_state()),
                },
            )
        });
    }

    pub fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, matrices: &FrameMatrices) {
        self.ensure_pipeline(ctx);
        let Some(pipeline) = self.program.get(ctx.surface_format) else { return };

        self.frame.write(
            ctx.queue,
            &FrameUniform::new(matrices, ctx.viewport, PointParams::default()),
        );

        let mut rpass = target.begin_pass("sphaera skybox pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &self.frame.bind_group, &[]);
        rpass.set_bind_group(1, &self.cubemap_bind_group, &[]);
        rpass.set_vertex_buffer(0, self.cube_vbo.slice(..));
        rpass.draw(0..SKYBOX_CUBE.len() as u32, 0..1);
    }
}
