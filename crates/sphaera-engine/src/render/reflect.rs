//! Reflective sphere meshes sampling the skybox cubemap.
//!
//! Used twice per frame at most: once for every particle (sphere display
//! mode) and once for the standalone sphere object. Each use owns its own
//! uniforms, the pipeline and mesh are shared.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::render::{RenderCtx, RenderTarget};

use super::camera::FrameMatrices;
use super::common::{
    instance_layout, texture_bind_group, texture_layout, FrameUniform, PointParams,
    UniformBinding, POSITION_AT_2,
};
use super::mesh::{Mesh, MeshVertex};
use super::particles::DisplayMode;
use super::program::{compile_program, ProgramDesc, ProgramSlot};
use super::shaders;
use super::texture::Cubemap;

const SPHERE_STACKS: u32 = 16;
const SPHERE_SLICES: u32 = 24;

/// Group 1 uniform of the reflective program.
///
/// Layout (80 bytes):
///
///  offset  0  model   mat4x4
///  offset 64  params  vec4   (.x = mesh scale)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ObjectUniform {
    model: [[f32; 4]; 4],
    params: [f32; 4],
}

impl ObjectUniform {
    fn new(model: Mat4, scale: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            params: [scale, 0.0, 0.0, 0.0],
        }
    }
}

struct PassUniforms {
    frame: UniformBinding<FrameUniform>,
    object: UniformBinding<ObjectUniform>,
}

/// Where the sphere instances come from.
#[derive(Copy, Clone)]
enum Instances<'a> {
    /// One sphere at the model origin.
    Origin,
    /// One sphere per particle, centered on its position.
    Particles(&'a wgpu::Buffer, u32),
}

pub struct ReflectRenderer {
    particles: PassUniforms,
    object: PassUniforms,

    cubemap_layout: wgpu::BindGroupLayout,
    cubemap_bind_group: wgpu::BindGroup,

    sphere_vbo: wgpu::Buffer,
    sphere_ibo: wgpu::Buffer,
    sphere_index_count: u32,
    origin_vbo: wgpu::Buffer,

    program: ProgramSlot,
}

impl ReflectRenderer {
    pub fn new(device: &wgpu::Device, cubemap: &Cubemap) -> Self {
        let particles = PassUniforms {
            frame: UniformBinding::new(
                device,
                "sphaera reflect particles frame ubo",
                wgpu::ShaderStages::VERTEX_FRAGMENT,
            ),
            object: UniformBinding::new(
                device,
                "sphaera reflect particles object ubo",
                wgpu::ShaderStages::VERTEX,
            ),
        };
        let object = PassUniforms {
            frame: particles.frame.sibling(device, "sphaera reflect object frame ubo"),
            object: particles.object.sibling(device, "sphaera reflect object object ubo"),
        };

        let cubemap_layout =
            texture_layout(device, "sphaera reflect cubemap bgl", wgpu::TextureViewDimension::Cube);
        let cubemap_bind_group = texture_bind_group(
            device,
            "sphaera reflect cubemap bind group",
            &cubemap_layout,
            &cubemap.view,
            &cubemap.sampler,
        );

        let sphere = Mesh::uv_sphere(SPHERE_STACKS, SPHERE_SLICES);
        let sphere_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphaera sphere vbo"),
            contents: bytemuck::cast_slice(&sphere.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let sphere_ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphaera sphere ibo"),
            contents: bytemuck::cast_slice(&sphere.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let origin_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphaera sphere origin instance"),
            contents: bytemuck::cast_slice(&[0.0f32, 0.0, 0.0, 1.0]),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            particles,
            object,
            cubemap_layout,
            cubemap_bind_group,
            sphere_vbo,
            sphere_ibo,
            sphere_index_count: sphere.index_count(),
            origin_vbo,
            program: ProgramSlot::default(),
        }
    }

    /// One sphere of world radius `radius` per particle in `positions`.
    pub fn draw_particles(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        matrices: &FrameMatrices,
        positions: &wgpu::Buffer,
        count: u32,
        radius: f32,
    ) {
        if count == 0 {
            return;
        }
        let uniform = ObjectUniform::new(Mat4::IDENTITY, radius);
        self.draw(ctx, target, matrices, uniform, Instances::Particles(positions, count));
    }

    /// One unit sphere transformed by `model`.
    pub fn draw_object(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        matrices: &FrameMatrices,
        model: Mat4,
    ) {
        let uniform = ObjectUniform::new(model, 1.0);
        self.draw(ctx, target, matrices, uniform, Instances::Origin);
    }

    /// Compiles the reflective program for the current surface format.
    pub fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        let (uniforms, cubemap_layout) = (&self.particles, &self.cubemap_layout);
        self.program.get_or_compile(ctx.surface_format, || {
            compile_program(
                ctx.device,
                &ProgramDesc {
                    label: "sphaera reflective sphere",
                    vertex_source: shaders::REFLECTIVE_OBJECT.vertex,
                    fragment_source: shaders::REFLECTIVE_OBJECT.fragment,
                    bind_group_layouts: &[
                        &uniforms.frame.layout,
                        &uniforms.object.layout,
                        cubemap_layout,
                    ],
                    vertex_buffers: &[MeshVertex::layout(), instance_layout(&POSITION_AT_2)],
                    color_format: ctx.surface_format,
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: Some(wgpu::Face::Back),
                    depth: Some(DisplayMode::Spheres.depth_state()),
                },
            )
        });
    }

    fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        matrices: &FrameMatrices,
        object_uniform: ObjectUniform,
        instances: Instances<'_>,
    ) {
        self.ensure_pipeline(ctx);
        let Some(pipeline) = self.program.get(ctx.surface_format) else { return };

        let (uniforms, instance_buffer, count) = match instances {
            Instances::Origin => (&self.object, &self.origin_vbo, 1),
            Instances::Particles(buffer, count) => (&self.particles, buffer, count),
        };

        uniforms.frame.write(
            ctx.queue,
            &FrameUniform::new(matrices, ctx.viewport, PointParams::default()),
        );
        uniforms.object.write(ctx.queue, &object_uniform);

        let mut rpass = target.begin_pass("sphaera reflect pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &uniforms.frame.bind_group, &[]);
        rpass.set_bind_group(1, &uniforms.object.bind_group, &[]);
        rpass.set_bind_group(2, &self.cubemap_bind_group, &[]);
        rpass.set_vertex_buffer(0, self.sphere_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_buffer.slice(..));
        rpass.set_index_buffer(self.sphere_ibo.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.sphere_index_count, 0, 0..count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn object_uniform_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 80);
        assert_eq!(std::mem::size_of::<ObjectUniform>() % 16, 0);
    }

    #[test]
    fn object_uniform_stores_model_columns_and_scale() {
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let u = ObjectUniform::new(model, 0.25);
        assert_eq!(u.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(u.params[0], 0.25);
    }
}
