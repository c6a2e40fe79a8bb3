//! Shared GPU types and helpers used by the particle, skybox and
//! reflective-object renderers.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::Viewport;
use crate::device::DEPTH_FORMAT;

use super::camera::FrameMatrices;

/// Bytes per particle in a position (or color) buffer: `(x, y, z, w)` floats.
pub const PARTICLE_STRIDE: u64 = std::mem::size_of::<[f32; 4]>() as u64;

// ── quad vertex ───────────────────────────────────────────────────────────

/// Corner of the unit quad expanded into a point or sprite.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct QuadVertex {
    pub corner: [f32; 2], // 0..1, (0, 0) = lower left
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub(super) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { corner: [0.0, 0.0] },
    QuadVertex { corner: [1.0, 0.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [0.0, 1.0] },
];

pub(super) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Static vertex + index buffers of the unit quad.
pub(super) struct QuadBuffers {
    pub vbo: wgpu::Buffer,
    pub ibo: wgpu::Buffer,
}

impl QuadBuffers {
    pub(super) fn new(device: &wgpu::Device) -> Self {
        Self {
            vbo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sphaera quad vbo"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            ibo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sphaera quad ibo"),
                contents: bytemuck::cast_slice(&QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            }),
        }
    }
}

// ── per-particle instance data ────────────────────────────────────────────

pub(super) const POSITION_AT_1: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x4];
pub(super) const POSITION_AT_2: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x4];
pub(super) const COLOR_AT_2: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x4];

/// Per-instance layout over a stride-4 float buffer.
pub(super) fn instance_layout(
    attributes: &'static [wgpu::VertexAttribute],
) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: PARTICLE_STRIDE,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes,
    }
}

// ── frame uniform ─────────────────────────────────────────────────────────

/// Point/sprite sizing parameters.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub(super) struct PointParams {
    /// Point size in pixels (point mode).
    pub size: f32,
    /// `window_height / tan(fov / 2)`; converts world radius over distance to pixels.
    pub scale: f32,
    /// Particle radius in world units (sprite and sphere modes).
    pub radius: f32,
}

/// Group 0 uniform shared by every program.
///
/// Layout (176 bytes):
///
///  offset   0  view        mat4x4
///  offset  64  projection  mat4x4
///  offset 128  eye         vec4   (.xyz = camera position)
///  offset 144  viewport    vec4   (.xy  = logical size)
///  offset 160  point       vec4   (.x = size px, .y = scale, .z = radius)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct FrameUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub eye: [f32; 4],
    pub viewport: [f32; 4],
    pub point: [f32; 4],
}

impl FrameUniform {
    pub(super) fn new(matrices: &FrameMatrices, viewport: Viewport, point: PointParams) -> Self {
        let [w, h] = viewport.to_array();
        Self {
            view: matrices.view.to_cols_array_2d(),
            projection: matrices.projection.to_cols_array_2d(),
            eye: matrices.eye().extend(1.0).to_array(),
            viewport: [w, h, 0.0, 0.0],
            point: [point.size, point.scale, point.radius, 0.0],
        }
    }
}

/// The `wgpu` minimum binding size for a uniform of type `T`.
pub(super) fn uniform_min_binding_size<T: Pod>() -> Option<wgpu::BufferSize> {
    wgpu::BufferSize::new(std::mem::size_of::<T>() as u64)
}

pub(super) fn uniform_layout_entry<T: Pod>(
    binding: u32,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: uniform_min_binding_size::<T>(),
        },
        count: None,
    }
}

/// A uniform buffer plus the single-entry bind group exposing it.
///
/// Every pass owns its own binding: queued buffer writes all land before the
/// frame's command buffer runs, so two passes sharing one buffer would both
/// see the last write.
pub(super) struct UniformBinding<T> {
    pub layout: wgpu::BindGroupLayout,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Pod> UniformBinding<T> {
    pub(super) fn new(device: &wgpu::Device, label: &str, visibility: wgpu::ShaderStages) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[uniform_layout_entry::<T>(0, visibility)],
        });

        Self::with_layout(device, label, layout)
    }

    /// A second binding with the same layout, for another pass of the same pipeline.
    pub(super) fn sibling(&self, device: &wgpu::Device, label: &str) -> Self {
        Self::with_layout(device, label, self.layout.clone())
    }

    fn with_layout(device: &wgpu::Device, label: &str, layout: wgpu::BindGroupLayout) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<T>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            layout,
            buffer,
            bind_group,
            _marker: std::marker::PhantomData,
        }
    }

    pub(super) fn write(&self, queue: &wgpu::Queue, value: &T) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(value));
    }
}

// ── sampled textures ──────────────────────────────────────────────────────

/// Layout of a texture (binding 0) + filtering sampler (binding 1) pair.
pub(super) fn texture_layout(
    device: &wgpu::Device,
    label: &str,
    view_dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

pub(super) fn texture_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

// ── depth ─────────────────────────────────────────────────────────────────

pub(super) fn depth_state(write: bool, compare: wgpu::CompareFunction) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    #[test]
    fn frame_uniform_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<FrameUniform>(), 176);
        assert_eq!(std::mem::size_of::<FrameUniform>() % 16, 0);
    }

    #[test]
    fn particle_stride_matches_vec4() {
        assert_eq!(PARTICLE_STRIDE, 16);
        assert_eq!(instance_layout(&POSITION_AT_1).array_stride, 16);
    }

    #[test]
    fn frame_uniform_packs_eye_and_point_params() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let matrices = FrameMatrices::new(view, Mat4::IDENTITY);
        let params = PointParams { size: 2.0, scale: 3.0, radius: 0.5 };
        let u = FrameUniform::new(&matrices, Viewport::new(800.0, 600.0), params);

        assert!((u.eye[2] - 5.0).abs() < 1e-5);
        assert_eq!(u.eye[3], 1.0);
        assert_eq!(u.viewport, [800.0, 600.0, 0.0, 0.0]);
        assert_eq!(u.point, [2.0, 3.0, 0.5, 0.0]);
    }

    #[test]
    fn quad_indices_cover_two_triangles() {
        assert_eq!(QUAD_INDICES.len(), 6);
        assert!(QUAD_INDICES.iter().all(|&i| (i as usize) < QUAD_VERTICES.len()));
    }
}
