//! Where particle positions come from and how they reach the GPU.

use std::sync::Arc;

use crate::render::common::PARTICLE_STRIDE;
use crate::render::RenderCtx;

const FLOATS_PER_PARTICLE: usize = 4;

/// Copies the first `num_particles` stride-4 vectors out of `positions`.
///
/// The count is clamped to the whole vectors actually present.
pub(super) fn pack_positions(positions: &[f32], num_particles: usize) -> Vec<f32> {
    let available = positions.len() / FLOATS_PER_PARTICLE;
    if num_particles > available {
        log::warn!(
            "set_positions: {num_particles} particles requested, only {available} in a {}-float slice",
            positions.len()
        );
    }
    let count = num_particles.min(available);
    positions[..count * FLOATS_PER_PARTICLE].to_vec()
}

/// Clamps `num_particles` to what a buffer of `buffer_size` bytes holds.
pub(super) fn clamp_device_count(buffer_size: u64, num_particles: usize) -> u32 {
    let available = buffer_size / PARTICLE_STRIDE;
    let requested = num_particles as u64;
    if requested > available {
        log::warn!(
            "set_vertex_buffer: {requested} particles requested, buffer of {buffer_size} bytes holds {available}"
        );
    }
    u32::try_from(requested.min(available)).unwrap_or(u32::MAX)
}

/// Particle positions as last handed to the renderer.
#[derive(Default)]
pub(super) enum ParticleSource {
    #[default]
    Empty,
    /// Host copy, uploaded into the renderer's own instance buffer on draw.
    Host(HostPositions),
    /// Caller-owned device buffer of stride-4 floats.
    Device { buffer: Arc<wgpu::Buffer>, count: u32 },
}

impl ParticleSource {
    pub(super) fn host(positions: &[f32], num_particles: usize) -> Self {
        ParticleSource::Host(HostPositions {
            data: pack_positions(positions, num_particles),
            uploaded: false,
        })
    }

    pub(super) fn device(buffer: Arc<wgpu::Buffer>, num_particles: usize) -> Self {
        let count = clamp_device_count(buffer.size(), num_particles);
        ParticleSource::Device { buffer, count }
    }

    pub(super) fn count(&self) -> u32 {
        match self {
            ParticleSource::Empty => 0,
            ParticleSource::Host(host) => host.count(),
            ParticleSource::Device { count, .. } => *count,
        }
    }

    pub(super) fn is_device(&self) -> bool {
        matches!(self, ParticleSource::Device { .. })
    }
}

pub(super) struct HostPositions {
    data: Vec<f32>,
    uploaded: bool,
}

impl HostPositions {
    fn count(&self) -> u32 {
        u32::try_from(self.data.len() / FLOATS_PER_PARTICLE).unwrap_or(u32::MAX)
    }
}

/// Instance buffer backing host-side positions. Grows, never shrinks.
#[derive(Default)]
pub(super) struct HostInstanceBuffer {
    vbo: Option<Arc<wgpu::Buffer>>,
    capacity: usize,
}

impl HostInstanceBuffer {
    fn ensure_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.capacity && self.vbo.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(64);
        self.vbo = Some(Arc::new(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sphaera particle instance vbo"),
            size: new_cap as u64 * PARTICLE_STRIDE,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })));
        self.capacity = new_cap;
    }

    /// Returns the buffer to draw from and the particle count, or `None`
    /// when there is nothing to draw.
    pub(super) fn resolve(
        &mut self,
        ctx: &RenderCtx<'_>,
        source: &mut ParticleSource,
    ) -> Option<(Arc<wgpu::Buffer>, u32)> {
        match source {
            ParticleSource::Empty => None,
            ParticleSource::Device { count: 0, .. } => None,
            ParticleSource::Device { buffer, count } => Some((Arc::clone(buffer), *count)),
            ParticleSource::Host(host) => {
                let count = host.count();
                if count == 0 {
                    return None;
                }
                if !host.uploaded {
                    self.ensure_capacity(ctx, count as usize);
                    let vbo = self.vbo.as_ref()?;
                    ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&host.data));
                    host.uploaded = true;
                }
                self.vbo.as_ref().map(|vbo| (Arc::clone(vbo), count))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_copies_whole_vectors() {
        let positions: Vec<f32> = (0..12).map(|i| i as f32).collect();
        assert_eq!(pack_positions(&positions, 2), positions[..8].to_vec());
    }

    #[test]
    fn pack_clamps_to_available_vectors() {
        // 2.5 vectors: the trailing partial one is dropped.
        let positions = [1.0f32; 10];
        assert_eq!(pack_positions(&positions, 5).len(), 8);
    }

    #[test]
    fn pack_of_empty_input_is_empty() {
        assert!(pack_positions(&[], 10).is_empty());
        assert!(pack_positions(&[1.0; 8], 0).is_empty());
    }

    #[test]
    fn host_source_counts_packed_particles() {
        let source = ParticleSource::host(&[0.0; 16], 3);
        assert_eq!(source.count(), 3);
        assert!(!source.is_device());
    }

    #[test]
    fn device_count_is_clamped_to_buffer_size() {
        assert_eq!(clamp_device_count(160, 5), 5);
        assert_eq!(clamp_device_count(160, 100), 10);
        assert_eq!(clamp_device_count(15, 1), 0);
    }

    #[test]
    fn empty_source_has_no_particles() {
        assert_eq!(ParticleSource::default().count(), 0);
    }
}
