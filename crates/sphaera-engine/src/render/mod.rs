//! GPU rendering subsystem.
//!
//! Renderers own their GPU resources (pipelines, buffers, textures) and record
//! their own render passes into a `RenderTarget` whose color and depth
//! attachments were cleared at the start of the frame.
//!
//! Convention:
//! - World space is right-handed; the host supplies view and projection.
//! - Particle data is stride-4 `(x, y, z, w)` floats.

mod camera;
mod common;
mod ctx;
mod mesh;
mod program;
mod reflect;
mod skybox;

pub mod particles;
pub mod shaders;
pub mod texture;

pub use camera::{point_scale, FrameMatrices};
pub use common::PARTICLE_STRIDE;
pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::{Mesh, MeshVertex, SKYBOX_CUBE};
pub use particles::{DisplayMode, ParseDisplayModeError, ParticleRenderer, ParticleRendererConfig};
pub use program::{compile_program, ProgramDesc};
pub use reflect::ReflectRenderer;
pub use skybox::SkyboxRenderer;
pub use texture::{CubemapPaths, TextureError, TexturePaths};
