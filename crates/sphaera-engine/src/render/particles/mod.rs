//! Particle renderer: points, lit sphere sprites, or reflective spheres,
//! with an optional skybox behind them.
//!
//! Positions come from outside (host slice or device buffer) as stride-4
//! `(x, y, z, w)` floats; `w` is ignored.

mod config;
mod points;
mod source;
mod sprites;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use glam::Mat4;

use crate::render::common::{depth_state, QuadBuffers, PARTICLE_STRIDE};
use crate::render::reflect::ReflectRenderer;
use crate::render::skybox::SkyboxRenderer;
use crate::render::texture::{load_cubemap, load_texture, Cubemap, Texture2d};
use crate::render::{FrameMatrices, RenderCtx, RenderTarget};

pub use config::ParticleRendererConfig;

use points::PointsPass;
use source::{HostInstanceBuffer, ParticleSource};
use sprites::{SpritePass, SpriteSizing};

/// How particles are drawn.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    /// Fixed-size screen-space points.
    #[default]
    Points,
    /// Camera-facing quads shaded as textured, lit spheres.
    Sprites,
    /// One reflective sphere mesh per particle.
    Spheres,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 3] = [DisplayMode::Points, DisplayMode::Sprites, DisplayMode::Spheres];

    /// The following mode, wrapping around.
    pub fn next(self) -> Self {
        match self {
            DisplayMode::Points => DisplayMode::Sprites,
            DisplayMode::Sprites => DisplayMode::Spheres,
            DisplayMode::Spheres => DisplayMode::Points,
        }
    }

    /// Depth test for this mode's pipeline. Every mode writes depth, which
    /// the skybox pass after `display` relies on.
    pub(crate) fn depth_state(self) -> wgpu::DepthStencilState {
        depth_state(true, wgpu::CompareFunction::Less)
    }

    pub fn name(self) -> &'static str {
        match self {
            DisplayMode::Points => "points",
            DisplayMode::Sprites => "sprites",
            DisplayMode::Spheres => "spheres",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown display mode name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDisplayModeError(String);

impl fmt::Display for ParseDisplayModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown display mode `{}` (expected points, sprites or spheres)",
            self.0
        )
    }
}

impl std::error::Error for ParseDisplayModeError {}

impl FromStr for DisplayMode {
    type Err = ParseDisplayModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DisplayMode::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseDisplayModeError(s.to_string()))
    }
}

/// Draws externally simulated particles and the environment around them.
///
/// Owns every GPU resource it creates; they are released on drop. Buffers
/// handed in through `set_vertex_buffer`/`set_color_buffer` stay shared with
/// the caller.
pub struct ParticleRenderer {
    source: ParticleSource,
    host_instances: HostInstanceBuffer,
    colors: Option<Arc<wgpu::Buffer>>,

    point_size: f32,
    particle_radius: f32,
    fov_degrees: f32,
    window_height: f32,

    quad: QuadBuffers,
    points: PointsPass,
    sprites: SpritePass,
    reflect: ReflectRenderer,
    skybox: SkyboxRenderer,
}

impl ParticleRenderer {
    /// Loads the sprite texture and the cubemap and compiles every program
    /// for `ctx.surface_format`.
    ///
    /// Missing or unreadable images are replaced by placeholders; a program
    /// that fails to compile is logged and its draws are skipped.
    pub fn new(ctx: &RenderCtx<'_>, config: ParticleRendererConfig) -> Self {
        let ParticleRendererConfig {
            point_size,
            particle_radius,
            fov_degrees,
            window_height,
            textures,
        } = config;

        let sprite_texture = load_texture(ctx, &textures.sprite).unwrap_or_else(|err| {
            log::warn!("{err}; using a plain white sprite texture");
            Texture2d::placeholder(ctx)
        });
        let cubemap = load_cubemap(ctx, &textures.cubemap).unwrap_or_else(|err| {
            log::warn!("{err}; using a flat placeholder skybox");
            Cubemap::placeholder(ctx)
        });

        let mut renderer = Self {
            source: ParticleSource::default(),
            host_instances: HostInstanceBuffer::default(),
            colors: None,
            point_size,
            particle_radius,
            fov_degrees,
            window_height,
            quad: QuadBuffers::new(ctx.device),
            points: PointsPass::new(ctx.device),
            sprites: SpritePass::new(ctx.device, &sprite_texture),
            reflect: ReflectRenderer::new(ctx.device, &cubemap),
            skybox: SkyboxRenderer::new(ctx.device, &cubemap),
        };

        renderer.points.ensure_pipelines(ctx);
        renderer.sprites.ensure_pipeline(ctx);
        renderer.reflect.ensure_pipeline(ctx);
        renderer.skybox.ensure_pipeline(ctx);

        log::info!("particle renderer ready ({:?})", ctx.surface_format);
        renderer
    }

    // ── particle data ──────────────────────────────────────────────────────

    /// Uses host-side positions: `num_particles` stride-4 vectors copied out of
    /// `positions` and uploaded on the next draw.
    ///
    /// Replaces any device buffer set before.
    pub fn set_positions(&mut self, positions: &[f32], num_particles: usize) {
        self.source = ParticleSource::host(positions, num_particles);
    }

    /// Uses a device buffer of stride-4 positions (`VERTEX` usage).
    ///
    /// Replaces any host positions set before.
    pub fn set_vertex_buffer(&mut self, buffer: Arc<wgpu::Buffer>, num_particles: usize) {
        self.source = ParticleSource::device(buffer, num_particles);
    }

    /// Per-particle RGBA colors for point mode with a device position buffer.
    pub fn set_color_buffer(&mut self, colors: Option<Arc<wgpu::Buffer>>) {
        self.colors = colors;
    }

    pub fn num_particles(&self) -> u32 {
        self.source.count()
    }

    // ── parameters ─────────────────────────────────────────────────────────

    pub fn set_point_size(&mut self, size: f32) {
        self.point_size = size;
    }

    pub fn set_particle_radius(&mut self, radius: f32) {
        self.particle_radius = radius;
    }

    pub fn set_fov(&mut self, fov_degrees: f32) {
        self.fov_degrees = fov_degrees;
    }

    pub fn set_window_height(&mut self, height: f32) {
        self.window_height = height;
    }

    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    pub fn particle_radius(&self) -> f32 {
        self.particle_radius
    }

    // ── drawing ────────────────────────────────────────────────────────────

    /// Draws the particles in `mode`. Nothing is drawn without particles.
    pub fn display(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        mode: DisplayMode,
        matrices: &FrameMatrices,
    ) {
        let Some((positions, count)) = self.host_instances.resolve(ctx, &mut self.source) else {
            return;
        };

        match mode {
            DisplayMode::Points => {
                let colors = if self.source.is_device() { self.colors.as_deref() } else { None };
                // A short color buffer limits how many points can be drawn.
                let count = colors.map_or(count, |c| count.min(color_capacity(c)));
                self.points.draw(
                    ctx,
                    target,
                    &self.quad,
                    matrices,
                    self.point_size,
                    &positions,
                    colors,
                    count,
                );
            }
            DisplayMode::Sprites => {
                let sizing = SpriteSizing {
                    radius: self.particle_radius,
                    fov_degrees: self.fov_degrees,
                    window_height: self.window_height,
                };
                self.sprites
                    .draw(ctx, target, &self.quad, matrices, sizing, &positions, count);
            }
            DisplayMode::Spheres => {
                self.reflect.draw_particles(
                    ctx,
                    target,
                    matrices,
                    &positions,
                    count,
                    self.particle_radius,
                );
            }
        }
    }

    /// `display` followed by the skybox behind the particles.
    pub fn display_with_skybox(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        mode: DisplayMode,
        matrices: &FrameMatrices,
    ) {
        self.display(ctx, target, mode, matrices);
        self.skybox.draw(ctx, target, matrices);
    }

    /// Draws one reflective unit sphere transformed by `model`.
    pub fn draw_sphere_object(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        view: Mat4,
        model: Mat4,
        projection: Mat4,
    ) {
        let matrices = FrameMatrices::new(view, projection);
        self.reflect.draw_object(ctx, target, &matrices, model);
    }

    /// Draws the background. Call after opaque geometry.
    pub fn draw_skybox(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        view: Mat4,
        projection: Mat4,
    ) {
        let matrices = FrameMatrices::new(view, projection);
        self.skybox.draw(ctx, target, &matrices);
    }
}

fn color_capacity(colors: &wgpu::Buffer) -> u32 {
    u32::try_from(colors.size() / PARTICLE_STRIDE).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_is_the_default_mode() {
        assert_eq!(DisplayMode::default(), DisplayMode::Points);
    }

    #[test]
    fn next_cycles_through_every_mode() {
        let mut mode = DisplayMode::Points;
        let mut seen = Vec::new();
        for _ in 0..DisplayMode::ALL.len() {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(mode, DisplayMode::Points);
        assert_eq!(seen, DisplayMode::ALL);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("sprites".parse::<DisplayMode>(), Ok(DisplayMode::Sprites));
        assert_eq!(" Spheres ".parse::<DisplayMode>(), Ok(DisplayMode::Spheres));
        assert_eq!("POINTS".parse::<DisplayMode>(), Ok(DisplayMode::Points));
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "lines".parse::<DisplayMode>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown display mode `lines` (expected points, sprites or spheres)"
        );
    }

    /// Applies `state` to one fragment at depth `incoming` against `stored`.
    fn depth_test(state: &wgpu::DepthStencilState, incoming: f32, stored: &mut f32) -> bool {
        use wgpu::CompareFunction as C;
        let passed = match state.depth_compare {
            C::Never => false,
            C::Less => incoming < *stored,
            C::Equal => incoming == *stored,
            C::LessEqual => incoming <= *stored,
            C::Greater => incoming > *stored,
            C::NotEqual => incoming != *stored,
            C::GreaterEqual => incoming >= *stored,
            C::Always => true,
        };
        if passed && state.depth_write_enabled {
            *stored = incoming;
        }
        passed
    }

    #[test]
    fn skybox_after_particles_leaves_them_visible() {
        let sky = SkyboxRenderer::depth_state();
        for mode in DisplayMode::ALL {
            let mut depth = 1.0;
            assert!(depth_test(&mode.depth_state(), 0.5, &mut depth), "{mode}");
            assert!(!depth_test(&sky, 1.0, &mut depth), "sky covered {mode}");
        }
    }

    #[test]
    fn skybox_fills_uncovered_pixels() {
        let mut depth = 1.0;
        assert!(depth_test(&SkyboxRenderer::depth_state(), 1.0, &mut depth));
        assert_eq!(depth, 1.0);
    }

    #[test]
    fn nearer_particle_hides_farther_one() {
        for mode in DisplayMode::ALL {
            let state = mode.depth_state();
            let mut depth = 1.0;
            assert!(depth_test(&state, 0.3, &mut depth));
            assert!(!depth_test(&state, 0.6, &mut depth), "{mode}");
        }
    }

    #[test]
    fn display_matches_name() {
        for mode in DisplayMode::ALL {
            assert_eq!(mode.to_string(), mode.name());
            assert_eq!(mode.to_string().parse::<DisplayMode>(), Ok(mode));
        }
    }
}
