use crate::render::texture::TexturePaths;

/// Initial renderer state. Every field can also be changed later through the
/// matching `ParticleRenderer` setter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleRendererConfig {
    /// Point size in pixels for `DisplayMode::Points`.
    pub point_size: f32,
    /// Particle radius in world units for sprites and spheres.
    pub particle_radius: f32,
    /// Vertical field of view in degrees; must match the host projection.
    pub fov_degrees: f32,
    /// Window height in pixels used to size sprites.
    pub window_height: f32,
    pub textures: TexturePaths,
}

impl Default for ParticleRendererConfig {
    fn default() -> Self {
        Self {
            point_size: 1.0,
            particle_radius: 0.125 * 0.5,
            fov_degrees: 60.0,
            window_height: 600.0,
            textures: TexturePaths::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ParticleRendererConfig::default();
        assert_eq!(config.point_size, 1.0);
        assert_eq!(config.particle_radius, 0.0625);
        assert_eq!(config.fov_degrees, 60.0);
        assert_eq!(config.window_height, 600.0);
        assert_eq!(config.textures, TexturePaths::under("textures"));
    }
}
