//! Static WGSL sources, one vertex and one fragment source per program.
//!
//! Every vertex stage reads the group 0 frame uniform laid out as
//! `render::common::FrameUniform`. Its WGSL declaration lives once in
//! `frame.wgsl` and is prepended with `with_frame!`.

/// `frame.wgsl` followed by the named source.
macro_rules! with_frame {
    ($file:literal) => {
        concat!(include_str!("frame.wgsl"), include_str!($file))
    };
}

/// Vertex and fragment sources of one program.
#[derive(Debug, Copy, Clone)]
pub struct ProgramSource {
    pub vertex: &'static str,
    pub fragment: &'static str,
}

/// Fixed-size white points.
pub const POINTS: ProgramSource = ProgramSource {
    vertex: with_frame!("points.vert.wgsl"),
    fragment: include_str!("points.frag.wgsl"),
};

/// Fixed-size points colored from a per-particle color buffer.
pub const POINTS_COLORED: ProgramSource = ProgramSource {
    vertex: with_frame!("points_colored.vert.wgsl"),
    fragment: include_str!("points.frag.wgsl"),
};

/// Point-sprite spheres: textured, diffuse-lit.
pub const SPHERE_SPRITE: ProgramSource = ProgramSource {
    vertex: with_frame!("sprite.vert.wgsl"),
    fragment: include_str!("sprite.frag.wgsl"),
};

/// Sphere meshes reflecting the skybox.
pub const REFLECTIVE_OBJECT: ProgramSource = ProgramSource {
    vertex: with_frame!("reflect.vert.wgsl"),
    fragment: with_frame!("reflect.frag.wgsl"),
};

/// Cubemap background.
pub const SKYBOX: ProgramSource = ProgramSource {
    vertex: with_frame!("skybox.vert.wgsl"),
    fragment: include_str!("skybox.frag.wgsl"),
};

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ProgramSource; 5] = [POINTS, POINTS_COLORED, SPHERE_SPRITE, REFLECTIVE_OBJECT, SKYBOX];

    #[test]
    fn every_program_has_both_entry_points() {
        for program in ALL {
            assert!(program.vertex.contains("fn vs_main("));
            assert!(program.fragment.contains("fn fs_main("));
        }
    }

    #[test]
    fn frame_uniform_is_declared_once_per_stage() {
        for program in ALL {
            assert_eq!(program.vertex.matches("struct FrameUniform").count(), 1);
            assert!(program.fragment.matches("struct FrameUniform").count() <= 1);
        }
        assert!(REFLECTIVE_OBJECT.fragment.contains("struct FrameUniform"));
    }

    #[test]
    fn frame_fields_follow_the_rust_layout() {
        let prelude = include_str!("frame.wgsl");
        let order: Vec<usize> = ["view:", "projection:", "eye:", "viewport:", "point:"]
            .iter()
            .map(|field| prelude.find(field).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn sprite_uv_has_lower_left_origin() {
        // corner (0, 0) is offset by (-1, -1) in NDC, the bottom-left corner.
        assert!(SPHERE_SPRITE.vertex.contains("out.uv = corner;"));
        assert!(SPHERE_SPRITE
            .vertex
            .contains("(corner * 2.0 - vec2<f32>(1.0, 1.0))"));
    }

    #[test]
    fn sprite_light_direction_is_the_diagonal() {
        assert!(SPHERE_SPRITE
            .fragment
            .contains("vec3<f32>(0.577, 0.577, 0.577)"));
    }
}
