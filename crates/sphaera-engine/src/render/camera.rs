use glam::{Mat4, Vec3};

/// View and projection matrices supplied by the host each frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameMatrices {
    pub view: Mat4,
    pub projection: Mat4,
}

impl FrameMatrices {
    #[inline]
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self { view, projection }
    }

    /// Camera position in world space.
    ///
    /// A singular view matrix yields the origin.
    pub fn eye(&self) -> Vec3 {
        if self.view.determinant().abs() <= f32::EPSILON {
            return Vec3::ZERO;
        }
        self.view.inverse().w_axis.truncate()
    }
}

/// Scale that turns `radius / eye_distance` into a sprite size in pixels.
///
/// `window_height / tan(fov / 2)` with `fov_degrees` the vertical field of view.
pub fn point_scale(window_height: f32, fov_degrees: f32) -> f32 {
    window_height / (fov_degrees * 0.5).to_radians().tan()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_scale_at_ninety_degrees_is_window_height() {
        assert!((point_scale(600.0, 90.0) - 600.0).abs() < 1e-3);
    }

    #[test]
    fn point_scale_grows_as_fov_narrows() {
        let wide = point_scale(600.0, 90.0);
        let narrow = point_scale(600.0, 30.0);
        assert!(narrow > wide);
        // tan(15°) ≈ 0.267949
        assert!((narrow - 600.0 / 0.267_949).abs() < 0.5);
    }

    #[test]
    fn eye_is_recovered_from_look_at() {
        let eye = Vec3::new(3.0, 4.0, -2.0);
        let m = FrameMatrices::new(Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y), Mat4::IDENTITY);
        assert!((m.eye() - eye).length() < 1e-4);
    }

    #[test]
    fn singular_view_yields_origin() {
        let m = FrameMatrices::new(Mat4::ZERO, Mat4::IDENTITY);
        assert_eq!(m.eye(), Vec3::ZERO);
    }
}
