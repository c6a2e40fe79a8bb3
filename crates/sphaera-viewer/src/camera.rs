//! Orbit camera around the particle cloud.

use glam::{Mat4, Vec3};
use sphaera_engine::render::FrameMatrices;

pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    /// Angle around +Y, radians.
    pub yaw: f32,
    /// Height of the eye over the orbit plane, as a fraction of `radius`.
    pub lift: f32,
    /// Radians per second.
    pub speed: f32,
    pub fov_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl OrbitCamera {
    pub fn new(target: Vec3, radius: f32, fov_degrees: f32) -> Self {
        Self {
            target,
            radius,
            yaw: 0.0,
            lift: 0.4,
            speed: 0.25,
            fov_degrees,
            znear: 0.05,
            zfar: radius * 20.0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.yaw = (self.yaw + self.speed * dt) % std::f32::consts::TAU;
    }

    pub fn eye(&self) -> Vec3 {
        let offset = Vec3::new(
            self.yaw.cos() * self.radius,
            self.radius * self.lift,
            self.yaw.sin() * self.radius,
        );
        self.target + offset
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, self.znear, self.zfar)
    }

    pub fn matrices(&self, aspect: f32) -> FrameMatrices {
        FrameMatrices::new(self.view(), self.projection(aspect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_stays_on_orbit() {
        let mut cam = OrbitCamera::new(Vec3::ZERO, 4.0, 60.0);
        for _ in 0..10 {
            cam.advance(0.3);
            let eye = cam.eye();
            let planar = Vec3::new(eye.x, 0.0, eye.z).length();
            assert!((planar - 4.0).abs() < 1e-4);
            assert!((eye.y - 1.6).abs() < 1e-4);
        }
    }

    #[test]
    fn matrices_agree_with_eye() {
        let cam = OrbitCamera::new(Vec3::new(1.0, 2.0, 3.0), 5.0, 60.0);
        let m = cam.matrices(16.0 / 9.0);
        assert!((m.eye() - cam.eye()).length() < 1e-3);
    }

    #[test]
    fn target_projects_to_screen_center() {
        let cam = OrbitCamera::new(Vec3::ZERO, 5.0, 60.0);
        let m = cam.matrices(1.0);
        let clip = m.projection * m.view * Vec3::ZERO.extend(1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }
}
