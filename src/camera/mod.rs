/// Camera Module
///
/// Host-side camera used to produce the per-frame frustum planes.

pub mod frustum;

pub use frustum::Frustum;

use cgmath::{perspective, Deg, Matrix4, Point3, Vector3};

#[derive(Debug, Clone)]
pub struct CullingCamera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fovy: Deg<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl CullingCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Point3::new(0.0, 5.0, -15.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::unit_y(),
            fovy: Deg(45.0),
            aspect: width as f32 / height.max(1) as f32,
            znear: 0.1,
            zfar: 100.0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn build_view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn build_projection_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.build_projection_matrix() * self.build_view_matrix()
    }

    /// Frustum for the current frame
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.build_view_projection_matrix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_sees_its_target() {
        let camera = CullingCamera::new(1280, 720);
        let frustum = camera.frustum();

        assert!(frustum.intersects_aabb(Vector3::new(0.0, 0.0, 0.0), 0.475));
        // Behind the camera
        assert!(!frustum.intersects_aabb(Vector3::new(0.0, 10.0, -30.0), 0.475));
        // Beyond the far plane
        assert!(!frustum.intersects_aabb(Vector3::new(0.0, -30.0, 200.0), 0.475));
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut camera = CullingCamera::new(100, 100);
        camera.resize(200, 100);
        assert_eq!(camera.aspect, 2.0);

        camera.resize(200, 0);
        assert!(camera.aspect.is_finite());
    }
}
