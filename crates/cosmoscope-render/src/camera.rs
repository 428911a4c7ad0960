//! Camera and view management.

use glam::{Mat4, Vec3};

/// World up axis. COSMO geometries are viewed with +Z up.
pub const WORLD_UP: Vec3 = Vec3::Z;

/// Default direction from the target towards the camera: an isometric view.
pub const ISOMETRIC_VIEW: Vec3 = Vec3::ONE;

/// An orthographic camera.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Half of the visible height in world units.
    pub ortho_scale: f32,
}

impl Camera {
    /// Creates a new camera with default settings.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: ISOMETRIC_VIEW,
            target: Vec3::ZERO,
            up: WORLD_UP,
            aspect_ratio,
            near: 0.01,
            far: 1000.0,
            ortho_scale: 1.0,
        }
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Returns the projection matrix. Depth maps to `[0, 1]` between near and far.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        let half_height = self.ortho_scale;
        let half_width = half_height * self.aspect_ratio;
        Mat4::orthographic_rh(
            -half_width,
            half_width,
            -half_height,
            half_height,
            self.near,
            self.far,
        )
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Returns the camera's forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Points the camera at the given bounding box from the isometric direction.
    pub fn look_at_box(&mut self, min: Vec3, max: Vec3) {
        self.look_at_box_from(min, max, ISOMETRIC_VIEW);
    }

    /// Points the camera at the given bounding box, placing it along `view_dir` from the
    /// box center, and fits the orthographic scale so the whole box is visible.
    ///
    /// A `view_dir` parallel to the up vector falls back to the isometric direction.
    pub fn look_at_box_from(&mut self, min: Vec3, max: Vec3, view_dir: Vec3) {
        let center = (min + max) * 0.5;
        let size = (max - min).length().max(1e-3);

        let mut dir = view_dir.normalize_or_zero();
        if dir == Vec3::ZERO || dir.cross(self.up).length_squared() < 1e-8 {
            dir = ISOMETRIC_VIEW.normalize();
            if dir.cross(self.up).length_squared() < 1e-8 {
                dir = self.up.any_orthonormal_vector();
            }
        }

        self.target = center;
        self.position = center + dir * size * 1.5;
        self.near = size * 0.25;
        self.far = size * 3.0;

        // Fit the projected box corners, with a small margin.
        let view = self.view_matrix();
        let (mut half_w, mut half_h) = (0.0f32, 0.0f32);
        for corner in 0..8u8 {
            let p = Vec3::new(
                if corner & 1 == 0 { min.x } else { max.x },
                if corner & 2 == 0 { min.y } else { max.y },
                if corner & 4 == 0 { min.z } else { max.z },
            );
            let v = view.transform_point3(p);
            half_w = half_w.max(v.x.abs());
            half_h = half_h.max(v.y.abs());
        }
        let aspect = if self.aspect_ratio > 0.0 {
            self.aspect_ratio
        } else {
            1.0
        };
        self.ortho_scale = (half_h.max(half_w / aspect) * 1.05).max(1e-3);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(4.0 / 3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_defaults() {
        let camera = Camera::default();
        assert_eq!(camera.up, WORLD_UP);
        assert!((camera.aspect_ratio - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_projection_is_orthographic() {
        let mut camera = Camera::new(1.0);
        camera.ortho_scale = 5.0;
        let proj = camera.projection_matrix();
        // Orthographic matrix has w_axis.w = 1.0
        assert!((proj.w_axis.w - 1.0).abs() < 0.001);
        assert!(proj.z_axis.w.abs() < 0.001);
    }

    #[test]
    fn test_look_at_box_contains_corners() {
        let mut camera = Camera::new(4.0 / 3.0);
        let min = Vec3::new(-1.0, -2.0, -0.5);
        let max = Vec3::new(3.0, 1.0, 2.5);
        camera.look_at_box(min, max);
        assert!((camera.target - (min + max) * 0.5).length() < 1e-5);

        let vp = camera.view_projection_matrix();
        for corner in [min, max, Vec3::new(min.x, max.y, min.z), Vec3::new(max.x, min.y, max.z)] {
            let ndc = vp.project_point3(corner);
            assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0, "{ndc:?}");
            assert!((0.0..=1.0).contains(&ndc.z), "{ndc:?}");
        }
    }

    #[test]
    fn test_view_along_up_falls_back() {
        let mut camera = Camera::new(1.0);
        camera.look_at_box_from(Vec3::ZERO, Vec3::ONE, Vec3::Z);
        assert!(camera.forward().is_finite());
        assert!(camera.forward().cross(camera.up).length() > 1e-3);
    }

    #[test]
    fn test_degenerate_box() {
        let mut camera = Camera::new(1.0);
        camera.look_at_box(Vec3::ONE, Vec3::ONE);
        assert!(camera.ortho_scale > 0.0);
        assert!(camera.far > camera.near);
        let ndc = camera.view_projection_matrix().project_point3(Vec3::ONE);
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
    }
}
