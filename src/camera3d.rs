use crate::phases::Phases;
use glam::{Mat4, Vec2, Vec3, Vec4};
use winit::dpi::PhysicalSize;

const DEFAULT_UP: Vec3 = Vec3::Y;

pub const CAMERA_FOV_RADIANS: f32 = 75.0_f32.to_radians();
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

/// Resting distance of the camera from the origin.
pub const BASE_DEPTH: f32 = 5.0;
const TRANSFORM_DEPTH: f32 = 3.0;
const PYRAMID_DEPTH: f32 = 2.0;
const BALL_DEPTH: f32 = 6.0;
const PYRAMID_TRANSFORM_DEPTH: f32 = 4.0;
const DOLLY_EASE: f32 = 0.02;
const RETURN_EASE: f32 = 0.05;
const PARALLAX_EASE: f32 = 0.05;
const PARALLAX_SCALE: f32 = 0.5;

/// Half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction: direction.normalize_or_zero() }
    }

    /// Shortest distance from `point` to this ray. Points behind the origin measure
    /// to the origin itself.
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        let to_point = point - self.origin;
        let t = to_point.dot(self.direction).max(0.0);
        (to_point - self.direction * t).length()
    }
}

/// Perspective camera that always looks at a target.
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera3D {
    pub fn new(position: Vec3, target: Vec3, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self { position, target, up: DEFAULT_UP, fov_y_radians, near, far }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, aspect.max(0.0001), self.near, self.far)
    }

    pub fn view_projection(&self, viewport: PhysicalSize<u32>) -> Mat4 {
        self.projection_matrix(aspect_of(viewport)) * self.view_matrix()
    }

    /// World-space ray through a point given in normalized device coordinates.
    pub fn ndc_ray(&self, ndc: Vec2, aspect: f32) -> Option<Ray> {
        let clip = Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let inv_view_proj = (self.projection_matrix(aspect) * self.view_matrix()).inverse();
        let world = inv_view_proj * clip;
        if world.w.abs() < f32::EPSILON {
            return None;
        }
        let direction = (world.truncate() / world.w) - self.position;
        if direction.length_squared() <= f32::EPSILON {
            return None;
        }
        Some(Ray::new(self.position, direction))
    }

    /// Generates a world-space ray originating from the camera through a screen-space position.
    pub fn screen_ray(&self, screen: Vec2, viewport: PhysicalSize<u32>) -> Option<Ray> {
        if viewport.width == 0 || viewport.height == 0 {
            return None;
        }
        let ndc_x = (2.0 * screen.x / viewport.width as f32) - 1.0;
        let ndc_y = 1.0 - (2.0 * screen.y / viewport.height as f32);
        self.ndc_ray(Vec2::new(ndc_x, ndc_y), aspect_of(viewport))
    }

    pub fn project_point(&self, point: Vec3, viewport: PhysicalSize<u32>) -> Option<Vec2> {
        if viewport.width == 0 || viewport.height == 0 {
            return None;
        }
        let clip = self.view_projection(viewport) * point.extend(1.0);
        if clip.w.abs() < f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let x = (ndc.x + 1.0) * 0.5 * viewport.width as f32;
        let y = (1.0 - ndc.y) * 0.5 * viewport.height as f32;
        Some(Vec2::new(x, y))
    }
}

fn aspect_of(viewport: PhysicalSize<u32>) -> f32 {
    if viewport.height > 0 {
        viewport.width as f32 / viewport.height as f32
    } else {
        1.0
    }
}

/// Sum of per-phase depth contributions.
pub fn dolly_target(phases: &Phases) -> f32 {
    BASE_DEPTH
        + phases.transform * TRANSFORM_DEPTH
        + phases.pyramid * PYRAMID_DEPTH
        + phases.ball * BALL_DEPTH
        + phases.pyramid_transform * PYRAMID_TRANSFORM_DEPTH
}

/// Eases the camera along Z with the scroll phases and along X/Y with the pointer.
/// The two never write the same axis.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub camera: Camera3D,
}

impl CameraRig {
    pub fn new() -> Self {
        let camera = Camera3D::new(
            Vec3::new(0.0, 0.0, BASE_DEPTH),
            Vec3::ZERO,
            CAMERA_FOV_RADIANS,
            CAMERA_NEAR,
            CAMERA_FAR,
        );
        Self { camera }
    }

    pub fn dolly(&mut self, phases: &Phases) {
        let target = dolly_target(phases);
        self.camera.position.z += (target - self.camera.position.z) * DOLLY_EASE;
    }

    /// Drift back to the resting depth while the scene is idle.
    pub fn return_to_base(&mut self) {
        self.camera.position.z += (BASE_DEPTH - self.camera.position.z) * RETURN_EASE;
    }

    pub fn parallax(&mut self, pointer: Vec2) {
        let target = pointer * PARALLAX_SCALE;
        self.camera.position.x += (target.x - self.camera.position.x) * PARALLAX_EASE;
        self.camera.position.y += (target.y - self.camera.position.y) * PARALLAX_EASE;
        self.camera.target = Vec3::ZERO;
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera3d_view_projection_is_finite() {
        let camera = Camera3D::new(Vec3::new(0.0, 1.0, 5.0), Vec3::ZERO, 60.0_f32.to_radians(), 0.1, 1000.0);
        let vp = camera.view_projection(PhysicalSize::new(1280, 720));
        assert!(!vp.to_cols_array().iter().any(|v| v.is_nan() || v.is_infinite()));
    }

    #[test]
    fn dolly_target_spans_base_to_full() {
        assert_eq!(dolly_target(&Phases::from_progress(0.05)), 5.0);
        assert!((dolly_target(&Phases::from_progress(1.0)) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn dolly_eases_instead_of_snapping() {
        let mut rig = CameraRig::new();
        let phases = Phases::from_progress(1.0);
        rig.dolly(&phases);
        let z = rig.camera.position.z;
        assert!(z > BASE_DEPTH && z < 6.0);
        for _ in 0..2000 {
            rig.dolly(&phases);
        }
        assert!((rig.camera.position.z - 20.0).abs() < 1e-2);
    }

    #[test]
    fn parallax_leaves_depth_alone() {
        let mut rig = CameraRig::new();
        for _ in 0..500 {
            rig.parallax(Vec2::new(1.0, -1.0));
        }
        assert!((rig.camera.position.x - 0.5).abs() < 1e-3);
        assert!((rig.camera.position.y + 0.5).abs() < 1e-3);
        assert_eq!(rig.camera.position.z, BASE_DEPTH);
        assert_eq!(rig.camera.target, Vec3::ZERO);
    }

    #[test]
    fn center_ray_points_at_target() {
        let rig = CameraRig::new();
        let ray = rig.camera.ndc_ray(Vec2::ZERO, 16.0 / 9.0).expect("center ray");
        assert!(ray.distance_to_point(Vec3::ZERO) < 1e-3);
        assert!(ray.distance_to_point(Vec3::new(2.0, 0.0, 0.0)) > 1.5);
    }

    #[test]
    fn projected_origin_lands_mid_screen() {
        let rig = CameraRig::new();
        let size = PhysicalSize::new(800, 600);
        let screen = rig.camera.project_point(Vec3::ZERO, size).expect("projected");
        assert!((screen - Vec2::new(400.0, 300.0)).length() < 1e-2);
        let ray = rig.camera.screen_ray(screen, size).expect("ray");
        assert!(ray.distance_to_point(Vec3::ZERO) < 1e-3);
    }
}
