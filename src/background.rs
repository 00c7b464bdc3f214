//! Unlit backdrop sphere with swirling color bands.
//!
//! The mesh is a large sphere around the scene whose vertex colors spiral in hue from
//! pole to pole. Each frame the whole backdrop turns slowly around Y and is tinted by
//! a hue that drifts on the slow color clock.

use crate::mesh::{Mesh, MeshVertex};
use crate::time::TimeCache;
use crate::title::hsl_to_rgb;
use glam::{Mat4, Quat, Vec3, Vec4};
use std::f32::consts::{PI, TAU};

pub const BACKGROUND_RADIUS: f32 = 60.0;
const BACKGROUND_SEGMENTS: u32 = 48;
/// Hue turns per pole-to-pole sweep.
const SWIRL_TWIST: f32 = 1.5;
const BAND_SATURATION: f32 = 0.6;
const BAND_LIGHTNESS: f32 = 0.3;
const SPIN_RATE: f32 = 0.05;
const TINT_SATURATION: f32 = 0.35;
const TINT_LIGHTNESS: f32 = 0.8;

/// Sphere with inward normals and hue bands spiraling around the Y axis.
pub fn background_mesh() -> Mesh {
    let mut mesh = Mesh::sphere(BACKGROUND_RADIUS, BACKGROUND_SEGMENTS, BACKGROUND_SEGMENTS / 2, Vec4::ONE);
    for vertex in &mut mesh.vertices {
        let p = Vec3::from_array(vertex.position) / BACKGROUND_RADIUS;
        *vertex = MeshVertex::new(Vec3::from_array(vertex.position), -p, swirl_color(p));
    }
    mesh
}

fn swirl_color(unit: Vec3) -> Vec4 {
    let azimuth = unit.z.atan2(unit.x) / TAU;
    let polar = unit.y.clamp(-1.0, 1.0).acos() / PI;
    let hue = (azimuth + polar * SWIRL_TWIST).rem_euclid(1.0);
    let lightness = BAND_LIGHTNESS + (polar * PI * 6.0).sin() * 0.05;
    hsl_to_rgb(hue, BAND_SATURATION, lightness).extend(1.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub rotation: f32,
    pub tint: Vec3,
}

impl Background {
    pub fn new() -> Self {
        let mut background = Self { rotation: 0.0, tint: Vec3::ONE };
        background.update(&TimeCache::default());
        background
    }

    pub fn update(&mut self, time: &TimeCache) {
        let c = time.color;
        self.rotation = c * SPIN_RATE * TAU;
        let hue = (c * 0.05 + (c * 0.3).sin() * 0.03).rem_euclid(1.0);
        self.tint = hsl_to_rgb(hue, TINT_SATURATION, TINT_LIGHTNESS);
    }

    /// Follows the camera so the backdrop never gets closer.
    pub fn model_matrix(&self, eye: Vec3) -> Mat4 {
        Mat4::from_rotation_translation(Quat::from_rotation_y(self.rotation), eye)
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::new()
    }
}
