//! The single cube that idles at the center and later becomes the core of the grid.

use crate::phases::Phases;
use crate::time::TimeCache;
use glam::{EulerRot, Mat4, Quat, Vec3};

const SPIN_STEP: f32 = 0.01;
const BOB_AMPLITUDE: f32 = 0.3;
const MIN_ASSEMBLED_SCALE: f32 = 0.6;
/// Where the main object rests once the pyramid is formed.
pub const APEX: Vec3 = Vec3::new(0.0, 1.0, 0.0);

#[derive(Debug, Clone, PartialEq)]
pub struct MainObject {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
    pub visible: bool,
}

impl MainObject {
    pub fn new() -> Self {
        Self { position: Vec3::ZERO, rotation: Vec3::ZERO, scale: 1.0, visible: true }
    }

    /// Spin and bob while the page sits at the top.
    pub fn idle(&mut self, time: &TimeCache) {
        self.rotation.x += SPIN_STEP;
        self.rotation.y += SPIN_STEP;
        self.position.y = bob_height(time.now);
    }

    pub fn apply_assembly_scale(&mut self, phases: &Phases) {
        self.scale = 1.0 - phases.transform * (1.0 - MIN_ASSEMBLED_SCALE);
    }

    pub fn apply_phases(&mut self, phases: &Phases, time: &TimeCache) {
        if phases.ball > 0.0 || phases.pyramid_transform > 0.0 {
            self.visible = false;
            return;
        }
        self.visible = true;
        if phases.pyramid > 0.0 {
            let bob = Vec3::new(0.0, bob_height(time.now), 0.0);
            self.position = bob.lerp(APEX, phases.pyramid);
        }
    }

    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.visible = true;
    }

    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.position)
    }
}

impl Default for MainObject {
    fn default() -> Self {
        Self::new()
    }
}

fn bob_height(now: f32) -> f32 {
    now.sin() * BOB_AMPLITUDE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_spins_and_bobs() {
        let mut main = MainObject::new();
        main.idle(&TimeCache::at(std::f32::consts::FRAC_PI_2));
        main.idle(&TimeCache::at(std::f32::consts::FRAC_PI_2));
        assert!((main.rotation.x - 0.02).abs() < 1e-6);
        assert!((main.rotation.y - 0.02).abs() < 1e-6);
        assert!((main.position.y - 0.3).abs() < 1e-6);
    }

    #[test]
    fn assembly_shrinks_to_sixty_percent() {
        let mut main = MainObject::new();
        main.apply_assembly_scale(&Phases::from_progress(0.5));
        assert!((main.scale - 0.6).abs() < 1e-6);
        main.apply_assembly_scale(&Phases::from_progress(0.2));
        assert!((main.scale - 0.8).abs() < 1e-5);
    }

    #[test]
    fn hidden_during_ball_and_spinning_pyramid() {
        let time = TimeCache::at(0.0);
        let mut main = MainObject::new();
        main.apply_phases(&Phases::from_progress(0.7), &time);
        assert!(!main.visible);
        main.apply_phases(&Phases::from_progress(0.95), &time);
        assert!(!main.visible);
        main.apply_phases(&Phases::from_progress(0.6), &time);
        assert!(main.visible);
        assert!((main.position - APEX).length() < 1e-5);
    }
}
