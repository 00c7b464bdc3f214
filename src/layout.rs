//! Target positions for every arrangement the pieces move through.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Distance between neighbouring cells in the assembled cube.
pub const GRID_SPACING: f32 = 1.0;
/// Multiplier applied to grid coordinates for the scattered start.
pub const SPREAD_FACTOR: f32 = 8.0;
/// Fixed slots in the four-layer pyramid.
pub const PYRAMID_SLOT_COUNT: usize = 15;
pub const PYRAMID_RING_RADIUS: f32 = 2.5;
pub const PYRAMID_RING_Y: f32 = -2.5;
const PYRAMID_RING_SEGMENTS: f32 = 6.0;
/// Fraction of a turn between consecutive sphere-cloud samples.
const GOLDEN_TURN: f32 = 0.618;

const PYRAMID_SLOTS: [Vec3; PYRAMID_SLOT_COUNT] = [
    // 3x3 base
    Vec3::new(-1.0, -2.0, -1.0),
    Vec3::new(0.0, -2.0, -1.0),
    Vec3::new(-1.0, -2.0, 0.0),
    Vec3::new(0.0, -2.0, 0.0),
    Vec3::new(-1.0, -2.0, 1.0),
    Vec3::new(0.0, -2.0, 1.0),
    Vec3::new(1.0, -2.0, -1.0),
    Vec3::new(1.0, -2.0, 0.0),
    Vec3::new(1.0, -2.0, 1.0),
    // 2x2
    Vec3::new(-0.5, -1.0, -0.5),
    Vec3::new(0.5, -1.0, -0.5),
    Vec3::new(-0.5, -1.0, 0.5),
    Vec3::new(0.5, -1.0, 0.5),
    // single
    Vec3::new(0.0, 0.0, 0.0),
    // apex
    Vec3::new(0.0, 1.0, 0.0),
];

/// One cell of the 3x3x3 grid that becomes a separate piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub coords: Vec3,
}

impl GridCell {
    pub fn initial_position(&self) -> Vec3 {
        self.coords * GRID_SPACING * SPREAD_FACTOR
    }

    pub fn target_position(&self) -> Vec3 {
        self.coords * GRID_SPACING
    }
}

/// Walks the 3x3x3 grid in x, y, z order, skipping the center (the main object)
/// and optionally the +x face.
pub fn grid_cells(skip_positive_x_face: bool) -> Vec<GridCell> {
    let mut cells = Vec::with_capacity(26);
    for x in -1..=1 {
        for y in -1..=1 {
            for z in -1..=1 {
                if x == 0 && y == 0 && z == 0 {
                    continue;
                }
                if skip_positive_x_face && x == 1 {
                    continue;
                }
                cells.push(GridCell { coords: Vec3::new(x as f32, y as f32, z as f32) });
            }
        }
    }
    cells
}

/// Slot in the pyramid arrangement. Indices past the fixed slots are spread on a ring
/// around the base.
pub fn pyramid_position(index: usize) -> Vec3 {
    if let Some(slot) = PYRAMID_SLOTS.get(index) {
        return *slot;
    }
    let angle = (index - PYRAMID_SLOT_COUNT) as f32 * (TAU / PYRAMID_RING_SEGMENTS);
    Vec3::new(angle.cos() * PYRAMID_RING_RADIUS, PYRAMID_RING_Y, angle.sin() * PYRAMID_RING_RADIUS)
}

/// Point in the floating sphere cloud: golden-angle spiral in azimuth, randomized
/// radius, polar angle and height drawn from `rng`.
pub fn ball_position(index: usize, rng: &mut impl Rng) -> Vec3 {
    let radius = 4.0 + rng.gen::<f32>() * 6.0;
    let theta = index as f32 * GOLDEN_TURN * TAU;
    let phi = (1.0 - 2.0 * rng.gen::<f32>()).clamp(-1.0, 1.0).acos();
    let y = (rng.gen::<f32>() - 0.5) * 8.0;
    Vec3::new(radius * phi.sin() * theta.cos(), y, radius * phi.sin() * theta.sin())
}

/// Deterministic sphere-cloud positions for `count` items.
pub fn ball_positions(count: usize, seed: u64) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|index| ball_position(index, &mut rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_skips_center_and_positive_face() {
        let cells = grid_cells(true);
        assert_eq!(cells.len(), 17);
        assert!(cells.iter().all(|c| c.coords.x < 1.0));
        assert!(cells.iter().all(|c| c.coords != Vec3::ZERO));
        assert_eq!(grid_cells(false).len(), 26);
    }

    #[test]
    fn spread_start_is_scaled_grid() {
        let cell = GridCell { coords: Vec3::new(-1.0, 0.0, 1.0) };
        assert_eq!(cell.initial_position(), Vec3::new(-8.0, 0.0, 8.0));
        assert_eq!(cell.target_position(), Vec3::new(-1.0, 0.0, 1.0));
    }

    #[test]
    fn pyramid_slots_are_stable() {
        for index in 0..30 {
            assert_eq!(pyramid_position(index), pyramid_position(index));
        }
        assert_eq!(pyramid_position(14), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn overflow_items_land_on_ring() {
        for index in PYRAMID_SLOT_COUNT..40 {
            let p = pyramid_position(index);
            assert_eq!(p.y, PYRAMID_RING_Y);
            let radius = (p.x * p.x + p.z * p.z).sqrt();
            assert!((radius - PYRAMID_RING_RADIUS).abs() < 1e-5);
        }
        let first = pyramid_position(PYRAMID_SLOT_COUNT);
        assert!((first - Vec3::new(PYRAMID_RING_RADIUS, PYRAMID_RING_Y, 0.0)).length() < 1e-5);
    }

    #[test]
    fn ball_cloud_is_seeded_and_bounded() {
        let a = ball_positions(26, 7);
        let b = ball_positions(26, 7);
        assert_eq!(a, b);
        assert_ne!(a, ball_positions(26, 8));
        for p in &a {
            let horizontal = (p.x * p.x + p.z * p.z).sqrt();
            assert!(horizontal <= 10.0 + 1e-4);
            assert!(p.y >= -4.0 && p.y <= 4.0);
        }
    }
}
