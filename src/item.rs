//! Sub-cube pieces and the per-piece animator.
//!
//! Every piece owns three representations (cube, sphere, cone). Which of them may be
//! shown is decided once per frame from the dominant [`PhaseState`]; the animator only
//! positions, scales and fades the representations in that set.

use crate::camera3d::Ray;
use crate::layout::{self, GridCell};
use crate::phases::{PhaseState, Phases};
use crate::time::TimeCache;
use glam::{EulerRot, Mat4, Quat, Vec3};

const FLOAT_AMPLITUDE: f32 = 0.5;
const FLOAT_INDEX_OFFSET: f32 = 0.5;
const SPHERE_SPIN: Vec3 = Vec3::new(0.02, 0.01, 0.0);
const SPHERE_CLOUD_SCALE: f32 = 1.2;
const CONE_SCALE: f32 = 1.5;
const CUBE_BALL_SHRINK: f32 = 0.8;
const PYRAMID_ROTATION_OFFSET: Vec3 = Vec3::new(0.5, 0.3, 0.0);
/// Direction the cones lean toward while spinning (top-left, slightly away from the camera).
const CONE_HEADING: Vec3 = Vec3::new(-1.0, 1.0, -0.5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    Cube,
    Sphere,
    Cone,
}

impl Representation {
    pub const ALL: [Representation; 3] = [Representation::Cube, Representation::Sphere, Representation::Cone];

    fn slot(self) -> usize {
        match self {
            Representation::Cube => 0,
            Representation::Sphere => 1,
            Representation::Cone => 2,
        }
    }
}

/// Representations allowed to be visible in a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepresentationSet {
    pub cube: bool,
    pub sphere: bool,
    pub cone: bool,
}

impl RepresentationSet {
    pub fn contains(&self, rep: Representation) -> bool {
        match rep {
            Representation::Cube => self.cube,
            Representation::Sphere => self.sphere,
            Representation::Cone => self.cone,
        }
    }
}

pub fn active_representations(state: PhaseState) -> RepresentationSet {
    match state {
        PhaseState::PyramidTransform => RepresentationSet { cube: false, sphere: true, cone: true },
        PhaseState::Ball => RepresentationSet { cube: true, sphere: true, cone: false },
        PhaseState::Pyramid | PhaseState::Assembling | PhaseState::Idle => {
            RepresentationSet { cube: true, sphere: false, cone: false }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepresentationState {
    pub position: Vec3,
    /// Euler angles, applied in X, Y, Z order.
    pub rotation: Vec3,
    pub scale: f32,
    pub opacity: f32,
    pub visible: bool,
}

impl RepresentationState {
    fn hidden_at(position: Vec3) -> Self {
        Self { position, rotation: Vec3::ZERO, scale: 0.0, opacity: 1.0, visible: false }
    }

    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.position)
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Everything an item needs to know about the current frame.
#[derive(Debug, Clone, Copy)]
pub struct ItemFrame {
    pub phases: Phases,
    pub state: PhaseState,
    pub time: TimeCache,
    pub main_rotation: Vec3,
    pub pointer_ray: Option<Ray>,
    pub touch_threshold: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetreatOutcome {
    /// Nothing was visible, so nothing moved.
    Skipped,
    Moving,
    Hidden,
}

#[derive(Debug, Clone)]
pub struct Item {
    pub index: usize,
    pub initial_position: Vec3,
    pub grid_target: Vec3,
    pub pyramid_target: Vec3,
    pub ball_target: Vec3,
    representations: [RepresentationState; 3],
    touched: bool,
}

impl Item {
    pub fn new(index: usize, cell: GridCell, ball_target: Vec3) -> Self {
        let initial_position = cell.initial_position();
        Self {
            index,
            initial_position,
            grid_target: cell.target_position(),
            pyramid_target: layout::pyramid_position(index),
            ball_target,
            representations: [
                RepresentationState::hidden_at(initial_position),
                RepresentationState::hidden_at(ball_target),
                RepresentationState::hidden_at(ball_target),
            ],
            touched: false,
        }
    }

    /// Builds every piece of the grid in creation order.
    pub fn build_all(skip_positive_x_face: bool, seed: u64) -> Vec<Item> {
        let cells = layout::grid_cells(skip_positive_x_face);
        let balls = layout::ball_positions(cells.len(), seed);
        cells.into_iter().zip(balls).enumerate().map(|(index, (cell, ball))| Item::new(index, cell, ball)).collect()
    }

    pub fn representation(&self, rep: Representation) -> &RepresentationState {
        &self.representations[rep.slot()]
    }

    fn representation_mut(&mut self, rep: Representation) -> &mut RepresentationState {
        &mut self.representations[rep.slot()]
    }

    pub fn representations(&self) -> impl Iterator<Item = (Representation, &RepresentationState)> {
        Representation::ALL.into_iter().map(move |rep| (rep, self.representation(rep)))
    }

    /// Position of the cube representation.
    pub fn position(&self) -> Vec3 {
        self.representation(Representation::Cube).position
    }

    pub fn is_hidden(&self) -> bool {
        self.representations.iter().all(|state| !state.visible)
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn show_cube(&mut self) {
        self.representation_mut(Representation::Cube).visible = true;
    }

    /// Advances this piece for one frame. `local_progress` is the stagger-adjusted
    /// assembly progress from [`crate::phases::staggered_progress`]. Only called above the
    /// idle threshold; below it pieces go through [`Item::retreat`] instead.
    pub fn animate(&mut self, frame: &ItemFrame, local_progress: f32) {
        let active = active_representations(frame.state);
        for rep in Representation::ALL {
            let state = self.representation_mut(rep);
            state.visible = active.contains(rep);
        }
        self.touched = false;

        match frame.state {
            PhaseState::PyramidTransform => self.animate_spinning_pyramid(frame),
            PhaseState::Ball => self.animate_ball(frame, local_progress),
            PhaseState::Pyramid => {
                let anchor = self.grid_target.lerp(self.pyramid_target, frame.phases.pyramid);
                self.assemble_cube(anchor, local_progress);
            }
            PhaseState::Assembling | PhaseState::Idle => {
                self.assemble_cube(self.grid_target, local_progress);
            }
        }

        let offset = PYRAMID_ROTATION_OFFSET * frame.phases.pyramid;
        let cube = self.representation_mut(Representation::Cube);
        cube.rotation.x = frame.main_rotation.x + offset.x;
        cube.rotation.y = frame.main_rotation.y + offset.y;
    }

    fn assemble_cube(&mut self, anchor: Vec3, local_progress: f32) {
        let start = self.initial_position;
        let cube = self.representation_mut(Representation::Cube);
        cube.position = start.lerp(anchor, local_progress);
        cube.scale = local_progress;
        cube.opacity = 1.0;
    }

    fn animate_ball(&mut self, frame: &ItemFrame, local_progress: f32) {
        let ball = frame.phases.ball;
        let from = if frame.phases.pyramid > 0.0 { self.pyramid_target } else { self.grid_target };
        let anchor = from.lerp(self.ball_target, ball);
        let position = self.initial_position.lerp(anchor, local_progress);
        let float = self.float_offset(frame.time.now) * ball;

        let cube = self.representation_mut(Representation::Cube);
        cube.position = position;
        cube.scale = local_progress * (1.0 - ball * CUBE_BALL_SHRINK);
        cube.opacity = 1.0 - ball;

        let sphere = self.representation_mut(Representation::Sphere);
        sphere.position = position + Vec3::Y * float;
        sphere.rotation += SPHERE_SPIN * ball;
        sphere.scale = local_progress * ball * SPHERE_CLOUD_SCALE;
        sphere.opacity = ball;
    }

    fn animate_spinning_pyramid(&mut self, frame: &ItemFrame) {
        let fade = frame.phases.pyramid_transform;
        let now = frame.time.now;
        let anchor = self.ball_target + Vec3::Y * self.float_offset(now);
        self.touched = frame
            .pointer_ray
            .is_some_and(|ray| ray.distance_to_point(anchor) < frame.touch_threshold);

        let sphere = self.representation_mut(Representation::Sphere);
        sphere.position = anchor;
        sphere.scale = SPHERE_CLOUD_SCALE;
        sphere.opacity = 1.0 - fade;

        let (rotation, scale) = if self.touched {
            jiggle(self.index, now)
        } else {
            let base = cone_heading();
            (base + Vec3::new((now * 2.0).sin() * 0.3, (now * 3.0).cos() * 0.3, now.sin() * 0.2), CONE_SCALE)
        };
        let cone = self.representation_mut(Representation::Cone);
        cone.position = anchor;
        cone.rotation = rotation;
        cone.scale = scale;
        cone.opacity = fade;
    }

    fn float_offset(&self, now: f32) -> f32 {
        (now + self.index as f32 * FLOAT_INDEX_OFFSET).sin() * FLOAT_AMPLITUDE
    }

    /// Collapses the piece back toward its scattered start while scrolling back under
    /// the idle threshold.
    pub fn retreat(&mut self, retreat_progress: f32) -> RetreatOutcome {
        let cube_visible = self.representation(Representation::Cube).visible;
        let sphere_visible = self.representation(Representation::Sphere).visible;
        if !cube_visible && !sphere_visible {
            return RetreatOutcome::Skipped;
        }
        self.representation_mut(Representation::Sphere).visible = false;
        self.representation_mut(Representation::Cone).visible = false;

        let from = self.grid_target;
        let to = self.initial_position;
        let cube = self.representation_mut(Representation::Cube);
        cube.visible = true;
        cube.opacity = 1.0;
        cube.position = from.lerp(to, retreat_progress);
        cube.scale = 1.0 - retreat_progress;
        if retreat_progress >= 1.0 {
            cube.visible = false;
            RetreatOutcome::Hidden
        } else {
            RetreatOutcome::Moving
        }
    }
}

/// Base orientation pointing a cone's tip along [`CONE_HEADING`].
fn cone_heading() -> Vec3 {
    let dir = CONE_HEADING.normalize();
    let x = dir.y.atan2(dir.z);
    let y = (-dir.x).atan2((dir.y * dir.y + dir.z * dir.z).sqrt());
    Vec3::new(x, y, 0.0)
}

/// Fast multi-axis shake for a cone under the pointer.
fn jiggle(index: usize, now: f32) -> (Vec3, f32) {
    let i = index as f32;
    let base = cone_heading();
    let rotation = base
        + Vec3::new(
            (now * 25.0 + i).sin() * 0.4,
            (now * 30.0 + i * 1.3).cos() * 0.4,
            (now * 35.0 + i * 0.7).sin() * 0.3,
        );
    let scale = CONE_SCALE * (1.0 + (now * 40.0 + i).sin() * 0.1);
    (rotation, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::staggered_progress;

    fn sample_item(index: usize) -> Item {
        Item::new(index, GridCell { coords: Vec3::new(-1.0, 1.0, 0.0) }, Vec3::new(5.0, 1.0, -3.0))
    }

    fn frame_with(phases: Phases, now: f32) -> ItemFrame {
        ItemFrame {
            phases,
            state: phases.state(),
            time: TimeCache::at(now),
            main_rotation: Vec3::new(0.4, 0.2, 0.0),
            pointer_ray: None,
            touch_threshold: 0.8,
        }
    }

    fn frame_at(progress: f32) -> ItemFrame {
        frame_with(Phases::from_progress(progress), 0.0)
    }

    #[test]
    fn fresh_item_is_hidden_at_spread_start() {
        let item = sample_item(0);
        assert!(item.is_hidden());
        assert_eq!(item.position(), Vec3::new(-8.0, 8.0, 0.0));
        assert_eq!(item.grid_target, Vec3::new(-1.0, 1.0, 0.0));
    }

    #[test]
    fn assembling_moves_toward_grid_slot() {
        let mut item = sample_item(0);
        let frame = frame_at(0.35);
        item.animate(&frame, staggered_progress(frame.phases.transform, 0));
        let cube = item.representation(Representation::Cube);
        assert!(cube.visible);
        assert!((cube.position - item.grid_target).length() < 1e-5);
        assert!((cube.scale - 1.0).abs() < 1e-5);
        assert!(!item.representation(Representation::Sphere).visible);
    }

    #[test]
    fn rotation_follows_main_object_with_pyramid_offset() {
        let mut item = sample_item(2);
        let frame = frame_at(0.6);
        item.animate(&frame, 1.0);
        let cube = item.representation(Representation::Cube);
        assert!((cube.rotation.x - (0.4 + 0.5)).abs() < 1e-5);
        assert!((cube.rotation.y - (0.2 + 0.3)).abs() < 1e-5);
    }

    #[test]
    fn rotation_sync_applies_in_every_branch() {
        for progress in [0.2, 0.45, 0.7, 0.95] {
            let mut item = sample_item(4);
            let frame = frame_at(progress);
            item.animate(&frame, 1.0);
            let cube = item.representation(Representation::Cube);
            let offset = PYRAMID_ROTATION_OFFSET * frame.phases.pyramid;
            assert!((cube.rotation.x - (0.4 + offset.x)).abs() < 1e-5, "progress {progress}");
            assert!((cube.rotation.y - (0.2 + offset.y)).abs() < 1e-5, "progress {progress}");
        }
    }

    #[test]
    fn pyramid_phase_blends_grid_and_pyramid_slots() {
        let mut item = sample_item(14);
        let frame = frame_at(0.475);
        item.animate(&frame, 1.0);
        let expected = item.grid_target.lerp(item.pyramid_target, frame.phases.pyramid);
        assert!((item.position() - expected).length() < 1e-5);
        assert_eq!(item.representation(Representation::Cube).opacity, 1.0);
    }

    #[test]
    fn ball_phase_cross_fades_cube_and_sphere() {
        let mut item = sample_item(1);
        let frame = frame_at(0.725);
        let ball = frame.phases.ball;
        item.animate(&frame, 1.0);
        let cube = *item.representation(Representation::Cube);
        let sphere = *item.representation(Representation::Sphere);
        assert!(cube.visible && sphere.visible);
        assert!(!item.representation(Representation::Cone).visible);
        assert!((cube.opacity + sphere.opacity - 1.0).abs() < 1e-5);
        assert!((cube.scale - (1.0 - ball * 0.8)).abs() < 1e-5);
        assert!((sphere.scale - ball * 1.2).abs() < 1e-5);
        let anchor = item.pyramid_target.lerp(item.ball_target, ball);
        assert!((cube.position - anchor).length() < 1e-5);
    }

    #[test]
    fn ball_phase_floats_and_spins_the_sphere() {
        let mut item = sample_item(5);
        let now = 1.3;
        let frame = frame_with(Phases::from_progress(0.725), now);
        let ball = frame.phases.ball;
        assert!(ball > 0.0 && ball < 1.0);

        item.animate(&frame, 1.0);
        let cube = *item.representation(Representation::Cube);
        let sphere = *item.representation(Representation::Sphere);
        let float = (now + 5.0 * 0.5).sin() * 0.5 * ball;
        assert!((sphere.position.y - (cube.position.y + float)).abs() < 1e-5);
        assert_eq!(sphere.position.x, cube.position.x);
        assert_eq!(sphere.position.z, cube.position.z);

        item.animate(&frame, 1.0);
        let spun = item.representation(Representation::Sphere).rotation;
        let expected = Vec3::new(0.02, 0.01, 0.0) * ball * 2.0;
        assert!((spun - expected).length() < 1e-6);
    }

    #[test]
    fn ball_phase_without_pyramid_starts_from_grid_slot() {
        let mut item = sample_item(1);
        let phases = Phases { transform: 1.0, pyramid: 0.0, ball: 0.5, pyramid_transform: 0.0 };
        let frame = frame_with(phases, 0.0);
        assert_eq!(frame.state, PhaseState::Ball);
        item.animate(&frame, 1.0);
        let expected = item.grid_target.lerp(item.ball_target, 0.5);
        assert!((item.position() - expected).length() < 1e-5);
        let via_pyramid = item.pyramid_target.lerp(item.ball_target, 0.5);
        assert!((item.position() - via_pyramid).length() > 1e-3);
    }

    #[test]
    fn spinning_pyramid_hides_cube_and_fades_in_cone() {
        let mut item = sample_item(3);
        let frame = frame_at(0.925);
        item.animate(&frame, 1.0);
        let set = item.representations().filter(|(_, s)| s.visible).map(|(rep, _)| rep).collect::<Vec<_>>();
        assert_eq!(set, vec![Representation::Sphere, Representation::Cone]);
        let cone = item.representation(Representation::Cone);
        let sphere = item.representation(Representation::Sphere);
        assert!((cone.opacity - frame.phases.pyramid_transform).abs() < 1e-5);
        assert!((sphere.opacity - (1.0 - frame.phases.pyramid_transform)).abs() < 1e-5);
        assert_eq!(cone.position, sphere.position);
        assert!((cone.position.x - item.ball_target.x).abs() < 1e-5);
        assert!(!item.is_touched());
    }

    #[test]
    fn touching_a_cone_switches_to_jiggle() {
        let mut item = sample_item(3);
        let mut frame = frame_at(1.0);
        frame.time = TimeCache::at(1.3);
        item.animate(&frame, 1.0);
        let calm = *item.representation(Representation::Cone);

        let target = calm.position;
        let origin = Vec3::new(0.0, 0.0, 20.0);
        frame.pointer_ray = Some(Ray::new(origin, target - origin));
        item.animate(&frame, 1.0);
        assert!(item.is_touched());
        let shaking = *item.representation(Representation::Cone);
        assert_ne!(calm.rotation, shaking.rotation);

        frame.pointer_ray = Some(Ray::new(origin, Vec3::new(0.0, -1.0, 0.0)));
        item.animate(&frame, 1.0);
        assert!(!item.is_touched());
        assert_eq!(item.representation(Representation::Cone).scale, 1.5);
    }

    #[test]
    fn retreat_skips_invisible_items() {
        let mut item = sample_item(0);
        assert_eq!(item.retreat(0.5), RetreatOutcome::Skipped);
        assert!(item.is_hidden());
    }

    #[test]
    fn retreat_collapses_to_start() {
        let mut item = sample_item(0);
        item.animate(&frame_at(0.9), 1.0);
        assert_eq!(item.retreat(0.5), RetreatOutcome::Moving);
        assert!(item.representation(Representation::Cube).visible);
        assert!(!item.representation(Representation::Sphere).visible);
        assert!((item.representation(Representation::Cube).scale - 0.5).abs() < 1e-6);
        assert_eq!(item.retreat(1.0), RetreatOutcome::Hidden);
        assert!(item.is_hidden());
        assert_eq!(item.position(), item.initial_position);
    }

    #[test]
    fn build_all_assigns_indices_in_order() {
        let items = Item::build_all(true, 42);
        assert_eq!(items.len(), 17);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item.index, i);
            assert_eq!(item.pyramid_target, layout::pyramid_position(i));
        }
    }
}
