//! Per-frame orchestration of the morphing scene.
//!
//! [`SceneState`] owns everything the animation touches. [`FrameDriver`] reads the input
//! fields once per frame, advances every component in a fixed order and hands a
//! [`FrameSnapshot`] to the [`RenderTarget`] exactly once.

use crate::background::Background;
use crate::camera3d::CameraRig;
use crate::config::AppConfig;
use crate::events::{EventBus, SceneEvent};
use crate::glyph::GlyphSource;
use crate::item::{Item, ItemFrame, Representation, RepresentationState, RetreatOutcome};
use crate::main_object::MainObject;
use crate::phases::{self, PhaseState, Phases};
use crate::time::TimeCache;
use crate::title::{TitleController, TitleText};
use anyhow::Result;
use glam::{Mat4, Vec2, Vec3, Vec4};
use winit::dpi::PhysicalSize;

/// Which uploaded mesh a draw uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKey {
    Cube,
    MainCube,
    Sphere,
    Cone,
    Background,
    Title(u64),
}

impl MeshKey {
    fn for_representation(rep: Representation) -> Self {
        match rep {
            Representation::Cube => MeshKey::Cube,
            Representation::Sphere => MeshKey::Sphere,
            Representation::Cone => MeshKey::Cone,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshKey,
    pub model: Mat4,
    /// Multiplied with the vertex color. Alpha carries the material opacity.
    pub tint: Vec4,
    pub transparent: bool,
    /// Unlit draws ignore the scene lights and show their colors as-is.
    pub lit: bool,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone)]
pub struct FrameSnapshot<'a> {
    pub view_projection: Mat4,
    pub camera_position: Vec3,
    pub viewport: PhysicalSize<u32>,
    /// Opaque draws first, then transparent ones back to front.
    pub draws: Vec<DrawItem>,
    pub title: Option<&'a TitleText>,
}

impl FrameSnapshot<'_> {
    pub fn opaque_count(&self) -> usize {
        self.draws.iter().filter(|draw| !draw.transparent).count()
    }
}

/// Consumer of finished frames.
pub trait RenderTarget {
    fn render(&mut self, frame: &FrameSnapshot<'_>) -> Result<()>;
}

pub struct SceneState {
    pub progress: f32,
    pub pointer: Vec2,
    pub viewport: PhysicalSize<u32>,
    pub items: Vec<Item>,
    pub main: MainObject,
    pub rig: CameraRig,
    pub title: TitleController,
    pub background: Background,
    pub time: TimeCache,
    pub phases: Phases,
    pub events: EventBus,
    touch_threshold: f32,
    last_state: PhaseState,
    retreating: bool,
}

impl SceneState {
    pub fn new(config: &AppConfig, viewport: PhysicalSize<u32>) -> Self {
        let items = Item::build_all(config.scene.skip_positive_x_face, config.scene.seed);
        tracing::debug!(count = items.len(), seed = config.scene.seed, "Built scene items");
        Self {
            progress: 0.0,
            pointer: Vec2::ZERO,
            viewport,
            items,
            main: MainObject::new(),
            rig: CameraRig::new(),
            title: TitleController::new(),
            background: Background::new(),
            time: TimeCache::default(),
            phases: Phases::default(),
            events: EventBus::default(),
            touch_threshold: config.scene.touch_threshold,
            last_state: PhaseState::Idle,
            retreating: false,
        }
    }

    pub fn attach_font(&mut self, font: Box<dyn GlyphSource>) {
        self.title.attach_font(font, &mut self.events);
    }

    pub fn is_idle_spin(&self) -> bool {
        phases::is_idle_spin(self.progress)
    }

    pub fn aspect(&self) -> f32 {
        if self.viewport.height == 0 {
            1.0
        } else {
            self.viewport.width as f32 / self.viewport.height as f32
        }
    }

    pub fn is_retreating(&self) -> bool {
        self.retreating
    }

    /// Builds the draw list for the current state.
    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        let camera = &self.rig.camera;
        let mut draws = Vec::with_capacity(self.items.len() * 2 + 3);

        draws.push(DrawItem {
            mesh: MeshKey::Background,
            model: self.background.model_matrix(camera.position),
            tint: self.background.tint.extend(1.0),
            transparent: false,
            lit: false,
        });
        if self.main.visible && self.main.scale > 0.0 {
            draws.push(DrawItem {
                mesh: MeshKey::MainCube,
                model: self.main.model_matrix(),
                tint: Vec4::ONE,
                transparent: false,
                lit: true,
            });
        }
        for item in &self.items {
            for (rep, state) in item.representations() {
                if let Some(draw) = representation_draw(rep, state) {
                    draws.push(draw);
                }
            }
        }
        let title = self.title.text();
        if let Some(text) = title {
            if self.title.opacity > 0.0 && !text.mesh.is_empty() {
                draws.push(DrawItem {
                    mesh: MeshKey::Title(text.generation),
                    model: self.title.model_matrix(),
                    tint: self.title.color.extend(self.title.opacity),
                    transparent: true,
                    lit: true,
                });
            }
        }

        sort_draws(&mut draws, camera.position);
        FrameSnapshot {
            view_projection: camera.view_projection(self.viewport),
            camera_position: camera.position,
            viewport: self.viewport,
            draws,
            title,
        }
    }
}

fn representation_draw(rep: Representation, state: &RepresentationState) -> Option<DrawItem> {
    if !state.visible || state.opacity <= 0.0 || state.scale <= 0.0 {
        return None;
    }
    Some(DrawItem {
        mesh: MeshKey::for_representation(rep),
        model: state.model_matrix(),
        tint: Vec4::new(1.0, 1.0, 1.0, state.opacity),
        transparent: state.is_transparent(),
        lit: true,
    })
}

fn sort_draws(draws: &mut [DrawItem], eye: Vec3) {
    let depth = |draw: &DrawItem| (draw.model.w_axis.truncate() - eye).length_squared();
    draws.sort_by(|a, b| match (a.transparent, b.transparent) {
        (false, true) => std::cmp::Ordering::Less,
        (true, false) => std::cmp::Ordering::Greater,
        (true, true) => depth(b).total_cmp(&depth(a)),
        (false, false) => std::cmp::Ordering::Equal,
    });
}

/// Drives [`SceneState`] one frame at a time.
pub struct FrameDriver {
    pub state: SceneState,
    frames: u64,
}

impl FrameDriver {
    pub fn new(state: SceneState) -> Self {
        Self { state, frames: 0 }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Latches the input fields for the next frame.
    pub fn sync_input(&mut self, progress: f32, pointer: Vec2, viewport: PhysicalSize<u32>) {
        self.state.progress = if progress.is_finite() { progress.clamp(0.0, 1.0) } else { 0.0 };
        self.state.pointer = pointer;
        self.state.viewport = viewport;
    }

    /// Advances the scene to `now` and renders it.
    pub fn run_frame(&mut self, now: f32, target: &mut impl RenderTarget) -> Result<()> {
        self.update(now);
        let snapshot = self.state.snapshot();
        target.render(&snapshot)
    }

    pub fn update(&mut self, now: f32) {
        let state = &mut self.state;
        state.time.refresh(now);
        let progress = state.progress;
        let idle_spin = phases::is_idle_spin(progress);
        let phases = Phases::from_progress(progress);
        state.phases = phases;
        let phase_state = phases.state();
        if phase_state != state.last_state {
            state.events.push(SceneEvent::PhaseEntered { from: state.last_state, to: phase_state });
            state.last_state = phase_state;
        }

        if !idle_spin {
            state.retreating = false;
            state.main.apply_assembly_scale(&phases);
            let pointer_ray = state.rig.camera.ndc_ray(state.pointer, state.aspect());
            let frame = ItemFrame {
                phases,
                state: phase_state,
                time: state.time,
                main_rotation: state.main.rotation,
                pointer_ray,
                touch_threshold: state.touch_threshold,
            };
            for item in &mut state.items {
                item.show_cube();
                let local = phases::staggered_progress(phases.transform, item.index);
                item.animate(&frame, local);
            }
            state.rig.dolly(&phases);
            state.main.apply_phases(&phases, &state.time);
            state.title.update(&phases, &state.time, &mut state.events);
        } else {
            state.main.idle(&state.time);
            retreat(state, progress);
            state.main.reset();
            state.rig.return_to_base();
            state.title.update(&Phases::from_progress(progress), &state.time, &mut state.events);
        }

        state.background.update(&state.time);
        state.rig.parallax(state.pointer);
        self.frames += 1;
    }
}

fn retreat(state: &mut SceneState, progress: f32) {
    let mut moved = false;
    for item in &mut state.items {
        let outcome = item.retreat(phases::retreat_progress(progress, item.index));
        moved |= outcome != RetreatOutcome::Skipped;
    }
    if moved && !state.retreating {
        state.retreating = true;
        state.events.push(SceneEvent::RetreatStarted);
    }
    if state.retreating && state.items.iter().all(Item::is_hidden) {
        state.retreating = false;
        state.events.push(SceneEvent::RetreatFinished);
    }
}
