//! Floating 3D title that names the current shape.
//!
//! The title runs a small state machine: `Stable -> FadingOut -> FadingIn -> Stable`.
//! A change of the implied label starts a fade-out; halfway through the old text is
//! disposed and the new label is built, which then fades in. Motion and color keep
//! running regardless of the transition state.

use crate::events::{EventBus, SceneEvent};
use crate::glyph::GlyphSource;
use crate::mesh::Mesh;
use crate::phases::Phases;
use crate::time::TimeCache;
use glam::{EulerRot, Mat4, Quat, Vec3};
use std::fmt;

pub const TEXT_ANCHOR: Vec3 = Vec3::new(0.0, 2.8, -3.0);
const FADE_STEP: f32 = 0.05;
/// Frames spent in each half of a transition.
const STEPS_PER_HALF: u32 = 20;
const OPACITY_EASE: f32 = 0.1;
const BOB_AMPLITUDE: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TitleLabel {
    Cube,
    Sphere,
    Pyramid,
}

impl TitleLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            TitleLabel::Cube => "CUBE",
            TitleLabel::Sphere => "SPHERE",
            TitleLabel::Pyramid => "PYRAMID",
        }
    }

    pub fn base_opacity(self) -> f32 {
        match self {
            TitleLabel::Cube => 0.3,
            TitleLabel::Sphere | TitleLabel::Pyramid => 0.4,
        }
    }

    /// Label implied by the phases. The spinning pyramid overrides the sphere cloud.
    pub fn for_phases(phases: &Phases) -> Self {
        if phases.pyramid_transform > 0.0 {
            TitleLabel::Pyramid
        } else if phases.ball > 0.0 {
            TitleLabel::Sphere
        } else {
            TitleLabel::Cube
        }
    }
}

impl fmt::Display for TitleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleTransition {
    Stable,
    FadingOut,
    FadingIn,
}

/// The text object currently on screen.
#[derive(Debug, Clone)]
pub struct TitleText {
    pub label: TitleLabel,
    pub mesh: Mesh,
    /// Bumped on every rebuild so the renderer can drop stale GPU buffers.
    pub generation: u64,
}

pub struct TitleController {
    font: Option<Box<dyn GlyphSource>>,
    current: TitleLabel,
    target: TitleLabel,
    transition: TitleTransition,
    fade_steps: u32,
    text: Option<TitleText>,
    next_generation: u64,
    disposed: u64,
    pub opacity: f32,
    pub position: Vec3,
    pub rotation: Vec3,
    pub color: Vec3,
}

impl TitleController {
    pub fn new() -> Self {
        Self {
            font: None,
            current: TitleLabel::Cube,
            target: TitleLabel::Cube,
            transition: TitleTransition::Stable,
            fade_steps: 0,
            text: None,
            next_generation: 1,
            disposed: 0,
            opacity: 0.0,
            position: TEXT_ANCHOR,
            rotation: Vec3::ZERO,
            color: Vec3::ONE,
        }
    }

    /// Hands over a loaded font and builds the text for the current label.
    pub fn attach_font(&mut self, font: Box<dyn GlyphSource>, events: &mut EventBus) {
        events.push(SceneEvent::FontReady { name: font.name().to_string() });
        self.font = Some(font);
        self.rebuild(events);
    }

    pub fn is_ready(&self) -> bool {
        self.font.is_some()
    }

    pub fn current_label(&self) -> TitleLabel {
        self.current
    }

    pub fn target_label(&self) -> TitleLabel {
        self.target
    }

    pub fn transition(&self) -> TitleTransition {
        self.transition
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition != TitleTransition::Stable
    }

    /// In `[0, 2)`: below 1 while fading out, above while fading in.
    pub fn fade_progress(&self) -> f32 {
        self.fade_steps as f32 * FADE_STEP
    }

    pub fn text(&self) -> Option<&TitleText> {
        self.text.as_ref()
    }

    pub fn disposed_count(&self) -> u64 {
        self.disposed
    }

    /// Opacity the material eases toward this frame.
    pub fn target_opacity(&self) -> f32 {
        let base = self.current.base_opacity();
        let fade = self.fade_progress();
        match self.transition {
            TitleTransition::Stable => base,
            TitleTransition::FadingOut => base * (1.0 - fade),
            TitleTransition::FadingIn => base * (fade - 1.0),
        }
    }

    pub fn update(&mut self, phases: &Phases, time: &TimeCache, events: &mut EventBus) {
        if self.font.is_none() {
            return;
        }

        let implied = TitleLabel::for_phases(phases);
        if implied != self.target {
            events.push(SceneEvent::TitleTargetChanged {
                from: self.target.to_string(),
                to: implied.to_string(),
            });
            self.target = implied;
            self.transition = TitleTransition::FadingOut;
            self.fade_steps = 0;
        }

        if self.is_transitioning() {
            self.fade_steps += 1;
            if self.transition == TitleTransition::FadingOut && self.fade_steps >= STEPS_PER_HALF {
                self.current = self.target;
                self.fade_steps = STEPS_PER_HALF;
                self.rebuild(events);
                self.transition = TitleTransition::FadingIn;
            } else if self.transition == TitleTransition::FadingIn && self.fade_steps >= 2 * STEPS_PER_HALF {
                self.transition = TitleTransition::Stable;
                self.fade_steps = 0;
            }
        }

        self.opacity += (self.target_opacity() - self.opacity) * OPACITY_EASE;
        self.decorate(time);
    }

    fn rebuild(&mut self, events: &mut EventBus) {
        let Some(font) = self.font.as_ref() else {
            return;
        };
        if let Some(old) = self.text.take() {
            self.disposed += 1;
            events.push(SceneEvent::TitleMeshDisposed { label: old.label.to_string(), generation: old.generation });
        }
        let mesh = font.build_text(self.current.as_str());
        events.push(SceneEvent::TitleSwapped { label: self.current.to_string(), triangles: mesh.triangle_count() });
        let generation = self.next_generation;
        self.next_generation += 1;
        self.text = Some(TitleText { label: self.current, mesh, generation });
    }

    fn decorate(&mut self, time: &TimeCache) {
        let t = time.motion;
        self.position = TEXT_ANCHOR + Vec3::Y * (t * 1.6).sin() * BOB_AMPLITUDE;
        self.rotation = Vec3::new(t.sin() * 0.08, (t * 0.6).sin() * 0.15, (t * 0.8).cos() * 0.04);

        let c = time.color;
        let hue = (c * 0.1 + (c * 0.7).sin() * 0.05).rem_euclid(1.0);
        let saturation = (0.65 + (c * 1.3).sin() * 0.2).clamp(0.0, 1.0);
        let lightness = (0.55 + (c * 0.9).sin() * 0.1 + (c * 0.4).cos() * 0.05).clamp(0.0, 1.0);
        self.color = hsl_to_rgb(hue, saturation, lightness);
    }

    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_rotation_translation(rotation, self.position)
    }
}

impl Default for TitleController {
    fn default() -> Self {
        Self::new()
    }
}

/// HSL in `[0, 1]` to linear RGB.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    if s <= 0.0 {
        return Vec3::splat(l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vec3::new(hue_channel(p, q, h + 1.0 / 3.0), hue_channel(p, q, h), hue_channel(p, q, h - 1.0 / 3.0))
}

fn hue_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::BlockFont;

    fn phases(ball: f32, pyramid_transform: f32) -> Phases {
        Phases { transform: 1.0, pyramid: 1.0, ball, pyramid_transform }
    }

    fn ready_controller(events: &mut EventBus) -> TitleController {
        let mut title = TitleController::new();
        title.attach_font(Box::new(BlockFont::default()), events);
        title
    }

    #[test]
    fn label_priority() {
        assert_eq!(TitleLabel::for_phases(&phases(0.5, 0.0)), TitleLabel::Sphere);
        assert_eq!(TitleLabel::for_phases(&phases(0.5, 0.3)), TitleLabel::Pyramid);
        assert_eq!(TitleLabel::for_phases(&phases(0.0, 0.0)), TitleLabel::Cube);
    }

    #[test]
    fn updates_are_noops_without_font() {
        let mut events = EventBus::default();
        let mut title = TitleController::new();
        title.update(&phases(0.5, 0.0), &TimeCache::at(1.0), &mut events);
        assert_eq!(title.target_label(), TitleLabel::Cube);
        assert!(!title.is_transitioning());
        assert!(title.text().is_none());
        assert_eq!(title.opacity, 0.0);
        assert!(events.is_empty());
    }

    #[test]
    fn full_transition_swaps_label_at_midpoint() {
        let mut events = EventBus::default();
        let mut title = ready_controller(&mut events);
        let time = TimeCache::at(0.0);
        let sphere = phases(0.5, 0.0);

        title.update(&sphere, &time, &mut events);
        assert_eq!(title.transition(), TitleTransition::FadingOut);
        assert_eq!(title.current_label(), TitleLabel::Cube);

        for _ in 1..STEPS_PER_HALF {
            title.update(&sphere, &time, &mut events);
        }
        assert_eq!(title.transition(), TitleTransition::FadingIn);
        assert_eq!(title.current_label(), TitleLabel::Sphere);
        assert_eq!(title.text().map(|t| t.label), Some(TitleLabel::Sphere));
        assert!((title.fade_progress() - 1.0).abs() < 1e-6);
        assert_eq!(title.target_opacity(), 0.0);

        for _ in 0..STEPS_PER_HALF {
            title.update(&sphere, &time, &mut events);
        }
        assert_eq!(title.transition(), TitleTransition::Stable);
        assert_eq!(title.fade_progress(), 0.0);
        assert!((title.target_opacity() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn rebuild_disposes_previous_text() {
        let mut events = EventBus::default();
        let mut title = ready_controller(&mut events);
        let first_generation = title.text().map(|t| t.generation);
        let time = TimeCache::at(0.0);
        for _ in 0..(2 * STEPS_PER_HALF) {
            title.update(&phases(0.0, 0.5), &time, &mut events);
        }
        assert_eq!(title.disposed_count(), 1);
        assert!(title.text().map(|t| t.generation) > first_generation);
        let disposed: Vec<_> = events
            .drain()
            .into_iter()
            .filter(|ev| matches!(ev, SceneEvent::TitleMeshDisposed { .. }))
            .collect();
        assert_eq!(disposed.len(), 1);
    }

    #[test]
    fn opacity_eases_toward_target() {
        let mut events = EventBus::default();
        let mut title = ready_controller(&mut events);
        let time = TimeCache::at(0.0);
        title.update(&phases(0.0, 0.0), &time, &mut events);
        assert!((title.opacity - 0.03).abs() < 1e-6);
        for _ in 0..200 {
            title.update(&phases(0.0, 0.0), &time, &mut events);
        }
        assert!((title.opacity - 0.3).abs() < 1e-3);
    }

    #[test]
    fn decoration_keeps_running_and_color_stays_in_gamut() {
        let mut events = EventBus::default();
        let mut title = ready_controller(&mut events);
        for frame in 0..300 {
            title.update(&phases(0.0, 0.0), &TimeCache::at(frame as f32 * 0.37), &mut events);
            assert!(title.color.min_element() >= 0.0 && title.color.max_element() <= 1.0);
            assert!((title.position.y - TEXT_ANCHOR.y).abs() <= BOB_AMPLITUDE + 1e-5);
        }
    }

    #[test]
    fn hsl_primaries() {
        assert!((hsl_to_rgb(0.0, 1.0, 0.5) - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
        assert!((hsl_to_rgb(1.0 / 3.0, 1.0, 0.5) - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
        assert_eq!(hsl_to_rgb(0.2, 0.0, 0.7), Vec3::splat(0.7));
    }
}
