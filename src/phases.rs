//! Scroll progress to per-phase progress.
//!
//! Each phase owns a window of the scroll range and reports how far through that
//! window the current progress is, clamped to `[0, 1]`:
//!
//! | phase               | window        |
//! |---------------------|---------------|
//! | `transform`         | `0.05..0.35`  |
//! | `pyramid`           | `0.35..0.60`  |
//! | `ball`              | `0.60..0.85`  |
//! | `pyramid_transform` | `0.85..1.00`  |

/// Progress at or below which the scene idles and pieces retreat.
pub const IDLE_THRESHOLD: f32 = 0.05;

const TRANSFORM_START: f32 = 0.05;
const TRANSFORM_SPAN: f32 = 0.30;
const PYRAMID_START: f32 = 0.35;
const PYRAMID_SPAN: f32 = 0.25;
const BALL_START: f32 = 0.60;
const BALL_SPAN: f32 = 0.25;
const PYRAMID_TRANSFORM_START: f32 = 0.85;
const PYRAMID_TRANSFORM_SPAN: f32 = 0.15;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Phases {
    pub transform: f32,
    pub pyramid: f32,
    pub ball: f32,
    pub pyramid_transform: f32,
}

impl Phases {
    pub fn from_progress(progress: f32) -> Self {
        Self {
            transform: window(progress, TRANSFORM_START, TRANSFORM_SPAN),
            pyramid: window(progress, PYRAMID_START, PYRAMID_SPAN),
            ball: window(progress, BALL_START, BALL_SPAN),
            pyramid_transform: window(progress, PYRAMID_TRANSFORM_START, PYRAMID_TRANSFORM_SPAN),
        }
    }

    pub fn as_array(&self) -> [f32; 4] {
        [self.transform, self.pyramid, self.ball, self.pyramid_transform]
    }

    /// Highest-priority phase that is currently non-zero.
    pub fn state(&self) -> PhaseState {
        if self.pyramid_transform > 0.0 {
            PhaseState::PyramidTransform
        } else if self.ball > 0.0 {
            PhaseState::Ball
        } else if self.pyramid > 0.0 {
            PhaseState::Pyramid
        } else if self.transform > 0.0 {
            PhaseState::Assembling
        } else {
            PhaseState::Idle
        }
    }
}

/// The dominant phase for a frame. Later phases win whenever they are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhaseState {
    Idle,
    Assembling,
    Pyramid,
    Ball,
    PyramidTransform,
}

impl PhaseState {
    pub fn label(self) -> &'static str {
        match self {
            PhaseState::Idle => "idle",
            PhaseState::Assembling => "assembling",
            PhaseState::Pyramid => "pyramid",
            PhaseState::Ball => "ball",
            PhaseState::PyramidTransform => "pyramid-transform",
        }
    }
}

/// Whether the main object should idle-spin at this scroll progress.
pub fn is_idle_spin(progress: f32) -> bool {
    progress <= IDLE_THRESHOLD
}

/// Stagger-adjusted assembly progress for the item at `index`.
pub fn staggered_progress(transform: f32, index: usize) -> f32 {
    ((transform - index as f32 * 0.03) / 0.5).clamp(0.0, 1.0)
}

/// Stagger-adjusted collapse progress used while scrolling back under the idle threshold.
pub fn retreat_progress(progress: f32, index: usize) -> f32 {
    ((IDLE_THRESHOLD - progress + index as f32 * 0.02) / IDLE_THRESHOLD).clamp(0.0, 1.0)
}

fn window(progress: f32, start: f32, span: f32) -> f32 {
    ((progress - start) / span).clamp(0.0, 1.0)
}
