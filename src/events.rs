use crate::phases::PhaseState;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    PhaseEntered { from: PhaseState, to: PhaseState },
    TitleTargetChanged { from: String, to: String },
    TitleSwapped { label: String, triangles: usize },
    TitleMeshDisposed { label: String, generation: u64 },
    FontReady { name: String },
    RetreatStarted,
    RetreatFinished,
}

impl fmt::Display for SceneEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneEvent::PhaseEntered { from, to } => {
                write!(f, "PhaseEntered from={} to={}", from.label(), to.label())
            }
            SceneEvent::TitleTargetChanged { from, to } => write!(f, "TitleTargetChanged from={from} to={to}"),
            SceneEvent::TitleSwapped { label, triangles } => {
                write!(f, "TitleSwapped label={label} triangles={triangles}")
            }
            SceneEvent::TitleMeshDisposed { label, generation } => {
                write!(f, "TitleMeshDisposed label={label} generation={generation}")
            }
            SceneEvent::FontReady { name } => write!(f, "FontReady name={name}"),
            SceneEvent::RetreatStarted => write!(f, "RetreatStarted"),
            SceneEvent::RetreatFinished => write!(f, "RetreatFinished"),
        }
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<SceneEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: SceneEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<SceneEvent> {
        self.events.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
