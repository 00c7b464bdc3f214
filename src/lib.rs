pub mod app;
pub mod background;
pub mod camera3d;
pub mod cli;
pub mod config;
pub mod events;
pub mod glyph;
pub mod input;
pub mod item;
pub mod layout;
pub mod main_object;
pub mod mesh;
pub mod phases;
pub mod renderer;
pub mod scene;
pub mod time;
pub mod title;

pub use app::{run, run_with_overrides, App};
