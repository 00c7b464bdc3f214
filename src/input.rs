//! Window input normalized into a scroll progress and a pointer position.

use crate::config::ScrollConfig;
use glam::Vec2;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, NamedKey};

/// Pointer position in normalized device coordinates, both axes in `[-1, 1]`, +y up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    pub ndc: Vec2,
}

impl PointerState {
    /// Converts a cursor position in physical pixels. A zero-sized viewport leaves the state untouched.
    pub fn update(&mut self, x: f32, y: f32, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.ndc = Vec2::new(x / width as f32 * 2.0 - 1.0, -(y / height as f32) * 2.0 + 1.0);
    }
}

/// Virtual document scroll. The document is `pages` viewports tall.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollState {
    offset: f32,
    viewport_height: f32,
    pages: f32,
    progress: f32,
}

impl ScrollState {
    pub fn new(pages: f32, viewport_height: f32) -> Self {
        Self { offset: 0.0, viewport_height: viewport_height.max(0.0), pages, progress: 0.0 }
    }

    pub fn max_scroll(&self) -> f32 {
        self.viewport_height * (self.pages - 1.0)
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    /// Always in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn scroll_by(&mut self, pixels: f32) {
        self.set_offset(self.offset + pixels);
    }

    pub fn set_offset(&mut self, offset: f32) {
        let max = self.max_scroll().max(0.0);
        self.offset = if offset.is_finite() { offset.clamp(0.0, max) } else { 0.0 };
        self.recompute();
    }

    pub fn set_progress(&mut self, progress: f32) {
        self.set_offset(progress.clamp(0.0, 1.0) * self.max_scroll());
    }

    pub fn jump_start(&mut self) {
        self.set_offset(0.0);
    }

    pub fn jump_end(&mut self) {
        self.set_offset(self.max_scroll());
    }

    pub fn resize(&mut self, viewport_height: f32) {
        self.viewport_height = viewport_height.max(0.0);
        self.set_offset(self.offset);
    }

    fn recompute(&mut self) {
        let max = self.max_scroll();
        self.progress = if max <= 0.0 { 0.0 } else { (self.offset / max).min(1.0) };
    }
}

pub struct Input {
    bindings: InputBindings,
    line_height_px: f32,
    page_step: f32,
    viewport: (u32, u32),
    pub scroll: ScrollState,
    pub pointer: PointerState,
    pub events: Vec<InputEvent>,
    quit_requested: bool,
    resized: bool,
}

impl Input {
    pub fn new(scroll: &ScrollConfig, viewport: (u32, u32)) -> Self {
        Self::with_bindings(InputBindings::default(), scroll, viewport)
    }

    pub fn from_config(path: impl AsRef<Path>, scroll: &ScrollConfig, viewport: (u32, u32)) -> Self {
        let bindings = InputBindings::load_or_default(path);
        Self::with_bindings(bindings, scroll, viewport)
    }

    fn with_bindings(bindings: InputBindings, scroll: &ScrollConfig, viewport: (u32, u32)) -> Self {
        Self {
            bindings,
            line_height_px: scroll.line_height_px,
            page_step: scroll.page_step,
            viewport,
            scroll: ScrollState::new(scroll.pages, viewport.1 as f32),
            pointer: PointerState::default(),
            events: Vec::new(),
            quit_requested: false,
            resized: false,
        }
    }

    pub fn push(&mut self, ev: InputEvent) {
        match &ev {
            InputEvent::Key { key, pressed } => {
                if *pressed {
                    self.apply_key_binding(key);
                }
            }
            InputEvent::Wheel { delta } => {
                // Positive wheel deltas scroll toward the top of the document.
                let pixels = match delta {
                    WheelDelta::Lines(lines) => lines * self.line_height_px,
                    WheelDelta::Pixels(pixels) => *pixels,
                };
                self.scroll.scroll_by(-pixels);
            }
            InputEvent::CursorPos { x, y } => {
                self.pointer.update(*x, *y, self.viewport.0, self.viewport.1);
            }
            InputEvent::Resized { width, height } => {
                self.viewport = (*width, *height);
                self.scroll.resize(*height as f32);
                self.resized = true;
            }
            InputEvent::Other => {}
        }
        self.events.push(ev);
    }

    pub fn clear_frame(&mut self) {
        self.events.clear();
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn progress(&self) -> f32 {
        self.scroll.progress()
    }

    pub fn take_quit_requested(&mut self) -> bool {
        let v = self.quit_requested;
        self.quit_requested = false;
        v
    }

    pub fn take_resized(&mut self) -> bool {
        let v = self.resized;
        self.resized = false;
        v
    }

    fn apply_key_binding(&mut self, key: &Key) {
        if let Some(binding_key) = InputKeyBinding::from_event_key(key) {
            let actions: Vec<_> = self.bindings.actions_for_key(&binding_key).collect();
            for action in actions {
                self.trigger(action);
            }
        }
    }

    fn trigger(&mut self, action: InputAction) {
        let page = self.scroll.viewport_height() * self.page_step;
        match action {
            InputAction::ScrollUp => self.scroll.scroll_by(-self.line_height_px),
            InputAction::ScrollDown => self.scroll.scroll_by(self.line_height_px),
            InputAction::PageUp => self.scroll.scroll_by(-page),
            InputAction::PageDown => self.scroll.scroll_by(page),
            InputAction::JumpStart => self.scroll.jump_start(),
            InputAction::JumpEnd => self.scroll.jump_end(),
            InputAction::Quit => self.quit_requested = true,
        }
    }
}

#[derive(Debug, Clone)]
struct InputBindings {
    key_to_actions: HashMap<InputKeyBinding, Vec<InputAction>>,
}

impl InputBindings {
    fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<InputConfigFile>(&contents) {
                Ok(config) => Self::from_config(config, &path.display().to_string()),
                Err(err) => {
                    tracing::warn!(
                        "Failed to parse {}: {err}. Falling back to default bindings.",
                        path.display()
                    );
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!("Failed to read {}: {err}. Falling back to default bindings.", path.display());
                Self::default()
            }
        }
    }

    fn from_config(config: InputConfigFile, origin: &str) -> Self {
        let overrides = config.into_overrides(origin);
        Self::with_overrides(overrides)
    }

    fn with_overrides(overrides: HashMap<InputAction, Vec<InputKeyBinding>>) -> Self {
        let mut action_map = Self::default_action_map();
        for (action, keys) in overrides {
            if keys.is_empty() {
                continue;
            }
            action_map.insert(action, keys);
        }
        Self::from_action_map(action_map)
    }

    fn default_action_map() -> HashMap<InputAction, Vec<InputKeyBinding>> {
        use InputAction::*;
        let mut map = HashMap::new();
        map.insert(ScrollUp, vec![InputKeyBinding::named(NamedKeyCode::ArrowUp), InputKeyBinding::character("k")]);
        map.insert(
            ScrollDown,
            vec![InputKeyBinding::named(NamedKeyCode::ArrowDown), InputKeyBinding::character("j")],
        );
        map.insert(PageUp, vec![InputKeyBinding::named(NamedKeyCode::PageUp)]);
        map.insert(PageDown, vec![InputKeyBinding::named(NamedKeyCode::PageDown), InputKeyBinding::named(NamedKeyCode::Space)]);
        map.insert(JumpStart, vec![InputKeyBinding::named(NamedKeyCode::Home)]);
        map.insert(JumpEnd, vec![InputKeyBinding::named(NamedKeyCode::End)]);
        map.insert(Quit, vec![InputKeyBinding::named(NamedKeyCode::Escape)]);
        map
    }

    fn from_action_map(action_map: HashMap<InputAction, Vec<InputKeyBinding>>) -> Self {
        let mut key_to_actions: HashMap<InputKeyBinding, Vec<InputAction>> = HashMap::new();
        for (action, keys) in action_map {
            for key in keys {
                key_to_actions.entry(key).or_default().push(action);
            }
        }
        Self { key_to_actions }
    }

    fn actions_for_key(&self, key: &InputKeyBinding) -> impl Iterator<Item = InputAction> + '_ {
        self.key_to_actions.get(key).into_iter().flatten().copied()
    }
}

impl Default for InputBindings {
    fn default() -> Self {
        Self::from_action_map(Self::default_action_map())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum InputKeyBinding {
    Character(String),
    Named(NamedKeyCode),
}

impl InputKeyBinding {
    fn character(ch: &str) -> Self {
        Self::Character(ch.to_lowercase())
    }

    fn named(named: NamedKeyCode) -> Self {
        Self::Named(named)
    }

    fn from_event_key(key: &Key) -> Option<Self> {
        match key {
            Key::Character(ch) => {
                let s = ch.to_string();
                if s.is_empty() {
                    None
                } else {
                    Some(Self::Character(s.to_lowercase()))
                }
            }
            Key::Named(named) => NamedKeyCode::from_named_key(named).map(Self::Named),
            _ => None,
        }
    }

    fn from_config_value(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        if let Some(named) = NamedKeyCode::from_str(&normalized) {
            return Some(Self::Named(named));
        }
        if normalized.chars().count() == 1 {
            return Some(Self::Character(normalized));
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NamedKeyCode {
    ArrowUp,
    ArrowDown,
    PageUp,
    PageDown,
    Home,
    End,
    Space,
    Escape,
}

impl NamedKeyCode {
    fn from_named_key(key: &NamedKey) -> Option<Self> {
        match key {
            NamedKey::ArrowUp => Some(Self::ArrowUp),
            NamedKey::ArrowDown => Some(Self::ArrowDown),
            NamedKey::PageUp => Some(Self::PageUp),
            NamedKey::PageDown => Some(Self::PageDown),
            NamedKey::Home => Some(Self::Home),
            NamedKey::End => Some(Self::End),
            NamedKey::Space => Some(Self::Space),
            NamedKey::Escape => Some(Self::Escape),
            _ => None,
        }
    }

    fn from_str(value: &str) -> Option<Self> {
        match value {
            "up" | "arrow_up" => Some(Self::ArrowUp),
            "down" | "arrow_down" => Some(Self::ArrowDown),
            "page_up" | "pageup" => Some(Self::PageUp),
            "page_down" | "pagedown" => Some(Self::PageDown),
            "home" => Some(Self::Home),
            "end" => Some(Self::End),
            "space" => Some(Self::Space),
            "escape" | "esc" => Some(Self::Escape),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum InputAction {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    JumpStart,
    JumpEnd,
    Quit,
}

impl InputAction {
    fn from_str(value: &str) -> Option<Self> {
        match value {
            "scroll_up" => Some(Self::ScrollUp),
            "scroll_down" => Some(Self::ScrollDown),
            "page_up" => Some(Self::PageUp),
            "page_down" => Some(Self::PageDown),
            "jump_start" => Some(Self::JumpStart),
            "jump_end" => Some(Self::JumpEnd),
            "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InputConfigFile {
    #[serde(default)]
    bindings: HashMap<String, Vec<String>>,
}

impl InputConfigFile {
    fn into_overrides(self, origin: &str) -> HashMap<InputAction, Vec<InputKeyBinding>> {
        let mut overrides = HashMap::new();
        for (action_name, keys) in self.bindings {
            let action_key = action_name.trim().to_lowercase();
            match InputAction::from_str(&action_key) {
                Some(action) => {
                    let mut parsed = Vec::new();
                    for key in keys {
                        match InputKeyBinding::from_config_value(&key) {
                            Some(binding) => parsed.push(binding),
                            None => {
                                tracing::warn!("{origin}: unknown key '{key}' for action '{action_name}', ignoring.")
                            }
                        }
                    }
                    if parsed.is_empty() {
                        tracing::warn!("{origin}: action '{action_name}' has no valid keys, keeping defaults.");
                        continue;
                    }
                    overrides.insert(action, parsed);
                }
                None => tracing::warn!("{origin}: unknown action '{action_name}', ignoring."),
            }
        }
        overrides
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelDelta {
    Lines(f32),
    Pixels(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, pressed: bool },
    Wheel { delta: WheelDelta },
    CursorPos { x: f32, y: f32 },
    Resized { width: u32, height: u32 },
    Other,
}

impl InputEvent {
    pub fn from_window_event(ev: &WindowEvent) -> Self {
        match ev {
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => WheelDelta::Lines(*y),
                    MouseScrollDelta::PixelDelta(p) => WheelDelta::Pixels(p.y as f32),
                };
                InputEvent::Wheel { delta }
            }
            WindowEvent::CursorMoved { position, .. } => {
                InputEvent::CursorPos { x: position.x as f32, y: position.y as f32 }
            }
            WindowEvent::KeyboardInput { event, .. } => InputEvent::Key {
                key: event.logical_key.clone(),
                pressed: event.state == ElementState::Pressed,
            },
            WindowEvent::Resized(size) => InputEvent::Resized { width: size.width, height: size.height },
            _ => InputEvent::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn input() -> Input {
        Input::new(&ScrollConfig::default(), (800, 600))
    }

    fn press(input: &mut Input, key: NamedKey) {
        input.push(InputEvent::Key { key: Key::Named(key), pressed: true });
    }

    #[test]
    fn pointer_maps_to_ndc() {
        let mut input = input();
        input.push(InputEvent::CursorPos { x: 0.0, y: 0.0 });
        assert_eq!(input.pointer.ndc, Vec2::new(-1.0, 1.0));
        input.push(InputEvent::CursorPos { x: 800.0, y: 600.0 });
        assert_eq!(input.pointer.ndc, Vec2::new(1.0, -1.0));
        input.push(InputEvent::CursorPos { x: 400.0, y: 300.0 });
        assert_eq!(input.pointer.ndc, Vec2::ZERO);
    }

    #[test]
    fn zero_viewport_leaves_pointer_alone() {
        let mut pointer = PointerState { ndc: Vec2::new(0.25, 0.5) };
        pointer.update(10.0, 10.0, 0, 600);
        assert_eq!(pointer.ndc, Vec2::new(0.25, 0.5));
    }

    #[test]
    fn wheel_moves_progress_within_bounds() {
        let mut input = input();
        // 600 * (5 - 1) = 2400 px of scroll
        input.push(InputEvent::Wheel { delta: WheelDelta::Lines(-10.0) });
        assert!((input.progress() - 0.25).abs() < 1e-6);
        input.push(InputEvent::Wheel { delta: WheelDelta::Pixels(-100_000.0) });
        assert_eq!(input.progress(), 1.0);
        input.push(InputEvent::Wheel { delta: WheelDelta::Pixels(100_000.0) });
        assert_eq!(input.progress(), 0.0);
    }

    #[test]
    fn keys_drive_scroll_and_quit() {
        let mut input = input();
        press(&mut input, NamedKey::End);
        assert_eq!(input.progress(), 1.0);
        press(&mut input, NamedKey::PageUp);
        assert!((input.scroll.offset() - (2400.0 - 540.0)).abs() < 1e-3);
        press(&mut input, NamedKey::Home);
        assert_eq!(input.progress(), 0.0);
        input.push(InputEvent::Key { key: Key::Named(NamedKey::Escape), pressed: false });
        assert!(!input.take_quit_requested());
        press(&mut input, NamedKey::Escape);
        assert!(input.take_quit_requested());
        assert!(!input.take_quit_requested());
    }

    #[test]
    fn resize_clamps_offset_and_recomputes_progress() {
        let mut input = input();
        press(&mut input, NamedKey::End);
        input.push(InputEvent::Resized { width: 800, height: 300 });
        assert!(input.take_resized());
        assert_eq!(input.scroll.offset(), 1200.0);
        assert_eq!(input.progress(), 1.0);
        input.push(InputEvent::Resized { width: 800, height: 0 });
        assert_eq!(input.progress(), 0.0);
    }

    #[test]
    fn single_page_document_never_progresses() {
        let mut scroll = ScrollState::new(1.0, 600.0);
        scroll.scroll_by(500.0);
        assert_eq!(scroll.progress(), 0.0);
        scroll.set_progress(0.5);
        assert_eq!(scroll.offset(), 0.0);
    }

    #[test]
    fn bindings_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "bindings": {{ "jump_end": ["e"], "teleport": ["t"], "quit": ["not-a-key"] }} }}"#)
            .expect("write bindings");
        let mut input = Input::from_config(file.path(), &ScrollConfig::default(), (800, 600));
        input.push(InputEvent::Key { key: Key::Character("e".into()), pressed: true });
        assert_eq!(input.progress(), 1.0);
        press(&mut input, NamedKey::End);
        press(&mut input, NamedKey::Escape);
        assert!(input.take_quit_requested(), "invalid override keeps the default binding");
    }
}
