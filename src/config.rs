use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "WindowConfig::default_title")]
    pub title: String,
    #[serde(default = "WindowConfig::default_width")]
    pub width: u32,
    #[serde(default = "WindowConfig::default_height")]
    pub height: u32,
    #[serde(default = "WindowConfig::default_vsync")]
    pub vsync: bool,
    #[serde(default)]
    pub fullscreen: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrollConfig {
    /// Document height in viewport heights.
    #[serde(default = "ScrollConfig::default_pages")]
    pub pages: f32,
    #[serde(default = "ScrollConfig::default_line_height_px")]
    pub line_height_px: f32,
    /// Fraction of the viewport moved by page up/down.
    #[serde(default = "ScrollConfig::default_page_step")]
    pub page_step: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneConfig {
    /// Leaves the +x face of the grid empty, giving 17 items instead of 26.
    #[serde(default = "SceneConfig::default_skip_positive_x_face")]
    pub skip_positive_x_face: bool,
    #[serde(default = "SceneConfig::default_seed")]
    pub seed: u64,
    #[serde(default = "SceneConfig::default_touch_threshold")]
    pub touch_threshold: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LightingConfig {
    #[serde(default = "LightingConfig::default_ambient_color")]
    pub ambient_color: [f32; 3],
    #[serde(default = "LightingConfig::default_ambient_intensity")]
    pub ambient_intensity: f32,
    #[serde(default = "LightingConfig::default_directional_color")]
    pub directional_color: [f32; 3],
    #[serde(default = "LightingConfig::default_directional_intensity")]
    pub directional_intensity: f32,
    #[serde(default = "LightingConfig::default_directional_position")]
    pub directional_position: [f32; 3],
    #[serde(default = "LightingConfig::default_clear_color")]
    pub clear_color: [f32; 3],
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub lighting: LightingConfig,
}

#[derive(Debug, Clone, Default)]
pub struct AppConfigOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub vsync: Option<bool>,
    pub seed: Option<u64>,
    pub progress: Option<f32>,
}

impl WindowConfig {
    fn default_title() -> String {
        "Cube Morph".to_string()
    }

    const fn default_width() -> u32 {
        1280
    }

    const fn default_height() -> u32 {
        720
    }

    const fn default_vsync() -> bool {
        true
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            width: Self::default_width(),
            height: Self::default_height(),
            vsync: Self::default_vsync(),
            fullscreen: false,
        }
    }
}

impl ScrollConfig {
    const fn default_pages() -> f32 {
        5.0
    }

    const fn default_line_height_px() -> f32 {
        60.0
    }

    const fn default_page_step() -> f32 {
        0.9
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            pages: Self::default_pages(),
            line_height_px: Self::default_line_height_px(),
            page_step: Self::default_page_step(),
        }
    }
}

impl SceneConfig {
    const fn default_skip_positive_x_face() -> bool {
        true
    }

    const fn default_seed() -> u64 {
        0x5EED_CAFE
    }

    const fn default_touch_threshold() -> f32 {
        0.8
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            skip_positive_x_face: Self::default_skip_positive_x_face(),
            seed: Self::default_seed(),
            touch_threshold: Self::default_touch_threshold(),
        }
    }
}

impl LightingConfig {
    // 0x404040
    const fn default_ambient_color() -> [f32; 3] {
        [0.251, 0.251, 0.251]
    }

    const fn default_ambient_intensity() -> f32 {
        0.6
    }

    const fn default_directional_color() -> [f32; 3] {
        [1.0, 1.0, 1.0]
    }

    const fn default_directional_intensity() -> f32 {
        1.0
    }

    const fn default_directional_position() -> [f32; 3] {
        [5.0, 5.0, 5.0]
    }

    const fn default_clear_color() -> [f32; 3] {
        [0.02, 0.02, 0.03]
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: Self::default_ambient_color(),
            ambient_intensity: Self::default_ambient_intensity(),
            directional_color: Self::default_directional_color(),
            directional_intensity: Self::default_directional_intensity(),
            directional_position: Self::default_directional_position(),
            clear_color: Self::default_clear_color(),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &AppConfigOverrides) {
        if let Some(width) = overrides.width {
            self.window.width = width;
        }
        if let Some(height) = overrides.height {
            self.window.height = height;
        }
        if let Some(vsync) = overrides.vsync {
            self.window.vsync = vsync;
        }
        if let Some(seed) = overrides.seed {
            self.scene.seed = seed;
        }
    }
}

impl AppConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.width.is_none()
            && self.height.is_none()
            && self.vsync.is_none()
            && self.seed.is_none()
            && self.progress.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.width.is_some() {
            fields.push("width");
        }
        if self.height.is_some() {
            fields.push("height");
        }
        if self.vsync.is_some() {
            fields.push("vsync");
        }
        if self.seed.is_some() {
            fields.push("seed");
        }
        if self.progress.is_some() {
            fields.push("progress");
        }
        fields
    }

    /// Starting scroll progress, clamped to `[0, 1]`.
    pub fn start_progress(&self) -> Option<f32> {
        self.progress.map(|p| p.clamp(0.0, 1.0))
    }
}
