use crate::config::{AppConfig, AppConfigOverrides};
use crate::glyph::BlockFont;
use crate::input::{Input, InputEvent};
use crate::renderer::Renderer;
use crate::scene::{FrameDriver, SceneState};
use crate::time::Time;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};

pub const CONFIG_PATH: &str = "config/app.json";
pub const INPUT_CONFIG_PATH: &str = "config/input.json";

pub fn run() -> Result<()> {
    run_with_overrides(AppConfigOverrides::default())
}

pub fn run_with_overrides(overrides: AppConfigOverrides) -> Result<()> {
    let mut config = AppConfig::load_or_default(CONFIG_PATH);
    if !overrides.is_empty() {
        tracing::info!(fields = ?overrides.applied_fields(), "Applying command line overrides");
    }
    config.apply_overrides(&overrides);
    let event_loop = EventLoop::new().context("Failed to create winit event loop")?;
    let mut app = App::new(config, overrides.start_progress());
    event_loop.run_app(&mut app).context("Event loop execution failed")?;
    tracing::info!(frames = app.driver.frames(), "Event loop finished");
    Ok(())
}

pub struct App {
    renderer: Renderer,
    driver: FrameDriver,
    input: Input,
    time: Time,
    start_progress: Option<f32>,
    should_close: bool,
}

impl App {
    pub fn new(config: AppConfig, start_progress: Option<f32>) -> Self {
        let viewport = (config.window.width, config.window.height);
        let input = Input::from_config(INPUT_CONFIG_PATH, &config.scroll, viewport);
        let state = SceneState::new(&config, PhysicalSize::new(viewport.0, viewport.1));
        tracing::info!(
            items = state.items.len(),
            pages = config.scroll.pages,
            seed = config.scene.seed,
            "Scene ready"
        );
        Self {
            renderer: Renderer::new(&config.window, &config.lighting),
            driver: FrameDriver::new(state),
            input,
            time: Time::new(),
            start_progress,
            should_close: false,
        }
    }

    fn frame(&mut self) {
        self.time.tick();
        let now = self.time.elapsed_seconds();
        self.driver.sync_input(self.input.progress(), self.input.pointer.ndc, self.renderer.size());
        if let Err(err) = self.driver.run_frame(now, &mut self.renderer) {
            tracing::warn!("Frame render failed: {err:?}");
        }
        for event in self.driver.state.events.drain() {
            tracing::info!(target: "cube_morph::events", "{event}");
        }
        self.input.clear_frame();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.renderer.ensure_window(event_loop) {
            tracing::error!("Renderer initialization error: {err:?}");
            self.should_close = true;
            return;
        }
        let size = self.renderer.size();
        self.input.push(InputEvent::Resized { width: size.width, height: size.height });
        if let Some(progress) = self.start_progress.take() {
            self.input.scroll.set_progress(progress);
        }
        if !self.driver.state.title.is_ready() {
            self.driver.state.attach_font(Box::new(BlockFont::default()));
        }
        if let Some(window) = self.renderer.window() {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, _el: &ActiveEventLoop, _id: winit::window::WindowId, event: WindowEvent) {
        self.input.push(InputEvent::from_window_event(&event));
        match &event {
            WindowEvent::CloseRequested => self.should_close = true,
            WindowEvent::Resized(size) => self.renderer.resize(*size),
            WindowEvent::RedrawRequested => self.frame(),
            _ => {}
        }
        if self.input.take_resized() {
            tracing::debug!(viewport = ?self.input.viewport(), "Viewport resized");
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.take_quit_requested() {
            self.should_close = true;
        }
        if self.should_close {
            event_loop.exit();
            return;
        }
        if let Some(window) = self.renderer.window() {
            window.request_redraw();
        }
    }
}
