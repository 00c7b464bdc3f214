//! wgpu renderer for [`FrameSnapshot`]s.

mod mesh_pass;
mod window_surface;

pub use window_surface::{SurfaceFrame, WindowSurface};

use crate::background::background_mesh;
use crate::config::{LightingConfig, WindowConfig};
use crate::mesh::{FaceColors, Mesh};
use crate::scene::{FrameSnapshot, MeshKey, RenderTarget};
use crate::title::TitleText;
use anyhow::{Context, Result};
use glam::Vec4;
use mesh_pass::{GpuMesh, MeshPass};
use std::collections::HashMap;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub const ITEM_CUBE_SIZE: f32 = 1.02;
pub const SPHERE_RADIUS: f32 = 0.5;
pub const CONE_RADIUS: f32 = 0.8;
pub const CONE_HEIGHT: f32 = 1.6;
const SPHERE_SEGMENTS: u32 = 16;
const CONE_SEGMENTS: u32 = 4;
const SHAPE_RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

/// CPU meshes for every non-title [`MeshKey`].
pub fn scene_meshes() -> Vec<(MeshKey, Mesh)> {
    vec![
        (MeshKey::Cube, Mesh::cube(ITEM_CUBE_SIZE, FaceColors::puzzle())),
        (MeshKey::MainCube, Mesh::cube(ITEM_CUBE_SIZE, FaceColors::puzzle())),
        (MeshKey::Sphere, Mesh::sphere(SPHERE_RADIUS, SPHERE_SEGMENTS, SPHERE_SEGMENTS, SHAPE_RED)),
        (MeshKey::Cone, Mesh::cone(CONE_RADIUS, CONE_HEIGHT, CONE_SEGMENTS, SHAPE_RED)),
        (MeshKey::Background, background_mesh()),
    ]
}

fn clear_color(rgb: [f32; 3]) -> wgpu::Color {
    wgpu::Color { r: rgb[0] as f64, g: rgb[1] as f64, b: rgb[2] as f64, a: 1.0 }
}

/// What to do with the uploaded title mesh given the generation on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TitleUpload {
    Keep,
    Replace,
    Clear,
}

pub(crate) fn title_upload(uploaded: Option<u64>, wanted: Option<u64>) -> TitleUpload {
    match (uploaded, wanted) {
        (a, b) if a == b => TitleUpload::Keep,
        (_, Some(_)) => TitleUpload::Replace,
        (Some(_), None) => TitleUpload::Clear,
        (None, None) => TitleUpload::Keep,
    }
}

pub struct Renderer {
    surface: WindowSurface,
    mesh_pass: MeshPass,
    meshes: HashMap<MeshKey, GpuMesh>,
    title_generation: Option<u64>,
    lighting: LightingConfig,
}

impl Renderer {
    pub fn new(window_cfg: &WindowConfig, lighting: &LightingConfig) -> Self {
        Self {
            surface: WindowSurface::new(window_cfg),
            mesh_pass: MeshPass::new(),
            meshes: HashMap::new(),
            title_generation: None,
            lighting: lighting.clone(),
        }
    }

    pub fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        self.surface.ensure_window(event_loop)?;
        let format = self.surface.surface_format()?;
        let device = self.surface.device()?;
        self.mesh_pass.ensure_resources(device, format)?;
        if self.meshes.is_empty() {
            for (key, mesh) in scene_meshes() {
                if let Some(gpu) = GpuMesh::upload(device, &mesh, &format!("{key:?}")) {
                    self.meshes.insert(key, gpu);
                }
            }
            tracing::info!(meshes = self.meshes.len(), "Uploaded scene meshes");
        }
        Ok(())
    }

    pub fn window(&self) -> Option<&Window> {
        self.surface.window()
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.surface.size()
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.surface.resize(new_size);
    }

    fn sync_title(&mut self, title: Option<&TitleText>) -> Result<()> {
        let wanted = title.map(|text| text.generation);
        match title_upload(self.title_generation, wanted) {
            TitleUpload::Keep => return Ok(()),
            TitleUpload::Clear | TitleUpload::Replace => {
                if let Some(old) = self.title_generation.take() {
                    if let Some(gpu) = self.meshes.remove(&MeshKey::Title(old)) {
                        gpu.destroy();
                        tracing::debug!(generation = old, "Destroyed title buffers");
                    }
                }
            }
        }
        if let Some(text) = title {
            let device = self.surface.device()?;
            if let Some(gpu) = GpuMesh::upload(device, &text.mesh, &format!("Title {}", text.label)) {
                self.meshes.insert(MeshKey::Title(text.generation), gpu);
            }
            self.title_generation = Some(text.generation);
        }
        Ok(())
    }
}

impl RenderTarget for Renderer {
    fn render(&mut self, frame: &FrameSnapshot<'_>) -> Result<()> {
        let size = self.surface.size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        self.sync_title(frame.title)?;
        {
            let (device, queue) = self.surface.device_and_queue()?;
            self.mesh_pass.write(device, queue, frame, &self.lighting)?;
        }
        let surface_frame = self.surface.acquire_surface_frame()?;
        let (device, queue) = self.surface.device_and_queue()?;
        let depth_view = self.surface.depth_view()?;
        let resources = self.mesh_pass.resources.as_ref().context("Mesh pipeline missing")?;
        let bind_group = self.mesh_pass.frame_draw_bind_group.as_ref().context("Mesh bind group missing")?;

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Scene Encoder") });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: surface_frame.view(),
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(self.lighting.clear_color)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_bind_group(0, bind_group, &[]);
            let mut transparent_bound = false;
            pass.set_pipeline(&resources.opaque);
            for (index, draw) in frame.draws.iter().enumerate() {
                if draw.transparent && !transparent_bound {
                    pass.set_pipeline(&resources.transparent);
                    transparent_bound = true;
                }
                if let Some(mesh) = self.meshes.get(&draw.mesh) {
                    mesh.draw(&mut pass, index as u32);
                }
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
        surface_frame.present();
        Ok(())
    }
}
