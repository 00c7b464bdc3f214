use crate::config::LightingConfig;
use crate::mesh::{Mesh, MeshVertex};
use crate::scene::{DrawItem, FrameSnapshot};
use anyhow::{Context, Result};
use glam::Vec3;
use std::sync::Arc;
use wgpu::util::DeviceExt;

use super::DEPTH_FORMAT;

const MIN_DRAW_CAPACITY: usize = 64;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(super) struct MeshFrameData {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    /// Direction toward the light.
    pub light_dir: [f32; 4],
    pub light_color: [f32; 4],
    pub ambient_color: [f32; 4],
}

impl MeshFrameData {
    pub fn new(frame: &FrameSnapshot<'_>, lighting: &LightingConfig) -> Self {
        let mut light_dir = Vec3::from_array(lighting.directional_position).normalize_or_zero();
        if light_dir == Vec3::ZERO {
            light_dir = Vec3::Y;
        }
        let light_color = Vec3::from_array(lighting.directional_color) * lighting.directional_intensity;
        let ambient = Vec3::from_array(lighting.ambient_color) * lighting.ambient_intensity;
        Self {
            view_proj: frame.view_projection.to_cols_array_2d(),
            camera_pos: frame.camera_position.extend(1.0).to_array(),
            light_dir: light_dir.extend(0.0).to_array(),
            light_color: light_color.extend(1.0).to_array(),
            ambient_color: ambient.extend(1.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(super) struct MeshDrawData {
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
    /// x: 1 for lit draws, 0 for unlit.
    pub params: [f32; 4],
}

impl From<&DrawItem> for MeshDrawData {
    fn from(draw: &DrawItem) -> Self {
        let lit = if draw.lit { 1.0 } else { 0.0 };
        Self { model: draw.model.to_cols_array_2d(), tint: draw.tint.to_array(), params: [lit, 0.0, 0.0, 0.0] }
    }
}

/// Vertex and index buffers of one uploaded mesh.
pub(super) struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Option<Self> {
        if mesh.is_empty() {
            return None;
        }
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} VB")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} IB")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Some(Self { vertex_buffer, index_buffer, index_count: mesh.indices.len() as u32 })
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, instance: u32) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, instance..instance + 1);
    }

    /// Releases the GPU memory right away instead of waiting for the last reference to drop.
    pub fn destroy(self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

pub(super) struct MeshPipelineResources {
    pub opaque: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
    pub frame_draw_bgl: Arc<wgpu::BindGroupLayout>,
}

#[derive(Default)]
pub(super) struct MeshPass {
    pub resources: Option<MeshPipelineResources>,
    pub frame_buffer: Option<wgpu::Buffer>,
    pub draw_buffer: Option<wgpu::Buffer>,
    pub draw_capacity: usize,
    pub frame_draw_bind_group: Option<wgpu::BindGroup>,
    draw_staging: Vec<MeshDrawData>,
}

impl MeshPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_resources(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat) -> Result<()> {
        if self.resources.is_some() {
            return Ok(());
        }
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../assets/shaders/scene.wgsl").into()),
        });

        let frame_draw_bgl = Arc::new(device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Frame/Draw BGL"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        }));

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[frame_draw_bgl.as_ref()],
            push_constant_ranges: &[],
        });

        let build = |label: &str, depth_write_enabled: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[MeshVertex::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };
        let opaque = build("Mesh Pipeline (opaque)", true);
        let transparent = build("Mesh Pipeline (transparent)", false);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mesh Frame Buffer"),
            size: std::mem::size_of::<MeshFrameData>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.frame_buffer = Some(frame_buffer);
        self.resources = Some(MeshPipelineResources { opaque, transparent, frame_draw_bgl });
        self.draw_buffer = None;
        self.draw_capacity = 0;
        self.ensure_draw_capacity(device, MIN_DRAW_CAPACITY)
    }

    pub fn ensure_draw_capacity(&mut self, device: &wgpu::Device, count: usize) -> Result<()> {
        if self.draw_buffer.is_some() && self.draw_capacity >= count {
            return Ok(());
        }
        let capacity = next_capacity(self.draw_capacity, count);
        let draw_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mesh Draw Buffer"),
            size: (capacity * std::mem::size_of::<MeshDrawData>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let resources = self.resources.as_ref().context("Mesh pipeline missing")?;
        let frame_buffer = self.frame_buffer.as_ref().context("Mesh frame buffer missing")?;
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Frame/Draw BG"),
            layout: resources.frame_draw_bgl.as_ref(),
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: frame_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: draw_buffer.as_entire_binding() },
            ],
        });
        if let Some(old) = self.draw_buffer.replace(draw_buffer) {
            old.destroy();
        }
        self.frame_draw_bind_group = Some(bind_group);
        self.draw_capacity = capacity;
        tracing::debug!(capacity, "Resized mesh draw buffer");
        Ok(())
    }

    /// Uploads frame constants and per-draw data for `frame`.
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &FrameSnapshot<'_>,
        lighting: &LightingConfig,
    ) -> Result<()> {
        self.ensure_draw_capacity(device, frame.draws.len())?;
        let frame_data = MeshFrameData::new(frame, lighting);
        queue.write_buffer(
            self.frame_buffer.as_ref().context("Mesh frame buffer missing")?,
            0,
            bytemuck::bytes_of(&frame_data),
        );
        self.draw_staging.clear();
        self.draw_staging.extend(frame.draws.iter().map(MeshDrawData::from));
        if !self.draw_staging.is_empty() {
            queue.write_buffer(
                self.draw_buffer.as_ref().context("Mesh draw buffer missing")?,
                0,
                bytemuck::cast_slice(&self.draw_staging),
            );
        }
        Ok(())
    }
}

/// Doubles from the current capacity until `needed` fits.
pub(super) fn next_capacity(current: usize, needed: usize) -> usize {
    let mut capacity = current.max(MIN_DRAW_CAPACITY);
    while capacity < needed {
        capacity *= 2;
    }
    capacity
}
