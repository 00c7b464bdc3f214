use glam::{Mat4, Vec3, Vec4};
use std::f32::consts::{PI, TAU};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl MeshVertex {
    pub fn new(position: Vec3, normal: Vec3, color: Vec4) -> Self {
        Self { position: position.to_array(), normal: normal.to_array(), color: color.to_array() }
    }

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: 24,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Face colors of a cube, in +x, -x, +y, -y, +z, -z order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceColors(pub [Vec4; 6]);

impl FaceColors {
    pub fn uniform(color: Vec4) -> Self {
        Self([color; 6])
    }

    /// Classic puzzle-cube palette: red, green, blue, yellow, magenta, cyan.
    pub fn puzzle() -> Self {
        Self([
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 1.0, 0.0, 1.0),
            Vec4::new(0.0, 0.0, 1.0, 1.0),
            Vec4::new(1.0, 1.0, 0.0, 1.0),
            Vec4::new(1.0, 0.0, 1.0, 1.0),
            Vec4::new(0.0, 1.0, 1.0, 1.0),
        ])
    }
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub bounds: MeshBounds,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBounds {
    pub min: Vec3,
    pub max: Vec3,
    pub center: Vec3,
    pub radius: f32,
}

impl Mesh {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        let bounds = MeshBounds::from_vertices(&vertices);
        Self { vertices, indices, bounds }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn cube(size: f32, colors: FaceColors) -> Self {
        let hs = size * 0.5;
        let positions = [
            Vec3::new(-hs, -hs, -hs),
            Vec3::new(hs, -hs, -hs),
            Vec3::new(hs, hs, -hs),
            Vec3::new(-hs, hs, -hs),
            Vec3::new(-hs, -hs, hs),
            Vec3::new(hs, -hs, hs),
            Vec3::new(hs, hs, hs),
            Vec3::new(-hs, hs, hs),
        ];
        let [right, left, top, bottom, front, back] = colors.0;

        let mut vertices = Vec::with_capacity(24);
        let mut write_face = |indices: [usize; 4], normal: Vec3, color: Vec4| {
            for &index in &indices {
                vertices.push(MeshVertex::new(positions[index], normal, color));
            }
        };

        write_face([1, 2, 6, 5], Vec3::X, right);
        write_face([0, 4, 7, 3], Vec3::NEG_X, left);
        write_face([3, 7, 6, 2], Vec3::Y, top);
        write_face([0, 1, 5, 4], Vec3::NEG_Y, bottom);
        write_face([4, 5, 6, 7], Vec3::Z, front);
        write_face([0, 3, 2, 1], Vec3::NEG_Z, back);

        let mut indices = Vec::with_capacity(36);
        for face in 0..6 {
            let base = face * 4;
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(vertices, indices)
    }

    /// UV sphere with smooth normals.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32, color: Vec4) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
        for y in 0..=height_segments {
            let v = y as f32 / height_segments as f32;
            let polar = v * PI;
            for x in 0..=width_segments {
                let u = x as f32 / width_segments as f32;
                let azimuth = u * TAU;
                let normal = Vec3::new(-azimuth.cos() * polar.sin(), polar.cos(), azimuth.sin() * polar.sin());
                vertices.push(MeshVertex::new(normal * radius, normal, color));
            }
        }

        let row = width_segments + 1;
        let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);
        for y in 0..height_segments {
            for x in 0..width_segments {
                let a = y * row + x + 1;
                let b = y * row + x;
                let c = (y + 1) * row + x;
                let d = (y + 1) * row + x + 1;
                if y != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if y != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self::new(vertices, indices)
    }

    /// Cone along +Y centered on its mid-height. Four radial segments give a pyramid.
    pub fn cone(radius: f32, height: f32, radial_segments: u32, color: Vec4) -> Self {
        let segments = radial_segments.max(3);
        let half = height * 0.5;
        let apex = Vec3::new(0.0, half, 0.0);
        let rim = |i: u32| {
            let angle = i as f32 / segments as f32 * TAU;
            Vec3::new(angle.sin() * radius, -half, angle.cos() * radius)
        };

        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for i in 0..segments {
            let a = rim(i);
            let b = rim(i + 1);
            let normal = (b - a).cross(apex - a).normalize_or_zero();
            let base = vertices.len() as u32;
            vertices.push(MeshVertex::new(a, normal, color));
            vertices.push(MeshVertex::new(b, normal, color));
            vertices.push(MeshVertex::new(apex, normal, color));
            indices.extend_from_slice(&[base, base + 1, base + 2]);
        }

        let center = vertices.len() as u32;
        vertices.push(MeshVertex::new(Vec3::new(0.0, -half, 0.0), Vec3::NEG_Y, color));
        for i in 0..segments {
            let base = vertices.len() as u32;
            vertices.push(MeshVertex::new(rim(i), Vec3::NEG_Y, color));
            vertices.push(MeshVertex::new(rim(i + 1), Vec3::NEG_Y, color));
            indices.extend_from_slice(&[center, base + 1, base]);
        }

        Self::new(vertices, indices)
    }

    /// Appends `other` transformed by `transform`.
    pub fn append(&mut self, other: &Mesh, transform: Mat4) {
        let base = self.vertices.len() as u32;
        let normal_matrix = transform.inverse().transpose();
        self.vertices.extend(other.vertices.iter().map(|v| {
            let position = transform.transform_point3(Vec3::from_array(v.position));
            let normal = normal_matrix.transform_vector3(Vec3::from_array(v.normal)).normalize_or_zero();
            MeshVertex { position: position.to_array(), normal: normal.to_array(), color: v.color }
        }));
        self.indices.extend(other.indices.iter().map(|idx| idx + base));
        self.bounds = MeshBounds::from_vertices(&self.vertices);
    }

    /// Shifts every vertex so the bounds are centered on the origin.
    pub fn recenter(&mut self) {
        let offset = self.bounds.center;
        for vertex in &mut self.vertices {
            let p = Vec3::from_array(vertex.position) - offset;
            vertex.position = p.to_array();
        }
        self.bounds = MeshBounds::from_vertices(&self.vertices);
    }
}

impl MeshBounds {
    pub fn from_vertices(vertices: &[MeshVertex]) -> Self {
        if vertices.is_empty() {
            return MeshBounds { min: Vec3::ZERO, max: Vec3::ZERO, center: Vec3::ZERO, radius: 0.0 };
        }
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for vertex in vertices {
            let pos = Vec3::from_array(vertex.position);
            min = min.min(pos);
            max = max.max(pos);
        }
        let center = (min + max) * 0.5;
        let mut radius: f32 = 0.0;
        for vertex in vertices {
            let pos = Vec3::from_array(vertex.position);
            radius = radius.max((pos - center).length());
        }
        MeshBounds { min, max, center, radius }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}
