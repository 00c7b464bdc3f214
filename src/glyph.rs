//! Extruded text meshes built from an 8x8 bitmap font.

use crate::mesh::{FaceColors, Mesh};
use font8x8::legacy::BASIC_LEGACY;
use glam::{Mat4, Quat, Vec3, Vec4};

const GLYPH_SIZE: usize = 8;

/// Something that can turn a string into a 3D mesh.
pub trait GlyphSource {
    fn name(&self) -> &str;
    fn build_text(&self, text: &str) -> Mesh;
}

/// Style for [`BlockFont`] text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Edge length of one font pixel in world units.
    pub pixel_size: f32,
    /// Extrusion depth in world units.
    pub depth: f32,
    /// Gap between characters, in font pixels.
    pub letter_spacing: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self { pixel_size: 0.16, depth: 0.2, letter_spacing: 1.0 }
    }
}

/// Renders each lit font pixel as a small box and merges them into one centered mesh.
#[derive(Debug, Clone)]
pub struct BlockFont {
    style: TextStyle,
    pixel: Mesh,
}

impl BlockFont {
    pub fn new(style: TextStyle) -> Self {
        let pixel = Mesh::cube(1.0, FaceColors::uniform(Vec4::ONE));
        Self { style, pixel }
    }

    pub fn style(&self) -> TextStyle {
        self.style
    }
}

impl Default for BlockFont {
    fn default() -> Self {
        Self::new(TextStyle::default())
    }
}

impl GlyphSource for BlockFont {
    fn name(&self) -> &str {
        "font8x8-block"
    }

    fn build_text(&self, text: &str) -> Mesh {
        let style = self.style;
        let advance = (GLYPH_SIZE as f32 + style.letter_spacing) * style.pixel_size;
        let scale = Vec3::new(style.pixel_size, style.pixel_size, style.depth);
        let mut mesh = Mesh::default();
        for (col, ch) in text.chars().enumerate() {
            let glyph = glyph_for_char(ch);
            let origin_x = col as f32 * advance;
            for (row, bits) in glyph.iter().enumerate() {
                for x_bit in 0..GLYPH_SIZE {
                    if (bits >> x_bit) & 0x01 == 0 {
                        continue;
                    }
                    let center = Vec3::new(
                        origin_x + (x_bit as f32 + 0.5) * style.pixel_size,
                        -(row as f32 + 0.5) * style.pixel_size,
                        0.0,
                    );
                    mesh.append(&self.pixel, Mat4::from_scale_rotation_translation(scale, Quat::IDENTITY, center));
                }
            }
        }
        mesh.recenter();
        mesh
    }
}

fn glyph_for_char(ch: char) -> [u8; 8] {
    let index = ch as usize;
    if index < BASIC_LEGACY.len() {
        BASIC_LEGACY[index]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}
