//! CPU textures backing render targets.
//!
//! This module provides [`Texture`], the colour and depth storage that the
//! engine rasterises into, and helpers for exporting its contents through
//! the `image` crate.

use std::path::Path;

use anyhow::*;

use crate::data_structures::color::Color;

/// A colour texture with an attached depth buffer.
///
/// Colour is stored as RGBA8 texels in row-major order, top row first.
/// Depth holds normalized device depth in `[0, 1]`, cleared to `1.0`.
#[derive(Clone, Debug)]
pub struct Texture {
    pub label: String,
    width: u32,
    height: u32,
    color: Vec<[u8; 4]>,
    depth: Vec<f32>,
}

impl Texture {
    /// Depth value of a cleared texel (far plane).
    pub const CLEAR_DEPTH: f32 = 1.0;

    /// Create a texture of at least 1x1 texels cleared to transparent black.
    pub fn new(width: u32, height: u32, label: &str) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let texels = width as usize * height as usize;
        Self {
            label: label.to_string(),
            width,
            height,
            color: vec![[0; 4]; texels],
            depth: vec![Self::CLEAR_DEPTH; texels],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, colour: Color) {
        let texel = colour.to_rgba8();
        self.color.iter_mut().for_each(|c| *c = texel);
        self.depth.iter_mut().for_each(|d| *d = Self::CLEAR_DEPTH);
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.index(x, y).map(|i| self.color[i])
    }

    /// All colour texels in row-major order, top row first.
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.color
    }

    pub fn depth(&self, x: u32, y: u32) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    /// Depth-tested write. Returns `true` if the texel was updated.
    pub fn write(&mut self, x: u32, y: u32, depth: f32, colour: [u8; 4]) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        if depth > self.depth[i] {
            return false;
        }
        self.depth[i] = depth;
        self.color[i] = colour;
        true
    }

    /// Raw RGBA8 bytes, `width * height * 4` long.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.color)
    }

    pub fn to_image(&self) -> image::RgbaImage {
        // The buffer always holds exactly width * height texels.
        image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            image::Rgba(self.color[y as usize * self.width as usize + x as usize])
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.to_image()
            .save(path)
            .with_context(|| format!("Failed to write texture '{}' to {}", self.label, path.display()))
    }
}

/// A `u32` per texel buffer used by the selection pass. `0` means "nothing".
#[derive(Clone, Debug)]
pub struct IdTexture {
    width: u32,
    height: u32,
    ids: Vec<u32>,
    depth: Vec<f32>,
}

impl IdTexture {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let texels = width as usize * height as usize;
        Self {
            width,
            height,
            ids: vec![0; texels],
            depth: vec![Texture::CLEAR_DEPTH; texels],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self) {
        self.ids.iter_mut().for_each(|id| *id = 0);
        self.depth.iter_mut().for_each(|d| *d = Texture::CLEAR_DEPTH);
    }

    pub fn write(&mut self, x: u32, y: u32, depth: f32, id: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let i = y as usize * self.width as usize + x as usize;
        if depth > self.depth[i] {
            return false;
        }
        self.depth[i] = depth;
        self.ids[i] = id;
        true
    }

    pub fn id(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.ids[y as usize * self.width as usize + x as usize])
    }
}
