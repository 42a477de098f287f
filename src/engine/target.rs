//! Render targets and their per-frame events.
//!
//! A [`RenderTarget`] is a surface a camera draws into: an offscreen
//! texture or a window. Besides its colour/depth storage it carries the
//! material scheme used for technique resolution and the statistics of
//! the last rendered frame.

use crate::{
    data_structures::{color::Color, scene_graph::NodeId, texture::Texture},
    engine::{
        ItemId,
        listener::ListenerToken,
        material::{DEFAULT_SCHEME, MaterialId, TechniqueRef},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetId(pub(crate) u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
    Texture,
    Window,
}

/// Passed to [`RenderTargetListener`]s around every update of a target.
#[derive(Clone, Debug)]
pub struct RenderTargetEvent {
    pub target: TargetId,
    pub name: String,
    pub frame: u64,
}

/// Hooks invoked before and after a render target is drawn.
pub trait RenderTargetListener {
    fn pre_render_target_update(&mut self, _evt: &RenderTargetEvent) {}

    fn post_render_target_update(&mut self, _evt: &RenderTargetEvent) {}
}

/// A listener bound to the target it observes.
pub struct TargetListenerEntry {
    pub(crate) target: TargetId,
    pub(crate) listener: Box<dyn RenderTargetListener>,
}

pub type RenderTargetListenerToken = ListenerToken<TargetListenerEntry>;

/// How one item was drawn in a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderedItem {
    pub item: ItemId,
    pub visual: Option<NodeId>,
    /// The material assigned to the item.
    pub material: MaterialId,
    /// The technique actually used, possibly from another material.
    pub technique: TechniqueRef,
}

#[derive(Clone, Debug, Default)]
pub struct FrameStats {
    pub frame: u64,
    pub items: Vec<RenderedItem>,
    /// Items skipped because no technique could be resolved.
    pub skipped: usize,
}

impl FrameStats {
    /// Whether every drawn item used a technique of `material`.
    pub fn all_drawn_with(&self, material: MaterialId) -> bool {
        !self.items.is_empty() && self.items.iter().all(|r| r.technique.material == material)
    }

    /// Whether every drawn item used a technique of its own material.
    pub fn all_drawn_with_own_material(&self) -> bool {
        self.items.iter().all(|r| r.technique.material == r.material)
    }
}

pub struct RenderTarget {
    id: TargetId,
    name: String,
    kind: TargetKind,
    texture: Texture,
    anti_aliasing: u32,
    background: Color,
    scheme: String,
    native_texture_id: u32,
    frame_count: u64,
    stats: FrameStats,
}

impl RenderTarget {
    pub(crate) fn new(
        id: TargetId,
        name: &str,
        kind: TargetKind,
        width: u32,
        height: u32,
        native_texture_id: u32,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            texture: Texture::new(width, height, name),
            anti_aliasing: 0,
            background: Color::BLACK,
            scheme: DEFAULT_SCHEME.to_string(),
            native_texture_id,
            frame_count: 0,
            stats: FrameStats::default(),
        }
    }

    pub fn id(&self) -> TargetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    pub fn height(&self) -> u32 {
        self.texture.height()
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub(crate) fn texture_mut(&mut self) -> &mut Texture {
        &mut self.texture
    }

    pub fn anti_aliasing(&self) -> u32 {
        self.anti_aliasing
    }

    pub fn set_anti_aliasing(&mut self, samples: u32) {
        self.anti_aliasing = samples;
    }

    pub fn background_color(&self) -> Color {
        self.background
    }

    pub fn set_background_color(&mut self, colour: Color) {
        self.background = colour;
    }

    /// Scheme used to pick material techniques for this target.
    pub fn material_scheme(&self) -> &str {
        &self.scheme
    }

    pub fn set_material_scheme(&mut self, scheme: &str) {
        self.scheme = scheme.to_string();
    }

    /// Engine texture name, `0` for window targets.
    pub fn native_texture_id(&self) -> u32 {
        self.native_texture_id
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn last_frame(&self) -> &FrameStats {
        &self.stats
    }

    pub(crate) fn finish_frame(&mut self, mut stats: FrameStats) {
        self.frame_count += 1;
        stats.frame = self.frame_count;
        self.stats = stats;
    }
}
