//! Render targets owned by engine-backed cameras.
//!
//! [`EngineRenderTarget`] keeps the user-facing settings of a target and the
//! native [`RenderTarget`] built from them. Changing the size or the
//! anti-aliasing marks the target dirty; it is rebuilt right before the next
//! frame. A rebuilt native target gets a new id, so an active material
//! override is removed and installed again on the new target.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use log::{debug, warn};

use crate::{
    backend::render_target_material::EngineRenderTargetMaterial,
    data_structures::{color::Color, texture::Texture},
    engine::{
        DEFAULT_SCHEME, FrameStats, MaterialId, NativeCamera, RenderTarget, SceneManager,
        SceneManagerRef, TargetId, TargetKind,
    },
};

pub struct EngineRenderTarget {
    manager: Weak<RefCell<SceneManager>>,
    name: String,
    kind: TargetKind,
    target: Option<RenderTarget>,
    width: u32,
    height: u32,
    anti_aliasing: u32,
    background: Color,
    material: Option<MaterialId>,
    material_override: Option<EngineRenderTargetMaterial>,
    target_dirty: bool,
    material_dirty: bool,
}

impl EngineRenderTarget {
    /// The native target is built by the first [`Self::pre_render`].
    pub(crate) fn new(
        manager: &SceneManagerRef,
        name: &str,
        kind: TargetKind,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            manager: Rc::downgrade(manager),
            name: name.to_string(),
            kind,
            target: None,
            width: width.max(1),
            height: height.max(1),
            anti_aliasing: 0,
            background: Color::BLACK,
            material: None,
            material_override: None,
            target_dirty: true,
            material_dirty: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Id of the native target, `None` once destroyed.
    pub fn id(&self) -> Option<TargetId> {
        self.target.as_ref().map(|t| t.id())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn set_width(&mut self, width: u32) {
        if width == 0 {
            warn!("Render target '{}' cannot have zero width.", self.name);
            return;
        }
        self.target_dirty |= width != self.width;
        self.width = width;
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_height(&mut self, height: u32) {
        if height == 0 {
            warn!("Render target '{}' cannot have zero height.", self.name);
            return;
        }
        self.target_dirty |= height != self.height;
        self.height = height;
    }

    pub fn anti_aliasing(&self) -> u32 {
        self.anti_aliasing
    }

    pub fn set_anti_aliasing(&mut self, samples: u32) {
        self.target_dirty |= samples != self.anti_aliasing;
        self.anti_aliasing = samples;
    }

    pub fn background_color(&self) -> Color {
        self.background
    }

    pub fn set_background_color(&mut self, colour: Color) {
        self.background = colour;
        if let Some(target) = self.target.as_mut() {
            target.set_background_color(colour);
        }
    }

    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }

    /// Draw everything in this target with `material`, or with their own
    /// materials again for `None`. Takes effect on the next frame.
    pub fn set_material(&mut self, material: Option<MaterialId>) {
        self.material = material;
        self.material_dirty = true;
    }

    pub fn material_override(&self) -> Option<&EngineRenderTargetMaterial> {
        self.material_override.as_ref()
    }

    /// Engine texture name, `0` for windows and destroyed targets.
    pub fn native_texture_id(&self) -> u32 {
        match (&self.target, self.kind) {
            (Some(target), TargetKind::Texture) => target.native_texture_id(),
            _ => 0,
        }
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.target.as_ref().map(|t| t.texture())
    }

    pub fn frame_count(&self) -> u64 {
        self.target.as_ref().map_or(0, |t| t.frame_count())
    }

    pub fn frame_stats(&self) -> Option<&FrameStats> {
        self.target
            .as_ref()
            .filter(|t| t.frame_count() > 0)
            .map(|t| t.last_frame())
    }

    fn build_target(&mut self, scene: &mut SceneManager) {
        if let Some(old) = self.target.take() {
            scene.destroy_render_target(old);
        }
        let mut target = match self.kind {
            TargetKind::Texture => scene.create_render_texture(&self.name, self.width, self.height),
            TargetKind::Window => scene.create_render_window(&self.name, self.width, self.height),
        };
        target.set_anti_aliasing(self.anti_aliasing);
        target.set_background_color(self.background);
        debug!(
            "Built render target '{}' {}x{} with {} sample(s)",
            self.name, self.width, self.height, self.anti_aliasing
        );
        self.target = Some(target);
    }

    fn update_material(&mut self, manager: &SceneManagerRef) {
        // The old override must be gone before its scheme is reset.
        self.material_override = None;
        let Some(target) = self.target.as_mut() else {
            return;
        };
        target.set_material_scheme(DEFAULT_SCHEME);
        if let Some(material) = self.material {
            self.material_override = Some(EngineRenderTargetMaterial::new(manager, target, material));
        }
    }

    /// Apply pending changes to the native target.
    pub fn pre_render(&mut self) {
        let Some(manager) = self.manager.upgrade() else {
            return;
        };
        if self.target_dirty {
            // Listeners are bound to the old target id.
            self.material_override = None;
            self.build_target(&mut manager.borrow_mut());
            self.target_dirty = false;
            self.material_dirty = true;
        }
        if self.material_dirty {
            self.update_material(&manager);
            self.material_dirty = false;
        }
    }

    /// Draw one frame of the scene as seen by `camera`.
    pub fn render(&mut self, camera: &NativeCamera) {
        self.pre_render();
        let Some(manager) = self.manager.upgrade() else {
            warn!("Render target '{}' outlived its scene.", self.name);
            return;
        };
        let Some(target) = self.target.as_mut() else {
            return;
        };
        manager.borrow_mut().update_render_target(camera, target);
    }

    /// Release the override and the native target. Safe to call twice.
    pub fn destroy(&mut self) {
        self.material_override = None;
        let Some(target) = self.target.take() else {
            return;
        };
        let Some(manager) = self.manager.upgrade() else {
            return;
        };
        match manager.try_borrow_mut() {
            Ok(mut scene) => scene.destroy_render_target(target),
            Err(_) => warn!("Scene busy, render target '{}' leaked.", self.name),
        };
    }
}

impl Drop for EngineRenderTarget {
    fn drop(&mut self) {
        self.destroy();
    }
}
