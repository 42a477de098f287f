//! Object picking and selection.
//!
//! A [`SelectionBuffer`] renders every visible item with a unique id into
//! an offscreen id texture, then reads the id under a pixel to find out
//! which visual was hit. The picking pass works as follows:
//! 1. Render all items into the id texture, keeping the frontmost id per pixel
//! 2. Read the id at the requested pixel, rejecting coordinates outside the texture
//! 3. Map the id back to the visual that owns the item (wire boxes resolve to the visual they outline)
//!
//! Step 3 consults the scene again so that a visual destroyed after the
//! pass is never returned.

use std::{
    cell::RefCell,
    collections::HashMap,
    rc::{Rc, Weak},
};

use log::{debug, warn};

use crate::{
    data_structures::{
        scene_graph::{NodeId, VisualId},
        texture::IdTexture,
    },
    engine::{NativeCamera, SceneManager, SceneManagerRef},
};

pub struct SelectionBuffer {
    manager: Weak<RefCell<SceneManager>>,
    ids: IdTexture,
    translation: HashMap<u32, NodeId>,
}

impl SelectionBuffer {
    pub fn new(manager: &SceneManagerRef, width: u32, height: u32) -> Self {
        Self {
            manager: Rc::downgrade(manager),
            ids: IdTexture::new(width, height),
            translation: HashMap::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.ids.width()
    }

    pub fn height(&self) -> u32 {
        self.ids.height()
    }

    /// Render the id pass as seen by `camera`. Returns `false` if the scene is gone.
    pub fn update(&mut self, camera: &NativeCamera) -> bool {
        let Some(manager) = self.manager.upgrade() else {
            warn!("Selection buffer outlived its scene.");
            return false;
        };
        self.translation = manager.borrow().render_selection(camera, &mut self.ids);
        true
    }

    /// Visual under the pixel `(x, y)` of the last pass.
    pub fn visual_at(&self, x: i32, y: i32) -> Option<VisualId> {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return None;
        };
        let id = self.ids.id(x, y)?;
        if id == 0 {
            return None;
        }
        let node = *self.translation.get(&id)?;
        let manager = self.manager.upgrade()?;
        if !manager.borrow().graph().contains(node) {
            return None;
        }
        debug!("Selected item {} owned by {:?}", id, node);
        Some(VisualId(node))
    }

    /// Render a fresh pass and read the visual under `(x, y)`.
    pub fn on_selection_click(&mut self, camera: &NativeCamera, x: i32, y: i32) -> Option<VisualId> {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return None;
        }
        if !self.update(camera) {
            return None;
        }
        self.visual_at(x, y)
    }
}
