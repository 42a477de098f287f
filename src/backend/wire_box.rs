//! Wire box drawn by the engine.
//!
//! The outline lives on its own scene node below the visual it is attached
//! to, so it inherits that visual's world transform. The node carries one
//! line-list item with the twelve box edges. Destroying the visual takes
//! the node with it; engine-side updates on the wire box are skipped from
//! then on while its own state keeps round-tripping.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use cgmath::Point3;
use log::{debug, warn};

use crate::{
    data_structures::{
        aabb::AxisAlignedBox,
        scene_graph::{NodeId, VisualId},
    },
    engine::{ItemGeometry, ItemId, MaterialId, SceneManager, SceneManagerRef},
    geometry::{Geometry, WireBox},
};

pub struct EngineWireBox {
    manager: Weak<RefCell<SceneManager>>,
    name: String,
    material: MaterialId,
    aabb: AxisAlignedBox,
    visible: bool,
    visual: Option<VisualId>,
    node: Option<NodeId>,
    item: Option<ItemId>,
}

fn segments_of(aabb: &AxisAlignedBox) -> Vec<[Point3<f64>; 2]> {
    if !aabb.is_valid() {
        return Vec::new();
    }
    aabb.edges().to_vec()
}

impl EngineWireBox {
    pub(crate) fn new(manager: &SceneManagerRef, name: &str, material: MaterialId) -> Self {
        Self {
            manager: Rc::downgrade(manager),
            name: name.to_string(),
            material,
            aabb: AxisAlignedBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0)),
            visible: true,
            visual: None,
            node: None,
            item: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Item drawing the outline, `None` while detached.
    pub fn item(&self) -> Option<ItemId> {
        let manager = self.manager.upgrade()?;
        let item = self.item?;
        manager.borrow().item(item).map(|_| item)
    }

    /// The outline node if it still exists in the scene.
    fn live_node(&mut self, scene: &SceneManager) -> Option<NodeId> {
        let node = self.node?;
        if scene.graph().contains(node) {
            return Some(node);
        }
        debug!("Wire box '{}' lost its visual", self.name);
        self.node = None;
        self.item = None;
        None
    }

    fn detach(&mut self) {
        let Some(node) = self.node.take() else {
            return;
        };
        self.item = None;
        let Some(manager) = self.manager.upgrade() else {
            return;
        };
        match manager.try_borrow_mut() {
            Ok(mut scene) => scene.destroy_node(node),
            Err(_) => warn!("Scene busy, wire box node of '{}' leaked.", self.name),
        }
    }
}

impl Geometry for EngineWireBox {
    fn bounds(&self) -> AxisAlignedBox {
        self.aabb
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        let Some(manager) = self.manager.upgrade() else {
            return;
        };
        let mut scene = manager.borrow_mut();
        if let Some(node) = self.live_node(&scene) {
            scene.graph_mut().set_visible(node, visible);
        }
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn parent(&self) -> Option<VisualId> {
        let visual = self.visual?;
        let manager = self.manager.upgrade()?;
        let alive = manager.borrow().graph().contains(visual.node());
        alive.then_some(visual)
    }
}

impl WireBox for EngineWireBox {
    fn set_box(&mut self, aabb: AxisAlignedBox) {
        self.aabb = aabb;
        let Some(manager) = self.manager.upgrade() else {
            return;
        };
        let mut scene = manager.borrow_mut();
        if self.live_node(&scene).is_none() {
            return;
        }
        if let Some(item) = self.item.and_then(|item| scene.item_mut(item)) {
            item.geometry = ItemGeometry::Lines(segments_of(&aabb));
        }
    }

    fn get_box(&self) -> AxisAlignedBox {
        self.aabb
    }

    fn set_visual(&mut self, visual: VisualId) {
        self.detach();
        let Some(manager) = self.manager.upgrade() else {
            return;
        };
        let mut scene = manager.borrow_mut();
        let is_visual = scene
            .graph()
            .node(visual.node())
            .is_some_and(|node| node.is_visual);
        if !is_visual {
            warn!("Wire box '{}': {:?} is not a visual.", self.name, visual);
            self.visual = None;
            return;
        }
        let Some(node) = scene.create_node(&self.name, Some(visual.node()), false) else {
            self.visual = None;
            return;
        };
        self.item = scene.create_item(
            node,
            &self.name,
            ItemGeometry::Lines(segments_of(&self.aabb)),
            self.material,
        );
        scene.graph_mut().set_visible(node, self.visible);
        self.node = Some(node);
        self.visual = Some(visual);
    }

    fn segments(&self) -> Vec<[Point3<f64>; 2]> {
        segments_of(&self.aabb)
    }
}

impl Drop for EngineWireBox {
    fn drop(&mut self) {
        self.detach();
    }
}
