//! Scene graph and hierarchical scene organization.
//!
//! Provides a hierarchical representation of the objects in a scene. Every
//! node carries a local transform relative to its parent and a cached world
//! transform. Renderable items are attached to nodes and inherit their
//! world transform, which is how a wire box follows the visual it outlines.
//!
//! Nodes flagged as *visuals* are the user-facing objects; internal nodes
//! (for example the node carrying a wire box's lines) resolve to their
//! nearest visual ancestor when picked.

use log::warn;

use crate::{
    data_structures::{
        arena::{Arena, Handle},
        transform::Transform,
    },
    engine::ItemId,
};

pub type NodeId = Handle<SceneNode>;

/// A user-facing scene object. Wraps the node that represents it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VisualId(pub(crate) NodeId);

impl VisualId {
    pub fn node(&self) -> NodeId {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub local: Transform,
    pub world: Transform,
    pub visible: bool,
    pub is_visual: bool,
    pub items: Vec<ItemId>,
}

impl SceneNode {
    fn new(name: &str, parent: Option<NodeId>, is_visual: bool) -> Self {
        Self {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            local: Transform::default(),
            world: Transform::default(),
            visible: true,
            is_visual,
            items: Vec::new(),
        }
    }
}

pub struct SceneGraph {
    nodes: Arena<SceneNode>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let root = nodes.insert(SceneNode::new("root", None, false));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    /// Create a node below `parent` (the root if `None`). Returns `None` if
    /// the parent no longer exists.
    pub fn create_node(&mut self, name: &str, parent: Option<NodeId>, is_visual: bool) -> Option<NodeId> {
        let parent = parent.unwrap_or(self.root);
        if !self.nodes.contains(parent) {
            warn!("Cannot create node '{}': parent {:?} does not exist.", name, parent);
            return None;
        }
        let id = self.nodes.insert(SceneNode::new(name, Some(parent), is_visual));
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        self.update_world_transforms_from(id);
        Some(id)
    }

    /// Remove `id` and its whole subtree. Returns the removed nodes so the
    /// caller can release what was attached to them. The root is never removed.
    pub fn remove_node(&mut self, id: NodeId) -> Vec<SceneNode> {
        if id == self.root {
            warn!("The scene root cannot be removed.");
            return Vec::new();
        }
        let Some(parent) = self.nodes.get(id).and_then(|node| node.parent) else {
            return Vec::new();
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|child| *child != id);
        }
        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children.iter().copied());
                removed.push(node);
            }
        }
        removed
    }

    pub fn set_local_transform(&mut self, id: NodeId, transform: Transform) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => node.local = transform,
            None => return false,
        }
        self.update_world_transforms_from(id);
        true
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        self.nodes
            .get_mut(id)
            .map(|node| node.visible = visible)
            .is_some()
    }

    /// A node is drawn only if it and all of its ancestors are visible.
    pub fn is_visible_in_tree(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(next) = current {
            match self.nodes.get(next) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// The node itself if it is a visual, otherwise its closest visual ancestor.
    pub fn nearest_visual(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(next) = current {
            let node = self.nodes.get(next)?;
            if node.is_visual {
                return Some(next);
            }
            current = node.parent;
        }
        None
    }

    pub fn world_transform(&self, id: NodeId) -> Option<Transform> {
        self.nodes.get(id).map(|node| node.world)
    }

    /// Recompute the cached world transforms of `id` and its subtree.
    pub fn update_world_transforms_from(&mut self, id: NodeId) {
        let parent_world = self
            .nodes
            .get(id)
            .and_then(|node| node.parent)
            .and_then(|parent| self.nodes.get(parent))
            .map(|parent| parent.world)
            .unwrap_or_default();
        self.update_world_transforms(id, &parent_world);
    }

    fn update_world_transforms(&mut self, id: NodeId, parents_world_transform: &Transform) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let world_transform = parents_world_transform * &node.local;
        node.world = world_transform;
        let children = node.children.clone();
        for child in children {
            self.update_world_transforms(child, &world_transform);
        }
    }

    /// Depth-first walk over the subtree of `id`, parents before children.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get(next) {
                out.push(next);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }
}
