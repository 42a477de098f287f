//! Renderable items and per-frame render queue composition.
//!
//! An [`Item`] is geometry plus a material attached to a scene node. Each
//! frame the scene manager walks the scene graph and flattens every visible
//! item into a [`Renderable`]: the item together with its world matrix and
//! a frame-local pick id, ready to be resolved against a material scheme
//! and rasterised.

use std::collections::HashMap;

use cgmath::{Matrix4, Point3};

use crate::{
    data_structures::{
        aabb::AxisAlignedBox,
        arena::{Arena, Handle},
        scene_graph::{NodeId, SceneGraph},
    },
    engine::material::MaterialId,
};

pub type ItemId = Handle<Item>;

/// Shape of a renderable item in its node's local space.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemGeometry {
    /// A solid box drawn as twelve triangles.
    Box(AxisAlignedBox),
    /// A line list.
    Lines(Vec<[Point3<f64>; 2]>),
}

impl ItemGeometry {
    /// Local-space bounds of the geometry.
    pub fn bounds(&self) -> AxisAlignedBox {
        match self {
            ItemGeometry::Box(aabb) => *aabb,
            ItemGeometry::Lines(segments) => {
                let mut bounds = AxisAlignedBox::empty();
                segments.iter().flatten().for_each(|p| bounds.merge_point(*p));
                bounds
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Item {
    pub name: String,
    pub node: NodeId,
    pub geometry: ItemGeometry,
    pub material: MaterialId,
    pub visible: bool,
}

/// A visible item prepared for drawing.
pub struct Renderable<'a> {
    pub item: ItemId,
    pub node: NodeId,
    /// The visual owning the item's node, used for picking.
    pub visual: Option<NodeId>,
    pub geometry: &'a ItemGeometry,
    pub world: Matrix4<f64>,
    pub material: MaterialId,
    /// Non-zero id written by the selection pass.
    pub id: u32,
}

/// Flatten all visible items in the scene, parents before children.
pub(crate) fn collect_renderables<'a>(
    graph: &SceneGraph,
    items: &'a Arena<Item>,
) -> Vec<Renderable<'a>> {
    let mut renderables = Vec::new();
    for node_id in graph.descendants(graph.root()) {
        if !graph.is_visible_in_tree(node_id) {
            continue;
        }
        let Some(node) = graph.node(node_id) else {
            continue;
        };
        let world = node.world.to_matrix();
        for item_id in &node.items {
            let Some(item) = items.get(*item_id) else {
                continue;
            };
            if !item.visible {
                continue;
            }
            renderables.push(Renderable {
                item: *item_id,
                node: node_id,
                visual: graph.nearest_visual(node_id),
                geometry: &item.geometry,
                world,
                material: item.material,
                id: renderables.len() as u32 + 1,
            });
        }
    }
    renderables
}

/// Map pick ids back to the visuals that own them.
pub(crate) fn map_ids(renderables: &[Renderable<'_>]) -> HashMap<u32, NodeId> {
    renderables
        .iter()
        .filter_map(|r| r.visual.map(|visual| (r.id, visual)))
        .collect()
}
