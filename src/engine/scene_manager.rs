//! The engine's scene manager.
//!
//! [`SceneManager`] owns everything that makes up a scene on the engine
//! side: the scene graph, the renderable items attached to it, the
//! materials, and the render-target listener table. It is also the factory
//! for native cameras and render targets and keeps [`ResourceCounts`] so
//! that leaks show up as counts that never return to their baseline.
//!
//! # Frame protocol
//!
//! [`SceneManager::update_render_target`] draws one frame:
//! 1. Fire `pre_render_target_update` on the target's listeners
//! 2. Clear colour and depth to the target's background
//! 3. Collect visible items and resolve each one's technique for the target's scheme
//! 4. Rasterise every item with its technique's colour
//! 5. Fire `post_render_target_update` and store the frame statistics

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use anyhow::*;
use log::{debug, warn};

use crate::{
    data_structures::{
        aabb::AxisAlignedBox,
        arena::Arena,
        scene_graph::{NodeId, SceneGraph},
        texture::IdTexture,
        transform::Transform,
    },
    engine::{
        camera::NativeCamera,
        listener::ListenerTable,
        material::{Material, MaterialId, MaterialListener, MaterialListenerToken, MaterialManager},
        raster::{ColorSink, IdSink, draw_geometry},
        render::{Item, ItemGeometry, ItemId, collect_renderables, map_ids},
        target::{
            FrameStats, RenderTarget, RenderTargetEvent, RenderTargetListener,
            RenderTargetListenerToken, RenderedItem, TargetId, TargetKind, TargetListenerEntry,
        },
    },
};

/// Shared handle to a scene manager. The engine is single threaded.
pub type SceneManagerRef = Rc<RefCell<SceneManager>>;

/// Live native resources created through a scene manager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub cameras: usize,
    pub render_textures: usize,
    pub render_windows: usize,
}

pub struct SceneManager {
    name: String,
    graph: SceneGraph,
    items: Arena<Item>,
    materials: MaterialManager,
    target_listeners: ListenerTable<TargetListenerEntry>,
    counts: ResourceCounts,
    next_camera_id: u32,
    next_target_id: u32,
    // 0 is reserved for "no texture"
    next_texture_name: u32,
}

impl SceneManager {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            graph: SceneGraph::new(),
            items: Arena::new(),
            materials: MaterialManager::new(),
            target_listeners: ListenerTable::new(),
            counts: ResourceCounts::default(),
            next_camera_id: 0,
            next_target_id: 0,
            next_texture_name: 1,
        }
    }

    pub fn new_shared(name: &str) -> SceneManagerRef {
        Rc::new(RefCell::new(Self::new(name)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn resource_counts(&self) -> ResourceCounts {
        self.counts
    }

    // Nodes and items

    pub fn create_node(&mut self, name: &str, parent: Option<NodeId>, is_visual: bool) -> Option<NodeId> {
        self.graph.create_node(name, parent, is_visual)
    }

    /// Remove a node, its subtree and every item attached to them.
    pub fn destroy_node(&mut self, node: NodeId) {
        for removed in self.graph.remove_node(node) {
            for item in removed.items {
                self.items.remove(item);
            }
        }
    }

    pub fn set_node_transform(&mut self, node: NodeId, transform: Transform) -> bool {
        self.graph.set_local_transform(node, transform)
    }

    pub fn create_item(
        &mut self,
        node: NodeId,
        name: &str,
        geometry: ItemGeometry,
        material: MaterialId,
    ) -> Option<ItemId> {
        if !self.graph.contains(node) {
            warn!("Cannot attach item '{}': node {:?} does not exist.", name, node);
            return None;
        }
        let id = self.items.insert(Item {
            name: name.to_string(),
            node,
            geometry,
            material,
            visible: true,
        });
        if let Some(node) = self.graph.node_mut(node) {
            node.items.push(id);
        }
        Some(id)
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// World-space bounds of an item, `None` if it or its node is gone.
    pub fn item_world_bounds(&self, id: ItemId) -> Option<AxisAlignedBox> {
        let item = self.items.get(id)?;
        let world = self.graph.world_transform(item.node)?;
        Some(item.geometry.bounds().transformed(&world.to_matrix()))
    }

    /// Items currently drawn, with the visual owning each.
    pub fn visible_items(&self) -> Vec<(ItemId, Option<NodeId>)> {
        collect_renderables(&self.graph, &self.items)
            .iter()
            .map(|r| (r.item, r.visual))
            .collect()
    }

    // Materials

    pub fn materials(&self) -> &MaterialManager {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut MaterialManager {
        &mut self.materials
    }

    pub fn create_material(&mut self, material: Material) -> Result<MaterialId> {
        self.materials.create(material)
    }

    pub fn add_material_listener(&mut self, listener: Box<dyn MaterialListener>) -> MaterialListenerToken {
        self.materials.add_listener(listener)
    }

    pub fn remove_material_listener(&mut self, token: MaterialListenerToken) -> bool {
        self.materials.remove_listener(token)
    }

    // Native cameras and targets

    pub fn create_camera(&mut self, name: &str) -> NativeCamera {
        let id = self.next_camera_id;
        self.next_camera_id += 1;
        self.counts.cameras += 1;
        debug!("Created native camera '{}' ({} live)", name, self.counts.cameras);
        NativeCamera::new(id, name)
    }

    pub fn destroy_camera(&mut self, camera: NativeCamera) {
        self.counts.cameras = self.counts.cameras.saturating_sub(1);
        debug!("Destroyed native camera '{}' ({} live)", camera.name(), self.counts.cameras);
    }

    fn next_target_id(&mut self) -> TargetId {
        let id = TargetId(self.next_target_id);
        self.next_target_id += 1;
        id
    }

    pub fn create_render_texture(&mut self, name: &str, width: u32, height: u32) -> RenderTarget {
        let id = self.next_target_id();
        let texture_name = self.next_texture_name;
        self.next_texture_name += 1;
        self.counts.render_textures += 1;
        debug!("Created render texture '{}' {}x{} (texture {})", name, width, height, texture_name);
        RenderTarget::new(id, name, TargetKind::Texture, width, height, texture_name)
    }

    pub fn create_render_window(&mut self, name: &str, width: u32, height: u32) -> RenderTarget {
        let id = self.next_target_id();
        self.counts.render_windows += 1;
        debug!("Created render window '{}' {}x{}", name, width, height);
        RenderTarget::new(id, name, TargetKind::Window, width, height, 0)
    }

    /// Release a render target. Listeners still registered for it are dropped.
    pub fn destroy_render_target(&mut self, target: RenderTarget) {
        match target.kind() {
            TargetKind::Texture => {
                self.counts.render_textures = self.counts.render_textures.saturating_sub(1)
            }
            TargetKind::Window => {
                self.counts.render_windows = self.counts.render_windows.saturating_sub(1)
            }
        }
        let id = target.id();
        let dropped = self.target_listeners.remove_where(|entry| entry.target == id);
        if dropped > 0 {
            warn!(
                "Render target '{}' destroyed with {} listener(s) still registered.",
                target.name(),
                dropped
            );
        }
    }

    pub fn add_render_target_listener(
        &mut self,
        target: TargetId,
        listener: Box<dyn RenderTargetListener>,
    ) -> RenderTargetListenerToken {
        self.target_listeners.add(TargetListenerEntry { target, listener })
    }

    pub fn remove_render_target_listener(&mut self, token: RenderTargetListenerToken) -> bool {
        self.target_listeners.remove(token).is_some()
    }

    pub fn has_render_target_listener(&self, token: RenderTargetListenerToken) -> bool {
        self.target_listeners.contains(token)
    }

    pub fn render_target_listener_count(&self) -> usize {
        self.target_listeners.len()
    }

    // Rendering

    fn fire_target_event(&mut self, evt: &RenderTargetEvent, pre: bool) {
        self.target_listeners.for_each_mut(|entry| {
            if entry.target != evt.target {
                return;
            }
            if pre {
                entry.listener.pre_render_target_update(evt);
            } else {
                entry.listener.post_render_target_update(evt);
            }
        });
    }

    /// Draw one frame of the scene as seen by `camera` into `target`.
    pub fn update_render_target(&mut self, camera: &NativeCamera, target: &mut RenderTarget) {
        let evt = RenderTargetEvent {
            target: target.id(),
            name: target.name().to_string(),
            frame: target.frame_count() + 1,
        };
        self.fire_target_event(&evt, true);

        let background = target.background_color();
        target.texture_mut().clear(background);
        let view_proj = camera.view_projection_matrix();
        let samples = target.anti_aliasing();
        let scheme = target.material_scheme().to_string();

        let mut stats = FrameStats::default();
        {
            let Self {
                graph,
                items,
                materials,
                ..
            } = self;
            let renderables = collect_renderables(graph, items);
            for renderable in &renderables {
                let Some(technique) = materials.resolve_technique(&scheme, renderable) else {
                    warn!("No technique to draw item {:?}, skipping.", renderable.item);
                    stats.skipped += 1;
                    continue;
                };
                let Some(colour) = materials.technique(technique).map(|t| t.colour) else {
                    stats.skipped += 1;
                    continue;
                };
                let mut sink = ColorSink {
                    texture: target.texture_mut(),
                    colour,
                };
                draw_geometry(&mut sink, &(view_proj * renderable.world), renderable.geometry, samples);
                stats.items.push(RenderedItem {
                    item: renderable.item,
                    visual: renderable.visual,
                    material: renderable.material,
                    technique,
                });
            }
        }
        target.finish_frame(stats);

        self.fire_target_event(&evt, false);
    }

    /// Draw the id pass used for picking. Returns the id to visual mapping.
    pub fn render_selection(&self, camera: &NativeCamera, ids: &mut IdTexture) -> HashMap<u32, NodeId> {
        ids.clear();
        let view_proj = camera.view_projection_matrix();
        let renderables = collect_renderables(&self.graph, &self.items);
        for renderable in &renderables {
            let mut sink = IdSink {
                texture: &mut *ids,
                id: renderable.id,
            };
            draw_geometry(&mut sink, &(view_proj * renderable.world), renderable.geometry, 1);
        }
        map_ids(&renderables)
    }
}
