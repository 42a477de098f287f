//! The scene: entry point and factory for everything else.
//!
//! A [`Scene`] owns the engine's scene manager and hands out the objects
//! that work on it:
//!
//! - visuals, the user-facing scene objects, optionally with a solid box
//! - materials
//! - cameras through a validating [`CameraBuilder`]
//! - wire boxes and ray queries
//!
//! Created objects only hold weak references to the scene manager. Destroy
//! cameras before dropping the scene; a camera that outlives its scene
//! still releases its own state but can no longer render.

use anyhow::*;
use log::{info, warn};

use crate::{
    backend::{CameraBuilder, EngineWireBox, RayQuery},
    camera::CameraSettings,
    config::SceneConfig,
    data_structures::{
        aabb::AxisAlignedBox, color::Color, scene_graph::VisualId, transform::Transform,
    },
    engine::{
        ItemGeometry, ItemId, Material, MaterialId, ResourceCounts, SceneManager, SceneManagerRef,
        Technique,
    },
};

const LINE_MATERIAL: &str = "flow_rendering/lines";

pub struct Scene {
    config: SceneConfig,
    manager: SceneManagerRef,
    line_material: MaterialId,
    wire_boxes_created: usize,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Result<Self> {
        let manager = SceneManager::new_shared(&config.name);
        let line_material = manager
            .borrow_mut()
            .create_material(Material::with_colour(LINE_MATERIAL, config.line_colour))
            .context("Failed to create the line material")?;
        info!("Scene '{}' created", config.name);
        Ok(Self {
            config,
            manager,
            line_material,
            wire_boxes_created: 0,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The engine scene manager. Do not hold a borrow across calls into
    /// scene objects.
    pub fn manager(&self) -> &SceneManagerRef {
        &self.manager
    }

    pub fn resource_counts(&self) -> ResourceCounts {
        self.manager.borrow().resource_counts()
    }

    // Materials

    /// A material with one flat-colour technique in the default scheme.
    pub fn create_material(&self, name: &str, colour: Color) -> Result<MaterialId> {
        self.manager
            .borrow_mut()
            .create_material(Material::with_colour(name, colour))
    }

    /// Register a material built by the caller, e.g. one with several schemes.
    pub fn add_material(&self, material: Material) -> Result<MaterialId> {
        self.manager.borrow_mut().create_material(material)
    }

    pub fn add_technique(&self, material: MaterialId, technique: Technique) -> Option<usize> {
        self.manager
            .borrow_mut()
            .materials_mut()
            .add_technique(material, technique)
    }

    pub fn material(&self, name: &str) -> Option<MaterialId> {
        self.manager.borrow().materials().by_name(name)
    }

    pub fn line_material(&self) -> MaterialId {
        self.line_material
    }

    // Visuals

    pub fn create_visual(&self, name: &str) -> Option<VisualId> {
        self.manager
            .borrow_mut()
            .create_node(name, None, true)
            .map(VisualId)
    }

    pub fn create_child_visual(&self, parent: VisualId, name: &str) -> Option<VisualId> {
        self.manager
            .borrow_mut()
            .create_node(name, Some(parent.node()), true)
            .map(VisualId)
    }

    pub fn contains_visual(&self, visual: VisualId) -> bool {
        self.manager.borrow().graph().contains(visual.node())
    }

    pub fn visual_name(&self, visual: VisualId) -> Option<String> {
        self.manager
            .borrow()
            .graph()
            .node(visual.node())
            .map(|node| node.name.clone())
    }

    /// Attach a solid box drawn with `material` to `visual`.
    pub fn add_visual_box(
        &self,
        visual: VisualId,
        aabb: AxisAlignedBox,
        material: MaterialId,
    ) -> Option<ItemId> {
        let mut scene = self.manager.borrow_mut();
        if scene.materials().get(material).is_none() {
            warn!("Cannot add a box with a destroyed material to {:?}.", visual);
            return None;
        }
        let name = scene.graph().node(visual.node())?.name.clone();
        scene.create_item(visual.node(), &name, ItemGeometry::Box(aabb), material)
    }

    /// Change the material an item is drawn with.
    pub fn set_item_material(&self, item: ItemId, material: MaterialId) -> bool {
        let mut scene = self.manager.borrow_mut();
        match scene.item_mut(item) {
            Some(item) => {
                item.material = material;
                true
            }
            None => false,
        }
    }

    pub fn set_visual_transform(&self, visual: VisualId, transform: Transform) -> bool {
        self.manager
            .borrow_mut()
            .set_node_transform(visual.node(), transform)
    }

    pub fn visual_transform(&self, visual: VisualId) -> Option<Transform> {
        self.manager
            .borrow()
            .graph()
            .node(visual.node())
            .map(|node| node.local)
    }

    pub fn set_visual_visible(&self, visual: VisualId, visible: bool) -> bool {
        self.manager
            .borrow_mut()
            .graph_mut()
            .set_visible(visual.node(), visible)
    }

    /// Remove `visual`, its children and everything attached to them,
    /// including wire boxes.
    pub fn destroy_visual(&self, visual: VisualId) {
        self.manager.borrow_mut().destroy_node(visual.node());
    }

    // Factories

    /// Settings a new camera starts from, taken from the scene config.
    pub fn camera_settings(&self, name: &str) -> CameraSettings {
        let defaults = &self.config.camera;
        CameraSettings {
            name: name.to_string(),
            hfov: defaults.hfov,
            aspect_ratio: None,
            near: defaults.near,
            far: defaults.far,
            anti_aliasing: defaults.anti_aliasing,
            image_width: defaults.image_width,
            image_height: defaults.image_height,
            background: defaults.background,
            position: cgmath::Point3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }

    pub fn camera(&self, name: &str) -> CameraBuilder {
        CameraBuilder::new(&self.manager, self.camera_settings(name))
    }

    /// A wire box drawn with the scene's line colour.
    pub fn create_wire_box(&mut self) -> EngineWireBox {
        let material = self.line_material;
        self.create_wire_box_with_material(material)
    }

    pub fn create_wire_box_with_material(&mut self, material: MaterialId) -> EngineWireBox {
        let name = format!("{}::wire_box_{}", self.config.name, self.wire_boxes_created);
        self.wire_boxes_created += 1;
        EngineWireBox::new(&self.manager, &name, material)
    }

    pub fn create_ray_query(&self) -> RayQuery {
        RayQuery::new(&self.manager)
    }
}
