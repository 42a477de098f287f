//! Materials, techniques and scheme-based technique resolution.
//!
//! A [`Material`] offers one or more [`Technique`]s, each bound to a named
//! scheme. Render targets select a scheme; when a material has no
//! technique for it, the [`MaterialManager`] asks its registered
//! [`MaterialListener`]s for a replacement before falling back to the
//! material's default-scheme technique.

use std::collections::HashMap;

use anyhow::*;
use log::{debug, warn};

use crate::{
    data_structures::{
        arena::{Arena, Handle},
        color::Color,
    },
    engine::{
        listener::{ListenerTable, ListenerToken},
        render::Renderable,
    },
};

/// Scheme every material technique is created in unless stated otherwise.
pub const DEFAULT_SCHEME: &str = "Default";

pub type MaterialId = Handle<Material>;

/// One way of drawing a material. Only the flat colour is consumed by the
/// rasteriser.
#[derive(Clone, Debug, PartialEq)]
pub struct Technique {
    pub name: String,
    pub scheme: String,
    pub supported: bool,
    pub colour: Color,
}

impl Technique {
    pub fn new(name: &str, scheme: &str, colour: Color) -> Self {
        Self {
            name: name.to_string(),
            scheme: scheme.to_string(),
            supported: true,
            colour,
        }
    }

    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Material {
    name: String,
    techniques: Vec<Technique>,
}

impl Material {
    /// A material without techniques. It cannot be drawn until one is added.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            techniques: Vec::new(),
        }
    }

    /// A material with a single technique in the default scheme.
    pub fn with_colour(name: &str, colour: Color) -> Self {
        let mut material = Self::new(name);
        material.add_technique(Technique::new("main", DEFAULT_SCHEME, colour));
        material
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_technique(&mut self, technique: Technique) -> usize {
        self.techniques.push(technique);
        self.techniques.len() - 1
    }

    pub fn techniques(&self) -> &[Technique] {
        &self.techniques
    }

    pub fn technique(&self, index: usize) -> Option<&Technique> {
        self.techniques.get(index)
    }

    /// First supported technique of `scheme`.
    pub fn best_technique(&self, scheme: &str) -> Option<usize> {
        self.techniques
            .iter()
            .position(|t| t.supported && t.scheme == scheme)
    }

    /// First supported technique regardless of scheme.
    pub fn first_supported_technique(&self) -> Option<usize> {
        self.techniques.iter().position(|t| t.supported)
    }
}

/// A technique of a specific material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TechniqueRef {
    pub material: MaterialId,
    pub technique: usize,
}

/// Fallback handler consulted when a material lacks a technique for the
/// requested scheme.
pub trait MaterialListener {
    /// Return the technique to use instead, or `None` to let the next
    /// listener (and finally the default scheme) decide.
    fn handle_scheme_not_found(
        &mut self,
        scheme_index: u16,
        scheme_name: &str,
        original_material: &Material,
        lod_index: u16,
        renderable: &Renderable<'_>,
        materials: &Arena<Material>,
    ) -> Option<TechniqueRef>;
}

pub type MaterialListenerToken = ListenerToken<Box<dyn MaterialListener>>;

/// Stable indices for scheme names.
#[derive(Default)]
struct SchemeRegistry {
    indices: HashMap<String, u16>,
}

impl SchemeRegistry {
    fn index_of(&mut self, name: &str) -> u16 {
        if let Some(index) = self.indices.get(name) {
            return *index;
        }
        let index = self.indices.len() as u16;
        self.indices.insert(name.to_string(), index);
        index
    }

    fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }
}

/// Owns all materials of a scene and resolves techniques for renderables.
pub struct MaterialManager {
    materials: Arena<Material>,
    by_name: HashMap<String, MaterialId>,
    schemes: SchemeRegistry,
    listeners: ListenerTable<Box<dyn MaterialListener>>,
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialManager {
    pub fn new() -> Self {
        let mut schemes = SchemeRegistry::default();
        schemes.index_of(DEFAULT_SCHEME);
        Self {
            materials: Arena::new(),
            by_name: HashMap::new(),
            schemes,
            listeners: ListenerTable::new(),
        }
    }

    /// Register a material. Names are unique within a manager.
    pub fn create(&mut self, material: Material) -> Result<MaterialId> {
        if self.by_name.contains_key(material.name()) {
            bail!("A material named '{}' already exists", material.name());
        }
        for technique in material.techniques() {
            self.schemes.index_of(&technique.scheme);
        }
        let name = material.name().to_string();
        let id = self.materials.insert(material);
        self.by_name.insert(name, id);
        Ok(id)
    }

    pub fn remove(&mut self, id: MaterialId) -> Option<Material> {
        let material = self.materials.remove(id)?;
        self.by_name.remove(material.name());
        Some(material)
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn by_name(&self, name: &str) -> Option<MaterialId> {
        self.by_name.get(name).copied()
    }

    pub fn add_technique(&mut self, id: MaterialId, technique: Technique) -> Option<usize> {
        self.schemes.index_of(&technique.scheme);
        self.materials
            .get_mut(id)
            .map(|material| material.add_technique(technique))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn materials(&self) -> &Arena<Material> {
        &self.materials
    }

    /// Index of `scheme`, registering it on first use.
    pub fn scheme_index(&mut self, scheme: &str) -> u16 {
        self.schemes.index_of(scheme)
    }

    /// Whether any material or render target already uses `scheme`.
    pub fn scheme_in_use(&self, scheme: &str) -> bool {
        self.schemes.contains(scheme)
            || self
                .materials
                .iter()
                .any(|(_, m)| m.techniques().iter().any(|t| t.scheme == scheme))
    }

    pub fn add_listener(&mut self, listener: Box<dyn MaterialListener>) -> MaterialListenerToken {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, token: MaterialListenerToken) -> bool {
        self.listeners.remove(token).is_some()
    }

    pub fn has_listener(&self, token: MaterialListenerToken) -> bool {
        self.listeners.contains(token)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Pick the technique `renderable` is drawn with under `scheme`.
    ///
    /// Order: the material's own technique for the scheme, then the scheme
    /// listeners, then the default scheme, then any supported technique.
    pub fn resolve_technique(
        &mut self,
        scheme: &str,
        renderable: &Renderable<'_>,
    ) -> Option<TechniqueRef> {
        let Self {
            materials,
            schemes,
            listeners,
            ..
        } = self;
        let materials = &*materials;
        let id = renderable.material;
        let Some(material) = materials.get(id) else {
            warn!("Renderable {:?} references a destroyed material.", renderable.item);
            return None;
        };
        if let Some(technique) = material.best_technique(scheme) {
            return Some(TechniqueRef {
                material: id,
                technique,
            });
        }
        let scheme_index = schemes.index_of(scheme);
        let from_listener = listeners.find_map_mut(|listener| {
            listener.handle_scheme_not_found(scheme_index, scheme, material, 0, renderable, materials)
        });
        if let Some(technique) = from_listener {
            let valid = materials
                .get(technique.material)
                .and_then(|m| m.technique(technique.technique))
                .is_some();
            if valid {
                return Some(technique);
            }
            warn!(
                "Scheme listener returned an invalid technique for material '{}'.",
                material.name()
            );
        }
        debug!(
            "Material '{}' has no technique for scheme '{}', using default scheme.",
            material.name(),
            scheme
        );
        material
            .best_technique(DEFAULT_SCHEME)
            .or_else(|| material.first_supported_technique())
            .map(|technique| TechniqueRef {
                material: id,
                technique,
            })
    }

    pub fn technique(&self, technique: TechniqueRef) -> Option<&Technique> {
        self.materials
            .get(technique.material)
            .and_then(|m| m.technique(technique.technique))
    }
}
