//! Forces one material onto everything drawn into a render target.
//!
//! On construction the utility
//! 1. generates a scheme name no material or target uses yet,
//! 2. makes it the target's active material scheme,
//! 3. registers a render-target listener and a scheme-not-found listener.
//!
//! No material has a technique for that scheme, so technique resolution
//! falls through to the scheme-not-found listener for every renderable in
//! the target, which answers with the override material's first supported
//! technique. Dropping the utility removes both listeners through their
//! tokens; nothing it registered can fire afterwards.

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use log::{debug, warn};

use crate::{
    data_structures::arena::Arena,
    engine::{
        Material, MaterialId, MaterialListener, MaterialListenerToken, Renderable, RenderTarget,
        RenderTargetEvent, RenderTargetListener, RenderTargetListenerToken, SceneManager,
        SceneManagerRef, TargetId, TechniqueRef,
    },
};

/// Invocation counts of the pre and post render hooks.
#[derive(Debug, Default)]
struct HookCounts {
    pre: Cell<u64>,
    post: Cell<u64>,
}

struct OverrideHooks {
    counts: Rc<HookCounts>,
}

impl RenderTargetListener for OverrideHooks {
    // Hook points around the frame. Render state is left untouched.
    fn pre_render_target_update(&mut self, _evt: &RenderTargetEvent) {
        self.counts.pre.set(self.counts.pre.get() + 1);
    }

    fn post_render_target_update(&mut self, _evt: &RenderTargetEvent) {
        self.counts.post.set(self.counts.post.get() + 1);
    }
}

struct OverrideTechnique {
    scheme: String,
    material: MaterialId,
}

impl MaterialListener for OverrideTechnique {
    fn handle_scheme_not_found(
        &mut self,
        _scheme_index: u16,
        scheme_name: &str,
        _original_material: &Material,
        _lod_index: u16,
        _renderable: &Renderable<'_>,
        materials: &Arena<Material>,
    ) -> Option<TechniqueRef> {
        // Other targets resolve their own schemes.
        if scheme_name != self.scheme {
            return None;
        }
        let Some(material) = materials.get(self.material) else {
            warn!("Override material for scheme '{}' no longer exists.", self.scheme);
            return None;
        };
        let Some(technique) = material.first_supported_technique() else {
            warn!(
                "Override material '{}' has no supported technique.",
                material.name()
            );
            return None;
        };
        Some(TechniqueRef {
            material: self.material,
            technique,
        })
    }
}

pub struct EngineRenderTargetMaterial {
    manager: Weak<RefCell<SceneManager>>,
    target: TargetId,
    material: MaterialId,
    scheme: String,
    target_token: Option<RenderTargetListenerToken>,
    material_token: Option<MaterialListenerToken>,
    hooks: Rc<HookCounts>,
}

impl EngineRenderTargetMaterial {
    /// Install the override on `target`. The caller must not hold a borrow
    /// of the scene manager.
    pub fn new(manager: &SceneManagerRef, target: &mut RenderTarget, material: MaterialId) -> Self {
        let hooks = Rc::new(HookCounts::default());
        let mut scene = manager.borrow_mut();

        let mut counter = 0u32;
        let mut scheme = format!("{}_scheme_{}", target.name(), counter);
        while scene.materials().scheme_in_use(&scheme) {
            counter += 1;
            scheme = format!("{}_scheme_{}", target.name(), counter);
        }
        scene.materials_mut().scheme_index(&scheme);
        target.set_material_scheme(&scheme);

        let target_token = scene.add_render_target_listener(
            target.id(),
            Box::new(OverrideHooks {
                counts: hooks.clone(),
            }),
        );
        let material_token = scene.add_material_listener(Box::new(OverrideTechnique {
            scheme: scheme.clone(),
            material,
        }));
        debug!(
            "Material override installed on '{}' with scheme '{}'",
            target.name(),
            scheme
        );

        Self {
            manager: Rc::downgrade(manager),
            target: target.id(),
            material,
            scheme,
            target_token: Some(target_token),
            material_token: Some(material_token),
            hooks,
        }
    }

    pub fn scheme_name(&self) -> &str {
        &self.scheme
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    /// Whether both listeners are still registered.
    pub fn is_active(&self) -> bool {
        let (Some(target_token), Some(material_token)) = (self.target_token, self.material_token)
        else {
            return false;
        };
        self.manager.upgrade().is_some_and(|manager| {
            let scene = manager.borrow();
            scene.has_render_target_listener(target_token)
                && scene.materials().has_listener(material_token)
        })
    }

    pub fn pre_render_count(&self) -> u64 {
        self.hooks.pre.get()
    }

    pub fn post_render_count(&self) -> u64 {
        self.hooks.post.get()
    }

    /// Remove both listeners. Runs on drop as well.
    pub fn remove(&mut self) {
        if self.target_token.is_none() && self.material_token.is_none() {
            return;
        }
        let Some(manager) = self.manager.upgrade() else {
            self.target_token = None;
            self.material_token = None;
            return;
        };
        let Ok(mut scene) = manager.try_borrow_mut() else {
            warn!(
                "Scene busy while removing material override '{}'; listeners stay registered.",
                self.scheme
            );
            return;
        };
        if let Some(token) = self.target_token.take() {
            scene.remove_render_target_listener(token);
        }
        if let Some(token) = self.material_token.take() {
            scene.remove_material_listener(token);
        }
        debug!("Material override with scheme '{}' removed", self.scheme);
    }
}

impl Drop for EngineRenderTargetMaterial {
    fn drop(&mut self) {
        self.remove();
    }
}
