//! Ray queries against the scene's visible items.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use cgmath::{InnerSpace, Point3, Vector2, Vector3};
use log::warn;

use crate::{
    backend::{NativeCameraAccess, camera::EngineCamera},
    data_structures::scene_graph::VisualId,
    engine::{SceneManager, SceneManagerRef},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayQueryResult {
    /// Distance from the ray origin along the (normalized) direction.
    pub distance: f64,
    pub point: Point3<f64>,
    pub visual: Option<VisualId>,
}

pub struct RayQuery {
    manager: Weak<RefCell<SceneManager>>,
    origin: Point3<f64>,
    direction: Vector3<f64>,
}

impl RayQuery {
    pub(crate) fn new(manager: &SceneManagerRef) -> Self {
        Self {
            manager: Rc::downgrade(manager),
            origin: Point3::new(0.0, 0.0, 0.0),
            direction: Vector3::unit_x(),
        }
    }

    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Point3<f64>) {
        self.origin = origin;
    }

    pub fn direction(&self) -> Vector3<f64> {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vector3<f64>) {
        if direction.magnitude2() <= f64::EPSILON {
            warn!("Ignoring zero length ray direction.");
            return;
        }
        self.direction = direction.normalize();
    }

    /// Aim the ray from `camera` through `coord`, given in normalized device
    /// coordinates (`[-1, 1]`, +Y up). Returns `false` for a destroyed camera.
    pub fn set_from_camera(&mut self, camera: &EngineCamera, coord: Vector2<f64>) -> bool {
        let Some(native) = camera.native_camera() else {
            warn!("Cannot cast a ray from a destroyed camera.");
            return false;
        };
        let screen_x = (coord.x + 1.0) * 0.5;
        let screen_y = (1.0 - coord.y) * 0.5;
        let (origin, direction) = native.camera_to_viewport_ray(screen_x, screen_y);
        self.origin = origin;
        self.direction = direction;
        true
    }

    /// Nearest intersection with the world bounds of a visible item.
    pub fn closest_point(&self) -> Option<RayQueryResult> {
        let manager = self.manager.upgrade()?;
        let scene = manager.borrow();
        scene
            .visible_items()
            .into_iter()
            .filter_map(|(item, visual)| {
                let bounds = scene.item_world_bounds(item)?;
                if !bounds.is_valid() {
                    return None;
                }
                let distance = bounds.intersect_ray(self.origin, self.direction)?;
                Some(RayQueryResult {
                    distance,
                    point: self.origin + self.direction * distance,
                    visual: visual.map(VisualId),
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
