//! flow-rendering
//!
//! A backend-neutral rendering facade. Client code talks to cameras and
//! geometry through small traits; this crate binds them to a scene-graph
//! engine with its own cameras, render targets, materials and techniques.
//! The engine rasterises on the CPU, which keeps every frame deterministic
//! and inspectable.
//!
//! High-level modules
//! - `camera`: the [`Camera`] contract and the settings cameras are built from
//! - `geometry`: capability traits [`Geometry`] and [`WireBox`]
//! - `scene`: [`Scene`], the factory for visuals, materials, cameras and wire boxes
//! - `backend`: engine-backed implementations, including the render-target material override
//! - `engine`: the wrapped engine object model (scene manager, targets, materials, listeners)
//! - `pick`: selection buffer for mapping pixels back to visuals
//! - `config`: scene and camera defaults
//! - `data_structures`: boxes, colours, transforms, the scene graph and textures
//! - `window`: presenting window targets with `wgpu` (feature `window`)
//!
//! ```no_run
//! use flow_rendering::{Camera, Color, Scene, SceneConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     flow_rendering::init_logger();
//!     let scene = Scene::new(SceneConfig::default())?;
//!     let red = scene.create_material("red", Color::RED)?;
//!     let mut camera = scene.camera("main").image_size(64, 48).build()?;
//!     camera.set_material(red);
//!     camera.render();
//!     camera.save_frame(std::path::Path::new("frame.png"))?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod camera;
pub mod config;
pub mod data_structures;
pub mod engine;
pub mod geometry;
pub mod pick;
pub mod scene;
#[cfg(feature = "window")]
pub mod window;

pub use backend::{
    CameraBuilder, EngineCamera, EngineRenderTargetMaterial, EngineWireBox, RayQuery,
    RayQueryResult,
};
pub use camera::{Camera, CameraSettings};
pub use config::{CameraDefaults, SceneConfig};
pub use data_structures::{aabb::AxisAlignedBox, color::Color, scene_graph::VisualId};
pub use geometry::{Geometry, WireBox};
pub use scene::Scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use cgmath::{Deg, Point3, Quaternion, Rad, Vector2, Vector3};

/// Initialise `env_logger` once. Later calls only print a warning.
pub fn init_logger() {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    }
}
