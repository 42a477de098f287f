//! The scene-graph rendering engine wrapped by the [`crate::backend`] adapters.
//!
//! This is the engine's own object model. Client code normally goes through
//! the backend-neutral contracts in [`crate::camera`] and
//! [`crate::geometry`]; the types here are what those contracts are bound to:
//!
//! - `scene_manager` owns nodes, items, materials and listeners, and draws frames
//! - `camera` is the native camera with its projection state
//! - `target` contains render targets, their events and frame statistics
//! - `material` holds materials, techniques, schemes and scheme-not-found listeners
//! - `listener` is the token based callback table used by both listener kinds
//! - `render` composes visible items into renderables each frame
//! - `raster` is the software rasteriser behind colour and selection passes

pub mod camera;
pub mod listener;
pub mod material;
pub(crate) mod raster;
pub mod render;
pub mod scene_manager;
pub mod target;

pub use camera::NativeCamera;
pub use listener::{ListenerTable, ListenerToken};
pub use material::{
    DEFAULT_SCHEME, Material, MaterialId, MaterialListener, MaterialListenerToken,
    MaterialManager, Technique, TechniqueRef,
};
pub use render::{Item, ItemGeometry, ItemId, Renderable};
pub use scene_manager::{ResourceCounts, SceneManager, SceneManagerRef};
pub use target::{
    FrameStats, RenderTarget, RenderTargetEvent, RenderTargetListener, RenderTargetListenerToken,
    RenderedItem, TargetId, TargetKind,
};
