//! Implementations of the camera and geometry contracts on top of
//! [`crate::engine`].
//!
//! - `camera`: [`EngineCamera`] and its [`CameraBuilder`]
//! - `render_target`: the render target a camera owns, rebuilt lazily
//! - `render_target_material`: forces one material onto a whole render target
//! - `wire_box`: [`EngineWireBox`], a wireframe box following a visual
//! - `ray_query`: [`RayQuery`] against item bounds

pub mod camera;
pub mod ray_query;
pub mod render_target;
pub mod render_target_material;
pub mod wire_box;

pub use camera::{CameraBuilder, EngineCamera};
pub use ray_query::{RayQuery, RayQueryResult};
pub use render_target::EngineRenderTarget;
pub use render_target_material::EngineRenderTargetMaterial;
pub use wire_box::EngineWireBox;

use crate::engine::NativeCamera;

/// Access to the native camera behind an adapter. Crate-private, so that
/// only collaborators such as [`RayQuery`] reach past the public contract.
pub(crate) trait NativeCameraAccess {
    fn native_camera(&self) -> Option<&NativeCamera>;
}
