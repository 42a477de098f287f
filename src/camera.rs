//! Backend-neutral camera contract.
//!
//! A [`Camera`] renders the scene it belongs to into a render target it
//! owns. Implementations translate these calls into their engine's camera
//! and render target objects; [`crate::backend::EngineCamera`] is the one
//! shipped with this crate.
//!
//! # Frame conventions
//!
//! - The camera looks along its local +X axis with +Z up
//! - `hfov` is the horizontal field of view; the vertical one follows from the aspect ratio
//! - Pixel coordinates start at the top left corner of the image
//!
//! Cameras are never constructed directly. A scene hands out a builder
//! that is configured with [`CameraSettings`] and validated before the
//! native objects are created, so every camera value you can hold is fully
//! initialised.

use std::path::Path;

use anyhow::*;
use cgmath::{Matrix4, Point3, Quaternion, Rad, Vector2};

use crate::{
    data_structures::{color::Color, scene_graph::VisualId},
    engine::{FrameStats, MaterialId, TargetId},
};

/// Everything a camera is configured with before it exists.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraSettings {
    pub name: String,
    pub hfov: Rad<f64>,
    /// Derived from the image size when `None`.
    pub aspect_ratio: Option<f64>,
    pub near: f64,
    pub far: f64,
    pub anti_aliasing: u32,
    pub image_width: u32,
    pub image_height: u32,
    pub background: Color,
    pub position: Point3<f64>,
    pub rotation: Quaternion<f64>,
}

impl CameraSettings {
    /// The aspect ratio the camera will start with.
    pub fn effective_aspect_ratio(&self) -> f64 {
        self.aspect_ratio
            .unwrap_or_else(|| f64::from(self.image_width) / f64::from(self.image_height.max(1)))
    }

    /// Check the invariants every camera upholds.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.near > 0.0,
            "Camera '{}': near clip plane must be positive, got {}",
            self.name,
            self.near
        );
        ensure!(
            self.near < self.far,
            "Camera '{}': near clip plane ({}) must be closer than far clip plane ({})",
            self.name,
            self.near,
            self.far
        );
        let aspect = self.effective_aspect_ratio();
        ensure!(
            aspect > 0.0 && aspect.is_finite(),
            "Camera '{}': aspect ratio must be positive, got {}",
            self.name,
            aspect
        );
        ensure!(
            self.hfov.0 > 0.0 && self.hfov.0 < std::f64::consts::PI,
            "Camera '{}': horizontal field of view must be in (0, pi), got {:?}",
            self.name,
            self.hfov
        );
        ensure!(
            self.image_width > 0 && self.image_height > 0,
            "Camera '{}': image size must not be zero, got {}x{}",
            self.name,
            self.image_width,
            self.image_height
        );
        Ok(())
    }
}

/// A camera that renders a scene into an image.
///
/// Setters that would break `near < far` or `aspect > 0` log a warning and
/// leave the camera unchanged.
pub trait Camera {
    fn name(&self) -> &str;

    fn hfov(&self) -> Rad<f64>;
    fn set_hfov(&mut self, hfov: Rad<f64>);

    fn aspect_ratio(&self) -> f64;
    fn set_aspect_ratio(&mut self, ratio: f64);

    /// Samples per pixel; `0` and `1` both mean no anti-aliasing.
    fn anti_aliasing(&self) -> u32;
    fn set_anti_aliasing(&mut self, samples: u32);

    fn near_clip_plane(&self) -> f64;
    fn set_near_clip_plane(&mut self, near: f64);
    fn far_clip_plane(&self) -> f64;
    fn set_far_clip_plane(&mut self, far: f64);
    /// Set both clip planes at once, for moves that are only valid together.
    fn set_clip_planes(&mut self, near: f64, far: f64);

    fn background_color(&self) -> Color;
    fn set_background_color(&mut self, colour: Color);

    fn image_width(&self) -> u32;
    fn set_image_width(&mut self, width: u32);
    fn image_height(&self) -> u32;
    fn set_image_height(&mut self, height: u32);

    fn world_position(&self) -> Point3<f64>;
    fn set_world_position(&mut self, position: Point3<f64>);
    fn world_rotation(&self) -> Quaternion<f64>;
    fn set_world_rotation(&mut self, rotation: Quaternion<f64>);
    /// Turn the camera so that it faces `target`, keeping +Z up.
    fn look_at(&mut self, target: Point3<f64>);

    fn projection_matrix(&self) -> Matrix4<f64>;
    fn view_matrix(&self) -> Matrix4<f64>;

    /// Render one frame into the camera's render target.
    fn render(&mut self);

    /// Switch the camera to a window-backed render target. Calling this
    /// again returns the same target.
    fn create_render_window(&mut self) -> Option<TargetId>;

    /// Frontmost visual at a pixel of the last rendered frame's viewport.
    /// Misses and coordinates outside the image give `None`.
    fn visual_at(&mut self, pixel: Vector2<i32>) -> Option<VisualId>;

    /// Draw everything this camera sees with `material`.
    fn set_material(&mut self, material: MaterialId);

    /// Native texture name of the render texture, `0` if there is none.
    fn render_texture_gl_id(&self) -> u32;

    /// Statistics of the last rendered frame.
    fn frame_stats(&self) -> Option<FrameStats>;

    /// The last rendered frame.
    fn capture(&self) -> Option<image::RgbaImage>;

    /// Write the last rendered frame as PNG.
    fn save_frame(&self, path: &Path) -> Result<()>;

    /// Release every native resource. Safe to call more than once.
    fn destroy(&mut self);
}
