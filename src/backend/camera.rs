//! Camera bound to the engine's native camera.
//!
//! [`EngineCamera`] keeps the backend-neutral parameters (horizontal field
//! of view, +X forward / +Z up pose) and translates every change into the
//! native camera, which looks down -Z with +Y up and takes a vertical
//! field of view. Projection state is updated eagerly, so matrices read
//! back right after a setter are never stale.
//!
//! The camera exclusively owns its native camera, its render target and its
//! selection buffer. All of them are released by [`Camera::destroy`], which
//! also runs on drop.

use std::{
    cell::RefCell,
    path::Path,
    rc::{Rc, Weak},
};

use anyhow::{Context, Result};
use cgmath::{
    Deg, InnerSpace, Matrix3, Matrix4, Point3, Quaternion, Rad, Rotation3, SquareMatrix, Vector2,
    Vector3,
};
use log::{debug, warn};

use crate::{
    backend::{NativeCameraAccess, render_target::EngineRenderTarget},
    camera::{Camera, CameraSettings},
    data_structures::{color::Color, scene_graph::VisualId},
    engine::{FrameStats, MaterialId, NativeCamera, SceneManager, SceneManagerRef, TargetId, TargetKind},
    pick::SelectionBuffer,
};

/// Rotation from the native camera frame (-Z forward, +Y up) into the
/// camera frame (+X forward, +Z up).
fn native_frame_fix() -> Quaternion<f64> {
    Quaternion::from(Matrix3::new(
        0.0, -1.0, 0.0, // native +X is camera right (-Y)
        0.0, 0.0, 1.0, // native +Y is camera up (+Z)
        -1.0, 0.0, 0.0, // native +Z is camera backwards (-X)
    ))
}

/// Vertical field of view for a horizontal one at `aspect`.
pub(crate) fn vertical_fov(hfov: Rad<f64>, aspect: f64) -> Rad<f64> {
    Rad(2.0 * ((hfov.0 * 0.5).tan() / aspect).atan())
}

/// Configures a camera and creates it with its native objects in one step.
pub struct CameraBuilder {
    manager: Weak<RefCell<SceneManager>>,
    settings: CameraSettings,
}

impl CameraBuilder {
    pub(crate) fn new(manager: &SceneManagerRef, settings: CameraSettings) -> Self {
        Self {
            manager: Rc::downgrade(manager),
            settings,
        }
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn hfov(mut self, hfov: impl Into<Rad<f64>>) -> Self {
        self.settings.hfov = hfov.into();
        self
    }

    pub fn aspect_ratio(mut self, ratio: f64) -> Self {
        self.settings.aspect_ratio = Some(ratio);
        self
    }

    pub fn clip_planes(mut self, near: f64, far: f64) -> Self {
        self.settings.near = near;
        self.settings.far = far;
        self
    }

    pub fn anti_aliasing(mut self, samples: u32) -> Self {
        self.settings.anti_aliasing = samples;
        self
    }

    pub fn image_size(mut self, width: u32, height: u32) -> Self {
        self.settings.image_width = width;
        self.settings.image_height = height;
        self
    }

    pub fn background(mut self, colour: Color) -> Self {
        self.settings.background = colour;
        self
    }

    pub fn position(mut self, position: Point3<f64>) -> Self {
        self.settings.position = position;
        self
    }

    pub fn rotation(mut self, rotation: Quaternion<f64>) -> Self {
        self.settings.rotation = rotation;
        self
    }

    /// Validate the settings, then create the native camera and its render
    /// texture.
    pub fn build(self) -> Result<EngineCamera> {
        self.settings.validate()?;
        let manager = self
            .manager
            .upgrade()
            .with_context(|| format!("Camera '{}': the scene no longer exists", self.settings.name))?;
        let settings = self.settings;
        let aspect = settings.effective_aspect_ratio();

        let mut native = manager.borrow_mut().create_camera(&settings.name);
        native.set_aspect_ratio(aspect);
        native.set_fovy(vertical_fov(settings.hfov, aspect));
        native.set_far_clip_distance(settings.far);
        native.set_near_clip_distance(settings.near);

        let mut target = EngineRenderTarget::new(
            &manager,
            &settings.name,
            TargetKind::Texture,
            settings.image_width,
            settings.image_height,
        );
        target.set_anti_aliasing(settings.anti_aliasing);
        target.set_background_color(settings.background);
        target.pre_render();

        let mut camera = EngineCamera {
            manager: Rc::downgrade(&manager),
            name: settings.name,
            native: Some(native),
            render_target: Some(target),
            selection_buffer: None,
            hfov: settings.hfov,
            position: settings.position,
            rotation: settings.rotation.normalize(),
        };
        camera.sync_pose();
        debug!("Camera '{}' created", camera.name);
        Ok(camera)
    }
}

pub struct EngineCamera {
    manager: Weak<RefCell<SceneManager>>,
    name: String,
    native: Option<NativeCamera>,
    render_target: Option<EngineRenderTarget>,
    selection_buffer: Option<SelectionBuffer>,
    hfov: Rad<f64>,
    position: Point3<f64>,
    rotation: Quaternion<f64>,
}

impl EngineCamera {
    fn sync_pose(&mut self) {
        if let Some(native) = self.native.as_mut() {
            native.set_position(self.position);
            native.set_orientation(self.rotation * native_frame_fix());
        }
    }

    fn update_fov(&mut self) {
        if let Some(native) = self.native.as_mut() {
            let aspect = native.aspect_ratio();
            native.set_fovy(vertical_fov(self.hfov, aspect));
        }
    }

    /// Whether `destroy` has not run yet.
    pub fn is_valid(&self) -> bool {
        self.native.is_some()
    }

    pub fn render_target(&self) -> Option<&EngineRenderTarget> {
        self.render_target.as_ref()
    }

    /// Id of the native render target currently drawn into.
    pub fn target_id(&self) -> Option<TargetId> {
        self.render_target.as_ref().and_then(|t| t.id())
    }
}

impl NativeCameraAccess for EngineCamera {
    fn native_camera(&self) -> Option<&NativeCamera> {
        self.native.as_ref()
    }
}

impl Camera for EngineCamera {
    fn name(&self) -> &str {
        &self.name
    }

    fn hfov(&self) -> Rad<f64> {
        self.hfov
    }

    fn set_hfov(&mut self, hfov: Rad<f64>) {
        if !(hfov.0 > 0.0 && hfov.0 < std::f64::consts::PI) {
            warn!(
                "Camera '{}': ignoring horizontal field of view {:?}.",
                self.name,
                Deg::from(hfov)
            );
            return;
        }
        self.hfov = hfov;
        self.update_fov();
    }

    fn aspect_ratio(&self) -> f64 {
        self.native.as_ref().map_or(1.0, |n| n.aspect_ratio())
    }

    fn set_aspect_ratio(&mut self, ratio: f64) {
        if !(ratio > 0.0 && ratio.is_finite()) {
            warn!("Camera '{}': ignoring aspect ratio {}.", self.name, ratio);
            return;
        }
        if let Some(native) = self.native.as_mut() {
            native.set_aspect_ratio(ratio);
        }
        self.update_fov();
    }

    fn anti_aliasing(&self) -> u32 {
        self.render_target.as_ref().map_or(0, |t| t.anti_aliasing())
    }

    fn set_anti_aliasing(&mut self, samples: u32) {
        if let Some(target) = self.render_target.as_mut() {
            target.set_anti_aliasing(samples);
        }
    }

    fn near_clip_plane(&self) -> f64 {
        self.native.as_ref().map_or(0.0, |n| n.near_clip_distance())
    }

    fn set_near_clip_plane(&mut self, near: f64) {
        let far = self.far_clip_plane();
        self.set_clip_planes(near, far);
    }

    fn far_clip_plane(&self) -> f64 {
        self.native.as_ref().map_or(0.0, |n| n.far_clip_distance())
    }

    fn set_far_clip_plane(&mut self, far: f64) {
        let near = self.near_clip_plane();
        self.set_clip_planes(near, far);
    }

    fn set_clip_planes(&mut self, near: f64, far: f64) {
        if !(near > 0.0 && near < far && far.is_finite()) {
            warn!(
                "Camera '{}': ignoring clip planes near {} far {}.",
                self.name, near, far
            );
            return;
        }
        if let Some(native) = self.native.as_mut() {
            native.set_near_clip_distance(near);
            native.set_far_clip_distance(far);
        }
    }

    fn background_color(&self) -> Color {
        self.render_target
            .as_ref()
            .map_or(Color::BLACK, |t| t.background_color())
    }

    fn set_background_color(&mut self, colour: Color) {
        if let Some(target) = self.render_target.as_mut() {
            target.set_background_color(colour);
        }
    }

    fn image_width(&self) -> u32 {
        self.render_target.as_ref().map_or(0, |t| t.width())
    }

    fn set_image_width(&mut self, width: u32) {
        if let Some(target) = self.render_target.as_mut() {
            target.set_width(width);
        }
        self.selection_buffer = None;
    }

    fn image_height(&self) -> u32 {
        self.render_target.as_ref().map_or(0, |t| t.height())
    }

    fn set_image_height(&mut self, height: u32) {
        if let Some(target) = self.render_target.as_mut() {
            target.set_height(height);
        }
        self.selection_buffer = None;
    }

    fn world_position(&self) -> Point3<f64> {
        self.position
    }

    fn set_world_position(&mut self, position: Point3<f64>) {
        self.position = position;
        self.sync_pose();
    }

    fn world_rotation(&self) -> Quaternion<f64> {
        self.rotation
    }

    fn set_world_rotation(&mut self, rotation: Quaternion<f64>) {
        self.rotation = rotation.normalize();
        self.sync_pose();
    }

    fn look_at(&mut self, target: Point3<f64>) {
        let dir: Vector3<f64> = target - self.position;
        if dir.magnitude2() <= f64::EPSILON {
            warn!("Camera '{}': cannot look at its own position.", self.name);
            return;
        }
        let yaw = dir.y.atan2(dir.x);
        let pitch = -dir.z.atan2(dir.x.hypot(dir.y));
        self.rotation = Quaternion::from_angle_z(Rad(yaw)) * Quaternion::from_angle_y(Rad(pitch));
        self.sync_pose();
    }

    fn projection_matrix(&self) -> Matrix4<f64> {
        self.native
            .as_ref()
            .map_or_else(Matrix4::identity, |n| n.projection_matrix())
    }

    fn view_matrix(&self) -> Matrix4<f64> {
        self.native
            .as_ref()
            .map_or_else(Matrix4::identity, |n| n.view_matrix())
    }

    fn render(&mut self) {
        let (Some(native), Some(target)) = (self.native.as_ref(), self.render_target.as_mut()) else {
            warn!("Camera '{}' was destroyed, nothing to render.", self.name);
            return;
        };
        target.render(native);
    }

    fn create_render_window(&mut self) -> Option<TargetId> {
        let manager = self.manager.upgrade()?;
        let Some(old) = self.render_target.as_ref() else {
            warn!("Camera '{}' was destroyed, cannot create a window.", self.name);
            return None;
        };
        if old.kind() == TargetKind::Window {
            return old.id();
        }
        let mut window = EngineRenderTarget::new(
            &manager,
            &self.name,
            TargetKind::Window,
            old.width(),
            old.height(),
        );
        window.set_anti_aliasing(old.anti_aliasing());
        window.set_background_color(old.background_color());
        window.set_material(old.material());
        window.pre_render();
        // Dropping the texture target releases it.
        self.render_target = Some(window);
        self.selection_buffer = None;
        debug!("Camera '{}' now renders into a window", self.name);
        self.target_id()
    }

    fn visual_at(&mut self, pixel: Vector2<i32>) -> Option<VisualId> {
        let (width, height) = (self.image_width(), self.image_height());
        if pixel.x < 0 || pixel.y < 0 || pixel.x as u32 >= width || pixel.y as u32 >= height {
            return None;
        }
        let native = self.native.as_ref()?;
        if self.selection_buffer.is_none() {
            let manager = self.manager.upgrade()?;
            self.selection_buffer = Some(SelectionBuffer::new(&manager, width, height));
        }
        self.selection_buffer
            .as_mut()?
            .on_selection_click(native, pixel.x, pixel.y)
    }

    fn set_material(&mut self, material: MaterialId) {
        if let Some(target) = self.render_target.as_mut() {
            target.set_material(Some(material));
        }
    }

    fn render_texture_gl_id(&self) -> u32 {
        self.render_target
            .as_ref()
            .map_or(0, |t| t.native_texture_id())
    }

    fn frame_stats(&self) -> Option<FrameStats> {
        self.render_target.as_ref()?.frame_stats().cloned()
    }

    fn capture(&self) -> Option<image::RgbaImage> {
        let target = self.render_target.as_ref()?;
        if target.frame_count() == 0 {
            return None;
        }
        target.texture().map(|t| t.to_image())
    }

    fn save_frame(&self, path: &Path) -> Result<()> {
        let target = self
            .render_target
            .as_ref()
            .filter(|t| t.frame_count() > 0)
            .with_context(|| format!("Camera '{}' has no rendered frame", self.name))?;
        let texture = target
            .texture()
            .with_context(|| format!("Camera '{}' has no render target", self.name))?;
        texture.save(path)
    }

    fn destroy(&mut self) {
        self.selection_buffer = None;
        if let Some(mut target) = self.render_target.take() {
            target.destroy();
        }
        let Some(native) = self.native.take() else {
            return;
        };
        match self.manager.upgrade() {
            Some(manager) => match manager.try_borrow_mut() {
                Ok(mut scene) => scene.destroy_camera(native),
                Err(_) => warn!("Scene busy, native camera '{}' leaked.", self.name),
            },
            None => debug!("Camera '{}' outlived its scene", self.name),
        }
    }
}

impl Drop for EngineCamera {
    fn drop(&mut self) {
        self.destroy();
    }
}
