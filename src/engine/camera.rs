//! The engine's native camera.
//!
//! A [`NativeCamera`] looks down its local -Z axis with +Y up. Its
//! projection matrix is recomputed eagerly whenever a projection parameter
//! changes, so reads never observe stale state.

use cgmath::{
    EuclideanSpace, InnerSpace, Matrix4, One, Point3, Quaternion, Rad, SquareMatrix, Vector3,
    Vector4,
};

#[derive(Debug)]
pub struct NativeCamera {
    id: u32,
    name: String,
    position: Point3<f64>,
    orientation: Quaternion<f64>,
    fovy: Rad<f64>,
    aspect: f64,
    near: f64,
    far: f64,
    projection: Matrix4<f64>,
}

impl NativeCamera {
    pub(crate) fn new(id: u32, name: &str) -> Self {
        let mut camera = Self {
            id,
            name: name.to_string(),
            position: Point3::origin(),
            orientation: Quaternion::one(),
            fovy: Rad(std::f64::consts::FRAC_PI_4),
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
            projection: Matrix4::identity(),
        };
        camera.update_projection();
        camera
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn update_projection(&mut self) {
        self.projection = cgmath::perspective(self.fovy, self.aspect, self.near, self.far);
    }

    pub fn set_fovy(&mut self, fovy: Rad<f64>) {
        self.fovy = fovy;
        self.update_projection();
    }

    pub fn fovy(&self) -> Rad<f64> {
        self.fovy
    }

    pub fn set_aspect_ratio(&mut self, aspect: f64) {
        self.aspect = aspect;
        self.update_projection();
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect
    }

    pub fn set_near_clip_distance(&mut self, near: f64) {
        self.near = near;
        self.update_projection();
    }

    pub fn near_clip_distance(&self) -> f64 {
        self.near
    }

    pub fn set_far_clip_distance(&mut self, far: f64) {
        self.far = far;
        self.update_projection();
    }

    pub fn far_clip_distance(&self) -> f64 {
        self.far
    }

    pub fn set_position(&mut self, position: Point3<f64>) {
        self.position = position;
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    pub fn set_orientation(&mut self, orientation: Quaternion<f64>) {
        self.orientation = orientation.normalize();
    }

    pub fn orientation(&self) -> Quaternion<f64> {
        self.orientation
    }

    /// World-space viewing direction.
    pub fn direction(&self) -> Vector3<f64> {
        self.orientation * Vector3::new(0.0, 0.0, -1.0)
    }

    pub fn projection_matrix(&self) -> Matrix4<f64> {
        self.projection
    }

    /// Inverse of the camera's world transform.
    pub fn view_matrix(&self) -> Matrix4<f64> {
        let world = Matrix4::from_translation(self.position.to_vec()) * Matrix4::from(self.orientation);
        world.invert().unwrap_or_else(Matrix4::identity)
    }

    pub fn view_projection_matrix(&self) -> Matrix4<f64> {
        self.projection * self.view_matrix()
    }

    /// World-space ray through a viewport point given in `[0, 1]`
    /// coordinates with the origin at the top left. The ray starts on the
    /// near plane; the direction is normalized.
    pub fn camera_to_viewport_ray(&self, screen_x: f64, screen_y: f64) -> (Point3<f64>, Vector3<f64>) {
        let ndc_x = screen_x * 2.0 - 1.0;
        let ndc_y = 1.0 - screen_y * 2.0;
        let inverse = self
            .view_projection_matrix()
            .invert()
            .unwrap_or_else(Matrix4::identity);
        let unproject = |z: f64| {
            let p = inverse * Vector4::new(ndc_x, ndc_y, z, 1.0);
            Point3::new(p.x / p.w, p.y / p.w, p.z / p.w)
        };
        let near = unproject(-1.0);
        let far = unproject(1.0);
        (near, (far - near).normalize())
    }
}
