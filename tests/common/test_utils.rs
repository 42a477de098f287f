#![allow(dead_code)]

use flow_rendering::{
    AxisAlignedBox, Camera, Color, EngineCamera, Point3, Scene, SceneConfig, VisualId,
    cgmath::Vector3, data_structures::transform::Transform, engine::MaterialId,
};

pub(crate) const WIDTH: u32 = 64;
pub(crate) const HEIGHT: u32 = 48;
pub(crate) const CENTER: (u32, u32) = (WIDTH / 2, HEIGHT / 2);

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A scene with a red unit box five units in front of the origin.
///
/// Cameras built with [`Fixture::camera`] sit at the origin and look along
/// +X with a 90 degree horizontal field of view, so the box covers the
/// center of the image and misses its corners.
pub(crate) struct Fixture {
    pub scene: Scene,
    pub red: MaterialId,
    pub green: MaterialId,
    pub blue: MaterialId,
    pub target: VisualId,
}

impl Fixture {
    pub fn new() -> Self {
        init_logger();
        let scene = Scene::new(SceneConfig::default().with_name("test")).unwrap();
        let red = scene.create_material("red", Color::RED).unwrap();
        let green = scene.create_material("green", Color::GREEN).unwrap();
        let blue = scene.create_material("blue", Color::BLUE).unwrap();
        let target = scene.create_visual("target").unwrap();
        scene.set_visual_transform(target, Transform::from_position(Vector3::new(5.0, 0.0, 0.0)));
        scene
            .add_visual_box(target, unit_box(), red)
            .unwrap();
        Self {
            scene,
            red,
            green,
            blue,
            target,
        }
    }

    pub fn camera(&self, name: &str) -> EngineCamera {
        self.scene
            .camera(name)
            .image_size(WIDTH, HEIGHT)
            .build()
            .unwrap()
    }

    /// Add another box visual at `x` on the camera axis.
    pub fn add_box_at(&self, name: &str, x: f64, material: MaterialId) -> VisualId {
        let visual = self.scene.create_visual(name).unwrap();
        self.scene
            .set_visual_transform(visual, Transform::from_position(Vector3::new(x, 0.0, 0.0)));
        self.scene.add_visual_box(visual, unit_box(), material).unwrap();
        visual
    }
}

pub(crate) fn unit_box() -> AxisAlignedBox {
    AxisAlignedBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
}

pub(crate) fn pixel(camera: &EngineCamera, x: u32, y: u32) -> [u8; 4] {
    camera.capture().unwrap().get_pixel(x, y).0
}

pub(crate) fn rgba(colour: Color) -> [u8; 4] {
    colour.to_rgba8()
}
