use approx::assert_relative_eq;
use flow_rendering::{
    Camera, CameraDefaults, Color, Deg, Rad, Scene, SceneConfig, Vector3, WireBox,
    data_structures::transform::Transform,
    engine::{DEFAULT_SCHEME, Material, Technique},
};

use crate::common::test_utils::{CENTER, Fixture, init_logger, pixel, rgba, unit_box};

mod common;

#[test]
fn should_describe_visuals() {
    let fixture = Fixture::new();
    assert!(fixture.scene.contains_visual(fixture.target));
    assert_eq!(fixture.scene.visual_name(fixture.target).as_deref(), Some("target"));
    assert_eq!(
        fixture.scene.visual_transform(fixture.target),
        Some(Transform::from_position(Vector3::new(5.0, 0.0, 0.0)))
    );

    fixture.scene.destroy_visual(fixture.target);
    assert!(!fixture.scene.contains_visual(fixture.target));
    assert_eq!(fixture.scene.visual_name(fixture.target), None);
    assert_eq!(fixture.scene.visual_transform(fixture.target), None);
}

#[test]
fn should_switch_item_material() {
    let fixture = Fixture::new();
    let visual = fixture.scene.create_visual("switch").unwrap();
    fixture
        .scene
        .set_visual_transform(visual, Transform::from_position(Vector3::new(3.0, 0.0, 0.0)));
    let item = fixture
        .scene
        .add_visual_box(visual, unit_box(), fixture.green)
        .unwrap();
    let mut camera = fixture.camera("switch");
    camera.render();
    assert_eq!(pixel(&camera, CENTER.0, CENTER.1), rgba(Color::GREEN));

    assert!(fixture.scene.set_item_material(item, fixture.blue));
    camera.render();
    assert_eq!(pixel(&camera, CENTER.0, CENTER.1), rgba(Color::BLUE));

    fixture.scene.destroy_visual(visual);
    assert!(!fixture.scene.set_item_material(item, fixture.green));
}

#[test]
fn should_register_caller_built_material() {
    let fixture = Fixture::new();
    let mut material = Material::new("built");
    material.add_technique(Technique::new("main", DEFAULT_SCHEME, Color::BLUE));
    let built = fixture.scene.add_material(material).unwrap();
    assert_eq!(fixture.scene.material("built"), Some(built));
    assert!(fixture.scene.add_material(Material::new("built")).is_err());

    let visual = fixture.scene.create_visual("built").unwrap();
    fixture
        .scene
        .set_visual_transform(visual, Transform::from_position(Vector3::new(3.0, 0.0, 0.0)));
    fixture.scene.add_visual_box(visual, unit_box(), built).unwrap();
    let mut camera = fixture.camera("built");
    camera.render();
    assert_eq!(pixel(&camera, CENTER.0, CENTER.1), rgba(Color::BLUE));
}

#[test]
fn should_apply_config_defaults() {
    init_logger();
    let defaults = CameraDefaults {
        hfov: Deg(60.0).into(),
        image_width: 32,
        image_height: 24,
        background: Color::BLUE,
        ..CameraDefaults::default()
    };
    let mut scene = Scene::new(
        SceneConfig::default()
            .with_name("configured")
            .with_camera_defaults(defaults)
            .with_line_colour(Color::GREEN),
    )
    .unwrap();
    let visual = scene.create_visual("outlined").unwrap();
    scene.set_visual_transform(visual, Transform::from_position(Vector3::new(5.0, 0.0, 0.0)));
    let mut wire_box = scene.create_wire_box();
    wire_box.set_box(unit_box());
    wire_box.set_visual(visual);

    let mut camera = scene.camera("defaults").build().unwrap();
    assert_eq!(camera.image_width(), 32);
    assert_eq!(camera.image_height(), 24);
    assert_relative_eq!(camera.hfov().0, Rad::from(Deg(60.0)).0, epsilon = 1e-9);
    camera.render();

    let image = camera.capture().unwrap();
    assert_eq!(image.dimensions(), (32, 24));
    assert_eq!(image.get_pixel(0, 0).0, rgba(Color::BLUE));
    assert!(image.pixels().any(|p| p.0 == rgba(Color::GREEN)));
}
