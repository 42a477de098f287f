use flow_rendering::{
    Camera, Color, EngineRenderTargetMaterial, Point3, Vector3,
    data_structures::{aabb::AxisAlignedBox, transform::Transform},
    engine::{
        DEFAULT_SCHEME, ItemGeometry, Material, MaterialId, NativeCamera, RenderTarget,
        SceneManager, SceneManagerRef, Technique,
    },
};

use crate::common::test_utils::{CENTER, Fixture, init_logger, pixel, rgba};

mod common;

struct EngineScene {
    manager: SceneManagerRef,
    red: MaterialId,
    green: MaterialId,
    blue: MaterialId,
}

/// Two boxes with their own materials in front of a native camera looking
/// down -Z.
fn engine_scene() -> EngineScene {
    init_logger();
    let manager = SceneManager::new_shared("engine");
    let (red, green, blue) = {
        let mut scene = manager.borrow_mut();
        let red = scene.create_material(Material::with_colour("red", Color::RED)).unwrap();
        let green = scene
            .create_material(Material::with_colour("green", Color::GREEN))
            .unwrap();
        let blue = scene.create_material(Material::with_colour("blue", Color::BLUE)).unwrap();
        let unit = AxisAlignedBox::new(Point3::new(-0.5, -0.5, -0.5), Point3::new(0.5, 0.5, 0.5));
        for (name, x, material) in [("left", -1.0, red), ("right", 1.0, green)] {
            let node = scene.create_node(name, None, true).unwrap();
            scene.set_node_transform(node, Transform::from_position(Vector3::new(x, 0.0, -5.0)));
            scene
                .create_item(node, name, ItemGeometry::Box(unit), material)
                .unwrap();
        }
        (red, green, blue)
    };
    EngineScene {
        manager,
        red,
        green,
        blue,
    }
}

fn frame(manager: &SceneManagerRef, camera: &NativeCamera, target: &mut RenderTarget) {
    manager.borrow_mut().update_render_target(camera, target);
}

#[test]
fn should_draw_every_renderable_with_override_material() {
    let s = engine_scene();
    let camera = s.manager.borrow_mut().create_camera("cam");
    let mut target = s.manager.borrow_mut().create_render_texture("tex", 32, 32);

    frame(&s.manager, &camera, &mut target);
    assert!(target.last_frame().all_drawn_with_own_material());

    let material_override = EngineRenderTargetMaterial::new(&s.manager, &mut target, s.blue);
    assert!(material_override.is_active());
    assert_eq!(target.material_scheme(), material_override.scheme_name());

    frame(&s.manager, &camera, &mut target);
    let stats = target.last_frame();
    assert_eq!(stats.items.len(), 2);
    assert!(stats.all_drawn_with(s.blue));
    assert!(stats.items.iter().all(|item| item.material != s.blue));
    assert_eq!(material_override.pre_render_count(), 1);
    assert_eq!(material_override.post_render_count(), 1);

    let blue = rgba(Color::BLUE);
    let drawn: Vec<_> = target
        .texture()
        .pixels()
        .iter()
        .filter(|p| **p != rgba(Color::BLACK))
        .collect();
    assert!(!drawn.is_empty());
    assert!(drawn.iter().all(|p| **p == blue));

    s.manager.borrow_mut().destroy_render_target(target);
    drop(material_override);
    s.manager.borrow_mut().destroy_camera(camera);
}

#[test]
fn should_revert_to_own_materials_after_drop() {
    let s = engine_scene();
    let camera = s.manager.borrow_mut().create_camera("cam");
    let mut target = s.manager.borrow_mut().create_render_texture("tex", 32, 32);

    let material_override = EngineRenderTargetMaterial::new(&s.manager, &mut target, s.blue);
    frame(&s.manager, &camera, &mut target);
    assert!(target.last_frame().all_drawn_with(s.blue));
    let hooks = material_override.pre_render_count();

    drop(material_override);
    assert_eq!(s.manager.borrow().materials().listener_count(), 0);
    assert_eq!(s.manager.borrow().render_target_listener_count(), 0);

    // The scheme is left as is; nothing answers for it any more.
    frame(&s.manager, &camera, &mut target);
    let stats = target.last_frame();
    assert!(stats.all_drawn_with_own_material());
    let materials: Vec<_> = stats.items.iter().map(|i| i.technique.material).collect();
    assert!(materials.contains(&s.red));
    assert!(materials.contains(&s.green));
    assert_eq!(hooks, 1);
}

#[test]
fn should_not_leak_override_into_other_targets() {
    let s = engine_scene();
    let camera = s.manager.borrow_mut().create_camera("cam");
    let mut overridden = s.manager.borrow_mut().create_render_texture("a", 16, 16);
    let mut plain = s.manager.borrow_mut().create_render_texture("b", 16, 16);

    let material_override = EngineRenderTargetMaterial::new(&s.manager, &mut overridden, s.blue);
    frame(&s.manager, &camera, &mut plain);
    frame(&s.manager, &camera, &mut overridden);

    assert!(plain.last_frame().all_drawn_with_own_material());
    assert_eq!(plain.material_scheme(), DEFAULT_SCHEME);
    assert!(overridden.last_frame().all_drawn_with(s.blue));
    // Hooks only fire for the target the override is bound to.
    assert_eq!(material_override.pre_render_count(), 1);
}

#[test]
fn should_generate_unused_scheme_names() {
    let s = engine_scene();
    let mut target = s.manager.borrow_mut().create_render_texture("tex", 8, 8);
    {
        let mut scene = s.manager.borrow_mut();
        let mut taken = Material::new("taken");
        taken.add_technique(Technique::new("main", "tex_scheme_0", Color::WHITE));
        scene.create_material(taken).unwrap();
    }

    let first = EngineRenderTargetMaterial::new(&s.manager, &mut target, s.blue);
    assert_ne!(first.scheme_name(), "tex_scheme_0");
    let second = EngineRenderTargetMaterial::new(&s.manager, &mut target, s.red);
    assert_ne!(second.scheme_name(), first.scheme_name());
}

#[test]
fn should_fall_back_when_override_has_no_technique() {
    let s = engine_scene();
    let camera = s.manager.borrow_mut().create_camera("cam");
    let mut target = s.manager.borrow_mut().create_render_texture("tex", 16, 16);
    let empty = s
        .manager
        .borrow_mut()
        .create_material(Material::new("empty"))
        .unwrap();
    let unsupported = {
        let mut material = Material::new("unsupported");
        material.add_technique(Technique::new("main", DEFAULT_SCHEME, Color::WHITE).unsupported());
        s.manager.borrow_mut().create_material(material).unwrap()
    };

    for material in [empty, unsupported] {
        let material_override = EngineRenderTargetMaterial::new(&s.manager, &mut target, material);
        frame(&s.manager, &camera, &mut target);
        assert!(target.last_frame().all_drawn_with_own_material());
        assert_eq!(target.last_frame().skipped, 0);
        drop(material_override);
    }
}

#[test]
fn should_prefer_own_technique_for_target_scheme() {
    let s = engine_scene();
    let camera = s.manager.borrow_mut().create_camera("cam");
    let mut target = s.manager.borrow_mut().create_render_texture("tex", 16, 16);
    s.manager
        .borrow_mut()
        .materials_mut()
        .add_technique(s.red, Technique::new("thermal", "thermal", Color::WHITE));

    target.set_material_scheme("thermal");
    frame(&s.manager, &camera, &mut target);
    let stats = target.last_frame();
    let red = stats.items.iter().find(|i| i.material == s.red).unwrap();
    assert_eq!(red.technique.technique, 1);
    let green = stats.items.iter().find(|i| i.material == s.green).unwrap();
    assert_eq!(green.technique.technique, 0);
}

#[test]
fn should_override_camera_material() {
    let fixture = Fixture::new();
    let other = fixture.add_box_at("other", 3.0, fixture.green);
    let mut camera = fixture.camera("override");

    camera.set_material(fixture.blue);
    camera.render();
    let stats = camera.frame_stats().unwrap();
    assert_eq!(stats.items.len(), 2);
    assert!(stats.all_drawn_with(fixture.blue));
    assert_eq!(pixel(&camera, CENTER.0, CENTER.1), rgba(Color::BLUE));

    let material_override = camera.render_target().unwrap().material_override().unwrap();
    assert!(material_override.is_active());
    assert_eq!(material_override.pre_render_count(), 1);
    assert_eq!(material_override.post_render_count(), 1);

    // A second camera renders with the objects' own materials.
    let mut plain = fixture.camera("plain");
    plain.render();
    assert!(plain.frame_stats().unwrap().all_drawn_with_own_material());
    assert_eq!(pixel(&plain, CENTER.0, CENTER.1), rgba(Color::GREEN));

    fixture.scene.destroy_visual(other);
    camera.set_material(fixture.red);
    camera.render();
    assert!(camera.frame_stats().unwrap().all_drawn_with(fixture.red));
    assert_eq!(
        fixture.scene.manager().borrow().materials().listener_count(),
        1
    );
}
