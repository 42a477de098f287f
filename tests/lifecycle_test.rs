use flow_rendering::{Camera, Color, Geometry, Vector2, WireBox, engine::TargetKind};

use crate::common::test_utils::{CENTER, Fixture, pixel, rgba, unit_box};

mod common;

#[test]
fn should_release_resources_on_destroy() {
    let fixture = Fixture::new();
    let baseline = fixture.scene.resource_counts();
    let mut camera = fixture.camera("destroy");
    camera.render();
    assert_eq!(fixture.scene.resource_counts().cameras, baseline.cameras + 1);

    camera.destroy();
    assert!(!camera.is_valid());
    assert_eq!(camera.render_texture_gl_id(), 0);
    assert!(camera.capture().is_none());
    assert_eq!(fixture.scene.resource_counts(), baseline);

    // Second destroy and the later drop are no-ops.
    camera.destroy();
    camera.render();
    drop(camera);
    assert_eq!(fixture.scene.resource_counts(), baseline);
}

#[test]
fn should_release_resources_on_drop() {
    let fixture = Fixture::new();
    let baseline = fixture.scene.resource_counts();
    {
        let mut first = fixture.camera("first");
        let mut second = fixture.camera("second");
        first.render();
        second.create_render_window();
        let counts = fixture.scene.resource_counts();
        assert_eq!(counts.cameras, 2);
        assert_eq!(counts.render_textures, 1);
        assert_eq!(counts.render_windows, 1);
    }
    assert_eq!(fixture.scene.resource_counts(), baseline);
}

#[test]
fn should_create_render_window_once() {
    let fixture = Fixture::new();
    let mut camera = fixture.camera("window");
    camera.set_background_color(Color::BLUE);
    assert_ne!(camera.render_texture_gl_id(), 0);

    let window = camera.create_render_window().unwrap();
    assert_eq!(camera.create_render_window(), Some(window));
    assert_eq!(camera.target_id(), Some(window));
    assert_eq!(camera.render_target().unwrap().kind(), TargetKind::Window);
    assert_eq!(camera.render_texture_gl_id(), 0);

    let counts = fixture.scene.resource_counts();
    assert_eq!(counts.render_windows, 1);
    assert_eq!(counts.render_textures, 0);

    // Settings carry over to the window.
    assert_eq!(camera.background_color(), Color::BLUE);
    camera.render();
    assert_eq!(pixel(&camera, CENTER.0, CENTER.1), rgba(Color::RED));
    assert_eq!(pixel(&camera, 0, 0), rgba(Color::BLUE));
}

#[test]
fn should_keep_material_override_on_window() {
    let fixture = Fixture::new();
    let mut camera = fixture.camera("window_override");
    camera.set_material(fixture.green);
    camera.render();
    assert_eq!(pixel(&camera, CENTER.0, CENTER.1), rgba(Color::GREEN));

    camera.create_render_window();
    camera.render();
    assert_eq!(pixel(&camera, CENTER.0, CENTER.1), rgba(Color::GREEN));
    assert!(camera.frame_stats().unwrap().all_drawn_with(fixture.green));
    assert_eq!(
        fixture.scene.manager().borrow().materials().listener_count(),
        1
    );
}

#[test]
fn should_remove_listeners_with_camera() {
    let fixture = Fixture::new();
    let mut camera = fixture.camera("listeners");
    camera.set_material(fixture.blue);
    camera.render();
    {
        let manager = fixture.scene.manager().borrow();
        assert_eq!(manager.materials().listener_count(), 1);
        assert_eq!(manager.render_target_listener_count(), 1);
    }

    camera.destroy();
    let manager = fixture.scene.manager().borrow();
    assert_eq!(manager.materials().listener_count(), 0);
    assert_eq!(manager.render_target_listener_count(), 0);
}

#[test]
fn should_outlive_scene() {
    let fixture = Fixture::new();
    let mut camera = fixture.camera("orphan");
    camera.render();
    let mut wire_box = {
        let mut fixture = fixture;
        let mut wire_box = fixture.scene.create_wire_box();
        wire_box.set_visual(fixture.target);
        wire_box
    };

    // The last frame stays readable; everything else turns into a no-op.
    camera.render();
    assert_eq!(pixel(&camera, CENTER.0, CENTER.1), rgba(Color::RED));
    assert_eq!(camera.visual_at(Vector2::new(0, 0)), None);
    assert_eq!(camera.create_render_window(), None);
    camera.destroy();
    assert!(!camera.is_valid());

    assert_eq!(wire_box.parent(), None);
    assert_eq!(wire_box.item(), None);
    wire_box.set_box(unit_box());
    assert_eq!(wire_box.get_box(), unit_box());
}
