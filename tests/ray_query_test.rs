use approx::assert_relative_eq;
use flow_rendering::{Camera, Point3, Vector2, Vector3};

use crate::common::test_utils::Fixture;

mod common;

#[test]
fn should_hit_box_through_image_center() {
    let fixture = Fixture::new();
    let camera = fixture.camera("ray");
    let mut query = fixture.scene.create_ray_query();

    assert!(query.set_from_camera(&camera, Vector2::new(0.0, 0.0)));
    // Rays start on the near plane.
    assert_relative_eq!(query.origin().x, camera.near_clip_plane(), epsilon = 1e-9);
    assert_relative_eq!(query.direction().x, 1.0, epsilon = 1e-9);

    let hit = query.closest_point().unwrap();
    assert_eq!(hit.visual, Some(fixture.target));
    assert_relative_eq!(hit.point.x, 4.0, epsilon = 1e-9);
    assert_relative_eq!(hit.distance, 4.0 - camera.near_clip_plane(), epsilon = 1e-9);
}

#[test]
fn should_return_nearest_hit() {
    let fixture = Fixture::new();
    let near = fixture.add_box_at("near", 2.5, fixture.green);
    let mut query = fixture.scene.create_ray_query();
    query.set_origin(Point3::new(0.0, 0.0, 0.0));
    query.set_direction(Vector3::new(3.0, 0.0, 0.0));
    assert_relative_eq!(query.direction().x, 1.0);

    let hit = query.closest_point().unwrap();
    assert_eq!(hit.visual, Some(near));
    assert_relative_eq!(hit.distance, 1.5);

    fixture.scene.set_visual_visible(near, false);
    let hit = query.closest_point().unwrap();
    assert_eq!(hit.visual, Some(fixture.target));
    assert_relative_eq!(hit.distance, 4.0);
}

#[test]
fn should_miss_empty_directions() {
    let fixture = Fixture::new();
    let camera = fixture.camera("miss");
    let mut query = fixture.scene.create_ray_query();

    // Top left corner of a 90 degree view passes beside the box.
    assert!(query.set_from_camera(&camera, Vector2::new(-1.0, 1.0)));
    assert_eq!(query.closest_point(), None);

    query.set_origin(Point3::new(0.0, 0.0, 0.0));
    query.set_direction(Vector3::new(-1.0, 0.0, 0.0));
    assert_eq!(query.closest_point(), None);

    // A zero direction is ignored.
    query.set_direction(Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(query.direction(), Vector3::new(-1.0, 0.0, 0.0));
}

#[test]
fn should_start_inside_box() {
    let fixture = Fixture::new();
    let mut query = fixture.scene.create_ray_query();
    query.set_origin(Point3::new(5.0, 0.0, 0.0));
    query.set_direction(Vector3::unit_z());

    let hit = query.closest_point().unwrap();
    assert_eq!(hit.distance, 0.0);
    assert_eq!(hit.point, Point3::new(5.0, 0.0, 0.0));
}

#[test]
fn should_refuse_destroyed_camera() {
    let fixture = Fixture::new();
    let mut camera = fixture.camera("gone");
    camera.destroy();

    let mut query = fixture.scene.create_ray_query();
    let origin = query.origin();
    assert!(!query.set_from_camera(&camera, Vector2::new(0.0, 0.0)));
    assert_eq!(query.origin(), origin);
}
