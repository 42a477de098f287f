use flow_rendering::{
    AxisAlignedBox, Geometry, Point3, Vector3, WireBox,
    data_structures::transform::Transform,
    engine::ItemGeometry,
};

use crate::common::test_utils::Fixture;

mod common;

fn boxes() -> Vec<AxisAlignedBox> {
    vec![
        // zero extent
        AxisAlignedBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0)),
        AxisAlignedBox::new(Point3::new(2.0, 2.0, 2.0), Point3::new(2.0, 2.0, 2.0)),
        // positive extent
        AxisAlignedBox::new(Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)),
        // negative coordinates
        AxisAlignedBox::new(Point3::new(-3.0, -2.0, -1.0), Point3::new(-0.5, -0.25, -0.125)),
        AxisAlignedBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)),
        // inverted, stored as given
        AxisAlignedBox::new(Point3::new(1.0, 1.0, 1.0), Point3::new(-1.0, -1.0, -1.0)),
    ]
}

#[test]
fn should_round_trip_box() {
    let mut fixture = Fixture::new();
    let mut detached = fixture.scene.create_wire_box();
    let mut attached = fixture.scene.create_wire_box();
    attached.set_visual(fixture.target);

    for aabb in boxes() {
        detached.set_box(aabb);
        attached.set_box(aabb);
        assert_eq!(detached.get_box(), aabb);
        assert_eq!(attached.get_box(), aabb);
        assert_eq!(attached.bounds(), aabb);
    }
}

#[test]
fn should_toggle_visibility() {
    let mut fixture = Fixture::new();
    let mut wire_box = fixture.scene.create_wire_box();
    assert!(wire_box.visible());

    wire_box.set_visible(false);
    assert!(!wire_box.visible());
    wire_box.set_visible(false);
    assert!(!wire_box.visible());

    wire_box.set_visual(fixture.target);
    assert!(!wire_box.visible());
    let item = wire_box.item().unwrap();
    let visible_items = fixture.scene.manager().borrow().visible_items();
    assert!(visible_items.iter().all(|(i, _)| *i != item));

    wire_box.set_visible(true);
    assert!(wire_box.visible());
    let visible_items = fixture.scene.manager().borrow().visible_items();
    assert!(visible_items.iter().any(|(i, _)| *i == item));
}

#[test]
fn should_build_twelve_edges() {
    let mut fixture = Fixture::new();
    let mut wire_box = fixture.scene.create_wire_box();
    let aabb = AxisAlignedBox::new(Point3::new(-1.0, -2.0, -3.0), Point3::new(1.0, 2.0, 3.0));
    assert_eq!(aabb.volume(), 48.0);
    wire_box.set_box(aabb);
    wire_box.set_visual(fixture.target);

    let segments = wire_box.segments();
    assert_eq!(segments.len(), 12);
    for [a, b] in &segments {
        let d = *b - *a;
        // Every edge runs along exactly one axis.
        let axes = [d.x, d.y, d.z].iter().filter(|c| **c != 0.0).count();
        assert_eq!(axes, 1);
        assert!(aabb.contains(*a) && aabb.contains(*b));
    }

    let item = wire_box.item().unwrap();
    let manager = fixture.scene.manager().borrow();
    assert_eq!(
        manager.item(item).unwrap().geometry,
        ItemGeometry::Lines(segments)
    );
}

#[test]
fn should_draw_nothing_for_invalid_box() {
    let mut fixture = Fixture::new();
    let mut wire_box = fixture.scene.create_wire_box();
    wire_box.set_visual(fixture.target);

    let inverted = AxisAlignedBox::new(Point3::new(1.0, 0.0, 0.0), Point3::new(-1.0, 0.0, 0.0));
    assert_eq!(inverted.volume(), 0.0);
    wire_box.set_box(inverted);
    assert!(wire_box.segments().is_empty());
    let item = wire_box.item().unwrap();
    assert_eq!(
        fixture.scene.manager().borrow().item(item).unwrap().geometry,
        ItemGeometry::Lines(Vec::new())
    );

    let flat = AxisAlignedBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0));
    assert!(flat.is_valid());
    assert_eq!(flat.volume(), 0.0);
    wire_box.set_box(flat);
    assert_eq!(wire_box.segments().len(), 12);
    assert!(wire_box.segments().iter().all(|[a, b]| a == b));
}

#[test]
fn should_follow_visual_transform() {
    let mut fixture = Fixture::new();
    let mut wire_box = fixture.scene.create_wire_box();
    wire_box.set_box(AxisAlignedBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)));
    assert_eq!(wire_box.parent(), None);
    assert_eq!(wire_box.item(), None);

    wire_box.set_visual(fixture.target);
    assert_eq!(wire_box.parent(), Some(fixture.target));
    let item = wire_box.item().unwrap();

    let bounds = fixture.scene.manager().borrow().item_world_bounds(item).unwrap();
    assert_eq!(bounds.center(), Point3::new(5.0, 0.0, 0.0));

    fixture.scene.set_visual_transform(
        fixture.target,
        Transform::from_position(Vector3::new(0.0, 10.0, -2.0)),
    );
    let bounds = fixture.scene.manager().borrow().item_world_bounds(item).unwrap();
    assert_eq!(bounds.center(), Point3::new(0.0, 10.0, -2.0));

    // Re-parenting moves the outline to the new visual.
    let other = fixture.scene.create_visual("other").unwrap();
    wire_box.set_visual(other);
    assert_eq!(wire_box.parent(), Some(other));
    assert!(fixture.scene.manager().borrow().item(item).is_none());
    let item = wire_box.item().unwrap();
    let bounds = fixture.scene.manager().borrow().item_world_bounds(item).unwrap();
    assert_eq!(bounds.center(), Point3::new(0.0, 0.0, 0.0));
}

#[test]
fn should_outlive_destroyed_visual() {
    let mut fixture = Fixture::new();
    let mut wire_box = fixture.scene.create_wire_box();
    wire_box.set_visual(fixture.target);
    let items_before = fixture.scene.manager().borrow().item_count();

    fixture.scene.destroy_visual(fixture.target);
    assert_eq!(fixture.scene.manager().borrow().item_count(), items_before - 2);
    assert_eq!(wire_box.parent(), None);
    assert_eq!(wire_box.item(), None);

    let aabb = AxisAlignedBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    wire_box.set_box(aabb);
    wire_box.set_visible(false);
    assert_eq!(wire_box.get_box(), aabb);
    assert!(!wire_box.visible());
    drop(wire_box);
    assert_eq!(fixture.scene.manager().borrow().item_count(), items_before - 2);
}

#[test]
fn should_remove_outline_on_drop() {
    let mut fixture = Fixture::new();
    let nodes_before = fixture.scene.manager().borrow().graph().len();
    let mut wire_box = fixture.scene.create_wire_box();
    wire_box.set_visual(fixture.target);
    assert_eq!(fixture.scene.manager().borrow().graph().len(), nodes_before + 1);

    drop(wire_box);
    assert_eq!(fixture.scene.manager().borrow().graph().len(), nodes_before);
}

#[test]
fn should_ignore_destroyed_parent() {
    let mut fixture = Fixture::new();
    let gone = fixture.scene.create_visual("gone").unwrap();
    fixture.scene.destroy_visual(gone);

    let mut wire_box = fixture.scene.create_wire_box();
    wire_box.set_visual(gone);
    assert_eq!(wire_box.parent(), None);
    assert_eq!(wire_box.item(), None);

    wire_box.set_visual(fixture.target);
    assert_eq!(wire_box.parent(), Some(fixture.target));
}
