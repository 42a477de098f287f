//! Geometry capabilities.
//!
//! Geometry is described by small capability traits rather than a type
//! hierarchy. Every geometry can report its bounds, be shown or hidden and
//! be attached to a parent visual; specific kinds extend [`Geometry`] with
//! what only they can do.

use cgmath::Point3;

use crate::data_structures::{aabb::AxisAlignedBox, scene_graph::VisualId};

pub trait Geometry {
    /// Local-space bounds.
    fn bounds(&self) -> AxisAlignedBox;

    fn set_visible(&mut self, visible: bool);
    fn visible(&self) -> bool;

    /// The visual this geometry follows, if any.
    fn parent(&self) -> Option<VisualId>;
}

/// Wireframe outline of an axis aligned box.
///
/// The box is drawn as its twelve edges relative to the visual it is
/// attached to, so it moves with that visual.
pub trait WireBox: Geometry {
    /// Replace the outlined box. The box is stored exactly as given.
    fn set_box(&mut self, aabb: AxisAlignedBox);
    fn get_box(&self) -> AxisAlignedBox;

    /// Attach the wire box to `visual`. The box follows the visual's world
    /// transform from now on.
    fn set_visual(&mut self, visual: VisualId);

    /// The line segments drawn for the current box. Empty for invalid boxes.
    fn segments(&self) -> Vec<[Point3<f64>; 2]>;
}
