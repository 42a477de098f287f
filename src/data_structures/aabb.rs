//! Axis-aligned bounding boxes.
//!
//! [`AxisAlignedBox`] is stored exactly as it is given: `min`/`max` are not
//! reordered, so a box set on a geometry reads back bit for bit.

use cgmath::{EuclideanSpace, Matrix4, Point3, Vector3};

/// Index pairs into [`AxisAlignedBox::corners`] forming the twelve box edges.
const EDGE_INDICES: [(usize, usize); 12] = [
    // bottom face (z = min)
    (0, 1),
    (1, 3),
    (3, 2),
    (2, 0),
    // top face (z = max)
    (4, 5),
    (5, 7),
    (7, 6),
    (6, 4),
    // verticals
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// A box defined by minimum and maximum coordinates along each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisAlignedBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl AxisAlignedBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// The empty box: `min` is `+inf` and `max` is `-inf`, so merging with
    /// any point yields that point.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// `min <= max` on every axis. Zero-volume boxes are valid.
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Zero for invalid boxes.
    pub fn volume(&self) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        let size = self.size();
        size.x * size.y * size.z
    }

    pub fn center(&self) -> Point3<f64> {
        self.min.midpoint(self.max)
    }

    pub fn contains(&self, p: Point3<f64>) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }

    /// The eight corners. Bit 0 of the index selects x, bit 1 y, bit 2 z.
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (lo, hi) = (self.min, self.max);
        std::array::from_fn(|i| {
            Point3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            )
        })
    }

    /// The twelve edges as line segments.
    pub fn edges(&self) -> [[Point3<f64>; 2]; 12] {
        let corners = self.corners();
        EDGE_INDICES.map(|(a, b)| [corners[a], corners[b]])
    }

    pub fn merge_point(&mut self, p: Point3<f64>) {
        self.min = Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    /// Bounds of this box after applying `matrix` to all of its corners.
    pub fn transformed(&self, matrix: &Matrix4<f64>) -> AxisAlignedBox {
        if !self.is_valid() {
            return *self;
        }
        let mut out = AxisAlignedBox::empty();
        for corner in self.corners() {
            let p = *matrix * corner.to_homogeneous();
            out.merge_point(Point3::new(p.x / p.w, p.y / p.w, p.z / p.w));
        }
        out
    }

    /// Slab test. Returns the distance along `dir` to the first intersection
    /// at or in front of `origin`, if any. `dir` need not be normalized; the
    /// distance is in units of `dir`.
    pub fn intersect_ray(&self, origin: Point3<f64>, dir: Vector3<f64>) -> Option<f64> {
        if !self.is_valid() {
            return None;
        }
        let mut t_near = f64::NEG_INFINITY;
        let mut t_far = f64::INFINITY;
        for axis in 0..3 {
            let (o, d, lo, hi) = (origin[axis], dir[axis], self.min[axis], self.max[axis]);
            if d.abs() < f64::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let (t0, t1) = ((lo - o) / d, (hi - o) / d);
            t_near = t_near.max(t0.min(t1));
            t_far = t_far.min(t0.max(t1));
            if t_near > t_far {
                return None;
            }
        }
        if t_far < 0.0 {
            return None;
        }
        Some(t_near.max(0.0))
    }
}

impl Default for AxisAlignedBox {
    fn default() -> Self {
        Self::empty()
    }
}
