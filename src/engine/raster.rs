//! Software rasterisation of item geometry.
//!
//! Solid boxes are split into triangles and filled with edge functions;
//! line lists are stepped with a DDA. Fragments go to a [`FragmentSink`],
//! which is either a colour texture (with coverage-based anti-aliasing) or
//! the id texture of the selection pass. Primitives with a vertex outside
//! the near or far plane are culled rather than clipped. Lines are clipped
//! to the viewport before stepping.

use cgmath::{Matrix4, Point3, Vector4};

use crate::{
    data_structures::{
        aabb::AxisAlignedBox,
        color::Color,
        texture::{IdTexture, Texture},
    },
    engine::render::ItemGeometry,
};

/// Corner quads of the six box faces, see [`AxisAlignedBox::corners`].
const BOX_FACES: [[usize; 4]; 6] = [
    [0, 2, 6, 4],
    [1, 5, 7, 3],
    [0, 4, 5, 1],
    [2, 3, 7, 6],
    [0, 1, 3, 2],
    [4, 6, 7, 5],
];

/// Lines are pulled slightly towards the viewer so that they win against
/// coplanar faces.
const LINE_DEPTH_BIAS: f32 = 1e-4;

pub(crate) trait FragmentSink {
    fn extent(&self) -> (u32, u32);

    /// `coverage` is the fraction of samples covered, in `(0, 1]`.
    fn fragment(&mut self, x: u32, y: u32, depth: f32, coverage: f32);
}

pub(crate) struct ColorSink<'a> {
    pub texture: &'a mut Texture,
    pub colour: Color,
}

impl FragmentSink for ColorSink<'_> {
    fn extent(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    fn fragment(&mut self, x: u32, y: u32, depth: f32, coverage: f32) {
        let texel = if coverage >= 1.0 {
            self.colour.to_rgba8()
        } else {
            let Some(existing) = self.texture.pixel(x, y) else {
                return;
            };
            Color::from_rgba8(existing)
                .lerp(&self.colour, coverage)
                .to_rgba8()
        };
        self.texture.write(x, y, depth, texel);
    }
}

pub(crate) struct IdSink<'a> {
    pub texture: &'a mut IdTexture,
    pub id: u32,
}

impl FragmentSink for IdSink<'_> {
    fn extent(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    fn fragment(&mut self, x: u32, y: u32, depth: f32, coverage: f32) {
        if coverage >= 0.5 {
            self.texture.write(x, y, depth, self.id);
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct ScreenVertex {
    x: f64,
    y: f64,
    depth: f32,
}

/// Radical inverse in base 2, used to spread samples along y.
fn van_der_corput(mut bits: u32) -> f32 {
    bits = bits.reverse_bits();
    bits as f32 / 4_294_967_296.0
}

/// Sub-pixel sample offsets for `samples` samples (at least one).
pub(crate) fn sample_offsets(samples: u32) -> Vec<(f32, f32)> {
    let n = samples.max(1);
    if n == 1 {
        return vec![(0.5, 0.5)];
    }
    (0..n)
        .map(|s| ((s as f32 + 0.5) / n as f32, van_der_corput(s) + 0.5 / n as f32))
        .map(|(x, y)| (x, y.fract()))
        .collect()
}

fn project(
    view_proj_world: &Matrix4<f64>,
    p: Point3<f64>,
    width: u32,
    height: u32,
) -> Option<ScreenVertex> {
    let clip: Vector4<f64> = *view_proj_world * p.to_homogeneous();
    // behind the eye, in front of the near plane or past the far plane
    if clip.w <= f64::EPSILON || clip.z < -clip.w || clip.z > clip.w {
        return None;
    }
    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let ndc_z = clip.z / clip.w;
    Some(ScreenVertex {
        x: (ndc_x * 0.5 + 0.5) * f64::from(width),
        y: (0.5 - ndc_y * 0.5) * f64::from(height),
        depth: (ndc_z * 0.5 + 0.5) as f32,
    })
}

fn edge(a: &ScreenVertex, b: &ScreenVertex, px: f64, py: f64) -> f64 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

fn draw_triangle(sink: &mut dyn FragmentSink, v: [ScreenVertex; 3], offsets: &[(f32, f32)]) {
    let (width, height) = sink.extent();
    let area = edge(&v[0], &v[1], v[2].x, v[2].y);
    if area.abs() <= f64::EPSILON {
        return;
    }
    let min_x = v.iter().map(|p| p.x).fold(f64::INFINITY, f64::min).floor().max(0.0);
    let min_y = v.iter().map(|p| p.y).fold(f64::INFINITY, f64::min).floor().max(0.0);
    let max_x = v
        .iter()
        .map(|p| p.x)
        .fold(f64::NEG_INFINITY, f64::max)
        .ceil()
        .min(f64::from(width) - 1.0);
    let max_y = v
        .iter()
        .map(|p| p.y)
        .fold(f64::NEG_INFINITY, f64::max)
        .ceil()
        .min(f64::from(height) - 1.0);
    if min_x > max_x || min_y > max_y {
        return;
    }
    let inside = |px: f64, py: f64| {
        let w0 = edge(&v[1], &v[2], px, py) / area;
        let w1 = edge(&v[2], &v[0], px, py) / area;
        let w2 = 1.0 - w0 - w1;
        (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0).then_some((w0, w1, w2))
    };
    for y in min_y as u32..=max_y as u32 {
        for x in min_x as u32..=max_x as u32 {
            let covered = offsets
                .iter()
                .filter(|(ox, oy)| {
                    inside(f64::from(x) + f64::from(*ox), f64::from(y) + f64::from(*oy)).is_some()
                })
                .count();
            if covered == 0 {
                continue;
            }
            // Depth is taken at the pixel center even for partially covered pixels.
            let (px, py) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
            let w0 = edge(&v[1], &v[2], px, py) / area;
            let w1 = edge(&v[2], &v[0], px, py) / area;
            let w2 = 1.0 - w0 - w1;
            let depth = (w0 * f64::from(v[0].depth)
                + w1 * f64::from(v[1].depth)
                + w2 * f64::from(v[2].depth))
            .clamp(0.0, 1.0) as f32;
            sink.fragment(x, y, depth, covered as f32 / offsets.len() as f32);
        }
    }
}

fn lerp_vertex(a: &ScreenVertex, b: &ScreenVertex, t: f64) -> ScreenVertex {
    ScreenVertex {
        x: a.x + (b.x - a.x) * t,
        y: a.y + (b.y - a.y) * t,
        depth: a.depth + (b.depth - a.depth) * t as f32,
    }
}

/// Liang-Barsky clip of the segment `a`..`b` against `[0, width] x [0, height]`.
fn clip_to_viewport(
    a: ScreenVertex,
    b: ScreenVertex,
    width: u32,
    height: u32,
) -> Option<(ScreenVertex, ScreenVertex)> {
    if ![a.x, a.y, b.x, b.y].iter().all(|c| c.is_finite()) {
        return None;
    }
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-dx, a.x),
        (dx, f64::from(width) - a.x),
        (-dy, a.y),
        (dy, f64::from(height) - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((lerp_vertex(&a, &b, t0), lerp_vertex(&a, &b, t1)))
}

fn draw_line(sink: &mut dyn FragmentSink, a: ScreenVertex, b: ScreenVertex) {
    let (width, height) = sink.extent();
    let Some((a, b)) = clip_to_viewport(a, b, width, height) else {
        return;
    };
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
    for i in 0..=steps {
        let t = f64::from(i) / f64::from(steps);
        let x = a.x + dx * t;
        let y = a.y + dy * t;
        if x < 0.0 || y < 0.0 || x >= f64::from(width) || y >= f64::from(height) {
            continue;
        }
        let depth = (a.depth + (b.depth - a.depth) * t as f32 - LINE_DEPTH_BIAS).clamp(0.0, 1.0);
        sink.fragment(x as u32, y as u32, depth, 1.0);
    }
}

fn draw_box(
    sink: &mut dyn FragmentSink,
    view_proj_world: &Matrix4<f64>,
    aabb: &AxisAlignedBox,
    offsets: &[(f32, f32)],
) {
    if !aabb.is_valid() {
        return;
    }
    let (width, height) = sink.extent();
    let corners = aabb.corners();
    let projected: Vec<Option<ScreenVertex>> = corners
        .iter()
        .map(|c| project(view_proj_world, *c, width, height))
        .collect();
    for [a, b, c, d] in BOX_FACES {
        for tri in [[a, b, c], [a, c, d]] {
            if let (Some(v0), Some(v1), Some(v2)) = (projected[tri[0]], projected[tri[1]], projected[tri[2]]) {
                draw_triangle(sink, [v0, v1, v2], offsets);
            }
        }
    }
}

/// Rasterise `geometry` transformed by `view_proj_world` into `sink`.
pub(crate) fn draw_geometry(
    sink: &mut dyn FragmentSink,
    view_proj_world: &Matrix4<f64>,
    geometry: &ItemGeometry,
    samples: u32,
) {
    match geometry {
        ItemGeometry::Box(aabb) => {
            let offsets = sample_offsets(samples);
            draw_box(sink, view_proj_world, aabb, &offsets);
        }
        ItemGeometry::Lines(segments) => {
            let (width, height) = sink.extent();
            for [a, b] in segments {
                let a = project(view_proj_world, *a, width, height);
                let b = project(view_proj_world, *b, width, height);
                if let (Some(a), Some(b)) = (a, b) {
                    draw_line(sink, a, b);
                }
            }
        }
    }
}
