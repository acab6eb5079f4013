//! Closest-point queries against triangles and segments.
//!
//! [`SpatialIndex`] answers "which point of this set of primitives is
//! nearest to `p`". The smoother uses one index over the faces of a target
//! surface and another over crease segments, snapping vertices back after
//! every iteration.
//!
//! # Example
//!
//! ```
//! use crease::spatial::SpatialIndex;
//! use nalgebra::Point3;
//!
//! let mut index = SpatialIndex::new();
//! index.add_segment(0, [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]);
//! index.add_segment(1, [Point3::new(0.0, 1.0, 0.0), Point3::new(1.0, 1.0, 0.0)]);
//! index.build();
//!
//! let p = index.closest_point(&Point3::new(0.5, 0.2, 0.3)).unwrap();
//! assert!((p - Point3::new(0.5, 0.0, 0.0)).norm() < 1e-12);
//! ```

mod aabb;
mod bvh;

pub use aabb::Aabb;
pub use bvh::{Bvh, BvhNode};

use nalgebra::Point3;

use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Default maximum number of primitives per leaf.
pub const DEFAULT_MAX_LEAF_SIZE: usize = 8;

/// A geometric primitive stored in a [`SpatialIndex`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// A triangle.
    Triangle([Point3<f64>; 3]),
    /// A line segment.
    Segment([Point3<f64>; 2]),
}

impl Primitive {
    /// Bounding box of the primitive.
    pub fn bbox(&self) -> Aabb {
        match self {
            Primitive::Triangle(t) => Aabb::from_points(t),
            Primitive::Segment(s) => Aabb::from_points(s),
        }
    }

    /// Point of the primitive closest to `p`.
    pub fn closest_point(&self, p: &Point3<f64>) -> Point3<f64> {
        match self {
            Primitive::Triangle([a, b, c]) => closest_point_on_triangle(p, a, b, c),
            Primitive::Segment([a, b]) => closest_point_on_segment(p, a, b),
        }
    }
}

/// Result of a nearest-primitive query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestHit {
    /// The closest point.
    pub point: Point3<f64>,
    /// User id of the primitive the point lies on.
    pub id: usize,
    /// Squared distance from the query point.
    pub distance_squared: f64,
}

/// A closest-point index over triangles and segments.
///
/// Primitives are added with a caller-chosen id, then [`build`](Self::build)
/// constructs the hierarchy. Adding primitives after building invalidates
/// the hierarchy until the next `build`; queries on an unbuilt index fall
/// back to a linear scan.
#[derive(Debug)]
pub struct SpatialIndex {
    ids: Vec<usize>,
    primitives: Vec<Primitive>,
    bvh: Option<Bvh>,
    max_leaf_size: usize,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::with_max_leaf_size(DEFAULT_MAX_LEAF_SIZE)
    }

    /// Create an empty index with the given leaf capacity.
    pub fn with_max_leaf_size(max_leaf_size: usize) -> Self {
        Self {
            ids: Vec::new(),
            primitives: Vec::new(),
            bvh: None,
            max_leaf_size: max_leaf_size.max(1),
        }
    }

    /// Build an index over all faces of a mesh.
    ///
    /// Polygons are fan-triangulated; every triangle carries the id of the
    /// face it came from.
    pub fn build_from_mesh_faces<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Self {
        let mut index = Self::new();
        for f in mesh.face_ids() {
            let corners = mesh.face_positions(f);
            for k in 1..corners.len() - 1 {
                index.add_triangle(f.index(), [corners[0], corners[k], corners[k + 1]]);
            }
        }
        index.build();
        index
    }

    /// Add a segment.
    pub fn add_segment(&mut self, id: usize, segment: [Point3<f64>; 2]) {
        self.push(id, Primitive::Segment(segment));
    }

    /// Add a triangle.
    pub fn add_triangle(&mut self, id: usize, triangle: [Point3<f64>; 3]) {
        self.push(id, Primitive::Triangle(triangle));
    }

    fn push(&mut self, id: usize, primitive: Primitive) {
        self.ids.push(id);
        self.primitives.push(primitive);
        self.bvh = None;
    }

    /// Build the hierarchy over the primitives added so far.
    pub fn build(&mut self) {
        let boxes: Vec<Aabb> = self.primitives.iter().map(Primitive::bbox).collect();
        self.bvh = Some(Bvh::build(&boxes, self.max_leaf_size));
    }

    /// Number of primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Whether the index holds no primitives.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Whether the hierarchy is up to date.
    pub fn is_built(&self) -> bool {
        self.bvh.is_some()
    }

    /// Nearest primitive to `p`, or `None` if the index is empty.
    pub fn closest(&self, p: &Point3<f64>) -> Option<ClosestHit> {
        let distance = |i: usize| (self.primitives[i].closest_point(p) - p).norm_squared();

        let (i, distance_squared) = match &self.bvh {
            Some(bvh) => bvh.nearest(p, distance)?,
            None => (0..self.primitives.len())
                .map(|i| (i, distance(i)))
                .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                    Some((_, bd)) if bd <= d => best,
                    _ => Some((i, d)),
                })?,
        };

        Some(ClosestHit {
            point: self.primitives[i].closest_point(p),
            id: self.ids[i],
            distance_squared,
        })
    }

    /// Point of the indexed geometry nearest to `p`, or `None` if empty.
    pub fn closest_point(&self, p: &Point3<f64>) -> Option<Point3<f64>> {
        self.closest(p).map(|hit| hit.point)
    }
}

/// Closest point to `p` on segment `[a, b]`.
pub fn closest_point_on_segment(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> Point3<f64> {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return *a;
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest point to `p` on triangle `(a, b, c)`, by Voronoi region of the
/// triangle features.
pub fn closest_point_on_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Point3<f64> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = va + vb + vc;
    if denom == 0.0 {
        // Degenerate triangle with all regions rejected; fall back to an edge
        return closest_point_on_segment(p, a, b);
    }
    let v = vb / denom;
    let w = vc / denom;
    a + ab * v + ac * w
}
