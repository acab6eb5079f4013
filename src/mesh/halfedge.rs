//! Half-edge mesh data structure.
//!
//! This module provides a half-edge (doubly-connected edge list) representation
//! for polygon meshes. Faces may have any number of corners; triangles and
//! quads are the common cases.
//!
//! # Structure
//!
//! - Each edge is split into two **half-edges** pointing in opposite directions
//! - Each half-edge knows its **twin**, **next** and **prev** half-edges around
//!   its face, its **origin vertex**, its **face** and the undirected **edge**
//!   it belongs to
//! - Each vertex stores one outgoing half-edge
//! - Each face stores one half-edge on its boundary and a precomputed unit
//!   normal
//! - Each undirected edge stores one of its half-edges and a `marked` flag used
//!   to tag sharp creases
//!
//! # Boundary Handling
//!
//! Boundary half-edges have an invalid face ID. Their twins are the interior
//! half-edges. Boundary loops can be traversed using the `next` pointer on
//! boundary half-edges, and boundary vertices always point at an outgoing
//! boundary half-edge.

use nalgebra::{Point3, Vector3};

use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge from this vertex.
    /// For boundary vertices, this is guaranteed to be a boundary half-edge.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new, unconnected vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge originates from.
    pub origin: VertexId<I>,

    /// The opposite half-edge.
    pub twin: HalfEdgeId<I>,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to. Invalid for boundary half-edges.
    pub face: FaceId<I>,

    /// The undirected edge shared with the twin.
    pub edge: EdgeId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new unlinked half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
            edge: EdgeId::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A polygonal face.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId<I>,

    /// Unit normal. Zero when the face is degenerate.
    pub normal: Vector3<f64>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face with the given half-edge and no normal yet.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self {
            halfedge,
            normal: Vector3::zeros(),
        }
    }
}

/// An undirected edge.
#[derive(Debug, Clone, Copy)]
pub struct Edge<I: MeshIndex = u32> {
    /// One of the two half-edges of this edge (the interior one on boundaries).
    pub halfedge: HalfEdgeId<I>,

    /// Whether the edge is tagged as a sharp crease to preserve.
    pub marked: bool,
}

impl<I: MeshIndex> Edge<I> {
    /// Create an unmarked edge.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self {
            halfedge,
            marked: false,
        }
    }
}

/// A half-edge mesh data structure for polygon meshes.
///
/// Stores vertices, half-edges, faces and undirected edges with full
/// connectivity information, enabling O(1) adjacency queries.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) faces: Vec<Face<I>>,
    pub(crate) edges: Vec<Edge<I>>,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            faces: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_corners: usize) -> Self {
        // Every corner owns one interior half-edge; boundary half-edges come on top.
        let num_halfedges = num_corners + num_corners / 4;

        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_corners / 3),
            edges: Vec::with_capacity(num_halfedges / 2),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of undirected edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by ID.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get a mutable half-edge by ID.
    #[inline]
    pub fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get an edge by ID.
    #[inline]
    pub fn edge(&self, id: EdgeId<I>) -> &Edge<I> {
        &self.edges[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, pos: Point3<f64>) {
        self.vertex_mut(v).position = pos;
    }

    /// Snapshot of all vertex positions, in vertex order.
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    /// The stored unit normal of a face.
    ///
    /// Normals are computed when the mesh is built and only change when
    /// [`update_face_normals`](Self::update_face_normals) is called.
    #[inline]
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        self.face(f).normal
    }

    /// Check whether an edge is marked as a sharp crease.
    #[inline]
    pub fn is_marked(&self, e: EdgeId<I>) -> bool {
        self.edge(e).marked
    }

    /// Mark or unmark an edge.
    #[inline]
    pub fn set_marked(&mut self, e: EdgeId<I>, marked: bool) {
        self.edges[e.index()].marked = marked;
    }

    /// Number of marked edges.
    pub fn num_marked_edges(&self) -> usize {
        self.edges.iter().filter(|e| e.marked).count()
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(self.twin(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Get the undirected edge of a half-edge.
    #[inline]
    pub fn edge_of(&self, he: HalfEdgeId<I>) -> EdgeId<I> {
        self.halfedge(he).edge
    }

    /// The two endpoints of an edge.
    pub fn edge_vertices(&self, e: EdgeId<I>) -> [VertexId<I>; 2] {
        let he = self.edge(e).halfedge;
        [self.origin(he), self.dest(he)]
    }

    /// The endpoint of `e` that is not `v`.
    ///
    /// `v` must be one of the endpoints of `e`.
    pub fn opposite_vertex(&self, e: EdgeId<I>, v: VertexId<I>) -> VertexId<I> {
        let [a, b] = self.edge_vertices(e);
        debug_assert!(a == v || b == v, "{:?} is not an endpoint of {:?}", v, e);
        if a == v {
            b
        } else {
            a
        }
    }

    /// Find the edge connecting two vertices, if any.
    pub fn find_edge(&self, v0: VertexId<I>, v1: VertexId<I>) -> Option<EdgeId<I>> {
        self.vertex_halfedges(v0)
            .find(|&he| self.dest(he) == v1)
            .map(|he| self.edge_of(he))
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if an edge lies on the mesh boundary.
    #[inline]
    pub fn is_boundary_edge(&self, e: EdgeId<I>) -> bool {
        let he = self.edge(e).halfedge;
        self.is_boundary_halfedge(he) || self.is_boundary_halfedge(self.twin(he))
    }

    /// Check if a vertex is on the boundary. Isolated vertices count as boundary.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        let he = self.vertex(v).halfedge;
        !he.is_valid() || self.is_boundary_halfedge(he)
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        (0..self.edges.len()).map(EdgeId::new)
    }

    /// Iterate over half-edges around a vertex (outgoing half-edges).
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over vertices adjacent to a vertex.
    pub fn vertex_neighbors(&self, v: VertexId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.dest(he))
    }

    /// Iterate over faces incident to a vertex.
    pub fn vertex_faces(&self, v: VertexId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.vertex_halfedges(v)
            .map(|he| self.face_of(he))
            .filter(|f| f.is_valid())
    }

    /// Iterate over edges incident to a vertex.
    pub fn vertex_edges(&self, v: VertexId<I>) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.edge_of(he))
    }

    /// Iterate over half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over vertices of a face, in winding order.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    /// Positions of the corners of a face, in winding order.
    pub fn face_positions(&self, f: FaceId<I>) -> Vec<Point3<f64>> {
        self.face_vertices(f).map(|v| *self.position(v)).collect()
    }

    /// Number of corners of a face.
    pub fn face_degree(&self, f: FaceId<I>) -> usize {
        self.face_halfedges(f).count()
    }

    // ==================== Geometry ====================

    /// Compute the (non-normalized) Newell vector of a face.
    ///
    /// Its direction is the face normal and its length twice the face area,
    /// which also holds for non-planar polygons.
    fn newell_vector(&self, f: FaceId<I>) -> Vector3<f64> {
        let corners = self.face_positions(f);
        let mut n = Vector3::zeros();
        for (i, p) in corners.iter().enumerate() {
            let q = &corners[(i + 1) % corners.len()];
            n.x += (p.y - q.y) * (p.z + q.z);
            n.y += (p.z - q.z) * (p.x + q.x);
            n.z += (p.x - q.x) * (p.y + q.y);
        }
        n
    }

    /// Compute the unit normal of a face from its current geometry.
    ///
    /// Returns the zero vector for degenerate faces.
    pub fn compute_face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        self.newell_vector(f)
            .try_normalize(1e-300)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Recompute all stored face normals from the current vertex positions.
    pub fn update_face_normals(&mut self) {
        for i in 0..self.faces.len() {
            let normal = self.compute_face_normal(FaceId::new(i));
            self.faces[i].normal = normal;
        }
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        0.5 * self.newell_vector(f).norm()
    }

    /// Compute the centroid (vertex average) of a face.
    pub fn face_centroid(&self, f: FaceId<I>) -> Point3<f64> {
        let corners = self.face_positions(f);
        let sum: Vector3<f64> = corners.iter().map(|p| p.coords).sum();
        Point3::from(sum / corners.len() as f64)
    }

    /// Length of an edge.
    pub fn edge_length(&self, e: EdgeId<I>) -> f64 {
        let [a, b] = self.edge_vertices(e);
        (self.position(b) - self.position(a)).norm()
    }

    /// Mean length over all edges (zero for a mesh without edges).
    pub fn average_edge_length(&self) -> f64 {
        if self.edges.is_empty() {
            return 0.0;
        }
        self.edge_ids().map(|e| self.edge_length(e)).sum::<f64>() / self.edges.len() as f64
    }

    /// Angle in radians between the stored normals of the two faces of an edge.
    ///
    /// Returns `None` for boundary edges.
    pub fn dihedral_angle(&self, e: EdgeId<I>) -> Option<f64> {
        if self.is_boundary_edge(e) {
            return None;
        }
        let he = self.edge(e).halfedge;
        let n0 = self.face_normal(self.face_of(he));
        let n1 = self.face_normal(self.face_of(self.twin(he)));
        Some(n0.dot(&n1).clamp(-1.0, 1.0).acos())
    }

    /// Compute the valence (degree) of a vertex.
    pub fn valence(&self, v: VertexId<I>) -> usize {
        self.vertex_halfedges(v).count()
    }

    /// Compute the axis-aligned bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let (mut min, mut max) = (first, first);

        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    /// Check whether every face is a triangle.
    pub fn is_triangle_mesh(&self) -> bool {
        self.face_ids().all(|f| self.face_degree(f) == 3)
    }

    /// Check whether every face is a quad.
    pub fn is_quad_mesh(&self) -> bool {
        self.face_ids().all(|f| self.face_degree(f) == 4)
    }

    // ==================== Construction ====================

    /// Add a new, unconnected vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    // ==================== Validation ====================

    /// Check if the mesh connectivity is consistent.
    pub fn is_valid(&self) -> bool {
        for (i, v) in self.vertices.iter().enumerate() {
            if v.halfedge.is_valid() && self.halfedge(v.halfedge).origin.index() != i {
                return false;
            }
        }

        for (i, he) in self.halfedges.iter().enumerate() {
            if !he.twin.is_valid() || self.halfedge(he.twin).twin.index() != i {
                return false;
            }
            if !he.edge.is_valid() || he.edge != self.halfedge(he.twin).edge {
                return false;
            }
            if he.next.is_valid() && self.halfedge(he.next).prev.index() != i {
                return false;
            }
            if he.prev.is_valid() && self.halfedge(he.prev).next.index() != i {
                return false;
            }
        }

        for e in &self.edges {
            if !e.halfedge.is_valid() {
                return false;
            }
        }

        self.faces.iter().all(|f| f.halfedge.is_valid())
    }
}

/// Iterator over the outgoing half-edges of a vertex.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;

        // he: v -> w, twin: w -> v, next(twin) leaves v again.
        self.current = self.mesh.next(self.mesh.twin(self.current));

        if self.current == self.start || !self.current.is_valid() {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over the half-edges bounding a face.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_quads, build_from_triangles};

    fn unit_square() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap()
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_edges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
        assert!(mesh.bounding_box().is_none());
    }

    #[test]
    fn test_add_vertex_is_isolated() {
        let mut mesh = HalfEdgeMesh::<u32>::new();
        let v = mesh.add_vertex(Point3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.position(v), &Point3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.valence(v), 0);
        assert!(mesh.is_boundary_vertex(v));
    }

    #[test]
    fn test_quad_normal_and_area() {
        let mesh = unit_square();
        let f = FaceId::new(0);
        assert!((mesh.face_normal(f) - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
        assert!((mesh.face_area(f) - 1.0).abs() < 1e-12);
        assert_eq!(mesh.face_degree(f), 4);
        assert!((mesh.face_centroid(f) - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-12);
        assert!(mesh.is_quad_mesh());
        assert!(!mesh.is_triangle_mesh());
    }

    #[test]
    fn test_edge_adjacency() {
        let mesh = unit_square();
        assert_eq!(mesh.num_edges(), 4);

        let v0 = VertexId::new(0);
        let edges: Vec<_> = mesh.vertex_edges(v0).collect();
        assert_eq!(edges.len(), 2);

        let mut opposite: Vec<usize> = edges
            .iter()
            .map(|&e| mesh.opposite_vertex(e, v0).index())
            .collect();
        opposite.sort_unstable();
        assert_eq!(opposite, vec![1, 3]);

        let e = mesh.find_edge(VertexId::new(1), VertexId::new(2)).unwrap();
        assert!(mesh.is_boundary_edge(e));
        assert!((mesh.edge_length(e) - 1.0).abs() < 1e-12);
        assert!(mesh.find_edge(VertexId::new(0), VertexId::new(2)).is_none());
    }

    #[test]
    fn test_marking_edges() {
        let mut mesh = unit_square();
        let e = EdgeId::new(2);
        assert!(!mesh.is_marked(e));
        mesh.set_marked(e, true);
        assert!(mesh.is_marked(e));
        assert_eq!(mesh.num_marked_edges(), 1);
    }

    #[test]
    fn test_dihedral_angle_of_folded_pair() {
        // Two triangles meeting at a right angle along the x-axis.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.0, 1.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3]];
        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();

        let shared = mesh.find_edge(VertexId::new(0), VertexId::new(1)).unwrap();
        let angle = mesh.dihedral_angle(shared).unwrap();
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        let border = mesh.find_edge(VertexId::new(1), VertexId::new(2)).unwrap();
        assert!(mesh.dihedral_angle(border).is_none());
    }

    #[test]
    fn test_update_face_normals_follows_geometry() {
        let mut mesh = unit_square();
        for v in 0..4 {
            let vid = VertexId::new(v);
            let p = *mesh.position(vid);
            mesh.set_position(vid, Point3::new(p.x, 0.0, p.y));
        }
        // Stored normal is stale until refreshed.
        assert!((mesh.face_normal(FaceId::new(0)).z - 1.0).abs() < 1e-12);

        mesh.update_face_normals();
        let n = mesh.face_normal(FaceId::new(0));
        assert!((n - Vector3::new(0.0, -1.0, 0.0)).norm() < 1e-12);
    }
}
