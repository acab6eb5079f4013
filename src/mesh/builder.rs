//! Mesh construction utilities.
//!
//! This module builds half-edge meshes from face-vertex lists as found in mesh
//! file formats, and converts them back.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{Edge, Face, HalfEdge, HalfEdgeMesh};
use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and polygon faces of any degree.
///
/// Faces are given as vertex index lists in counter-clockwise order. Each
/// undirected edge receives an [`EdgeId`] in order of first appearance, and
/// face normals are computed from the input geometry.
///
/// # Errors
///
/// - [`MeshError::EmptyMesh`] if `faces` is empty
/// - [`MeshError::InvalidVertexIndex`] for out-of-range indices
/// - [`MeshError::DegenerateFace`] for faces with fewer than three distinct corners
/// - [`MeshError::NonManifoldEdge`] if a directed edge is used twice
/// - [`MeshError::NonManifoldVertex`] if boundary loops pinch at a vertex
///
/// # Example
/// ```
/// use crease::mesh::{build_from_polygons, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.5, 1.5, 0.0),
/// ];
/// let faces: Vec<Vec<usize>> = vec![vec![0, 1, 2, 3], vec![3, 2, 4]];
///
/// let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// assert_eq!(mesh.num_edges(), 6);
/// ```
pub fn build_from_polygons<I: MeshIndex, F: AsRef<[usize]>>(
    vertices: &[Point3<f64>],
    faces: &[F],
) -> Result<HalfEdgeMesh<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    let mut num_corners = 0;
    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        if face.len() < 3 {
            return Err(MeshError::DegenerateFace { face: fi });
        }
        for (k, &vi) in face.iter().enumerate() {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
            if face[..k].contains(&vi) {
                return Err(MeshError::DegenerateFace { face: fi });
            }
        }
        num_corners += face.len();
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), num_corners);
    for &pos in vertices {
        mesh.add_vertex(pos);
    }

    // Directed edge (v0, v1) -> half-edge
    let mut directed: HashMap<(usize, usize), HalfEdgeId<I>> = HashMap::with_capacity(num_corners);

    // First pass: interior half-edges and faces
    for face in faces {
        let face = face.as_ref();
        let n = face.len();
        let base = mesh.num_halfedges();
        let face_id = FaceId::<I>::new(mesh.num_faces());
        mesh.faces.push(Face::new(HalfEdgeId::new(base)));

        for k in 0..n {
            let (v0, v1) = (face[k], face[(k + 1) % n]);
            let he_id = HalfEdgeId::<I>::new(base + k);
            if directed.insert((v0, v1), he_id).is_some() {
                return Err(MeshError::NonManifoldEdge { v0, v1 });
            }

            let mut he = HalfEdge::new();
            he.origin = VertexId::new(v0);
            he.next = HalfEdgeId::new(base + (k + 1) % n);
            he.prev = HalfEdgeId::new(base + (k + n - 1) % n);
            he.face = face_id;
            mesh.halfedges.push(he);

            mesh.vertex_mut(VertexId::new(v0)).halfedge = he_id;
        }
    }

    // Second pass: twins and undirected edges, in half-edge order so edge ids are stable
    let num_interior = mesh.num_halfedges();
    for i in 0..num_interior {
        let he = HalfEdgeId::<I>::new(i);
        if mesh.twin(he).is_valid() {
            continue;
        }

        let v0 = mesh.origin(he).index();
        let v1 = mesh.origin(mesh.next(he)).index();
        let edge_id = EdgeId::<I>::new(mesh.num_edges());
        mesh.edges.push(Edge::new(he));

        let twin = match directed.get(&(v1, v0)) {
            Some(&twin) => twin,
            None => {
                let boundary = HalfEdgeId::<I>::new(mesh.num_halfedges());
                let mut bhe = HalfEdge::new();
                bhe.origin = VertexId::new(v1);
                mesh.halfedges.push(bhe);
                boundary
            }
        };

        mesh.halfedge_mut(he).twin = twin;
        mesh.halfedge_mut(he).edge = edge_id;
        mesh.halfedge_mut(twin).twin = he;
        mesh.halfedge_mut(twin).edge = edge_id;
    }

    // Third pass: link boundary half-edges into loops
    link_boundary_loops(&mut mesh)?;

    // Fourth pass: ensure boundary vertices point to boundary half-edges
    fix_boundary_vertex_halfedges(&mut mesh);

    mesh.update_face_normals();

    Ok(mesh)
}

/// Build a half-edge mesh from vertices and triangle faces.
///
/// # Example
/// ```
/// use crease::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_edges(), 3);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Build a half-edge mesh from vertices and quad faces (counter-clockwise).
pub fn build_from_quads<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 4]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Link boundary half-edges into proper loops.
fn link_boundary_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<()> {
    let boundary_hes: Vec<HalfEdgeId<I>> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect();

    // Outgoing boundary half-edge per vertex; two of them means a pinched vertex.
    let mut outgoing: HashMap<usize, HalfEdgeId<I>> = HashMap::with_capacity(boundary_hes.len());
    for &he in &boundary_hes {
        let origin = mesh.origin(he).index();
        if outgoing.insert(origin, he).is_some() {
            return Err(MeshError::NonManifoldVertex { vertex: origin });
        }
    }

    for &he in &boundary_hes {
        let dest = mesh.dest(he).index();
        if let Some(&next_he) = outgoing.get(&dest) {
            mesh.halfedge_mut(he).next = next_he;
            mesh.halfedge_mut(next_he).prev = he;
        }
    }

    Ok(())
}

/// Ensure boundary vertices point to a boundary half-edge.
fn fix_boundary_vertex_halfedges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    for he in mesh.halfedge_ids().collect::<Vec<_>>() {
        if mesh.is_boundary_halfedge(he) {
            let origin = mesh.origin(he);
            mesh.vertex_mut(origin).halfedge = he;
        }
    }
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Returns `(vertices, faces)` with faces in winding order.
pub fn to_face_vertex<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let vertices = mesh.positions();
    let faces = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(|v| v.index()).collect())
        .collect();

    (vertices, faces)
}

/// Fan-triangulate every face of the mesh.
///
/// Returns `(vertices, triangles)`; triangles keep the face winding.
pub fn to_triangles<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let (vertices, faces) = to_face_vertex(mesh);
    let mut triangles = Vec::with_capacity(faces.len());
    for face in &faces {
        for k in 1..face.len() - 1 {
            triangles.push([face[0], face[k], face[k + 1]]);
        }
    }
    (vertices, triangles)
}
