//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation and related types
//! for representing and manipulating polygon meshes.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], which represents a polygon mesh using
//! a half-edge (doubly-connected edge list) data structure. Besides the usual
//! vertex, half-edge and face records it keeps a table of undirected
//! [`Edge`]s, each carrying a `marked` flag that tags sharp creases, and a
//! stored unit normal per [`Face`].
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//! - [`EdgeId`] - Identifies an undirected edge
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! Meshes are typically constructed from file I/O or from face-vertex lists:
//!
//! ```
//! use crease::mesh::{HalfEdgeMesh, build_from_quads};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2, 3]];
//!
//! let mesh: HalfEdgeMesh = build_from_quads(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_edges(), 4);
//! ```

mod builder;
mod halfedge;
mod index;

pub use builder::{
    build_from_polygons, build_from_quads, build_from_triangles, to_face_vertex, to_triangles,
};
pub use halfedge::{
    Edge, Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter,
};
pub use index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
