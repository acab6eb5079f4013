//! # Crease
//!
//! Feature-preserving smoothing of polygon meshes.
//!
//! Crease removes noise from a surface while keeping its sharp features.
//! Edges tagged as creases are treated as constraints: vertices on a crease
//! slide along it, vertices where creases meet stay put, and every other
//! vertex moves within its tangent plane. Each iteration is a sparse weighted
//! least-squares solve.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe indices
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Crease marking**: from dihedral angles, the open boundary, or OBJ/PLY files
//! - **Reprojection**: snapping onto a reference surface through a BVH
//! - **Multiple file formats**: OBJ, PLY, STL
//!
//! ## Quick Start
//!
//! ```no_run
//! use crease::prelude::*;
//! use crease::algo::features::mark_sharp_edges;
//!
//! let mut mesh: HalfEdgeMesh = crease::io::load("noisy.obj").unwrap();
//! let reference = mesh.clone();
//!
//! mark_sharp_edges(&mut mesh, 40.0);
//! let options = SmootherOptions::default().with_iterations(20);
//! feature_preserving_smooth(&mut mesh, &reference, &options).unwrap();
//!
//! crease::io::save(&mesh, "smooth.obj").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use crease::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//!
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 4);
//! assert_eq!(mesh.num_faces(), 4);
//! assert_eq!(mesh.num_edges(), 6);
//! ```
//!
//! ## Smoothing with Creases
//!
//! ```
//! use crease::prelude::*;
//! use crease::algo::features::mark_boundary_edges;
//! use nalgebra::Point3;
//!
//! // 2x2 grid of quads with a lifted center vertex
//! let mut vertices = Vec::new();
//! for j in 0..3 {
//!     for i in 0..3 {
//!         vertices.push(Point3::new(i as f64, j as f64, 0.0));
//!     }
//! }
//! vertices[4].z = 0.3;
//! let faces = vec![[0, 1, 4, 3], [1, 2, 5, 4], [3, 4, 7, 6], [4, 5, 8, 7]];
//! let mut mesh: HalfEdgeMesh = build_from_quads(&vertices, &faces).unwrap();
//!
//! // The boundary keeps its outline
//! mark_boundary_edges(&mut mesh);
//!
//! let options = SmootherOptions::default()
//!     .with_reprojection(false)
//!     .with_w_laplace(1.0)
//!     .with_iterations(5);
//! feature_preserving_smooth(&mut mesh, &HalfEdgeMesh::new(), &options).unwrap();
//!
//! assert!(mesh.position(VertexId::new(4)).z < 0.3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;
pub mod spatial;

pub use nalgebra;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use crease::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::smooth::{
        feature_preserving_smooth, feature_preserving_smooth_self,
        feature_preserving_smooth_with_diagnostics, feature_preserving_smooth_with_progress,
        LaplacianMode, SmootherOptions, SolverOptions,
    };
    pub use crate::algo::{Diagnostic, Diagnostics, Progress};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, build_from_quads, build_from_triangles, to_face_vertex, EdgeId, Face,
        FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh, MeshIndex, Vertex, VertexId,
    };
}
