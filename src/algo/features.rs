//! Tagging sharp creases.
//!
//! The smoother preserves whatever edges are marked on the mesh. These helpers
//! produce such a marking automatically, either from the dihedral angle
//! between neighbouring faces or from the open boundary.
//!
//! # Example
//!
//! ```
//! use crease::prelude::*;
//! use crease::algo::features::{mark_sharp_edges, marked_edges};
//! use nalgebra::Point3;
//!
//! // Two quads folded by 90 degrees along the edge (0, 1).
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 1.0),
//!     Point3::new(0.0, 0.0, 1.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2, 3], [0, 5, 4, 1]];
//! let mut mesh: HalfEdgeMesh = build_from_quads(&vertices, &faces).unwrap();
//!
//! assert_eq!(mark_sharp_edges(&mut mesh, 45.0), 1);
//! assert_eq!(marked_edges(&mesh).len(), 1);
//! ```

use crate::mesh::{EdgeId, HalfEdgeMesh, MeshIndex};

/// Mark every interior edge whose dihedral angle exceeds `angle_deg` degrees.
///
/// The angle is measured between the stored normals of the two adjacent faces,
/// so a flat region has angle 0. Existing marks are kept. Returns the number
/// of edges above the threshold.
pub fn mark_sharp_edges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, angle_deg: f64) -> usize {
    let threshold = angle_deg.to_radians();
    let sharp: Vec<EdgeId<I>> = mesh
        .edge_ids()
        .filter(|&e| mesh.dihedral_angle(e).is_some_and(|a| a > threshold))
        .collect();

    for &e in &sharp {
        mesh.set_marked(e, true);
    }
    log::debug!("marked {} sharp edges (threshold {} deg)", sharp.len(), angle_deg);
    sharp.len()
}

/// Mark all boundary edges. Returns how many there are.
pub fn mark_boundary_edges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> usize {
    let boundary: Vec<EdgeId<I>> = mesh
        .edge_ids()
        .filter(|&e| mesh.is_boundary_edge(e))
        .collect();

    for &e in &boundary {
        mesh.set_marked(e, true);
    }
    boundary.len()
}

/// Remove every mark.
pub fn clear_marks<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    for e in mesh.edge_ids().collect::<Vec<_>>() {
        mesh.set_marked(e, false);
    }
}

/// IDs of all marked edges, in ascending order.
pub fn marked_edges<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Vec<EdgeId<I>> {
    mesh.edge_ids().filter(|&e| mesh.is_marked(e)).collect()
}
