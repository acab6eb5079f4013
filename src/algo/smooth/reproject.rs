//! Reading solved positions back and snapping them to reference geometry.

use nalgebra::{DVector, Point3};
use rayon::prelude::*;

use super::assemble::{SystemLayout, VertexKind};
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};
use crate::spatial::SpatialIndex;

/// Reference geometry that smoothed vertices are snapped back onto.
#[derive(Debug)]
pub struct ReprojectionTargets {
    /// Faces of the target surface; used for regular and corner vertices.
    pub surface: SpatialIndex,
    /// Marked edges of the mesh being smoothed; used for feature vertices.
    pub creases: SpatialIndex,
}

impl ReprojectionTargets {
    /// Index the faces of `target` and the currently marked edges of `mesh`.
    ///
    /// The crease index keeps the initial crease geometry for the whole call.
    ///
    /// # Errors
    ///
    /// [`MeshError::EmptyMesh`] if `target` has no faces.
    pub fn build<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, target: &HalfEdgeMesh<I>) -> Result<Self> {
        if target.num_faces() == 0 {
            return Err(MeshError::EmptyMesh);
        }

        let surface = SpatialIndex::build_from_mesh_faces(target);

        let mut creases = SpatialIndex::new();
        for e in mesh.edge_ids().filter(|&e| mesh.is_marked(e)) {
            let [a, b] = mesh.edge_vertices(e);
            creases.add_segment(e.index(), [*mesh.position(a), *mesh.position(b)]);
        }
        creases.build();

        log::debug!(
            "reprojection targets: {} surface triangles, {} crease segments",
            surface.len(),
            creases.len()
        );

        Ok(Self { surface, creases })
    }

    /// Snap a reconstructed position according to the vertex kind.
    ///
    /// Falls back to `p` when the relevant index is empty.
    pub fn snap(&self, kind: &VertexKind, p: Point3<f64>) -> Point3<f64> {
        let index = match kind {
            VertexKind::Regular | VertexKind::Corner => &self.surface,
            VertexKind::Feature(_) => &self.creases,
        };
        index.closest_point(&p).unwrap_or(p)
    }
}

/// Position of vertex `v` described by `solution`.
///
/// Regular and corner vertices read their coordinate columns; feature
/// vertices move from `current` along their tangent by the solved `t`.
pub fn reconstruct_position(
    layout: &SystemLayout,
    solution: &DVector<f64>,
    v: usize,
    current: &Point3<f64>,
) -> Point3<f64> {
    match layout.kind(v) {
        VertexKind::Regular | VertexKind::Corner => Point3::new(
            solution[layout.coordinate_column(v, 0)],
            solution[layout.coordinate_column(v, 1)],
            solution[layout.coordinate_column(v, 2)],
        ),
        VertexKind::Feature(frame) => current + frame.direction * solution[frame.column],
    }
}

/// Write the solved positions into the mesh, snapping them to `targets`
/// when given.
///
/// # Errors
///
/// [`MeshError::InternalInvariant`] if the solution does not match the layout.
pub fn apply_solution<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    layout: &SystemLayout,
    solution: &DVector<f64>,
    targets: Option<&ReprojectionTargets>,
    parallel: bool,
) -> Result<()> {
    let nv = mesh.num_vertices();
    if layout.num_vertices() != nv || solution.len() != layout.num_cols() {
        return Err(MeshError::InternalInvariant(format!(
            "solution of length {} for a layout with {} columns over {} vertices",
            solution.len(),
            layout.num_cols(),
            nv
        )));
    }

    let current: &HalfEdgeMesh<I> = mesh;
    let new_position = |i: usize| {
        let p = reconstruct_position(layout, solution, i, current.position(VertexId::new(i)));
        match targets {
            Some(t) => t.snap(layout.kind(i), p),
            None => p,
        }
    };

    let positions: Vec<Point3<f64>> = if parallel {
        (0..nv).into_par_iter().map(new_position).collect()
    } else {
        (0..nv).map(new_position).collect()
    };

    for (i, p) in positions.into_iter().enumerate() {
        mesh.set_position(VertexId::new(i), p);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::smooth::{classify_vertices, VertexLabel};
    use crate::mesh::build_from_quads;

    fn strip() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        let mut mesh: HalfEdgeMesh =
            build_from_quads(&vertices, &[[0, 1, 4, 3], [1, 2, 5, 4]]).unwrap();
        for (a, b) in [(0, 1), (1, 2)] {
            let e = mesh.find_edge(VertexId::new(a), VertexId::new(b)).unwrap();
            mesh.set_marked(e, true);
        }
        mesh
    }

    fn layout(mesh: &HalfEdgeMesh) -> SystemLayout {
        let labels = classify_vertices(mesh);
        assert_eq!(labels[1], VertexLabel::Feature);
        SystemLayout::build(mesh, &labels, 0, &mut Vec::new()).unwrap()
    }

    #[test]
    fn test_reconstruction_by_kind() {
        let mut mesh = strip();
        let layout = layout(&mesh);
        let mut solution = layout.initial_guess(&mesh);

        // Regular vertex 4 gets its solved coordinates.
        solution[layout.coordinate_column(4, 2)] = 0.25;
        // Feature vertex 1 slides by t; its coordinate columns are ignored.
        let frame = match layout.kind(1) {
            VertexKind::Feature(frame) => *frame,
            _ => unreachable!(),
        };
        solution[frame.column] = 0.5;
        solution[layout.coordinate_column(1, 1)] = 42.0;

        apply_solution(&mut mesh, &layout, &solution, None, false).unwrap();

        assert_eq!(*mesh.position(VertexId::new(4)), Point3::new(1.0, 1.0, 0.25));
        let moved = mesh.position(VertexId::new(1)) - Point3::new(1.0, 0.0, 0.0);
        assert!((moved - frame.direction * 0.5).norm() < 1e-15);
        assert_eq!(*mesh.position(VertexId::new(0)), Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_snapping_uses_surface_and_creases() {
        let mut mesh = strip();
        let target = mesh.clone();
        let targets = ReprojectionTargets::build(&mesh, &target).unwrap();
        assert_eq!(targets.creases.len(), 2);

        let layout = layout(&mesh);
        let mut solution = layout.initial_guess(&mesh);
        // Lift regular vertex 4 off the plane; it must come back.
        solution[layout.coordinate_column(4, 2)] = 0.3;
        apply_solution(&mut mesh, &layout, &solution, Some(&targets), true).unwrap();
        assert!(mesh.position(VertexId::new(4)).z.abs() < 1e-12);

        // A feature vertex pushed off the crease is pulled back onto it.
        let p = targets.snap(layout.kind(1), Point3::new(1.5, 0.2, 0.1));
        assert!((p - Point3::new(1.5, 0.0, 0.0)).norm() < 1e-12);
        let q = targets.snap(&VertexKind::Regular, Point3::new(1.5, 0.2, 0.1));
        assert!((q - Point3::new(1.5, 0.2, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_empty_target_is_rejected() {
        let mesh = strip();
        assert!(matches!(
            ReprojectionTargets::build(&mesh, &HalfEdgeMesh::new()),
            Err(MeshError::EmptyMesh)
        ));
    }

    #[test]
    fn test_solution_length_is_checked() {
        let mut mesh = strip();
        let layout = layout(&mesh);
        let short = DVector::zeros(3);
        assert!(matches!(
            apply_solution(&mut mesh, &layout, &short, None, false),
            Err(MeshError::InternalInvariant(_))
        ));
    }
}
