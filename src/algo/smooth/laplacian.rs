//! Discrete Laplacian stencils.
//!
//! A stencil lists the neighbours of a vertex with weights summing to one, so
//! that `sum_j w_j x_j - x_v` is the offset from the vertex to the weighted
//! average of its one-ring.

use nalgebra::Point3;
use smallvec::SmallVec;

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

/// Cotangent weight sums with a smaller magnitude fall back to uniform weights.
const MIN_WEIGHT_SUM: f64 = 1e-12;

/// Weighting scheme of the Laplacian smoothing term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaplacianMode {
    /// Every neighbour gets weight `1 / valence`.
    #[default]
    Uniform,
    /// Neighbours are weighted by `(cot a + cot b) / 2` of the angles opposite
    /// the connecting edge. Requires a triangle mesh.
    Cotangent,
}

/// Neighbour weights of one vertex.
pub type Stencil<I> = SmallVec<[(VertexId<I>, f64); 8]>;

/// Check that `mode` can be evaluated on `mesh`.
///
/// # Errors
///
/// [`MeshError::InvalidState`] for cotangent weights on a mesh with
/// non-triangular faces.
pub fn check_mode<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, mode: LaplacianMode) -> Result<()> {
    if mode == LaplacianMode::Cotangent && !mesh.is_triangle_mesh() {
        return Err(MeshError::InvalidState(
            "cotangent Laplacian requires a triangle mesh".to_string(),
        ));
    }
    Ok(())
}

/// Normalised Laplacian stencil of `v`; empty for an isolated vertex.
pub fn laplacian_stencil<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    v: VertexId<I>,
    mode: LaplacianMode,
) -> Stencil<I> {
    match mode {
        LaplacianMode::Uniform => uniform_stencil(mesh, v),
        LaplacianMode::Cotangent => cotangent_stencil(mesh, v),
    }
}

fn uniform_stencil<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> Stencil<I> {
    let mut stencil: Stencil<I> = mesh.vertex_neighbors(v).map(|n| (n, 1.0)).collect();
    let w = 1.0 / stencil.len().max(1) as f64;
    for entry in &mut stencil {
        entry.1 = w;
    }
    stencil
}

fn cotangent_stencil<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> Stencil<I> {
    let mut stencil: Stencil<I> = mesh
        .vertex_halfedges(v)
        .map(|he| (mesh.dest(he), edge_cotangent_weight(mesh, he)))
        .collect();

    let total: f64 = stencil.iter().map(|&(_, w)| w).sum();
    if !total.is_finite() || total.abs() < MIN_WEIGHT_SUM {
        return uniform_stencil(mesh, v);
    }
    for entry in &mut stencil {
        entry.1 /= total;
    }
    stencil
}

/// Cotangent weight of the edge of `he`.
///
/// The weight is (cot(α) + cot(β)) / 2 where α and β are the angles
/// opposite to the edge in the two adjacent triangles. Boundary edges only
/// have one term.
fn edge_cotangent_weight<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, he: HalfEdgeId<I>) -> f64 {
    let p0 = mesh.position(mesh.origin(he));
    let p1 = mesh.position(mesh.dest(he));
    let mut weight = 0.0;

    if !mesh.is_boundary_halfedge(he) {
        let opposite = mesh.position(mesh.dest(mesh.next(he)));
        weight += cotangent_angle(opposite, p0, p1);
    }

    let twin = mesh.twin(he);
    if !mesh.is_boundary_halfedge(twin) {
        let opposite = mesh.position(mesh.dest(mesh.next(twin)));
        weight += cotangent_angle(opposite, p1, p0);
    }

    weight * 0.5
}

/// Cotangent of the angle at `a` in triangle (a, b, c); zero when degenerate.
fn cotangent_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;

    let cross_norm = ab.cross(&ac).norm();
    if cross_norm < 1e-12 {
        return 0.0;
    }

    ab.dot(&ac) / cross_norm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_quads, build_from_triangles};

    fn weight_sum<I: MeshIndex>(stencil: &Stencil<I>) -> f64 {
        stencil.iter().map(|&(_, w)| w).sum()
    }

    /// Regular hexagon fan around vertex 0.
    fn hexagon_fan() -> HalfEdgeMesh {
        let mut vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        for k in 0..6 {
            let a = k as f64 * std::f64::consts::PI / 3.0;
            vertices.push(Point3::new(a.cos(), a.sin(), 0.0));
        }
        let faces: Vec<[usize; 3]> = (0..6).map(|k| [0, 1 + k, 1 + (k + 1) % 6]).collect();
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_uniform_weights() {
        let mesh = hexagon_fan();
        let stencil = laplacian_stencil(&mesh, VertexId::new(0), LaplacianMode::Uniform);
        assert_eq!(stencil.len(), 6);
        for &(_, w) in &stencil {
            assert!((w - 1.0 / 6.0).abs() < 1e-15);
        }
    }

    #[test]
    fn test_cotangent_weights_on_symmetric_fan() {
        let mesh = hexagon_fan();
        let stencil = laplacian_stencil(&mesh, VertexId::new(0), LaplacianMode::Cotangent);
        assert_eq!(stencil.len(), 6);
        assert!((weight_sum(&stencil) - 1.0).abs() < 1e-12);
        // Equilateral triangles: all weights equal.
        for &(_, w) in &stencil {
            assert!((w - 1.0 / 6.0).abs() < 1e-12);
        }

        // The center of a symmetric fan is already at its weighted average.
        let avg = stencil
            .iter()
            .fold(Point3::origin().coords, |acc, &(n, w)| acc + mesh.position(n).coords * w);
        assert!(avg.norm() < 1e-12);
    }

    #[test]
    fn test_cotangent_stencil_on_boundary_sums_to_one() {
        let mesh = hexagon_fan();
        let stencil = laplacian_stencil(&mesh, VertexId::new(1), LaplacianMode::Cotangent);
        assert_eq!(stencil.len(), 3);
        assert!((weight_sum(&stencil) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_isolated_vertex_has_empty_stencil() {
        let mut mesh = hexagon_fan();
        let lonely = mesh.add_vertex(Point3::new(5.0, 5.0, 5.0));
        assert!(laplacian_stencil(&mesh, lonely, LaplacianMode::Uniform).is_empty());
        assert!(laplacian_stencil(&mesh, lonely, LaplacianMode::Cotangent).is_empty());
    }

    #[test]
    fn test_cotangent_requires_triangles() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let quad: HalfEdgeMesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
        assert!(check_mode(&quad, LaplacianMode::Uniform).is_ok());
        assert!(matches!(
            check_mode(&quad, LaplacianMode::Cotangent),
            Err(MeshError::InvalidState(_))
        ));
        assert!(check_mode(&hexagon_fan(), LaplacianMode::Cotangent).is_ok());
    }
}
