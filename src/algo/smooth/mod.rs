//! Feature-preserving mesh smoothing.
//!
//! Vertices are smoothed by a weighted least-squares solve per iteration,
//! balancing a Laplacian fairing term against constraints that keep the shape:
//!
//! - **Regular** vertices (no incident marked edge) stay in the tangent
//!   planes of their incident faces.
//! - **Feature** vertices (exactly two incident marked edges) slide along the
//!   crease line through their two crease neighbours.
//! - **Corner** vertices (any other number of marked edges) are softly pinned.
//!
//! Labels are computed once per call from the marked edges. Every iteration
//! then assembles the system from the current positions, solves it and writes
//! the result back, optionally snapping vertices onto a reference surface and
//! onto the initial crease network.
//!
//! # Example
//!
//! ```
//! use crease::prelude::*;
//! use crease::algo::features::mark_sharp_edges;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//!     Point3::new(1.0, 0.0, 1.0),
//!     Point3::new(1.0, 1.0, 1.0),
//!     Point3::new(0.0, 1.0, 1.0),
//! ];
//! let faces = vec![
//!     [0, 3, 2, 1],
//!     [4, 5, 6, 7],
//!     [0, 1, 5, 4],
//!     [2, 3, 7, 6],
//!     [0, 4, 7, 3],
//!     [1, 2, 6, 5],
//! ];
//! let mut cube: HalfEdgeMesh = build_from_quads(&vertices, &faces).unwrap();
//! assert_eq!(mark_sharp_edges(&mut cube, 30.0), 12);
//!
//! let target = cube.clone();
//! let options = SmootherOptions::default().with_iterations(2);
//! feature_preserving_smooth(&mut cube, &target, &options).unwrap();
//! ```

pub mod assemble;
pub mod classify;
pub mod laplacian;
pub mod reproject;
pub mod solve;

pub use assemble::{
    assemble_system, Assembly, FeatureFrame, LinearSystem, SystemEntry, SystemLayout, VertexKind,
};
pub use classify::{classify_vertices, label_counts, marked_valence, VertexLabel};
pub use laplacian::{laplacian_stencil, LaplacianMode};
pub use reproject::{apply_solution, reconstruct_position, ReprojectionTargets};
pub use solve::{solve_weighted_least_squares, NormalEquations, SolverOptions};

use super::{Diagnostics, Progress};
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Options for [`feature_preserving_smooth`].
#[derive(Debug, Clone, PartialEq)]
pub struct SmootherOptions {
    /// Weighting of the Laplacian fairing term.
    pub laplacian_mode: LaplacianMode,

    /// Weight of the Laplacian rows.
    ///
    /// Stencils are normalised to sum to one, so a row has diagonal `-1`
    /// instead of `-valence`. Relative to the constraint rows this weight
    /// is about `valence^2` weaker than with an unnormalised graph
    /// Laplacian; scale it up accordingly when porting weights.
    pub w_laplace: f64,

    /// Weight of the tangent-plane rows of regular vertices.
    pub w_regular: f64,

    /// Weight of the tangent-line rows of feature vertices.
    pub w_feature: f64,

    /// Weight of the pin rows of corner vertices.
    pub w_corner: f64,

    /// Number of smoothing iterations; zero leaves the mesh untouched.
    pub iterations: usize,

    /// Snap vertices back onto the target surface and the initial creases
    /// after every iteration.
    pub reproject_on_target: bool,

    /// Settings of the least-squares solver.
    pub solver: SolverOptions,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for SmootherOptions {
    fn default() -> Self {
        Self {
            laplacian_mode: LaplacianMode::Uniform,
            w_laplace: 0.01,
            w_regular: 1.0,
            w_feature: 1.0,
            w_corner: 1.0,
            iterations: 10,
            reproject_on_target: true,
            solver: SolverOptions::default(),
            parallel: true,
        }
    }
}

impl SmootherOptions {
    /// Set the Laplacian weighting scheme.
    pub fn with_laplacian_mode(mut self, mode: LaplacianMode) -> Self {
        self.laplacian_mode = mode;
        self
    }

    /// Set all four term weights at once.
    pub fn with_weights(mut self, laplace: f64, regular: f64, feature: f64, corner: f64) -> Self {
        self.w_laplace = laplace;
        self.w_regular = regular;
        self.w_feature = feature;
        self.w_corner = corner;
        self
    }

    /// Set the Laplacian weight.
    pub fn with_w_laplace(mut self, w: f64) -> Self {
        self.w_laplace = w;
        self
    }

    /// Set the regular-vertex weight.
    pub fn with_w_regular(mut self, w: f64) -> Self {
        self.w_regular = w;
        self
    }

    /// Set the feature-vertex weight.
    pub fn with_w_feature(mut self, w: f64) -> Self {
        self.w_feature = w;
        self
    }

    /// Set the corner-vertex weight.
    pub fn with_w_corner(mut self, w: f64) -> Self {
        self.w_corner = w;
        self
    }

    /// Set the number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Enable or disable reprojection onto the target.
    pub fn with_reprojection(mut self, reproject: bool) -> Self {
        self.reproject_on_target = reproject;
        self
    }

    /// Set the solver options.
    pub fn with_solver(mut self, solver: SolverOptions) -> Self {
        self.solver = solver;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check the weights and solver settings.
    ///
    /// # Errors
    ///
    /// [`MeshError::InvalidParameter`] for a negative or non-finite weight,
    /// or a solver tolerance that is not a positive finite number.
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("w_laplace", self.w_laplace),
            ("w_regular", self.w_regular),
            ("w_feature", self.w_feature),
            ("w_corner", self.w_corner),
        ];
        for (name, w) in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(MeshError::invalid_param(
                    name,
                    w,
                    "must be a finite non-negative number",
                ));
            }
        }
        let tol = self.solver.tolerance;
        if !tol.is_finite() || tol <= 0.0 {
            return Err(MeshError::invalid_param(
                "tolerance",
                tol,
                "must be a finite positive number",
            ));
        }
        Ok(())
    }
}

/// Smooth `mesh` in place while preserving its marked creases.
///
/// `target` is the surface regular and corner vertices are snapped back onto
/// when [`SmootherOptions::reproject_on_target`] is set; it is ignored
/// otherwise. Feature vertices snap onto the edges that are marked in `mesh`
/// when the call starts. Tangent planes come from the stored face normals,
/// which are read but never rewritten; call
/// [`HalfEdgeMesh::update_face_normals`] between calls to refresh them.
///
/// # Errors
///
/// - [`MeshError::InvalidParameter`] for invalid weights, before any work
/// - [`MeshError::InvalidState`] for cotangent weights on a non-triangle mesh
/// - [`MeshError::EmptyMesh`] if at least one iteration with reprojection is
///   requested onto a target without faces
/// - [`MeshError::SolverFailed`] if an iteration cannot be solved; the mesh
///   keeps the positions of the last completed iteration
/// - [`MeshError::InternalInvariant`] if assembly detects an inconsistency
///
/// Degenerate geometry is not an error; it is reported through the default
/// [`Diagnostics`] sink, which logs at `warn` level.
pub fn feature_preserving_smooth<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    target: &HalfEdgeMesh<I>,
    options: &SmootherOptions,
) -> Result<()> {
    smooth_impl(mesh, target, options, None, &Diagnostics::default())
}

/// [`feature_preserving_smooth`] with progress reporting, one step per
/// iteration and a final report with `current == total`.
pub fn feature_preserving_smooth_with_progress<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    target: &HalfEdgeMesh<I>,
    options: &SmootherOptions,
    progress: &Progress,
) -> Result<()> {
    smooth_impl(mesh, target, options, Some(progress), &Diagnostics::default())
}

/// [`feature_preserving_smooth`] with a caller-provided diagnostics sink.
pub fn feature_preserving_smooth_with_diagnostics<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    target: &HalfEdgeMesh<I>,
    options: &SmootherOptions,
    diagnostics: &Diagnostics,
) -> Result<()> {
    smooth_impl(mesh, target, options, None, diagnostics)
}

/// Smooth `mesh` using its own starting geometry as the reprojection target.
pub fn feature_preserving_smooth_self<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &SmootherOptions,
) -> Result<()> {
    let target = if options.reproject_on_target {
        mesh.clone()
    } else {
        HalfEdgeMesh::new()
    };
    smooth_impl(mesh, &target, options, None, &Diagnostics::default())
}

fn smooth_impl<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    target: &HalfEdgeMesh<I>,
    options: &SmootherOptions,
    progress: Option<&Progress>,
    diagnostics: &Diagnostics,
) -> Result<()> {
    options.validate()?;
    laplacian::check_mode(mesh, options.laplacian_mode)?;

    if options.iterations == 0 {
        return Ok(());
    }

    let targets = if options.reproject_on_target {
        Some(ReprojectionTargets::build(mesh, target)?)
    } else {
        None
    };

    let labels = classify_vertices(mesh);
    let (regular, feature, corner) = label_counts(&labels);
    log::debug!(
        "smoothing {} vertices ({} regular, {} feature, {} corner) for {} iterations",
        labels.len(),
        regular,
        feature,
        corner,
        options.iterations
    );

    for iter in 0..options.iterations {
        if let Some(p) = progress {
            p.report(iter, options.iterations, "Feature-preserving smoothing");
        }

        let assembly = assemble_system(mesh, &labels, options, iter)?;
        for d in &assembly.diagnostics {
            diagnostics.emit(d);
        }

        let x0 = assembly.layout.initial_guess(mesh);
        let solution =
            solve_weighted_least_squares(&assembly.system, Some(&x0), &options.solver)?;

        apply_solution(
            mesh,
            &assembly.layout,
            &solution,
            targets.as_ref(),
            options.parallel,
        )?;

        log::debug!(
            "iteration {}/{}: {} rows, {} unknowns",
            iter + 1,
            options.iterations,
            assembly.system.num_rows(),
            assembly.system.num_cols
        );
    }

    if let Some(p) = progress {
        p.report(options.iterations, options.iterations, "Feature-preserving smoothing");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::features::{mark_boundary_edges, mark_sharp_edges};
    use crate::algo::Diagnostic;
    use crate::mesh::{build_from_polygons, build_from_quads, VertexId};
    use nalgebra::{Point3, Vector3};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn unit_cube() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces = [
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [2, 3, 7, 6],
            [0, 4, 7, 3],
            [1, 2, 6, 5],
        ];
        build_from_quads(&vertices, &faces).unwrap()
    }

    /// Cube `[0, n]^3` with every face split into an `n x n` quad grid.
    fn subdivided_cube(n: usize) -> HalfEdgeMesh {
        let mut index: HashMap<[usize; 3], usize> = HashMap::new();
        let mut vertices = Vec::new();
        let mut faces: Vec<[usize; 4]> = Vec::new();

        let mut vertex = |p: [usize; 3]| {
            *index.entry(p).or_insert_with(|| {
                vertices.push(Point3::new(p[0] as f64, p[1] as f64, p[2] as f64));
                vertices.len() - 1
            })
        };

        for axis in 0..3 {
            let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
            for side in [0, n] {
                for i in 0..n {
                    for j in 0..n {
                        let corner = |di: usize, dj: usize| {
                            let mut p = [0; 3];
                            p[axis] = side;
                            p[u] = i + di;
                            p[v] = j + dj;
                            p
                        };
                        let mut quad = [
                            vertex(corner(0, 0)),
                            vertex(corner(1, 0)),
                            vertex(corner(1, 1)),
                            vertex(corner(0, 1)),
                        ];
                        if side == 0 {
                            quad.reverse();
                        }
                        faces.push(quad);
                    }
                }
            }
        }

        build_from_quads(&vertices, &faces).unwrap()
    }

    /// `(n+1) x (n+1)` planar grid with vertex (i, j) at index `(n+1) j + i`.
    fn grid(n: usize) -> HalfEdgeMesh {
        let mut vertices = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        let mut faces = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                faces.push(vec![v00, v00 + 1, v00 + n + 2, v00 + n + 1]);
            }
        }
        build_from_polygons(&vertices, &faces).unwrap()
    }

    fn mark(mesh: &mut HalfEdgeMesh, a: usize, b: usize) {
        let e = mesh
            .find_edge(VertexId::new(a), VertexId::new(b))
            .unwrap();
        mesh.set_marked(e, true);
    }

    fn no_reprojection() -> SmootherOptions {
        SmootherOptions::default().with_reprojection(false)
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let mut mesh = subdivided_cube(3);
        mark_sharp_edges(&mut mesh, 30.0);
        let before = mesh.positions();

        let target = mesh.clone();
        let options = SmootherOptions::default().with_iterations(0);
        feature_preserving_smooth(&mut mesh, &target, &options).unwrap();

        assert_eq!(mesh.positions(), before);
    }

    #[test]
    fn test_zero_iterations_skip_target_checks() {
        let mut mesh = unit_cube();
        let before = mesh.positions();
        let options = SmootherOptions::default().with_iterations(0);
        feature_preserving_smooth(&mut mesh, &HalfEdgeMesh::new(), &options).unwrap();
        assert_eq!(mesh.positions(), before);
    }

    #[test]
    fn test_stored_normals_are_left_alone() {
        let mut mesh = grid(3);
        mark_boundary_edges(&mut mesh);
        let lifted = [(5, 0.15, -0.1, 0.3), (6, -0.1, 0.05, -0.2), (9, 0.05, 0.1, 0.25)];
        for (v, dx, dy, dz) in lifted {
            let p = *mesh.position(VertexId::new(v));
            mesh.set_position(VertexId::new(v), Point3::new(p.x + dx, p.y + dy, dz));
        }
        mesh.update_face_normals();
        let normals: Vec<_> = mesh.face_ids().map(|f| mesh.face_normal(f)).collect();
        let before = mesh.positions();

        let options = no_reprojection().with_iterations(2);
        feature_preserving_smooth(&mut mesh, &HalfEdgeMesh::new(), &options).unwrap();

        assert_ne!(mesh.positions(), before);
        for (f, n) in mesh.face_ids().zip(&normals) {
            assert_eq!(mesh.face_normal(f), *n);
        }
        // The geometry did change, so a refresh would have moved them.
        assert!(mesh
            .face_ids()
            .any(|f| mesh.compute_face_normal(f) != mesh.face_normal(f)));
    }

    #[test]
    fn test_cube_corners_stay_pinned() {
        let mut mesh = unit_cube();
        assert_eq!(mark_sharp_edges(&mut mesh, 30.0), 12);
        let labels = classify_vertices(&mesh);
        assert_eq!(label_counts(&labels), (0, 0, 8));
        let before = mesh.positions();

        let options = no_reprojection()
            .with_laplacian_mode(LaplacianMode::Uniform)
            .with_weights(0.1, 1.0, 1.0, 1e6)
            .with_iterations(3);
        feature_preserving_smooth(&mut mesh, &HalfEdgeMesh::new(), &options).unwrap();

        for (p, q) in mesh.positions().iter().zip(&before) {
            assert!((p - q).norm() < 1e-6, "corner moved from {} to {}", q, p);
        }
    }

    #[test]
    fn test_subdivided_cube_keeps_its_shape() {
        let mut mesh = subdivided_cube(3);
        assert_eq!(mark_sharp_edges(&mut mesh, 30.0), 36);
        let labels = classify_vertices(&mesh);
        assert_eq!(label_counts(&labels), (24, 24, 8));
        let before = mesh.positions();

        let options = no_reprojection()
            .with_weights(0.1, 1.0, 1.0, 1e6)
            .with_iterations(1);
        feature_preserving_smooth(&mut mesh, &HalfEdgeMesh::new(), &options).unwrap();

        for (i, label) in labels.iter().enumerate() {
            let old = before[i];
            let d = mesh.position(VertexId::new(i)) - old;
            let on_face = |c: usize| old[c] == 0.0 || old[c] == 3.0;
            match label {
                VertexLabel::Corner => assert!(d.norm() < 1e-6),
                // Slides along the one axis where it is not on a face.
                VertexLabel::Feature => {
                    for c in (0..3).filter(|&c| on_face(c)) {
                        assert!(d[c].abs() < 1e-12, "feature {} left its crease", i);
                    }
                }
                // Held softly to the plane of its cube face.
                VertexLabel::Regular => {
                    for c in (0..3).filter(|&c| on_face(c)) {
                        assert!(d[c].abs() < 0.05, "regular {} left its face", i);
                    }
                }
            }
        }
    }

    #[test]
    fn test_feature_moves_along_tangent() {
        let mut mesh = grid(3);
        // Crease along the row j = 1: 4 - 5 - 6 - 7.
        mark(&mut mesh, 4, 5);
        mark(&mut mesh, 5, 6);
        mark(&mut mesh, 6, 7);
        mesh.set_position(VertexId::new(5), Point3::new(1.3, 1.0, 0.0));
        mesh.update_face_normals();

        let start = *mesh.position(VertexId::new(5));
        let options = no_reprojection()
            .with_weights(1.0, 1.0, 1.0, 1.0)
            .with_iterations(1)
            .sequential();
        feature_preserving_smooth(&mut mesh, &HalfEdgeMesh::new(), &options).unwrap();

        let d = mesh.position(VertexId::new(5)) - start;
        assert!(d.norm() > 1e-6);
        assert!(d.cross(&Vector3::x()).norm() < 1e-12);
        // Pulled back towards the middle of its neighbours.
        assert!(d.x < 0.0);
    }

    #[test]
    fn test_planar_patch_stays_planar() {
        let mut mesh = grid(4);
        assert_eq!(mark_boundary_edges(&mut mesh), 16);
        let jitter = [(6, 0.2, -0.1), (7, -0.15, 0.1), (12, 0.1, 0.2), (18, -0.2, -0.1)];
        for (v, dx, dy) in jitter {
            let p = *mesh.position(VertexId::new(v));
            mesh.set_position(VertexId::new(v), Point3::new(p.x + dx, p.y + dy, 0.0));
        }
        mesh.update_face_normals();

        let options = no_reprojection().with_iterations(3);
        feature_preserving_smooth(&mut mesh, &HalfEdgeMesh::new(), &options).unwrap();

        for p in mesh.positions() {
            assert!(p.z.abs() < 1e-9);
        }
    }

    #[test]
    fn test_reprojection_onto_own_geometry() {
        let mut mesh = grid(3);
        mark_boundary_edges(&mut mesh);
        mesh.set_position(VertexId::new(5), Point3::new(1.2, 0.9, 0.0));
        mesh.update_face_normals();

        let options = SmootherOptions::default()
            .with_weights(1.0, 1.0, 1.0, 1.0)
            .with_iterations(2);
        feature_preserving_smooth_self(&mut mesh, &options).unwrap();

        for (i, p) in mesh.positions().iter().enumerate() {
            assert!(p.z.abs() < 1e-12);
            if mesh.is_boundary_vertex(VertexId::new(i)) {
                let gap = [p.x, p.x - 3.0, p.y, p.y - 3.0]
                    .iter()
                    .fold(f64::INFINITY, |m, g| m.min(g.abs()));
                assert!(gap < 1e-12, "boundary vertex {} left the boundary", i);
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut a = subdivided_cube(2);
        mark_sharp_edges(&mut a, 30.0);
        a.set_position(VertexId::new(0), Point3::new(0.1, -0.05, 0.0));
        a.update_face_normals();
        let mut b = a.clone();
        let target = a.clone();

        let options = SmootherOptions::default().with_iterations(2);
        feature_preserving_smooth(&mut a, &target, &options).unwrap();
        feature_preserving_smooth(&mut b, &target, &options.clone().sequential()).unwrap();

        for (p, q) in a.positions().iter().zip(b.positions().iter()) {
            assert!((p - q).norm() < 1e-12);
        }
    }

    #[test]
    fn test_invalid_weights_are_rejected() {
        let mut mesh = unit_cube();
        let before = mesh.positions();
        for options in [
            no_reprojection().with_w_laplace(-1.0),
            no_reprojection().with_w_regular(f64::NAN),
            no_reprojection().with_w_feature(f64::INFINITY),
            no_reprojection().with_w_corner(-0.5),
            no_reprojection().with_solver(SolverOptions::default().with_tolerance(0.0)),
        ] {
            let result = feature_preserving_smooth(&mut mesh, &HalfEdgeMesh::new(), &options);
            assert!(matches!(result, Err(MeshError::InvalidParameter { .. })));
        }
        assert_eq!(mesh.positions(), before);
    }

    #[test]
    fn test_cotangent_on_quads_is_rejected() {
        let mut mesh = unit_cube();
        let options = no_reprojection().with_laplacian_mode(LaplacianMode::Cotangent);
        assert!(matches!(
            feature_preserving_smooth(&mut mesh, &HalfEdgeMesh::new(), &options),
            Err(MeshError::InvalidState(_))
        ));
    }

    #[test]
    fn test_reprojection_needs_a_target() {
        let mut mesh = unit_cube();
        let options = SmootherOptions::default().with_reprojection(true);
        assert!(matches!(
            feature_preserving_smooth(&mut mesh, &HalfEdgeMesh::new(), &options),
            Err(MeshError::EmptyMesh)
        ));
    }

    #[test]
    fn test_diagnostics_reach_the_sink() {
        let mut mesh = grid(3);
        mark(&mut mesh, 4, 5);
        mark(&mut mesh, 5, 6);
        // Both crease neighbours of vertex 5 at the same point.
        mesh.set_position(VertexId::new(6), Point3::new(0.0, 1.0, 0.0));
        mesh.update_face_normals();

        let collected = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&collected);
        let diagnostics = Diagnostics::new(move |d: &Diagnostic| sink.lock().unwrap().push(*d));

        let options = no_reprojection().with_iterations(1);
        feature_preserving_smooth_with_diagnostics(
            &mut mesh,
            &HalfEdgeMesh::new(),
            &options,
            &diagnostics,
        )
        .unwrap();

        let collected = collected.lock().unwrap();
        assert!(collected.contains(&Diagnostic::DegenerateFeatureTangent {
            iteration: 0,
            vertex: 5
        }));
    }

    #[test]
    fn test_progress_reports_every_iteration() {
        let mut mesh = unit_cube();
        mark_sharp_edges(&mut mesh, 30.0);

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let progress = Progress::new(move |current, total, _| {
            assert_eq!(total, 4);
            assert_eq!(current, counter.fetch_add(1, Ordering::SeqCst));
        });

        let options = no_reprojection().with_iterations(4);
        feature_preserving_smooth_with_progress(&mut mesh, &HalfEdgeMesh::new(), &options, &progress)
            .unwrap();
        // One report per iteration plus the final one.
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_u16_indices() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mut mesh: HalfEdgeMesh<u16> =
            build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
        mark_boundary_edges(&mut mesh);
        let options = no_reprojection().with_iterations(2);
        feature_preserving_smooth_self(&mut mesh, &options).unwrap();
        for p in mesh.positions() {
            assert!(p.z.abs() < 1e-12);
        }
    }
}
