//! Assembly of the per-iteration least-squares system.
//!
//! Unknowns are laid out as three coordinate blocks followed by one column
//! per feature vertex:
//!
//! ```text
//! [ x_0 .. x_{n-1} | y_0 .. y_{n-1} | z_0 .. z_{n-1} | t_0 .. t_{k-1} ]
//! ```
//!
//! Rows start with the Laplacian block (row `c * n + v` for coordinate `c` of
//! vertex `v`), followed by the constraint rows of every vertex in ascending
//! vertex order:
//!
//! | kind    | rows                              | weight      |
//! |---------|-----------------------------------|-------------|
//! | regular | `n_f . x = n_f . p` per face `f`  | `w_regular` |
//! | feature | `x_c - t d_c = p_c`, then `t = 0` | `w_feature`, 1 |
//! | corner  | `x_c = p_c`                       | `w_corner`  |
//!
//! Assembly runs in two passes. [`SystemLayout::build`] walks the vertices once
//! to size every block and hand out feature columns; the fill pass then
//! writes each vertex's rows independently at its precomputed offset.

use std::ops::Range;

use nalgebra::{DVector, Vector3};
use rayon::prelude::*;
use smallvec::SmallVec;

use super::classify::VertexLabel;
use super::laplacian::{laplacian_stencil, LaplacianMode};
use super::SmootherOptions;
use crate::algo::Diagnostic;
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

/// Tangent line of a feature vertex for one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureFrame {
    /// Unit direction of the crease at the vertex, or zero when degenerate.
    pub direction: Vector3<f64>,
    /// Column of the sliding parameter `t`.
    pub column: usize,
}

/// Per-iteration role of a vertex, carrying the data its constraint needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VertexKind {
    /// Held near the tangent planes of its faces.
    Regular,
    /// Slides along the crease tangent.
    Feature(FeatureFrame),
    /// Held in place.
    Corner,
}

/// One coefficient of the sparse system matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemEntry {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
    /// Coefficient.
    pub value: f64,
}

impl SystemEntry {
    #[inline]
    fn new(row: usize, col: usize, value: f64) -> Self {
        Self { row, col, value }
    }
}

/// An overdetermined weighted least-squares system `min sum_r w_r (A x - b)_r^2`.
#[derive(Debug, Clone, Default)]
pub struct LinearSystem {
    /// Smoothing iteration the system belongs to.
    pub iteration: usize,
    /// Number of unknowns.
    pub num_cols: usize,
    /// Sparse coefficients of `A`; duplicates are summed.
    pub entries: Vec<SystemEntry>,
    /// One weight per row.
    pub weights: Vec<f64>,
    /// One right-hand side value per row.
    pub rhs: Vec<f64>,
}

impl LinearSystem {
    /// Number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rhs.len()
    }
}

/// Row and column layout of one iteration's system.
#[derive(Debug, Clone)]
pub struct SystemLayout {
    kinds: Vec<VertexKind>,
    /// `row_starts[v]..row_starts[v + 1]` are the constraint rows of `v`.
    row_starts: Vec<usize>,
    num_features: usize,
}

impl SystemLayout {
    /// Counting pass: size every constraint block and assign feature columns.
    ///
    /// Degenerate crease tangents are appended to `diagnostics`.
    ///
    /// # Errors
    ///
    /// [`MeshError::InternalInvariant`] if `labels` does not match the mesh,
    /// or a feature vertex no longer has exactly two marked edges.
    pub fn build<I: MeshIndex>(
        mesh: &HalfEdgeMesh<I>,
        labels: &[VertexLabel],
        iteration: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Self> {
        let nv = mesh.num_vertices();
        if labels.len() != nv {
            return Err(MeshError::InternalInvariant(format!(
                "{} labels for {} vertices",
                labels.len(),
                nv
            )));
        }

        let mut kinds = Vec::with_capacity(nv);
        let mut row_starts = Vec::with_capacity(nv + 1);
        let mut row = 3 * nv;
        let mut num_features = 0;

        for (v, label) in mesh.vertex_ids().zip(labels) {
            row_starts.push(row);
            let kind = match label {
                VertexLabel::Regular => {
                    row += mesh.vertex_faces(v).count();
                    VertexKind::Regular
                }
                VertexLabel::Feature => {
                    let direction = crease_tangent(mesh, v)?;
                    if direction == Vector3::zeros() {
                        diagnostics.push(Diagnostic::DegenerateFeatureTangent {
                            iteration,
                            vertex: v.index(),
                        });
                    }
                    let column = 3 * nv + num_features;
                    num_features += 1;
                    row += 4;
                    VertexKind::Feature(FeatureFrame { direction, column })
                }
                VertexLabel::Corner => {
                    row += 3;
                    VertexKind::Corner
                }
            };
            kinds.push(kind);
        }
        row_starts.push(row);

        Ok(Self {
            kinds,
            row_starts,
            num_features,
        })
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.kinds.len()
    }

    /// Number of feature vertices, and thus of sliding parameters.
    #[inline]
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Total number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.row_starts.last().copied().unwrap_or(0)
    }

    /// Total number of unknowns.
    #[inline]
    pub fn num_cols(&self) -> usize {
        3 * self.num_vertices() + self.num_features
    }

    /// Kind of vertex `v` in this iteration.
    #[inline]
    pub fn kind(&self, v: usize) -> &VertexKind {
        &self.kinds[v]
    }

    /// Kinds of all vertices, in vertex order.
    pub fn kinds(&self) -> &[VertexKind] {
        &self.kinds
    }

    /// Constraint rows owned by vertex `v`.
    #[inline]
    pub fn constraint_rows(&self, v: usize) -> Range<usize> {
        self.row_starts[v]..self.row_starts[v + 1]
    }

    /// Column of coordinate `c` (0, 1, 2) of vertex `v`.
    #[inline]
    pub fn coordinate_column(&self, v: usize, c: usize) -> usize {
        c * self.num_vertices() + v
    }

    /// Solution vector matching the current geometry: positions in the
    /// coordinate blocks and zero sliding parameters.
    pub fn initial_guess<I: MeshIndex>(&self, mesh: &HalfEdgeMesh<I>) -> DVector<f64> {
        let mut x = DVector::zeros(self.num_cols());
        for v in mesh.vertex_ids() {
            let p = mesh.position(v);
            for c in 0..3 {
                x[self.coordinate_column(v.index(), c)] = p[c];
            }
        }
        x
    }
}

/// Unit crease tangent at a feature vertex, from its two crease neighbours.
///
/// Returns the zero vector when the neighbours coincide.
fn crease_tangent<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> Result<Vector3<f64>> {
    let ends: SmallVec<[VertexId<I>; 2]> = mesh
        .vertex_edges(v)
        .filter(|&e| mesh.is_marked(e))
        .map(|e| mesh.opposite_vertex(e, v))
        .collect();

    if ends.len() != 2 {
        return Err(MeshError::InternalInvariant(format!(
            "feature vertex {} has {} marked edges",
            v.index(),
            ends.len()
        )));
    }

    let d = mesh.position(ends[0]) - mesh.position(ends[1]);
    Ok(d.try_normalize(f64::MIN_POSITIVE).unwrap_or_else(Vector3::zeros))
}

/// Rows written for one vertex by the fill pass.
#[derive(Debug, Default)]
struct RowBlock {
    entries: Vec<SystemEntry>,
    weights: Vec<f64>,
    rhs: Vec<f64>,
    diagnostics: Vec<Diagnostic>,
}

impl RowBlock {
    fn push_row(&mut self, row: usize, coefficients: &[(usize, f64)], weight: f64, rhs: f64) {
        self.entries
            .extend(coefficients.iter().map(|&(col, value)| SystemEntry::new(row, col, value)));
        self.weights.push(weight);
        self.rhs.push(rhs);
    }
}

/// Assembled system of one iteration.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// Layout the system was built with; needed to read the solution back.
    pub layout: SystemLayout,
    /// The weighted least-squares system.
    pub system: LinearSystem,
    /// Degeneracies found while assembling, in vertex order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Assemble the least-squares system for the current mesh geometry.
///
/// # Errors
///
/// [`MeshError::InternalInvariant`] if the labels are inconsistent with the
/// marked edges, or if the fill pass does not produce the rows the counting
/// pass reserved.
pub fn assemble_system<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    labels: &[VertexLabel],
    options: &SmootherOptions,
    iteration: usize,
) -> Result<Assembly> {
    let mut diagnostics = Vec::new();
    let layout = SystemLayout::build(mesh, labels, iteration, &mut diagnostics)?;
    let nv = layout.num_vertices();
    let num_rows = layout.num_rows();

    let mut system = LinearSystem {
        iteration,
        num_cols: layout.num_cols(),
        entries: Vec::new(),
        weights: Vec::with_capacity(num_rows),
        rhs: Vec::with_capacity(num_rows),
    };

    // Laplacian block
    let laplacian: Vec<Vec<SystemEntry>> = if options.parallel {
        (0..nv)
            .into_par_iter()
            .map(|i| laplacian_entries(mesh, VertexId::new(i), options.laplacian_mode))
            .collect()
    } else {
        (0..nv)
            .map(|i| laplacian_entries(mesh, VertexId::new(i), options.laplacian_mode))
            .collect()
    };
    system.entries = laplacian.into_iter().flatten().collect();
    system.weights.resize(3 * nv, options.w_laplace);
    system.rhs.resize(3 * nv, 0.0);

    // Constraint blocks
    let blocks: Vec<RowBlock> = if options.parallel {
        (0..nv)
            .into_par_iter()
            .map(|i| fill_constraint_rows(mesh, &layout, VertexId::new(i), options, iteration))
            .collect()
    } else {
        (0..nv)
            .map(|i| fill_constraint_rows(mesh, &layout, VertexId::new(i), options, iteration))
            .collect()
    };

    for (v, block) in blocks.into_iter().enumerate() {
        let expected = layout.constraint_rows(v);
        if block.rhs.len() != expected.len() || system.rhs.len() != expected.start {
            return Err(MeshError::InternalInvariant(format!(
                "vertex {} wrote {} rows at {}, expected {:?}",
                v,
                block.rhs.len(),
                system.rhs.len(),
                expected
            )));
        }
        system.entries.extend(block.entries);
        system.weights.extend(block.weights);
        system.rhs.extend(block.rhs);
        diagnostics.extend(block.diagnostics);
    }

    if system.rhs.len() != num_rows {
        return Err(MeshError::InternalInvariant(format!(
            "assembled {} rows, layout has {}",
            system.rhs.len(),
            num_rows
        )));
    }

    log::trace!(
        "iteration {}: {} rows, {} columns, {} entries, {} feature vertices",
        iteration,
        num_rows,
        system.num_cols,
        system.entries.len(),
        layout.num_features()
    );

    Ok(Assembly {
        layout,
        system,
        diagnostics,
    })
}

/// The three Laplacian rows of `v`: `sum_j w_j x_j - x_v = 0` per coordinate.
fn laplacian_entries<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    v: VertexId<I>,
    mode: LaplacianMode,
) -> Vec<SystemEntry> {
    let stencil = laplacian_stencil(mesh, v, mode);
    if stencil.is_empty() {
        return Vec::new();
    }

    let nv = mesh.num_vertices();
    let mut entries = Vec::with_capacity(3 * (stencil.len() + 1));
    for c in 0..3 {
        let row = c * nv + v.index();
        entries.push(SystemEntry::new(row, row, -1.0));
        for &(j, w) in &stencil {
            entries.push(SystemEntry::new(row, c * nv + j.index(), w));
        }
    }
    entries
}

/// Constraint rows of one vertex, starting at its reserved offset.
fn fill_constraint_rows<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    layout: &SystemLayout,
    v: VertexId<I>,
    options: &SmootherOptions,
    iteration: usize,
) -> RowBlock {
    let vi = v.index();
    let p = mesh.position(v);
    let [cx, cy, cz] = [0, 1, 2].map(|c| layout.coordinate_column(vi, c));
    let mut row = layout.constraint_rows(vi).start;
    let mut block = RowBlock::default();

    match layout.kind(vi) {
        VertexKind::Regular => {
            for f in mesh.vertex_faces(v) {
                let n = mesh.face_normal(f);
                if n == Vector3::zeros() {
                    block.diagnostics.push(Diagnostic::ZeroLengthFaceNormal {
                        iteration,
                        vertex: vi,
                        face: f.index(),
                    });
                }
                block.push_row(
                    row,
                    &[(cx, n.x), (cy, n.y), (cz, n.z)],
                    options.w_regular,
                    n.dot(&p.coords),
                );
                row += 1;
            }
        }
        VertexKind::Feature(frame) => {
            for (c, col) in [cx, cy, cz].into_iter().enumerate() {
                block.push_row(
                    row,
                    &[(col, 1.0), (frame.column, -frame.direction[c])],
                    options.w_feature,
                    p[c],
                );
                row += 1;
            }
            block.push_row(row, &[(frame.column, 1.0)], 1.0, 0.0);
        }
        VertexKind::Corner => {
            for (c, col) in [cx, cy, cz].into_iter().enumerate() {
                block.push_row(row, &[(col, 1.0)], options.w_corner, p[c]);
                row += 1;
            }
        }
    }

    block
}
