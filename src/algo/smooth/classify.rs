//! Vertex labelling from the crease network.

use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

/// Role of a vertex with respect to the marked edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexLabel {
    /// No incident marked edge; free to slide in its tangent plane.
    Regular,
    /// Exactly two incident marked edges; slides along the crease.
    Feature,
    /// Any other number of incident marked edges; held in place.
    Corner,
}

impl VertexLabel {
    /// Label for a vertex with `marked` incident marked edges.
    ///
    /// A dangling crease end (one edge) and junctions of three or more
    /// creases are both corners.
    pub fn from_marked_count(marked: usize) -> Self {
        match marked {
            0 => VertexLabel::Regular,
            2 => VertexLabel::Feature,
            _ => VertexLabel::Corner,
        }
    }
}

/// Number of marked edges incident to `v`.
pub fn marked_valence<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> usize {
    mesh.vertex_edges(v).filter(|&e| mesh.is_marked(e)).count()
}

/// Label every vertex from the marked edges around it.
///
/// # Example
///
/// ```
/// use crease::prelude::*;
/// use crease::algo::smooth::{classify_vertices, VertexLabel};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mut mesh: HalfEdgeMesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
/// let e = mesh.find_edge(VertexId::new(0), VertexId::new(1)).unwrap();
/// mesh.set_marked(e, true);
///
/// let labels = classify_vertices(&mesh);
/// assert_eq!(labels[0], VertexLabel::Corner);
/// assert_eq!(labels[2], VertexLabel::Regular);
/// ```
pub fn classify_vertices<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Vec<VertexLabel> {
    mesh.vertex_ids()
        .map(|v| VertexLabel::from_marked_count(marked_valence(mesh, v)))
        .collect()
}

/// Count of each label, as `(regular, feature, corner)`.
pub fn label_counts(labels: &[VertexLabel]) -> (usize, usize, usize) {
    labels.iter().fold((0, 0, 0), |(r, f, c), label| match label {
        VertexLabel::Regular => (r + 1, f, c),
        VertexLabel::Feature => (r, f + 1, c),
        VertexLabel::Corner => (r, f, c + 1),
    })
}
