//! Mesh file I/O.
//!
//! This module provides functions for loading and saving meshes in various formats.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Marked edges |
//! |--------|-----------|------|------|--------------|
//! | Wavefront OBJ | `.obj` | ✓ | ✓ | `l` elements |
//! | PLY | `.ply` | ✓ | ✓ | `edge` element |
//! | STL | `.stl` | ✓ | ✓ | ✗ |
//!
//! OBJ and PLY keep polygons as they are; STL is triangles only, so polygons
//! are fan-triangulated on save.
//!
//! # Usage
//!
//! ```no_run
//! use crease::io::{load, save};
//! use crease::mesh::HalfEdgeMesh;
//!
//! // Load with automatic format detection
//! let mesh: HalfEdgeMesh = load("model.obj").unwrap();
//!
//! // Save with automatic format detection
//! save(&mesh, "output.ply").unwrap();
//! ```

pub mod obj;
pub mod ply;
pub mod stl;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ format.
    Obj,
    /// STL (stereolithography) format.
    Stl,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            "stl" => Some(Format::Stl),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    /// Whether the format can store marked edges.
    pub fn stores_marked_edges(self) -> bool {
        matches!(self, Format::Obj | Format::Ply)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file with automatic format detection.
///
/// The format is determined by the file extension.
///
/// # Example
///
/// ```no_run
/// use crease::io::load;
/// use crease::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Obj => obj::load(path),
        Format::Stl => stl::load(path),
        Format::Ply => ply::load(path),
    }
}

/// Save a mesh to a file with automatic format detection.
///
/// The format is determined by the file extension. Marked edges are lost
/// when saving to STL.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let format = detect(path)?;
    if !format.stores_marked_edges() && mesh.num_marked_edges() > 0 {
        log::warn!(
            "{} marked edges are not stored in {}",
            mesh.num_marked_edges(),
            path.display()
        );
    }
    match format {
        Format::Obj => obj::save(mesh, path),
        Format::Stl => stl::save(mesh, path),
        Format::Ply => ply::save(mesh, path),
    }
}

/// Mark the edges listed as vertex pairs; pairs that are not mesh edges are
/// skipped with a warning. Returns the number of edges marked.
pub(crate) fn mark_vertex_pairs<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    pairs: &[(usize, usize)],
    path: &Path,
) -> usize {
    let nv = mesh.num_vertices();
    let mut marked = 0;
    for &(a, b) in pairs {
        let edge = if a < nv && b < nv {
            mesh.find_edge(VertexId::new(a), VertexId::new(b))
        } else {
            None
        };
        match edge {
            Some(e) => {
                if !mesh.is_marked(e) {
                    mesh.set_marked(e, true);
                    marked += 1;
                }
            }
            None => log::warn!(
                "{}: marked edge ({}, {}) is not an edge of the mesh",
                path.display(),
                a,
                b
            ),
        }
    }
    marked
}
