//! STL (stereolithography) format support.
//!
//! STL stores independent triangles. Loading welds vertices with identical
//! coordinates; saving fan-triangulates polygons. Marked edges are not stored.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, to_triangles, HalfEdgeMesh, MeshIndex};

/// Load a mesh from an STL file.
///
/// Automatically detects binary vs ASCII format. Triangles that collapse to
/// fewer than three distinct vertices are skipped.
///
/// # Example
///
/// ```no_run
/// use crease::io::stl;
/// use crease::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = stl::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    // read_stl welds identical vertices into an indexed mesh
    let stl = stl_io::read_stl(&mut file).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let vertices: Vec<Point3<f64>> = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();

    let mut skipped = 0;
    let mut faces: Vec<[usize; 3]> = Vec::with_capacity(stl.faces.len());
    for tri in &stl.faces {
        let [i0, i1, i2] = tri.vertices;
        if i0 != i1 && i1 != i2 && i0 != i2 {
            faces.push([i0, i1, i2]);
        } else {
            skipped += 1;
        }
    }
    if skipped > 0 {
        log::warn!("{}: skipped {} degenerate triangles", path.display(), skipped);
    }

    if faces.is_empty() {
        return Err(MeshError::LoadError {
            path: path.to_path_buf(),
            message: "STL file contains no valid triangles".to_string(),
        });
    }

    build_from_triangles(&vertices, &faces)
}

/// Save a mesh to a binary STL file.
///
/// # Example
///
/// ```no_run
/// use crease::io::stl;
/// use crease::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = HalfEdgeMesh::new();
/// stl::save(&mesh, "output.stl").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (vertices, faces) = to_triangles(mesh);

    let triangles: Vec<stl_io::Triangle> = faces
        .iter()
        .map(|f| {
            let [p0, p1, p2] = f.map(|i| vertices[i]);
            let n = (p1 - p0)
                .cross(&(p2 - p0))
                .try_normalize(1e-300)
                .unwrap_or_else(Vector3::zeros);

            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [p0, p1, p2]
                    .map(|p| stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32])),
            }
        })
        .collect();

    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::test_util::temp_path;

    #[test]
    fn test_round_trip_welds_vertices() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();

        let path = temp_path("stl");
        save(&mesh, &path).unwrap();
        let loaded: HalfEdgeMesh = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_vertices(), 4);
        assert_eq!(loaded.num_faces(), 4);
        assert_eq!(loaded.num_edges(), 6);
        assert!(loaded.is_valid());
    }
}
