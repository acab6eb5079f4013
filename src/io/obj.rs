//! Wavefront OBJ format support.
//!
//! Reads `v` and `f` records (texture and normal indices are ignored, negative
//! indices count back from the last vertex). Polyline `l` records mark the
//! edges between consecutive vertices, which is how crease networks are
//! stored alongside the surface.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use super::mark_vertex_pairs;
use crate::error::{MeshError, Result};
use crate::mesh::{build_from_polygons, to_face_vertex, HalfEdgeMesh, MeshIndex};

#[derive(Debug, Default)]
struct ObjData {
    vertices: Vec<Point3<f64>>,
    faces: Vec<Vec<usize>>,
    lines: Vec<(usize, usize)>,
}

/// Load a mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use crease::io::obj;
/// use crease::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = obj::load("model.obj").unwrap();
/// println!("{} marked edges", mesh.num_marked_edges());
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let data = parse(BufReader::new(file)).map_err(|message| MeshError::LoadError {
        path: path.to_path_buf(),
        message,
    })?;

    if data.faces.is_empty() {
        return Err(MeshError::LoadError {
            path: path.to_path_buf(),
            message: "OBJ file contains no faces".to_string(),
        });
    }

    let mut mesh = build_from_polygons(&data.vertices, &data.faces)?;
    let marked = mark_vertex_pairs(&mut mesh, &data.lines, path);
    log::debug!(
        "{}: {} vertices, {} faces, {} marked edges",
        path.display(),
        mesh.num_vertices(),
        mesh.num_faces(),
        marked
    );
    Ok(mesh)
}

/// Save a mesh to an OBJ file, writing each marked edge as an `l` record.
///
/// # Example
///
/// ```no_run
/// use crease::io::obj;
/// use crease::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = HalfEdgeMesh::new();
/// obj::save(&mesh, "output.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn write<W: Write, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, w: &mut W) -> std::io::Result<()> {
    let (vertices, faces) = to_face_vertex(mesh);

    writeln!(w, "# crease")?;
    for v in &vertices {
        writeln!(w, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for f in &faces {
        write!(w, "f")?;
        for &i in f {
            write!(w, " {}", i + 1)?;
        }
        writeln!(w)?;
    }
    for e in mesh.edge_ids().filter(|&e| mesh.is_marked(e)) {
        let [a, b] = mesh.edge_vertices(e);
        writeln!(w, "l {} {}", a.index() + 1, b.index() + 1)?;
    }
    Ok(())
}

fn parse<R: BufRead>(reader: R) -> std::result::Result<ObjData, String> {
    let mut data = ObjData::default();

    for (n, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| e.to_string())?;
        let line_no = n + 1;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let mut coords = [0.0; 3];
                for c in &mut coords {
                    *c = tokens
                        .next()
                        .and_then(|t| t.parse::<f64>().ok())
                        .ok_or_else(|| format!("line {}: malformed vertex", line_no))?;
                }
                data.vertices.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let face = tokens
                    .map(|t| resolve_index(t, data.vertices.len(), line_no))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                if face.len() < 3 {
                    return Err(format!("line {}: face with fewer than 3 vertices", line_no));
                }
                data.faces.push(face);
            }
            Some("l") => {
                let polyline = tokens
                    .map(|t| resolve_index(t, data.vertices.len(), line_no))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                data.lines
                    .extend(polyline.windows(2).map(|pair| (pair[0], pair[1])));
            }
            _ => {}
        }
    }

    Ok(data)
}

/// Zero-based vertex index of a `v`, `v/vt` or `v/vt/vn` token.
fn resolve_index(
    token: &str,
    num_vertices: usize,
    line_no: usize,
) -> std::result::Result<usize, String> {
    let raw = token.split('/').next().unwrap_or(token);
    let index: i64 = raw
        .parse()
        .map_err(|_| format!("line {}: bad vertex index '{}'", line_no, token))?;

    let resolved = if index > 0 {
        index - 1
    } else {
        num_vertices as i64 + index
    };
    if index == 0 || resolved < 0 {
        return Err(format!("line {}: vertex index {} out of range", line_no, index));
    }
    Ok(resolved as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::VertexId;

    const SQUARE: &str = "\
# two quads sharing an edge
v 0 0 0
v 1 0 0
v 2 0 0
v 0 1 0
v 1 1 0
v 2 1 0
vn 0 0 1
f 1//1 2//1 5//1 4//1
f 2 3 6 5
l 1 2 3
";

    #[test]
    fn test_parse() {
        let data = parse(SQUARE.as_bytes()).unwrap();
        assert_eq!(data.vertices.len(), 6);
        assert_eq!(data.faces, vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4]]);
        assert_eq!(data.lines, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_negative_indices() {
        let data = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n".as_bytes()).unwrap();
        assert_eq!(data.faces, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_malformed_input() {
        assert!(parse("v 0 0\n".as_bytes()).is_err());
        assert!(parse("v 0 0 0\nf 1 2\n".as_bytes()).is_err());
        assert!(parse("v 0 0 0\nf 0 1 1\n".as_bytes()).is_err());
        assert!(parse("v 0 0 0\nf -4 1 1\n".as_bytes()).is_err());
    }

    #[test]
    fn test_load_marks_polyline_edges() {
        let path = super::super::test_util::temp_path("obj");
        std::fs::write(&path, SQUARE).unwrap();
        let mesh: HalfEdgeMesh = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_marked_edges(), 2);
        let e = mesh.find_edge(VertexId::new(1), VertexId::new(2)).unwrap();
        assert!(mesh.is_marked(e));
    }

    #[test]
    fn test_write_lists_marked_edges() {
        let data = parse(SQUARE.as_bytes()).unwrap();
        let mut mesh: HalfEdgeMesh = build_from_polygons(&data.vertices, &data.faces).unwrap();
        mark_vertex_pairs(&mut mesh, &data.lines, Path::new("square.obj"));

        let mut out = Vec::new();
        write(&mesh, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("f 1 2 5 4"));
        assert_eq!(text.lines().filter(|l| l.starts_with("l ")).count(), 2);

        let reparsed = parse(text.as_bytes()).unwrap();
        assert_eq!(reparsed.faces, data.faces);
        assert_eq!(reparsed.lines.len(), 2);
    }
}
