//! PLY (Stanford polygon) format support.
//!
//! Faces are read as polygons of any degree. Marked edges travel in an
//! optional `edge` element with `vertex1` and `vertex2` properties.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use super::mark_vertex_pairs;
use crate::error::{MeshError, Result};
use crate::mesh::{build_from_polygons, to_face_vertex, HalfEdgeMesh, MeshIndex};

/// Load a mesh from a PLY file.
///
/// # Example
///
/// ```no_run
/// use crease::io::ply;
/// use crease::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = ply::load("model.ply").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let load_error = |message: &str| MeshError::LoadError {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| load_error(&e.to_string()))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error("PLY file has no vertex element"))?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let coord = |name: &str| {
            get_float_property(vertex, name)
                .ok_or_else(|| load_error(&format!("vertex missing {} coordinate", name)))
        };
        vertices.push(Point3::new(coord("x")?, coord("y")?, coord("z")?));
    }

    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| load_error("PLY file has no face element"))?;

    let mut faces: Vec<Vec<usize>> = Vec::with_capacity(face_element.len());
    for face in face_element {
        let indices = get_list_property(face, "vertex_indices")
            .or_else(|| get_list_property(face, "vertex_index"))
            .ok_or_else(|| load_error("face missing vertex_indices property"))?;
        faces.push(indices);
    }

    if faces.is_empty() {
        return Err(load_error("PLY file contains no faces"));
    }

    let mut pairs = Vec::new();
    if let Some(edge_element) = ply.payload.get("edge") {
        for edge in edge_element {
            match (
                get_index_property(edge, "vertex1"),
                get_index_property(edge, "vertex2"),
            ) {
                (Some(a), Some(b)) => pairs.push((a, b)),
                _ => return Err(load_error("edge missing vertex1/vertex2 property")),
            }
        }
    }

    let mut mesh = build_from_polygons(&vertices, &faces)?;
    let marked = mark_vertex_pairs(&mut mesh, &pairs, path);
    log::debug!(
        "{}: {} vertices, {} faces, {} marked edges",
        path.display(),
        mesh.num_vertices(),
        mesh.num_faces(),
        marked
    );
    Ok(mesh)
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_index_property(element: &DefaultElement, name: &str) -> Option<usize> {
    match element.get(name)? {
        Property::Int(v) if *v >= 0 => Some(*v as usize),
        Property::UInt(v) => Some(*v as usize),
        Property::Short(v) if *v >= 0 => Some(*v as usize),
        Property::UShort(v) => Some(*v as usize),
        Property::UChar(v) => Some(*v as usize),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}

/// Save a mesh to a PLY file (ASCII format).
///
/// The `edge` element is only written when the mesh has marked edges.
///
/// # Example
///
/// ```no_run
/// use crease::io::ply;
/// use crease::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = HalfEdgeMesh::new();
/// ply::save(&mesh, "output.ply").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (vertices, faces) = to_face_vertex(mesh);
    let marked: Vec<_> = mesh
        .edge_ids()
        .filter(|&e| mesh.is_marked(e))
        .map(|e| mesh.edge_vertices(e))
        .collect();

    // Header
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by crease")?;
    writeln!(writer, "element vertex {}", vertices.len())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    writeln!(writer, "element face {}", faces.len())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    if !marked.is_empty() {
        writeln!(writer, "element edge {}", marked.len())?;
        writeln!(writer, "property int vertex1")?;
        writeln!(writer, "property int vertex2")?;
    }
    writeln!(writer, "end_header")?;

    for v in &vertices {
        writeln!(writer, "{} {} {}", v.x, v.y, v.z)?;
    }

    for f in &faces {
        if f.len() > u8::MAX as usize {
            return Err(MeshError::SaveError {
                path: path.to_path_buf(),
                message: format!("face with {} vertices exceeds the PLY list limit", f.len()),
            });
        }
        write!(writer, "{}", f.len())?;
        for i in f {
            write!(writer, " {}", i)?;
        }
        writeln!(writer)?;
    }

    for [a, b] in &marked {
        writeln!(writer, "{} {}", a.index(), b.index())?;
    }

    writer.flush()?;
    Ok(())
}
