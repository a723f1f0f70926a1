//! PLY (Stanford polygon) format support.
//!
//! Besides positions and faces, the vertex element may carry `selected`
//! and `hidden` properties (any numeric type, nonzero meaning set), and an
//! `edge` element with `vertex1`/`vertex2` lists loose edges. Edges that
//! coincide with a face side are folded into the face.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{MeshError, Result};
use crate::mesh::{build_mesh, to_face_vertex, HalfEdgeMesh, MeshIndex, VertexId};

/// Load a mesh from a PLY file.
///
/// # Example
///
/// ```no_run
/// use contour_sew::io::ply;
/// use contour_sew::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = ply::load("terrain.ply").unwrap();
/// println!("{} vertices selected", mesh.num_selected());
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    parse(&mut BufReader::new(file), path)
}

/// Read a mesh from PLY data.
pub fn from_reader<R: BufRead, I: MeshIndex>(mut reader: R) -> Result<HalfEdgeMesh<I>> {
    parse(&mut reader, Path::new("<reader>"))
}

fn parse<R: BufRead, I: MeshIndex>(reader: &mut R, path: &Path) -> Result<HalfEdgeMesh<I>> {
    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(reader)
        .map_err(|e| MeshError::load(path, e.to_string()))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| MeshError::load(path, "PLY file has no vertex element"))?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    let mut selected = Vec::new();
    let mut hidden = Vec::new();

    for (i, vertex) in vertex_element.iter().enumerate() {
        let coord = |name: &str| {
            get_float_property(vertex, name)
                .ok_or_else(|| MeshError::load(path, format!("vertex missing {} coordinate", name)))
        };
        vertices.push(Point3::new(coord("x")?, coord("y")?, coord("z")?));

        if is_flag_set(vertex, "selected") {
            selected.push(i);
        }
        if is_flag_set(vertex, "hidden") {
            hidden.push(i);
        }
    }

    let mut polygons: Vec<Vec<usize>> = Vec::new();
    if let Some(face_element) = ply.payload.get("face") {
        for face in face_element {
            let indices = get_list_property(face, "vertex_indices")
                .or_else(|| get_list_property(face, "vertex_index"))
                .ok_or_else(|| MeshError::load(path, "face missing vertex_indices property"))?;
            polygons.push(indices);
        }
    }

    let mut wires: Vec<[usize; 2]> = Vec::new();
    if let Some(edge_element) = ply.payload.get("edge") {
        for edge in edge_element {
            match (get_index_property(edge, "vertex1"), get_index_property(edge, "vertex2")) {
                (Some(a), Some(b)) => wires.push([a, b]),
                _ => return Err(MeshError::load(path, "edge missing vertex1/vertex2 property")),
            }
        }
    }

    if polygons.is_empty() && wires.is_empty() {
        return Err(MeshError::load(path, "PLY file contains no faces or edges"));
    }

    let mut mesh = build_mesh(&vertices, &polygons, &wires)?;
    for i in selected {
        mesh.select_vertex(VertexId::new(i), true);
    }
    for i in hidden {
        mesh.hide_vertex(VertexId::new(i), true);
    }

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

fn is_flag_set(element: &DefaultElement, name: &str) -> bool {
    get_float_property(element, name).is_some_and(|v| v != 0.0)
}

fn get_index_property(element: &DefaultElement, name: &str) -> Option<usize> {
    match element.get(name)? {
        Property::Int(v) => usize::try_from(*v).ok(),
        Property::UInt(v) => Some(*v as usize),
        Property::Short(v) => usize::try_from(*v).ok(),
        Property::UShort(v) => Some(*v as usize),
        Property::Char(v) => usize::try_from(*v).ok(),
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
/// Vertex selection and hidden flags are written as uchar properties.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    to_writer(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh as ASCII PLY.
pub fn to_writer<W: Write, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, writer: &mut W) -> Result<()> {
    let (vertices, polygons, wires) = to_face_vertex(mesh);

    // Header
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by contour-sew")?;
    writeln!(writer, "element vertex {}", vertices.len())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    writeln!(writer, "property uchar selected")?;
    writeln!(writer, "property uchar hidden")?;
    if !polygons.is_empty() {
        writeln!(writer, "element face {}", polygons.len())?;
        writeln!(writer, "property list uchar int vertex_indices")?;
    }
    if !wires.is_empty() {
        writeln!(writer, "element edge {}", wires.len())?;
        writeln!(writer, "property int vertex1")?;
        writeln!(writer, "property int vertex2")?;
    }
    writeln!(writer, "end_header")?;

    for (id, v) in mesh.vertices() {
        let p = &vertices[id.index()];
        writeln!(
            writer,
            "{} {} {} {} {}",
            p.x,
            p.y,
            p.z,
            u8::from(v.selected),
            u8::from(v.hidden)
        )?;
    }

    for polygon in &polygons {
        write!(writer, "{}", polygon.len())?;
        for i in polygon {
            write!(writer, " {}", i)?;
        }
        writeln!(writer)?;
    }

    for [a, b] in &wires {
        writeln!(writer, "{} {}", a, b)?;
    }

    Ok(())
}
