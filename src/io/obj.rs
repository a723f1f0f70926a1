//! Wavefront OBJ format support.
//!
//! Reads `v` positions, `f` polygons of any size and `l` polylines; the
//! segments of every `l` line become wire edges. Texture and normal indices
//! in `f` corners (`v/vt/vn`) are ignored, negative indices count back from
//! the most recent vertex, and all other statements are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{build_mesh, to_face_vertex, HalfEdgeMesh, MeshIndex};

/// Load a mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use contour_sew::io::obj;
/// use contour_sew::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = obj::load("contour.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    parse(BufReader::new(file), path)
}

/// Read a mesh from OBJ text.
pub fn from_reader<R: BufRead, I: MeshIndex>(reader: R) -> Result<HalfEdgeMesh<I>> {
    parse(reader, Path::new("<reader>"))
}

fn parse<R: BufRead, I: MeshIndex>(reader: R, path: &Path) -> Result<HalfEdgeMesh<I>> {
    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut polygons: Vec<Vec<usize>> = Vec::new();
    let mut wires: Vec<[usize; 2]> = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = number + 1;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let mut coords = [0.0; 3];
                for c in &mut coords {
                    let token = tokens.next().ok_or_else(|| {
                        MeshError::load(path, format!("line {}: vertex needs three coordinates", line_no))
                    })?;
                    *c = token.parse().map_err(|_| {
                        MeshError::load(path, format!("line {}: invalid coordinate '{}'", line_no, token))
                    })?;
                }
                vertices.push(Point3::from(coords));
            }
            Some("f") => {
                let corners = tokens
                    .map(|t| resolve_index(t, vertices.len(), path, line_no))
                    .collect::<Result<Vec<_>>>()?;
                polygons.push(corners);
            }
            Some("l") => {
                let points = tokens
                    .map(|t| resolve_index(t, vertices.len(), path, line_no))
                    .collect::<Result<Vec<_>>>()?;
                if points.len() < 2 {
                    return Err(MeshError::load(
                        path,
                        format!("line {}: polyline needs at least two vertices", line_no),
                    ));
                }
                wires.extend(points.windows(2).map(|w| [w[0], w[1]]));
            }
            _ => {}
        }
    }

    if polygons.is_empty() && wires.is_empty() {
        return Err(MeshError::load(path, "OBJ file contains no faces or lines"));
    }

    build_mesh(&vertices, &polygons, &wires)
}

/// Turn a 1-based (or negative, relative) OBJ index into a 0-based one.
fn resolve_index(token: &str, count: usize, path: &Path, line_no: usize) -> Result<usize> {
    let head = token.split('/').next().unwrap_or(token);
    let value: i64 = head
        .parse()
        .map_err(|_| MeshError::load(path, format!("line {}: invalid index '{}'", line_no, token)))?;

    let resolved = match value {
        v if v > 0 => v - 1,
        v if v < 0 => count as i64 + v,
        _ => -1,
    };

    if resolved < 0 || resolved >= count as i64 {
        return Err(MeshError::load(
            path,
            format!("line {}: index {} out of range ({} vertices so far)", line_no, value, count),
        ));
    }
    Ok(resolved as usize)
}

/// Save a mesh to an OBJ file.
///
/// Selection and hidden flags are not stored.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    to_writer(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh as OBJ text.
pub fn to_writer<W: Write, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, writer: &mut W) -> Result<()> {
    let (vertices, polygons, wires) = to_face_vertex(mesh);

    writeln!(writer, "# Generated by contour-sew")?;
    for v in &vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }

    for polygon in &polygons {
        write!(writer, "f")?;
        for &i in polygon {
            write!(writer, " {}", i + 1)?;
        }
        writeln!(writer)?;
    }

    for [a, b] in &wires {
        writeln!(writer, "l {} {}", a + 1, b + 1)?;
    }

    Ok(())
}
