//! STL (stereolithography) format support.
//!
//! STL holds loose triangles only. Coincident corners are welded on load so
//! the mesh has real shared edges and a contour; on save polygons are fan
//! triangulated and wire edges, which STL cannot express, are dropped.

use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, to_face_vertex, HalfEdgeMesh, MeshIndex};

/// Load a mesh from an STL file.
///
/// Automatically detects binary vs ASCII format.
///
/// # Example
///
/// ```no_run
/// use contour_sew::io::stl;
/// use contour_sew::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = stl::load("scan.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    parse(&mut file, path)
}

/// Read a mesh from STL data.
pub fn from_reader<R: Read + Seek, I: MeshIndex>(mut reader: R) -> Result<HalfEdgeMesh<I>> {
    parse(&mut reader, Path::new("<reader>"))
}

fn parse<R: Read + Seek, I: MeshIndex>(reader: &mut R, path: &Path) -> Result<HalfEdgeMesh<I>> {
    // The indexed mesh already shares bit-identical corners
    let stl = stl_io::read_stl(reader).map_err(|e| MeshError::load(path, e.to_string()))?;

    let vertices: Vec<Point3<f64>> = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();

    let faces: Vec<[usize; 3]> = stl
        .faces
        .iter()
        .map(|tri| tri.vertices)
        .filter(|[a, b, c]| a != b && b != c && a != c)
        .collect();

    if faces.is_empty() {
        return Err(MeshError::load(path, "STL file contains no valid triangles"));
    }

    build_from_triangles(&vertices, &faces)
}

/// Save a mesh to a binary STL file.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    to_writer(mesh, &mut writer).map_err(|e| match e {
        MeshError::Io(io) => MeshError::SaveError {
            path: path.to_path_buf(),
            message: io.to_string(),
        },
        other => other,
    })?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh as binary STL.
pub fn to_writer<W: Write, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, writer: &mut W) -> Result<()> {
    let (vertices, polygons, wires) = to_face_vertex(mesh);
    if !wires.is_empty() {
        log::warn!("STL cannot store wire edges; dropping {} of them", wires.len());
    }

    let vertex = |p: &Point3<f64>| stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32]);

    let mut triangles: Vec<stl_io::Triangle> = Vec::new();
    for polygon in &polygons {
        for k in 1..polygon.len().saturating_sub(1) {
            let p0 = &vertices[polygon[0]];
            let p1 = &vertices[polygon[k]];
            let p2 = &vertices[polygon[k + 1]];

            let n = (p1 - p0)
                .cross(&(p2 - p0))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros);

            triangles.push(stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [vertex(p0), vertex(p1), vertex(p2)],
            });
        }
    }

    stl_io::write_stl(writer, triangles.iter())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_mesh;
    use std::io::Cursor;

    #[test]
    fn test_quad_is_fanned_and_welded() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(5.0, 5.0, 5.0),
        ];
        let mesh: HalfEdgeMesh = build_mesh(&points, &[vec![0, 1, 2, 3]], &[[3, 4]]).unwrap();

        let mut out = Vec::new();
        to_writer(&mesh, &mut out).unwrap();
        // 80-byte header, triangle count, 50 bytes per triangle
        assert_eq!(out.len(), 84 + 2 * 50);

        let again: HalfEdgeMesh = from_reader(Cursor::new(out)).unwrap();
        assert_eq!(again.num_vertices(), 4);
        assert_eq!(again.num_faces(), 2);
        assert_eq!(again.num_wire_edges(), 0);
        // Welded corners leave the square outline as the only contour
        assert_eq!(again.contour_edges().count(), 4);
    }

    #[test]
    fn test_garbage_is_a_load_error() {
        let result: Result<HalfEdgeMesh> = from_reader(Cursor::new(b"not an stl file".to_vec()));
        assert!(matches!(result, Err(MeshError::LoadError { .. })));
    }
}
