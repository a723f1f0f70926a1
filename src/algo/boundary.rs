//! Contour edge extraction.
//!
//! A contour edge is an edge bordering at most one face: the open boundary
//! of a surface patch, or a loose wire edge. Contour edges are copied out as
//! world-space [`Segment`]s.

use crate::error::{MeshError, Result};
use crate::session::{world_positions, EditSession, WorldFrame};

use super::project::Segment;

/// Collect the contour edges of a mesh as world-space segments.
///
/// The order of the returned segments follows the backend's edge order
/// and carries no meaning. A mesh without edges yields an empty list.
///
/// # Errors
/// [`MeshError::VertexOutOfRange`] if an edge names a vertex the backend
/// did not report.
///
/// # Example
///
/// ```
/// use contour_sew::algo::boundary::contour_segments;
/// use contour_sew::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
///
/// // The diagonal is shared by both triangles; the four sides are contour.
/// assert_eq!(contour_segments(&mesh).unwrap().len(), 4);
/// ```
pub fn contour_segments<S: EditSession + ?Sized>(session: &S) -> Result<Vec<Segment>> {
    let edges = session.read_edges();
    if edges.is_empty() {
        return Ok(Vec::new());
    }

    let frame = WorldFrame::of(session);
    let positions = world_positions(session, &frame);

    let lookup = |index: usize| {
        positions
            .get(&index)
            .copied()
            .ok_or(MeshError::VertexOutOfRange {
                index,
                len: positions.len(),
            })
    };

    let mut segments = Vec::new();
    for edge in edges.iter().filter(|e| e.face_count <= 1) {
        let [a, b] = edge.vertices;
        segments.push(Segment::new(lookup(a)?, lookup(b)?));
    }

    log::debug!(
        "extracted {} contour segments from {} edges",
        segments.len(),
        edges.len()
    );

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_edges, build_mesh, HalfEdgeMesh};
    use crate::session::{EdgeRecord, MeshObject, VertexRecord};
    use nalgebra::{Matrix4, Point3, Vector3};

    #[test]
    fn test_closed_mesh_has_no_segments() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![vec![0, 2, 1], vec![0, 1, 3], vec![1, 2, 3], vec![2, 0, 3]];
        let mesh: HalfEdgeMesh = build_mesh(&vertices, &faces, &[]).unwrap();

        assert!(contour_segments(&mesh).unwrap().is_empty());
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert!(contour_segments(&mesh).unwrap().is_empty());
    }

    #[test]
    fn test_wire_edges_are_contour() {
        let points = vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(2.0, 0.0, 3.0),
        ];
        let mesh: HalfEdgeMesh = build_from_edges(&points, &[[0, 1], [1, 2]]).unwrap();

        let segments = contour_segments(&mesh).unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::new(points[0], points[1]),
                Segment::new(points[1], points[2]),
            ]
        );
    }

    #[test]
    fn test_segments_are_in_world_space() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let mesh: HalfEdgeMesh = build_from_edges(&points, &[[0, 1]]).unwrap();
        let object = MeshObject::new("contour", mesh)
            .with_transform(Matrix4::new_translation(&Vector3::new(0.0, 2.0, 3.0)));

        let segments = contour_segments(&object).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, Point3::new(0.0, 2.0, 3.0));
        assert_eq!(segments[0].end, Point3::new(1.0, 2.0, 3.0));
    }

    struct DanglingEdge;

    impl EditSession for DanglingEdge {
        fn read_vertices(&self) -> Vec<VertexRecord> {
            vec![VertexRecord {
                index: 0,
                position: Point3::origin(),
                selected: false,
                hidden: false,
            }]
        }

        fn read_edges(&self) -> Vec<EdgeRecord> {
            vec![EdgeRecord {
                vertices: [0, 4],
                face_count: 1,
            }]
        }

        fn write_vertex_position(&mut self, index: usize, _: Point3<f64>) -> Result<()> {
            Err(MeshError::VertexOutOfRange { index, len: 1 })
        }
    }

    #[test]
    fn test_unknown_vertex_is_an_error() {
        let err = contour_segments(&DanglingEdge).unwrap_err();
        assert!(matches!(err, MeshError::VertexOutOfRange { index: 4, len: 1 }));
    }
}
