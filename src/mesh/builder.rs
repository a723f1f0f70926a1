//! Mesh construction utilities.
//!
//! This module provides functions for building half-edge meshes from
//! face-vertex lists as found in mesh file formats. Polygons of any degree
//! are accepted, and loose edges (OBJ `l` records, contour polylines) can be
//! attached as wire edges.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh};
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and triangle faces.
///
/// # Example
/// ```
/// use contour_sew::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.contour_edges().count(), 3);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    let polygons: Vec<Vec<usize>> = faces.iter().map(|f| f.to_vec()).collect();
    build_mesh(vertices, &polygons, &[])
}

/// Build a mesh made only of wire edges, e.g. a contour polyline.
///
/// # Example
/// ```
/// use contour_sew::mesh::{build_from_edges, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)];
/// let mesh: HalfEdgeMesh = build_from_edges(&points, &[[0, 1]]).unwrap();
/// assert_eq!(mesh.num_faces(), 0);
/// assert_eq!(mesh.contour_edges().count(), 1);
/// ```
pub fn build_from_edges<I: MeshIndex>(
    vertices: &[Point3<f64>],
    edges: &[[usize; 2]],
) -> Result<HalfEdgeMesh<I>> {
    build_mesh(vertices, &[], edges)
}

/// Build a half-edge mesh from vertices, polygon faces and wire edges.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `polygons` - Faces as counter-clockwise vertex index lists (3 or more each)
/// * `wire_edges` - Loose edges as vertex index pairs
///
/// A wire edge that duplicates an edge of a face is dropped, since the
/// face edge already represents it.
///
/// # Errors
/// [`MeshError::EmptyMesh`] if there are neither faces nor wire edges,
/// and index or degeneracy errors for malformed input.
pub fn build_mesh<I: MeshIndex>(
    vertices: &[Point3<f64>],
    polygons: &[Vec<usize>],
    wire_edges: &[[usize; 2]],
) -> Result<HalfEdgeMesh<I>> {
    if polygons.is_empty() && wire_edges.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    validate_polygons(vertices.len(), polygons)?;
    validate_wire_edges(vertices.len(), wire_edges)?;

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), polygons.len());

    let vertex_ids: Vec<VertexId<I>> = vertices
        .iter()
        .map(|&pos| mesh.add_vertex(pos))
        .collect();

    // Directed edge (v0, v1) -> half-edge
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId<I>> = HashMap::new();

    // First pass: one half-edge ring per polygon
    for polygon in polygons {
        let first = mesh.num_halfedges();
        let n = polygon.len();
        let face_id = FaceId::<I>::new(mesh.num_faces());
        mesh.faces.push(Face::new(HalfEdgeId::new(first)));

        for (k, &v) in polygon.iter().enumerate() {
            let he_id = HalfEdgeId::<I>::new(first + k);
            mesh.halfedges.push(HalfEdge {
                origin: vertex_ids[v],
                twin: HalfEdgeId::invalid(),
                next: HalfEdgeId::new(first + (k + 1) % n),
                prev: HalfEdgeId::new(first + (k + n - 1) % n),
                face: face_id,
            });

            // Overwritten for shared vertices; fixed up below for boundaries
            mesh.vertex_mut(vertex_ids[v]).halfedge = he_id;
            edge_map.insert((v, polygon[(k + 1) % n]), he_id);
        }
    }

    // Second pass: link twins, creating boundary half-edges where needed.
    // Sorted so that boundary half-edge numbering is deterministic.
    let mut directed: Vec<((usize, usize), HalfEdgeId<I>)> =
        edge_map.iter().map(|(&k, &he)| (k, he)).collect();
    directed.sort_unstable_by_key(|&(k, _)| k);

    for ((v0, v1), he) in directed {
        if mesh.twin(he).is_valid() {
            continue;
        }
        if let Some(&twin) = edge_map.get(&(v1, v0)) {
            mesh.halfedge_mut(he).twin = twin;
            mesh.halfedge_mut(twin).twin = he;
        } else {
            let boundary_he = HalfEdgeId::<I>::new(mesh.num_halfedges());
            mesh.halfedges.push(HalfEdge {
                origin: vertex_ids[v1],
                twin: he,
                ..HalfEdge::new()
            });
            mesh.halfedge_mut(he).twin = boundary_he;
        }
    }

    link_boundary_loops(&mut mesh);
    fix_boundary_vertex_halfedges(&mut mesh);

    for &[a, b] in wire_edges {
        let on_face = edge_map.contains_key(&(a, b)) || edge_map.contains_key(&(b, a));
        let duplicate = mesh
            .wire_edges
            .iter()
            .any(|&[x, y]| (x.index(), y.index()) == (a, b) || (x.index(), y.index()) == (b, a));
        if !on_face && !duplicate {
            mesh.wire_edges.push([vertex_ids[a], vertex_ids[b]]);
        }
    }

    Ok(mesh)
}

fn validate_polygons(num_vertices: usize, polygons: &[Vec<usize>]) -> Result<()> {
    for (fi, polygon) in polygons.iter().enumerate() {
        if polygon.len() < 3 {
            return Err(MeshError::DegenerateFace { face: fi });
        }
        if let Some(&vi) = polygon.iter().find(|&&vi| vi >= num_vertices) {
            return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
        }
        for (k, &vi) in polygon.iter().enumerate() {
            if polygon[k + 1..].contains(&vi) {
                return Err(MeshError::DegenerateFace { face: fi });
            }
        }
    }
    Ok(())
}

fn validate_wire_edges(num_vertices: usize, edges: &[[usize; 2]]) -> Result<()> {
    for (ei, &[a, b]) in edges.iter().enumerate() {
        if let Some(&vi) = [a, b].iter().find(|&&vi| vi >= num_vertices) {
            return Err(MeshError::InvalidEdgeIndex { edge: ei, vertex: vi });
        }
        if a == b {
            return Err(MeshError::DegenerateEdge { edge: ei });
        }
    }
    Ok(())
}

/// Link boundary half-edges into loops.
fn link_boundary_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    let boundary_hes: Vec<HalfEdgeId<I>> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect();

    let mut outgoing: HashMap<usize, HalfEdgeId<I>> = HashMap::new();
    for &he in &boundary_hes {
        outgoing.insert(mesh.origin(he).index(), he);
    }

    for &he in &boundary_hes {
        let dest = mesh.dest(he).index();
        if let Some(&next_he) = outgoing.get(&dest) {
            mesh.halfedge_mut(he).next = next_he;
            mesh.halfedge_mut(next_he).prev = he;
        }
    }
}

/// Ensure boundary vertices point to a boundary half-edge.
fn fix_boundary_vertex_halfedges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    for vid in mesh.vertex_ids().collect::<Vec<_>>() {
        let start_he = mesh.vertex(vid).halfedge;
        if !start_he.is_valid() {
            continue;
        }

        // Walk outgoing half-edges: twin -> next. Stops at an open fan.
        let mut he = start_he;
        loop {
            if mesh.is_boundary_halfedge(he) {
                mesh.vertex_mut(vid).halfedge = he;
                break;
            }
            he = mesh.next(mesh.twin(he));
            if he == start_he || !he.is_valid() {
                break;
            }
        }
    }
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Returns `(vertices, polygons, wire_edges)`.
pub fn to_face_vertex<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
) -> (Vec<Point3<f64>>, Vec<Vec<usize>>, Vec<[usize; 2]>) {
    let vertices: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();

    let polygons: Vec<Vec<usize>> = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(|v| v.index()).collect())
        .collect();

    let wire_edges: Vec<[usize; 2]> = mesh
        .wire_edges()
        .iter()
        .map(|[a, b]| [a.index(), b.index()])
        .collect();

    (vertices, polygons, wire_edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3]];
        (vertices, faces)
    }

    fn tetrahedron() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_two_triangles_edge_counts() {
        let (vertices, faces) = two_triangles();
        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_faces(), 2);
        // 6 interior half-edges + 4 boundary half-edges
        assert_eq!(mesh.num_halfedges(), 10);
        assert_eq!(mesh.num_edges(), 5);
        assert!(mesh.is_valid());

        let shared: Vec<_> = mesh.edges().filter(|e| e.face_count == 2).collect();
        assert_eq!(shared.len(), 1);
        let mut ends = [shared[0].vertices[0].index(), shared[0].vertices[1].index()];
        ends.sort();
        assert_eq!(ends, [0, 1]);

        assert_eq!(mesh.contour_edges().count(), 4);
    }

    #[test]
    fn test_closed_mesh_has_no_contour() {
        let mesh = tetrahedron();
        assert_eq!(mesh.num_edges(), 6);
        assert!(mesh.edges().all(|e| e.face_count == 2));
        assert_eq!(mesh.contour_edges().count(), 0);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_quad_polygon() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_mesh(&vertices, &[vec![0, 1, 2, 3]], &[]).unwrap();

        assert_eq!(mesh.num_halfedges(), 8);
        assert_eq!(mesh.face_vertices(FaceId::new(0)).count(), 4);
        assert_eq!(mesh.contour_edges().count(), 4);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_wire_edges() {
        let (mut vertices, faces) = two_triangles();
        vertices.push(Point3::new(5.0, 5.0, 0.0));
        let polygons: Vec<Vec<usize>> = faces.iter().map(|f| f.to_vec()).collect();

        // [2, 4] is loose, [0, 1] duplicates a face edge, [4, 2] duplicates [2, 4]
        let mesh: HalfEdgeMesh =
            build_mesh(&vertices, &polygons, &[[2, 4], [0, 1], [4, 2]]).unwrap();

        assert_eq!(mesh.num_wire_edges(), 1);
        let wire: Vec<_> = mesh.edges().filter(|e| e.face_count == 0).collect();
        assert_eq!(wire.len(), 1);
        assert_eq!(wire[0].vertices, [VertexId::new(2), VertexId::new(4)]);
        assert_eq!(mesh.contour_edges().count(), 5);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_edges_only_mesh() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_edges(&points, &[[0, 1], [1, 2]]).unwrap();

        assert_eq!(mesh.num_faces(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_edges(), 2);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_roundtrip() {
        let (vertices, faces) = two_triangles();
        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();

        let (out_verts, out_faces, out_wires) = to_face_vertex(&mesh);

        assert_eq!(out_verts, vertices);
        assert_eq!(out_faces, vec![vec![0, 1, 2], vec![1, 0, 3]]);
        assert!(out_wires.is_empty());
    }

    #[test]
    fn test_select_contour_vertices() {
        let (mut vertices, faces) = two_triangles();
        vertices.push(Point3::new(9.0, 9.0, 9.0)); // isolated, touches no edge
        let mut mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
        mesh.hide_vertex(VertexId::new(3), true);

        assert_eq!(mesh.select_contour_vertices(), 3);
        let selected: Vec<usize> = mesh.selected_vertices().map(|v| v.index()).collect();
        assert_eq!(selected, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_input() {
        let result: Result<HalfEdgeMesh> = build_mesh(&[Point3::origin()], &[], &[]);
        assert!(matches!(result, Err(MeshError::EmptyMesh)));
    }

    #[test]
    fn test_invalid_indices() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];

        let result: Result<HalfEdgeMesh> = build_from_triangles(&vertices, &[[0, 1, 2]]);
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { face: 0, vertex: 2 })
        ));

        let result: Result<HalfEdgeMesh> = build_from_edges(&vertices, &[[0, 1], [1, 5]]);
        assert!(matches!(
            result,
            Err(MeshError::InvalidEdgeIndex { edge: 1, vertex: 5 })
        ));
    }

    #[test]
    fn test_degenerate_input() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];

        let result: Result<HalfEdgeMesh> = build_from_triangles(&vertices, &[[0, 0, 2]]);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));

        let result: Result<HalfEdgeMesh> = build_mesh(&vertices, &[vec![0, 1]], &[]);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));

        let result: Result<HalfEdgeMesh> = build_from_edges(&vertices, &[[1, 1]]);
        assert!(matches!(result, Err(MeshError::DegenerateEdge { edge: 0 })));
    }
}
