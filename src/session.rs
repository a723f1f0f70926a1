//! The mesh-editing backend seen by the algorithms.
//!
//! The alignment and relaxation passes never touch a mesh type directly.
//! They read vertices and edges through [`EditSession`], do all geometry in
//! world space, and hand back local positions. A host application wraps its
//! own edit-mode mesh in this trait; this crate implements it for
//! [`HalfEdgeMesh`] (identity transform) and for [`MeshObject`] (a mesh
//! placed in the world by a 4x4 matrix).

use std::collections::HashMap;

use nalgebra::{Matrix4, Point3};

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

/// A vertex as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexRecord {
    /// Stable vertex index.
    pub index: usize,
    /// Position in the mesh's local space.
    pub position: Point3<f64>,
    /// Whether the vertex is selected.
    pub selected: bool,
    /// Whether the vertex is hidden.
    pub hidden: bool,
}

/// An edge as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRecord {
    /// Indices of the two end vertices.
    pub vertices: [usize; 2],
    /// Number of faces adjacent to the edge.
    pub face_count: usize,
}

/// A mesh opened for editing.
///
/// Implementations must report vertex and edge indices consistently: every
/// index in [`read_edges`](EditSession::read_edges) must appear in
/// [`read_vertices`](EditSession::read_vertices), and
/// [`write_vertex_position`](EditSession::write_vertex_position) must accept
/// every reported vertex index.
pub trait EditSession {
    /// All vertices, in index order.
    fn read_vertices(&self) -> Vec<VertexRecord>;

    /// All edges with their adjacent face counts.
    fn read_edges(&self) -> Vec<EdgeRecord>;

    /// Local-to-world transform of the mesh.
    fn world_transform(&self) -> Matrix4<f64> {
        Matrix4::identity()
    }

    /// Overwrite the local position of a vertex.
    ///
    /// # Errors
    /// [`MeshError::VertexOutOfRange`] if `index` is unknown to the backend.
    fn write_vertex_position(&mut self, index: usize, position: Point3<f64>) -> Result<()>;

    /// Overwrite only the local Z of a vertex.
    ///
    /// Matches world Z only when the transform keeps the Z axis apart from
    /// X and Y; the passes themselves go through
    /// [`write_vertex_position`](EditSession::write_vertex_position).
    fn write_vertex_z(&mut self, index: usize, z: f64) -> Result<()> {
        let vertices = self.read_vertices();
        let vertex = vertices
            .iter()
            .find(|v| v.index == index)
            .ok_or(MeshError::VertexOutOfRange {
                index,
                len: vertices.len(),
            })?;
        let mut position = vertex.position;
        position.z = z;
        self.write_vertex_position(index, position)
    }
}

impl<I: MeshIndex> EditSession for HalfEdgeMesh<I> {
    fn read_vertices(&self) -> Vec<VertexRecord> {
        self.vertices()
            .map(|(id, v)| VertexRecord {
                index: id.index(),
                position: v.position,
                selected: v.selected,
                hidden: v.hidden,
            })
            .collect()
    }

    fn read_edges(&self) -> Vec<EdgeRecord> {
        self.edges()
            .map(|e| EdgeRecord {
                vertices: [e.vertices[0].index(), e.vertices[1].index()],
                face_count: e.face_count,
            })
            .collect()
    }

    fn write_vertex_position(&mut self, index: usize, position: Point3<f64>) -> Result<()> {
        if index >= self.num_vertices() {
            return Err(MeshError::VertexOutOfRange {
                index,
                len: self.num_vertices(),
            });
        }
        self.set_position(VertexId::new(index), position);
        Ok(())
    }
}

/// A named mesh placed in world space.
#[derive(Debug, Clone)]
pub struct MeshObject<I: MeshIndex = u32> {
    /// Display name.
    pub name: String,
    /// Mesh data in local coordinates.
    pub mesh: HalfEdgeMesh<I>,
    /// Local-to-world transform.
    pub transform: Matrix4<f64>,
}

impl<I: MeshIndex> MeshObject<I> {
    /// Wrap a mesh with an identity transform.
    pub fn new(name: impl Into<String>, mesh: HalfEdgeMesh<I>) -> Self {
        Self {
            name: name.into(),
            mesh,
            transform: Matrix4::identity(),
        }
    }

    /// Set the local-to-world transform.
    pub fn with_transform(mut self, transform: Matrix4<f64>) -> Self {
        self.transform = transform;
        self
    }

    /// World-space position of a vertex.
    pub fn world_position(&self, v: VertexId<I>) -> Point3<f64> {
        self.transform.transform_point(self.mesh.position(v))
    }
}

impl<I: MeshIndex> EditSession for MeshObject<I> {
    fn read_vertices(&self) -> Vec<VertexRecord> {
        self.mesh.read_vertices()
    }

    fn read_edges(&self) -> Vec<EdgeRecord> {
        self.mesh.read_edges()
    }

    fn world_transform(&self) -> Matrix4<f64> {
        self.transform
    }

    fn write_vertex_position(&mut self, index: usize, position: Point3<f64>) -> Result<()> {
        self.mesh.write_vertex_position(index, position)
    }
}

/// World-space view of one session, built once per pass.
pub(crate) struct WorldFrame {
    to_world: Matrix4<f64>,
    to_local: Option<Matrix4<f64>>,
}

impl WorldFrame {
    pub(crate) fn of<S: EditSession + ?Sized>(session: &S) -> Self {
        let to_world = session.world_transform();
        Self {
            to_world,
            to_local: to_world.try_inverse(),
        }
    }

    #[inline]
    pub(crate) fn to_world(&self, local: &Point3<f64>) -> Point3<f64> {
        self.to_world.transform_point(local)
    }

    /// Move a vertex so that its world position becomes `(world.x, world.y, z)`.
    pub(crate) fn write_world_z<S: EditSession + ?Sized>(
        &self,
        session: &mut S,
        index: usize,
        world: &Point3<f64>,
        z: f64,
    ) -> Result<()> {
        let to_local = self.to_local.as_ref().ok_or(MeshError::SingularTransform)?;
        let local = to_local.transform_point(&Point3::new(world.x, world.y, z));
        session.write_vertex_position(index, local)
    }
}

/// World positions of the session's vertices, keyed by vertex index.
pub(crate) fn world_positions<S: EditSession + ?Sized>(
    session: &S,
    frame: &WorldFrame,
) -> HashMap<usize, Point3<f64>> {
    session
        .read_vertices()
        .iter()
        .map(|v| (v.index, frame.to_world(&v.position)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;
    use nalgebra::Vector3;

    fn triangle() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap()
    }

    #[test]
    fn test_mesh_records() {
        let mut mesh = triangle();
        mesh.select_vertex(VertexId::new(1), true);

        let vertices = mesh.read_vertices();
        assert_eq!(vertices.len(), 3);
        assert!(vertices[1].selected);
        assert!(!vertices[0].selected);

        let edges = mesh.read_edges();
        assert_eq!(edges.len(), 3);
        assert!(edges.iter().all(|e| e.face_count == 1));
    }

    #[test]
    fn test_write_out_of_range() {
        let mut mesh = triangle();
        let err = mesh
            .write_vertex_position(3, Point3::origin())
            .unwrap_err();
        assert!(matches!(err, MeshError::VertexOutOfRange { index: 3, len: 3 }));
    }

    #[test]
    fn test_write_vertex_z() {
        let mut mesh = triangle();
        mesh.write_vertex_z(2, 4.5).unwrap();
        assert_eq!(*mesh.position(VertexId::new(2)), Point3::new(0.0, 1.0, 4.5));

        let err = mesh.write_vertex_z(7, 1.0).unwrap_err();
        assert!(matches!(err, MeshError::VertexOutOfRange { index: 7, len: 3 }));
    }

    #[test]
    fn test_world_z_write_back() {
        let transform = Matrix4::new_translation(&Vector3::new(10.0, 0.0, 5.0))
            * Matrix4::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2);
        let mut object = MeshObject::new("tri", triangle()).with_transform(transform);

        let frame = WorldFrame::of(&object);
        let world = object.world_position(VertexId::new(1));
        assert!((world - Point3::new(10.0, 1.0, 5.0)).norm() < 1e-12);

        frame.write_world_z(&mut object, 1, &world, 2.0).unwrap();

        let moved = object.world_position(VertexId::new(1));
        assert!((moved - Point3::new(10.0, 1.0, 2.0)).norm() < 1e-12);
        assert!((object.mesh.position(VertexId::new(1)).z + 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_singular_transform() {
        let mut object = MeshObject::new("flat", triangle())
            .with_transform(Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 1.0, 0.0)));
        let frame = WorldFrame::of(&object);

        let err = frame
            .write_world_z(&mut object, 0, &Point3::origin(), 1.0)
            .unwrap_err();
        assert!(matches!(err, MeshError::SingularTransform));
    }
}
