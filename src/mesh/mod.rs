//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation used for both the
//! source mesh (the one carrying the selected loop) and the reference mesh
//! (the one whose contour the loop is aligned to).
//!
//! # Overview
//!
//! [`HalfEdgeMesh`] stores polygon faces with half-edge connectivity, loose
//! wire edges, and per-vertex `selected`/`hidden` flags. [`HalfEdgeMesh::edges`]
//! enumerates every full edge once with the number of faces it borders, which
//! is what contour extraction is built on.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait).
//!
//! # Construction
//!
//! ```
//! use contour_sew::mesh::{build_mesh, HalfEdgeMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(3.0, 0.0, 0.0),
//! ];
//! let quads = vec![vec![0, 1, 2, 3]];
//! let loose = [[1, 4]];
//!
//! let mesh: HalfEdgeMesh = build_mesh(&vertices, &quads, &loose).unwrap();
//! assert_eq!(mesh.num_edges(), 5);
//! ```

mod builder;
mod halfedge;
mod index;

pub use builder::{build_from_edges, build_from_triangles, build_mesh, to_face_vertex};
pub use halfedge::{Edge, Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex};
pub use index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
