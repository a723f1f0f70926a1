//! # contour-sew
//!
//! Sew a selected vertex loop onto the open contour of a reference mesh.
//!
//! Given a source mesh with a loop of selected vertices and a reference
//! mesh with an open boundary (or loose wire edges), contour-sew moves each
//! loop vertex straight up or down onto the height of the nearest contour
//! edge in plan view, then eases the surrounding vertices toward the new
//! loop with a linear falloff.
//!
//! ## Features
//!
//! - **Half-edge meshes** with wire edges and per-vertex selection/hidden flags
//! - **Backend-agnostic passes**: the algorithms run over the [`session::EditSession`] trait
//! - **World-space geometry**: meshes placed by a 4x4 transform are handled throughout
//! - **File formats**: OBJ, PLY (with selection), STL
//!
//! ## Quick Start
//!
//! ```no_run
//! use contour_sew::prelude::*;
//!
//! let mut terrain: HalfEdgeMesh = contour_sew::io::load("terrain.ply").unwrap();
//! let road: HalfEdgeMesh = contour_sew::io::load("road.obj").unwrap();
//!
//! let summary = sew(&mut terrain, &road, &SewOptions::default().with_radius(2.5)).unwrap();
//! println!("aligned {}, relaxed {}", summary.align.aligned, summary.relax.affected);
//!
//! contour_sew::io::save(&terrain, "terrain_sewn.ply").unwrap();
//! ```
//!
//! ## Sewing a Loop Programmatically
//!
//! ```
//! use contour_sew::prelude::*;
//! use nalgebra::Point3;
//!
//! // A square loop floating at z = 3 with one vertex in its middle
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 3.0),
//!     Point3::new(4.0, 0.0, 3.0),
//!     Point3::new(4.0, 4.0, 3.0),
//!     Point3::new(0.0, 4.0, 3.0),
//!     Point3::new(2.0, 2.0, 3.0),
//! ];
//! let faces = vec![[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]];
//! let mut source: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! source.select_contour_vertices();
//!
//! // A flat reference patch at z = 0, slightly larger than the loop
//! let patch = vec![
//!     Point3::new(-1.0, -1.0, 0.0),
//!     Point3::new(5.0, -1.0, 0.0),
//!     Point3::new(5.0, 5.0, 0.0),
//!     Point3::new(-1.0, 5.0, 0.0),
//! ];
//! let reference: HalfEdgeMesh = build_from_triangles(&patch, &[[0, 1, 2], [0, 2, 3]]).unwrap();
//!
//! let summary = align(&mut source, &reference).unwrap();
//! assert_eq!(summary.aligned, 4);
//! for v in source.vertex_ids().take(4) {
//!     assert_eq!(source.position(v).z, 0.0);
//! }
//! // The center vertex was not selected
//! assert_eq!(source.position(VertexId::new(4)).z, 3.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;
pub mod session;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use contour_sew::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::{
        align, relax, sew, AlignSummary, Progress, RelaxOptions, RelaxSummary, SewOptions,
        SewSummary,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_edges, build_from_triangles, build_mesh, to_face_vertex, FaceId, HalfEdgeId,
        HalfEdgeMesh, MeshIndex, Vertex, VertexId,
    };
    pub use crate::session::{EditSession, MeshObject};
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::{Matrix4, Point3, Vector3};

    /// 5x5 grid of unit quads at height `z`.
    fn grid(z: f64) -> HalfEdgeMesh {
        let n = 5;
        let mut vertices = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, z));
            }
        }
        let mut quads = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                quads.push(vec![v00, v00 + 1, v00 + n + 2, v00 + n + 1]);
            }
        }
        build_mesh(&vertices, &quads, &[]).unwrap()
    }

    #[test]
    fn test_sew_grid_onto_tilted_reference() {
        let mut terrain = grid(2.0);
        let selected = terrain.select_contour_vertices();
        assert_eq!(selected, 20);

        // Reference: a larger square frame of wire edges on the plane z = x / 10,
        // shifted in world space.
        let corners = [
            Point3::new(-1.0, -1.0, -0.1),
            Point3::new(6.0, -1.0, 0.6),
            Point3::new(6.0, 6.0, 0.6),
            Point3::new(-1.0, 6.0, -0.1),
        ];
        let frame: HalfEdgeMesh =
            build_from_edges(&corners, &[[0, 1], [1, 2], [2, 3], [3, 0]]).unwrap();
        let reference = MeshObject::new("frame", frame)
            .with_transform(Matrix4::new_translation(&Vector3::new(0.0, 0.0, 1.0)));

        let summary = sew(&mut terrain, &reference, &SewOptions::default().with_radius(2.0)).unwrap();

        assert_eq!(summary.align.aligned, 20);
        assert!(summary.relax.affected > 0);
        assert!(terrain.is_valid());

        // Loop vertices sit within the frame's height range
        for v in terrain.vertex_ids() {
            let p = terrain.position(v);
            if terrain.vertex(v).selected {
                assert!(p.z >= 0.9 - 1e-9 && p.z <= 1.6 + 1e-9, "{:?}", p);
            }
        }
        // (2, 2) is at least 2 from the loop in plan view and at least 0.4
        // above it, so it lies outside the radius
        assert_eq!(terrain.position(VertexId::new(2 * 6 + 2)).z, 2.0);
    }
}
