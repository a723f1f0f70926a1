//! Mesh file I/O.
//!
//! This module provides functions for loading and saving meshes in various formats.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | Wavefront OBJ | `.obj` | ✓ | ✓ | Polygons and `l` wire edges |
//! | PLY | `.ply` | ✓ | ✓ | Keeps vertex `selected`/`hidden` flags |
//! | STL | `.stl` | ✓ | ✓ | Binary and ASCII; triangles only |
//!
//! Only PLY stores the vertex selection, so a loop picked in an editor
//! survives the round trip through a file.
//!
//! # Usage
//!
//! ```no_run
//! use contour_sew::io::{load, save};
//! use contour_sew::mesh::HalfEdgeMesh;
//!
//! // Load with automatic format detection
//! let mesh: HalfEdgeMesh = load("terrain.ply").unwrap();
//!
//! // Save with automatic format detection
//! save(&mesh, "terrain.obj").unwrap();
//! ```
//!
//! Each format module also reads from and writes to any reader or writer:
//!
//! ```
//! use contour_sew::io::obj;
//! use contour_sew::mesh::HalfEdgeMesh;
//!
//! let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nl 1 2 3\n";
//! let mesh: HalfEdgeMesh = obj::from_reader(text.as_bytes()).unwrap();
//! assert_eq!(mesh.num_wire_edges(), 2);
//! ```

pub mod obj;
pub mod ply;
pub mod stl;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ format.
    Obj,
    /// PLY (Stanford polygon) format.
    Ply,
    /// STL (stereolithography) format.
    Stl,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            "ply" => Some(Format::Ply),
            "stl" => Some(Format::Stl),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    fn of(path: &Path) -> Result<Format> {
        Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)")
                .to_string(),
        })
    }

    /// Whether the format stores vertex selection.
    pub fn keeps_selection(self) -> bool {
        matches!(self, Format::Ply)
    }
}

/// Load a mesh from a file with automatic format detection.
///
/// The format is determined by the file extension.
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let mesh = match Format::of(path)? {
        Format::Obj => obj::load(path),
        Format::Ply => ply::load(path),
        Format::Stl => stl::load(path),
    }?;

    log::debug!(
        "loaded {}: {} vertices, {} faces, {} wire edges",
        path.display(),
        mesh.num_vertices(),
        mesh.num_faces(),
        mesh.num_wire_edges()
    );
    Ok(mesh)
}

/// Save a mesh to a file with automatic format detection.
///
/// The format is determined by the file extension.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    match Format::of(path)? {
        Format::Obj => obj::save(mesh, path),
        Format::Ply => ply::save(mesh, path),
        Format::Stl => stl::save(mesh, path),
    }
}
