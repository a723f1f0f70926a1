//! Error types for contour-sew.
//!
//! Geometric edge cases (empty selection, empty contour, non-positive radius)
//! are not errors: the algorithms absorb them and leave the mesh untouched.
//! What surfaces here are construction failures, file failures, and
//! violations of the backend's integrity.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has neither faces nor wire edges.
    #[error("mesh has no faces or edges")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A wire edge references an invalid vertex index.
    #[error("edge {edge} references invalid vertex index {vertex}")]
    InvalidEdgeIndex {
        /// The wire edge index.
        edge: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices or fewer than three corners.
    #[error("face {face} is degenerate")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A wire edge connects a vertex to itself.
    #[error("edge {edge} is degenerate (both ends on the same vertex)")]
    DegenerateEdge {
        /// The wire edge index.
        edge: usize,
    },

    /// A vertex index is not known to the editing backend.
    ///
    /// This means the caller's view of the mesh and the backend's view have
    /// gone out of sync, so it is always propagated.
    #[error("vertex index {index} out of range (mesh has {len} vertices)")]
    VertexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of vertices the backend holds.
        len: usize,
    },

    /// A world transform has no inverse, so world-space edits cannot be
    /// written back to local coordinates.
    #[error("world transform is singular and cannot be inverted")]
    SingularTransform,

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a load error for `path`.
    pub(crate) fn load(path: &std::path::Path, message: impl Into<String>) -> Self {
        MeshError::LoadError {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
