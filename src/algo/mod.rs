//! Contour sewing algorithms.
//!
//! This module contains the passes that sew a selected vertex loop onto the
//! open contour of a reference mesh:
//!
//! - **Boundary**: contour edge extraction
//! - **Projection**: nearest contour segment in plan view
//! - **Alignment**: moving the loop vertically onto the contour
//! - **Falloff**: relaxing the vertices around the moved loop
//! - **Sew**: alignment followed by relaxation

pub mod align;
pub mod boundary;
pub mod falloff;
pub mod progress;
pub mod project;
pub mod sew;

pub use align::{align, align_with_progress, AlignSummary};
pub use boundary::contour_segments;
pub use falloff::{falloff_height, relax, relax_with_progress, RelaxOptions, RelaxSummary, DEFAULT_RADIUS};
pub use progress::Progress;
pub use project::{nearest, Projection, Segment};
pub use sew::{align_loop_to_contour, relax_neighbors, sew, sew_with_progress, SewOptions, SewSummary};
