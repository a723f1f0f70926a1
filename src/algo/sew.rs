//! Sewing a loop onto a reference contour.
//!
//! Sewing is alignment followed by relaxation: the selected loop is dropped
//! onto the reference contour height, then the vertices around it are eased
//! toward the new loop so the surface joins without a step.
//!
//! # Example
//!
//! ```
//! use contour_sew::algo::sew::{sew, SewOptions};
//! use contour_sew::mesh::{build_from_edges, HalfEdgeMesh, VertexId};
//! use nalgebra::Point3;
//!
//! // A loop vertex at height 5 and an unselected neighbor beside it
//! let mut source: HalfEdgeMesh = build_from_edges(
//!     &[Point3::new(0.0, 0.0, 5.0), Point3::new(0.0, 0.5, 5.0)],
//!     &[[0, 1]],
//! )
//! .unwrap();
//! source.select_vertex(VertexId::new(0), true);
//!
//! let reference: HalfEdgeMesh = build_from_edges(
//!     &[Point3::new(-10.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)],
//!     &[[0, 1]],
//! )
//! .unwrap();
//!
//! let summary = sew(&mut source, &reference, &SewOptions::default().with_radius(6.0)).unwrap();
//! assert_eq!(summary.align.aligned, 1);
//! assert_eq!(source.position(VertexId::new(0)).z, 0.0);
//! ```

use crate::error::Result;
use crate::session::EditSession;

use super::align::{align_loop, AlignSummary};
use super::falloff::{relax_neighbors_of_selection, RelaxOptions, RelaxSummary, DEFAULT_RADIUS};
use super::Progress;

/// Options for [`sew`].
#[derive(Debug, Clone)]
pub struct SewOptions {
    /// Relaxation radius in world units (default: [`DEFAULT_RADIUS`]).
    pub radius: f64,

    /// Whether to relax the neighbors after aligning (default: true).
    pub relax: bool,

    /// Whether to relax on the rayon thread pool (default: false).
    pub parallel: bool,
}

impl Default for SewOptions {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            relax: true,
            parallel: false,
        }
    }
}

impl SewOptions {
    /// Set the relaxation radius.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Set whether to relax the neighbors.
    pub fn with_relax(mut self, relax: bool) -> Self {
        self.relax = relax;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn relax_options(&self) -> RelaxOptions {
        RelaxOptions::default()
            .with_radius(self.radius)
            .with_parallel(self.parallel)
    }
}

/// Outcome of a sew.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SewSummary {
    /// Alignment phase.
    pub align: AlignSummary,
    /// Relaxation phase; empty when relaxation was skipped.
    pub relax: RelaxSummary,
}

/// Align the selected loop of `source` to `reference`, then relax around it.
pub fn sew<S, R>(source: &mut S, reference: &R, options: &SewOptions) -> Result<SewSummary>
where
    S: EditSession + ?Sized,
    R: EditSession + ?Sized,
{
    sew_with_progress(source, reference, options, &Progress::none())
}

/// Sew with progress reporting.
///
/// Alignment covers the first half of the reported range and relaxation
/// the second.
pub fn sew_with_progress<S, R>(
    source: &mut S,
    reference: &R,
    options: &SewOptions,
    progress: &Progress,
) -> Result<SewSummary>
where
    S: EditSession + ?Sized,
    R: EditSession + ?Sized,
{
    let align = align_loop(source, reference, &|current, total| {
        progress.report_sub(current, total, 0, 2, "Aligning loop")
    })?;

    let relax = if options.relax {
        relax_neighbors_of_selection(source, &options.relax_options(), &|current, total| {
            progress.report_sub(current, total, 1, 2, "Relaxing neighbors")
        })?
    } else {
        RelaxSummary::default()
    };

    log::info!(
        "sewed {} loop vertices (max shift {:.6}), relaxed {} neighbors",
        align.aligned,
        align.max_shift,
        relax.affected
    );

    Ok(SewSummary { align, relax })
}

/// Move the selected vertices of `source` vertically onto the contour of
/// `reference`.
pub fn align_loop_to_contour<S, R>(source: &mut S, reference: &R) -> Result<AlignSummary>
where
    S: EditSession + ?Sized,
    R: EditSession + ?Sized,
{
    align_loop(source, reference, &|_, _| {})
}

/// Relax the vertices within `radius` of the selection of `source`.
pub fn relax_neighbors<S: EditSession + ?Sized>(source: &mut S, radius: f64) -> Result<RelaxSummary> {
    relax_neighbors_of_selection(
        source,
        &RelaxOptions::default().with_radius(radius),
        &|_, _| {},
    )
}
