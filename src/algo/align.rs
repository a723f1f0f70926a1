//! Loop alignment.
//!
//! Every selected vertex of the source is matched in plan view against the
//! contour of the reference (see [`project`](super::project)) and moved
//! vertically onto the matched contour height. World X and Y never change,
//! so the loop keeps its outline and only its height profile follows the
//! reference.

use crate::error::Result;
use crate::session::{EditSession, WorldFrame};

use super::boundary::contour_segments;
use super::project::nearest;
use super::Progress;

/// Outcome of an alignment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AlignSummary {
    /// Number of selected vertices that were matched to the contour.
    pub aligned: usize,
    /// Largest absolute change in world Z over the aligned vertices.
    pub max_shift: f64,
}

/// Align the selected loop of `source` to the contour of `reference`.
///
/// An empty selection or a reference without contour edges leaves the
/// source untouched.
///
/// # Errors
/// Backend integrity errors ([`MeshError::VertexOutOfRange`]) and
/// [`MeshError::SingularTransform`] when the source cannot be written back.
///
/// [`MeshError::VertexOutOfRange`]: crate::error::MeshError::VertexOutOfRange
/// [`MeshError::SingularTransform`]: crate::error::MeshError::SingularTransform
///
/// # Example
///
/// ```
/// use contour_sew::algo::align::align;
/// use contour_sew::mesh::{build_from_edges, HalfEdgeMesh, VertexId};
/// use nalgebra::Point3;
///
/// let mut source: HalfEdgeMesh =
///     build_from_edges(&[Point3::new(0.0, 0.0, 5.0), Point3::new(0.0, 3.0, 5.0)], &[[0, 1]]).unwrap();
/// source.select_vertex(VertexId::new(0), true);
///
/// let reference: HalfEdgeMesh =
///     build_from_edges(&[Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)], &[[0, 1]]).unwrap();
///
/// let summary = align(&mut source, &reference).unwrap();
/// assert_eq!(summary.aligned, 1);
/// assert_eq!(*source.position(VertexId::new(0)), Point3::new(0.0, 0.0, 0.0));
/// assert_eq!(*source.position(VertexId::new(1)), Point3::new(0.0, 3.0, 5.0));
/// ```
pub fn align<S, R>(source: &mut S, reference: &R) -> Result<AlignSummary>
where
    S: EditSession + ?Sized,
    R: EditSession + ?Sized,
{
    align_loop(source, reference, &|_, _| {})
}

/// Align with progress reporting, one step per selected vertex.
pub fn align_with_progress<S, R>(
    source: &mut S,
    reference: &R,
    progress: &Progress,
) -> Result<AlignSummary>
where
    S: EditSession + ?Sized,
    R: EditSession + ?Sized,
{
    align_loop(source, reference, &|current, total| {
        progress.report(current, total, "Aligning loop")
    })
}

pub(crate) fn align_loop<S, R>(
    source: &mut S,
    reference: &R,
    report: &dyn Fn(usize, usize),
) -> Result<AlignSummary>
where
    S: EditSession + ?Sized,
    R: EditSession + ?Sized,
{
    let mut summary = AlignSummary::default();

    let selected: Vec<_> = source
        .read_vertices()
        .into_iter()
        .filter(|v| v.selected)
        .collect();
    if selected.is_empty() {
        log::warn!("no vertices selected; nothing to align");
        return Ok(summary);
    }

    let segments = contour_segments(reference)?;
    if segments.is_empty() {
        log::warn!("reference mesh has no contour edges; loop left unchanged");
        return Ok(summary);
    }

    let frame = WorldFrame::of(&*source);
    let total = selected.len();

    for (i, vertex) in selected.iter().enumerate() {
        let world = frame.to_world(&vertex.position);

        if let Some(hit) = nearest(&world, &segments) {
            let target = hit.point();
            frame.write_world_z(source, vertex.index, &world, target.z)?;

            summary.aligned += 1;
            summary.max_shift = summary.max_shift.max((target.z - world.z).abs());
        }

        report(i + 1, total);
    }

    log::debug!(
        "aligned {} vertices against {} contour segments (max shift {:.6})",
        summary.aligned,
        segments.len(),
        summary.max_shift
    );

    Ok(summary)
}
