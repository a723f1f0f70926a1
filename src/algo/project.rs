//! Nearest-segment lookup in plan view.
//!
//! A query point is matched against a set of 3D segments by looking at the
//! XY plane only: each segment's endpoints and the query are flattened, the
//! query is projected onto the infinite line through the flattened segment,
//! and the planar distance to that foot point decides. The height of the
//! match is then read back from the unflattened segment at the same ratio.
//!
//! # Selection rules
//!
//! Segments are visited in order and the first one is accepted provisionally.
//! A later segment replaces the current best when
//!
//! 1. its projection falls within the segment (`0 <= ratio <= 1`) and the
//!    current best's does not, regardless of distance; or
//! 2. both are within, or both are outside, their segments and it is strictly
//!    closer.
//!
//! An outside projection never replaces an inside one, and exact ties keep
//! the earlier segment. The returned ratio is not clamped, so when no
//! segment contains the projection the match is an extrapolation along the
//! closest segment line.
//!
//! # Example
//!
//! ```
//! use contour_sew::algo::project::{nearest, Segment};
//! use nalgebra::Point3;
//!
//! let segments = [Segment::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 2.0))];
//! let hit = nearest(&Point3::new(5.0, 3.0, 9.0), &segments).unwrap();
//!
//! assert!((hit.ratio - 0.5).abs() < 1e-12);
//! assert!((hit.distance - 3.0).abs() < 1e-12);
//! assert!((hit.point().z - 1.0).abs() < 1e-12);
//! ```

use nalgebra::{Point2, Point3};

/// A contour edge in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// First endpoint.
    pub start: Point3<f64>,
    /// Second endpoint.
    pub end: Point3<f64>,
}

impl Segment {
    /// Create a segment from its endpoints.
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    /// Point on the 3D line through the segment, `start + ratio * (end - start)`.
    #[inline]
    pub fn point_at(&self, ratio: f64) -> Point3<f64> {
        self.start + (self.end - self.start) * ratio
    }

    /// Project `point` onto the segment's line in the XY plane.
    ///
    /// Returns `(ratio, planar_distance)`. A segment that is a single point
    /// in plan view projects everything onto its start (`ratio = 0`).
    pub fn project_planar(&self, point: &Point3<f64>) -> (f64, f64) {
        let p0 = planar(&self.start);
        let q = planar(point);
        let dir = planar(&self.end) - p0;

        let len2 = dir.norm_squared();
        let ratio = if len2 > 0.0 {
            (q - p0).dot(&dir) / len2
        } else {
            0.0
        };

        let foot = p0 + dir * ratio;
        (ratio, (q - foot).norm())
    }
}

#[inline]
fn planar(p: &Point3<f64>) -> Point2<f64> {
    Point2::new(p.x, p.y)
}

/// The winning segment for a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Position of the segment in the input slice.
    pub index: usize,
    /// The segment itself.
    pub segment: Segment,
    /// Planar distance from the query to the projected foot point.
    pub distance: f64,
    /// Position of the foot point along the segment; unclamped.
    pub ratio: f64,
}

impl Projection {
    /// Whether the projection lands on the segment rather than its extension.
    #[inline]
    pub fn is_within_segment(&self) -> bool {
        (0.0..=1.0).contains(&self.ratio)
    }

    /// The 3D point on the segment line at [`ratio`](Self::ratio).
    #[inline]
    pub fn point(&self) -> Point3<f64> {
        self.segment.point_at(self.ratio)
    }

    fn beats(&self, other: &Projection) -> bool {
        match (self.is_within_segment(), other.is_within_segment()) {
            (true, false) => true,
            (false, true) => false,
            _ => self.distance < other.distance,
        }
    }
}

/// Find the segment whose plan-view projection best matches `point`.
///
/// Returns `None` only if `segments` is empty.
pub fn nearest(point: &Point3<f64>, segments: &[Segment]) -> Option<Projection> {
    let mut best: Option<Projection> = None;

    for (index, segment) in segments.iter().enumerate() {
        let (ratio, distance) = segment.project_planar(point);
        let candidate = Projection {
            index,
            segment: *segment,
            distance,
            ratio,
        };

        match &best {
            Some(current) if !candidate.beats(current) => {}
            _ => best = Some(candidate),
        }
    }

    best
}
