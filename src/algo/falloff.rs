//! Radius-based neighbor relaxation.
//!
//! After a loop has been moved, the vertices around it are pulled toward the
//! new loop height with a linear falloff, so the surrounding surface follows
//! the loop instead of leaving a step.
//!
//! # Algorithm
//!
//! 1. Index the selected (loop) vertices twice: by world `(x, y, z)` for the
//!    neighborhood test and by world `(x, y)` for the falloff distance.
//! 2. A vertex that is neither selected nor hidden is a neighbor if some loop
//!    vertex lies within `radius` of it in 3D.
//! 3. For each neighbor, find the loop vertex nearest in plan view at planar
//!    distance `d`, and set
//!    `z' = z_loop - (z_loop - z) * |d / radius|`.
//!
//! A neighbor directly above or below a loop vertex (`d = 0`) lands on the
//! loop height; one at `d = radius` keeps its height. The factor is not
//! clamped.
//!
//! # Example
//!
//! ```
//! use contour_sew::algo::falloff::{relax, RelaxOptions};
//! use contour_sew::mesh::{build_from_edges, HalfEdgeMesh, VertexId};
//! use nalgebra::Point3;
//!
//! let points = [Point3::new(0.0, 0.0, 0.0), Point3::new(0.5, 0.0, 1.0)];
//! let mut mesh: HalfEdgeMesh = build_from_edges(&points, &[[0, 1]]).unwrap();
//! mesh.select_vertex(VertexId::new(0), true);
//!
//! let summary = relax(&mut mesh, &RelaxOptions::default().with_radius(2.0)).unwrap();
//! assert_eq!(summary.affected, 1);
//! assert!((mesh.position(VertexId::new(1)).z - 0.25).abs() < 1e-12);
//! ```

use nalgebra::Point3;
use rayon::prelude::*;
use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::error::Result;
use crate::session::{EditSession, WorldFrame};

use super::Progress;

/// Default relaxation radius, in world units.
pub const DEFAULT_RADIUS: f64 = 1.0;

/// Options for neighbor relaxation.
#[derive(Debug, Clone)]
pub struct RelaxOptions {
    /// Neighborhood radius in world units. Values that are not strictly
    /// positive make the pass a no-op.
    pub radius: f64,

    /// Whether to compute the new heights on the rayon thread pool
    /// (default: false). The result is identical either way.
    pub parallel: bool,
}

impl Default for RelaxOptions {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            parallel: false,
        }
    }
}

impl RelaxOptions {
    /// Set the neighborhood radius.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Outcome of a relaxation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaxSummary {
    /// Number of neighbor vertices whose height was recomputed.
    pub affected: usize,
}

/// Height of a neighbor after falloff toward a loop vertex.
///
/// `anchor_z` is the loop vertex height, `z` the neighbor's current height
/// and `planar_distance` their distance in plan view.
#[inline]
pub fn falloff_height(anchor_z: f64, z: f64, planar_distance: f64, radius: f64) -> f64 {
    anchor_z - (anchor_z - z) * (planar_distance / radius).abs()
}

/// Relax the unselected, visible vertices around the selection.
///
/// # Errors
/// Backend integrity errors and [`MeshError::SingularTransform`] when a
/// moved vertex cannot be written back.
///
/// [`MeshError::SingularTransform`]: crate::error::MeshError::SingularTransform
pub fn relax<S: EditSession + ?Sized>(session: &mut S, options: &RelaxOptions) -> Result<RelaxSummary> {
    relax_neighbors_of_selection(session, options, &|_, _| {})
}

/// Relax with progress reporting, one step per moved vertex.
pub fn relax_with_progress<S: EditSession + ?Sized>(
    session: &mut S,
    options: &RelaxOptions,
    progress: &Progress,
) -> Result<RelaxSummary> {
    relax_neighbors_of_selection(session, options, &|current, total| {
        progress.report(current, total, "Relaxing neighbors")
    })
}

pub(crate) fn relax_neighbors_of_selection<S: EditSession + ?Sized>(
    session: &mut S,
    options: &RelaxOptions,
    report: &dyn Fn(usize, usize),
) -> Result<RelaxSummary> {
    let radius = options.radius;
    // Also rejects NaN
    if !(radius > 0.0) {
        log::warn!("relax radius {} is not positive; nothing to do", radius);
        return Ok(RelaxSummary::default());
    }

    let vertices = session.read_vertices();
    let frame = WorldFrame::of(&*session);
    let world: Vec<Point3<f64>> = vertices
        .iter()
        .map(|v| frame.to_world(&v.position))
        .collect();

    let loop_slots: Vec<usize> = (0..vertices.len()).filter(|&k| vertices[k].selected).collect();
    if loop_slots.is_empty() {
        log::warn!("no vertices selected; nothing to relax");
        return Ok(RelaxSummary::default());
    }

    let spatial: RTree<GeomWithData<[f64; 3], usize>> = RTree::bulk_load(
        loop_slots
            .iter()
            .map(|&k| GeomWithData::new([world[k].x, world[k].y, world[k].z], k))
            .collect(),
    );
    let planar: RTree<GeomWithData<[f64; 2], usize>> = RTree::bulk_load(
        loop_slots
            .iter()
            .map(|&k| GeomWithData::new([world[k].x, world[k].y], k))
            .collect(),
    );

    let candidates: Vec<usize> = (0..vertices.len())
        .filter(|&k| !vertices[k].selected && !vertices[k].hidden)
        .collect();

    let radius_2 = radius * radius;
    let relaxed_height = |k: usize| -> Option<(usize, f64)> {
        let p = &world[k];
        spatial
            .locate_within_distance([p.x, p.y, p.z], radius_2)
            .next()?;

        let anchor = &world[planar.nearest_neighbor(&[p.x, p.y])?.data];
        let planar_distance = (anchor.x - p.x).hypot(anchor.y - p.y);
        Some((k, falloff_height(anchor.z, p.z, planar_distance, radius)))
    };

    let updates: Vec<(usize, f64)> = if options.parallel {
        candidates
            .par_iter()
            .filter_map(|&k| relaxed_height(k))
            .collect()
    } else {
        candidates
            .iter()
            .filter_map(|&k| relaxed_height(k))
            .collect()
    };

    let total = updates.len();
    for (i, &(k, z)) in updates.iter().enumerate() {
        frame.write_world_z(session, vertices[k].index, &world[k], z)?;
        report(i + 1, total);
    }

    log::debug!(
        "relaxed {} of {} candidate vertices around {} loop vertices (radius {})",
        total,
        candidates.len(),
        loop_slots.len(),
        radius
    );

    Ok(RelaxSummary { affected: total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_mesh, HalfEdgeMesh, VertexId};
    use nalgebra::{Matrix4, Vector3};

    /// Selected unit square at z = 0 followed by the given extra vertices.
    fn square_with(extra: &[Point3<f64>]) -> HalfEdgeMesh {
        let mut points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        points.extend_from_slice(extra);

        let edges: Vec<[usize; 2]> = (0..points.len()).map(|i| [i, (i + 1) % points.len()]).collect();
        let mut mesh: HalfEdgeMesh = build_mesh(&points, &[], &edges).unwrap();
        for i in 0..4 {
            mesh.select_vertex(VertexId::new(i), true);
        }
        mesh
    }

    fn z_of(mesh: &HalfEdgeMesh, i: usize) -> f64 {
        mesh.position(VertexId::new(i)).z
    }

    #[test]
    fn test_falloff_height() {
        // Unit-square loop at z = 0, neighbor at (0.5, 0.5, 3), radius 2
        let d = 0.5_f64.hypot(0.5);
        let z = falloff_height(0.0, 3.0, d, 2.0);
        assert!((z - 1.0607).abs() < 1e-4);

        assert_eq!(falloff_height(2.0, 7.0, 0.0, 1.5), 2.0);
        assert_eq!(falloff_height(2.0, 7.0, 1.5, 1.5), 7.0);
        // Beyond the radius the factor exceeds one and overshoots
        assert_eq!(falloff_height(0.0, 1.0, 3.0, 1.5), 2.0);
    }

    #[test]
    fn test_neighbor_inside_square() {
        let mut mesh = square_with(&[Point3::new(0.5, 0.5, 1.0)]);

        let summary = relax(&mut mesh, &RelaxOptions::default().with_radius(2.0)).unwrap();

        assert_eq!(summary.affected, 1);
        let expected = 1.0 * 0.5_f64.hypot(0.5) / 2.0;
        assert!((z_of(&mesh, 4) - expected).abs() < 1e-12);
        for i in 0..4 {
            assert_eq!(z_of(&mesh, i), 0.0);
        }
    }

    #[test]
    fn test_eligibility_uses_3d_distance() {
        // In plan view the vertex is well inside the radius, but it sits
        // 3 units above the loop.
        let mut mesh = square_with(&[Point3::new(0.5, 0.5, 3.0)]);

        let summary = relax(&mut mesh, &RelaxOptions::default().with_radius(2.0)).unwrap();

        assert_eq!(summary.affected, 0);
        assert_eq!(z_of(&mesh, 4), 3.0);
    }

    #[test]
    fn test_directly_above_loop_snaps() {
        let mut mesh = square_with(&[Point3::new(1.0, 1.0, 0.4)]);

        relax(&mut mesh, &RelaxOptions::default()).unwrap();

        assert_eq!(z_of(&mesh, 4), 0.0);
    }

    #[test]
    fn test_at_radius_unchanged() {
        // Loop vertex A at the origin and B at (2, 2, 4); the neighbor at
        // (2, 0, 4) is 2 away from both in plan view and 2 from B in 3D.
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 4.0),
            Point3::new(2.0, 0.0, 4.0),
        ];
        let mut mesh: HalfEdgeMesh = build_mesh(&points, &[], &[[0, 1], [1, 2]]).unwrap();
        mesh.select_vertex(VertexId::new(0), true);
        mesh.select_vertex(VertexId::new(1), true);

        let summary = relax(&mut mesh, &RelaxOptions::default().with_radius(2.0)).unwrap();

        assert_eq!(summary.affected, 1);
        assert_eq!(z_of(&mesh, 2), 4.0);
    }

    #[test]
    fn test_far_and_hidden_vertices_untouched() {
        let mut mesh = square_with(&[Point3::new(0.5, 0.5, 0.5), Point3::new(9.0, 9.0, 1.0)]);
        mesh.hide_vertex(VertexId::new(4), true);

        let summary = relax(&mut mesh, &RelaxOptions::default()).unwrap();

        assert_eq!(summary.affected, 0);
        assert_eq!(z_of(&mesh, 4), 0.5);
        assert_eq!(z_of(&mesh, 5), 1.0);
    }

    #[test]
    fn test_invalid_radius_is_noop() {
        for radius in [0.0, -1.0, f64::NAN] {
            let mut mesh = square_with(&[Point3::new(0.5, 0.0, 0.1)]);
            let summary = relax(&mut mesh, &RelaxOptions::default().with_radius(radius)).unwrap();
            assert_eq!(summary.affected, 0);
            assert_eq!(z_of(&mesh, 4), 0.1);
        }
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let mut mesh = square_with(&[Point3::new(0.5, 0.0, 0.1)]);
        mesh.deselect_all();

        let summary = relax(&mut mesh, &RelaxOptions::default()).unwrap();
        assert_eq!(summary.affected, 0);
        assert_eq!(z_of(&mesh, 4), 0.1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut extra = Vec::new();
        for i in 0..20 {
            for j in 0..20 {
                let x = -1.0 + i as f64 * 0.15;
                let y = -1.0 + j as f64 * 0.15;
                extra.push(Point3::new(x, y, ((i * 7 + j * 3) % 5) as f64 * 0.2));
            }
        }

        let mut sequential = square_with(&extra);
        let mut parallel = sequential.clone();

        let options = RelaxOptions::default().with_radius(1.2);
        let a = relax(&mut sequential, &options).unwrap();
        let b = relax(&mut parallel, &options.clone().with_parallel(true)).unwrap();

        assert_eq!(a, b);
        assert!(a.affected > 0);
        for v in sequential.vertex_ids() {
            assert_eq!(sequential.position(v), parallel.position(v));
        }
    }

    #[test]
    fn test_relax_in_world_space() {
        use crate::session::MeshObject;

        // Lifting the whole object must not change the local result.
        let mut local = square_with(&[Point3::new(0.5, 0.0, 1.0)]);
        let mut lifted = MeshObject::new("lifted", local.clone())
            .with_transform(Matrix4::new_translation(&Vector3::new(0.0, 0.0, 8.0)));

        relax(&mut local, &RelaxOptions::default().with_radius(2.0)).unwrap();
        relax(&mut lifted, &RelaxOptions::default().with_radius(2.0)).unwrap();

        let a = z_of(&local, 4);
        let b = lifted.mesh.position(VertexId::new(4)).z;
        assert!((a - 0.25).abs() < 1e-12);
        assert!((a - b).abs() < 1e-12);
    }
}
