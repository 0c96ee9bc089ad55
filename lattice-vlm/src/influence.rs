//! Biot-Savart velocity kernels for ring vortices
//!
//! Everything the solver knows about the flow passes through the velocity
//! induced by straight vortex filaments. A bound or wake element is a
//! [`RingVortex`]: four filaments in winding order carrying a common
//! circulation. The kernel is singular on the filament axis; evaluations
//! closer than a configurable core radius return zero velocity and are
//! counted, so a step can report how often regularization fired without
//! aborting.
//!
//! Batch entry points are row-parallel over evaluation points. They are
//! pure index-wise maps, so results do not depend on the thread count.

use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use aero_lattice_common::Vec3;

/// Default finite-core radius [m]
pub const DEFAULT_CORE_RADIUS: f64 = 3.0e-6;

const FOUR_PI: f64 = 4.0 * std::f64::consts::PI;

/// Tally of regularized kernel evaluations, shared across rayon workers
#[derive(Debug, Default)]
pub struct KernelCounters {
    regularized: AtomicUsize,
}

impl KernelCounters {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&self) {
        self.regularized.fetch_add(1, Ordering::Relaxed);
    }

    /// Read and reset the tally
    pub fn take(&self) -> usize {
        self.regularized.swap(0, Ordering::Relaxed)
    }
}

/// Velocity induced at `point` by a straight filament of unit circulation
///
/// Circulation flows from `start` to `end`, right-handed. Returns zero when
/// `point` lies within `core_radius` of the filament axis or its endpoints;
/// such evaluations bump `counters` when one is supplied.
pub fn filament_velocity(
    start: &Vec3,
    end: &Vec3,
    point: &Vec3,
    core_radius: f64,
    counters: Option<&KernelCounters>,
) -> Vec3 {
    let r0 = *end - *start;
    // Collapsed legs induce nothing (mesh degeneracy, not a flow event)
    if r0.length_squared() < 1e-24 {
        return Vec3::zero();
    }

    let r1 = *point - *start;
    let r2 = *point - *end;
    let r1_len = r1.length();
    let r2_len = r2.length();
    if r1_len < core_radius || r2_len < core_radius {
        if let Some(c) = counters {
            c.bump();
        }
        return Vec3::zero();
    }

    let cross = r1.cross(&r2);
    let cross_sq = cross.length_squared();
    // |cross| / |r0| is the distance from the point to the filament axis
    let core_sq = core_radius * core_radius * r0.length_squared();
    if cross_sq < core_sq {
        if let Some(c) = counters {
            c.bump();
        }
        return Vec3::zero();
    }

    let projection = r0.dot(&r1.scale(1.0 / r1_len)) - r0.dot(&r2.scale(1.0 / r2_len));
    cross.scale(projection / (FOUR_PI * cross_sq))
}

/// A quadrilateral vortex ring: four filaments sharing one circulation
///
/// Winding runs front-left, front-right, back-right, back-left, so positive
/// circulation induces downwash through a ring whose normal points up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RingVortex {
    pub front_left: Vec3,
    pub front_right: Vec3,
    pub back_left: Vec3,
    pub back_right: Vec3,
}

impl RingVortex {
    pub fn new(front_left: Vec3, front_right: Vec3, back_left: Vec3, back_right: Vec3) -> Self {
        Self {
            front_left,
            front_right,
            back_left,
            back_right,
        }
    }

    /// The four filaments in winding order
    pub fn legs(&self) -> [(Vec3, Vec3); 4] {
        [
            (self.front_left, self.front_right),
            (self.front_right, self.back_right),
            (self.back_right, self.back_left),
            (self.back_left, self.front_left),
        ]
    }

    /// Corner vertices in storage order
    pub fn vertices(&self) -> [Vec3; 4] {
        [
            self.front_left,
            self.front_right,
            self.back_left,
            self.back_right,
        ]
    }

    /// Velocity induced at `point` per unit circulation
    pub fn unit_velocity_at(
        &self,
        point: &Vec3,
        core_radius: f64,
        counters: Option<&KernelCounters>,
    ) -> Vec3 {
        let mut v = Vec3::zero();
        for (start, end) in self.legs() {
            v += filament_velocity(&start, &end, point, core_radius, counters);
        }
        v
    }

    /// Velocity induced at `point` by this ring carrying `gamma`
    pub fn velocity_at(
        &self,
        point: &Vec3,
        gamma: f64,
        core_radius: f64,
        counters: Option<&KernelCounters>,
    ) -> Vec3 {
        self.unit_velocity_at(point, core_radius, counters).scale(gamma)
    }
}

/// Assemble the normal-wash influence matrix
///
/// `a[[i, j]]` is the velocity induced by ring `j` at collocation point `i`
/// under unit circulation, projected on normal `i`. Rows are computed in
/// parallel; each row is a sequential scan over rings so the sum order is
/// fixed.
pub fn influence_matrix(
    rings: &[RingVortex],
    collocations: &[Vec3],
    normals: &[Vec3],
    core_radius: f64,
    counters: &KernelCounters,
) -> Array2<f64> {
    let n = collocations.len();
    let m = rings.len();

    let rows: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let point = collocations[i];
            let normal = normals[i];
            rings
                .iter()
                .map(|ring| {
                    ring.unit_velocity_at(&point, core_radius, Some(counters))
                        .dot(&normal)
                })
                .collect()
        })
        .collect();

    let entries: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n, m), entries).expect("row-major assembly matches matrix shape")
}

/// Total velocity induced by a set of rings at each evaluation point
///
/// `rings` and `gammas` run in lockstep. Parallel over points, sequential
/// over rings within a point.
pub fn induced_velocities(
    points: &[Vec3],
    rings: &[RingVortex],
    gammas: &[f64],
    core_radius: f64,
    counters: Option<&KernelCounters>,
) -> Vec<Vec3> {
    debug_assert_eq!(rings.len(), gammas.len());
    points
        .par_iter()
        .map(|point| {
            let mut v = Vec3::zero();
            for (ring, &gamma) in rings.iter().zip(gammas.iter()) {
                v += ring.velocity_at(point, gamma, core_radius, counters);
            }
            v
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_filament_against_analytic_midpoint() {
        // Segment of length 2 along y, point at unit distance from its
        // midpoint: |v| = (1 / 4 pi d) * 2 L / sqrt(L^2 + d^2)
        let start = Vec3::new(0.0, -1.0, 0.0);
        let end = Vec3::new(0.0, 1.0, 0.0);
        let point = Vec3::new(1.0, 0.0, 0.0);
        let v = filament_velocity(&start, &end, &point, 1e-9, None);
        let expected = 2.0_f64.sqrt() / FOUR_PI;
        assert_relative_eq!(v.z, -expected, epsilon = 1e-12);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_point_on_axis_is_regularized() {
        let start = Vec3::new(0.0, 0.0, 0.0);
        let end = Vec3::new(1.0, 0.0, 0.0);
        let counters = KernelCounters::new();

        let on_axis = Vec3::new(0.5, 0.0, 0.0);
        let v = filament_velocity(&start, &end, &on_axis, 1e-6, Some(&counters));
        assert_relative_eq!(v.length(), 0.0);

        let near_axis = Vec3::new(0.5, 1e-8, 0.0);
        let v = filament_velocity(&start, &end, &near_axis, 1e-6, Some(&counters));
        assert_relative_eq!(v.length(), 0.0);

        assert_eq!(counters.take(), 2);
        assert_eq!(counters.take(), 0);
    }

    #[test]
    fn test_just_outside_core_is_finite() {
        let start = Vec3::new(0.0, 0.0, 0.0);
        let end = Vec3::new(1.0, 0.0, 0.0);
        let point = Vec3::new(0.5, 1e-3, 0.0);
        let v = filament_velocity(&start, &end, &point, 1e-6, None);
        assert!(v.length() > 0.0);
        assert!(v.length().is_finite());
    }

    fn flat_ring() -> RingVortex {
        RingVortex::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_positive_circulation_induces_downwash() {
        let ring = flat_ring();
        let center = Vec3::new(0.5, 0.5, 0.0);
        let v = ring.unit_velocity_at(&center, 1e-9, None);
        assert!(v.z < 0.0);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(v.y, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_self_influence_diagonal_is_negative() {
        let ring = flat_ring();
        let collocations = [Vec3::new(0.5, 0.5, 0.0)];
        let normals = [Vec3::new(0.0, 0.0, 1.0)];
        let counters = KernelCounters::new();
        let a = influence_matrix(&[ring], &collocations, &normals, 1e-9, &counters);
        assert_eq!(a.shape(), &[1, 1]);
        assert!(a[[0, 0]] < 0.0);
    }

    #[test]
    fn test_velocity_scales_with_circulation() {
        let ring = flat_ring();
        let p = Vec3::new(0.5, 0.5, 0.7);
        let v1 = ring.velocity_at(&p, 2.0, 1e-9, None);
        let v2 = ring.unit_velocity_at(&p, 1e-9, None);
        assert_relative_eq!(v1.x, 2.0 * v2.x, epsilon = 1e-14);
        assert_relative_eq!(v1.y, 2.0 * v2.y, epsilon = 1e-14);
        assert_relative_eq!(v1.z, 2.0 * v2.z, epsilon = 1e-14);
    }

    #[test]
    fn test_induced_velocities_match_direct_sum() {
        let rings = vec![
            flat_ring(),
            RingVortex::new(
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 2.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(1.0, 2.0, 0.0),
            ),
        ];
        let gammas = vec![1.5, -0.5];
        let points = vec![Vec3::new(0.3, 0.9, 0.4), Vec3::new(2.0, 0.0, -0.2)];

        let batch = induced_velocities(&points, &rings, &gammas, 1e-9, None);
        for (point, v) in points.iter().zip(batch.iter()) {
            let mut direct = Vec3::zero();
            for (ring, &g) in rings.iter().zip(gammas.iter()) {
                direct += ring.velocity_at(point, g, 1e-9, None);
            }
            assert_relative_eq!(v.x, direct.x, epsilon = 1e-14);
            assert_relative_eq!(v.y, direct.y, epsilon = 1e-14);
            assert_relative_eq!(v.z, direct.z, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_collapsed_leg_is_silent() {
        let counters = KernelCounters::new();
        let p = Vec3::new(0.2, 0.3, 0.4);
        let start = Vec3::new(1.0, 1.0, 1.0);
        let v = filament_velocity(&start, &start, &p, 1e-6, Some(&counters));
        assert_relative_eq!(v.length(), 0.0);
        assert_eq!(counters.take(), 0);
    }
}
