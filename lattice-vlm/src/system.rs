//! Per-step normal-wash balance system
//!
//! One flow-tangency equation per collocation point: the normal velocity
//! induced by all bound rings must cancel the normal component of
//! everything else the panel sees (freestream, wake induction, and the
//! apparent wind from the surface's own motion). The Kutta condition is
//! implicit in the ring layout; no extra equations or iteration.

use ndarray::{Array1, Array2};

use crate::error::SolverError;
use crate::influence::{influence_matrix, KernelCounters, RingVortex};
use aero_lattice_common::Vec3;
use aero_lattice_solvers::lu_solve;

/// Dense influence system for one time step
#[derive(Debug, Clone)]
pub struct InfluenceSystem {
    /// Unit-circulation normal-wash coefficients
    pub matrix: Array2<f64>,
    /// Negative normal component of the known onset flow
    pub rhs: Array1<f64>,
}

impl InfluenceSystem {
    /// Assemble the matrix and right-hand side for the current pose
    ///
    /// `wake_induced` and `surface_velocities` are per-collocation-point;
    /// the apparent flow at panel i is
    /// `freestream + wake_induced[i] - surface_velocities[i]`.
    pub fn assemble(
        rings: &[RingVortex],
        collocations: &[Vec3],
        normals: &[Vec3],
        freestream: &Vec3,
        wake_induced: &[Vec3],
        surface_velocities: &[Vec3],
        core_radius: f64,
        counters: &KernelCounters,
    ) -> Self {
        let matrix = influence_matrix(rings, collocations, normals, core_radius, counters);

        let rhs = Array1::from_iter((0..collocations.len()).map(|i| {
            let onset = *freestream + wake_induced[i] - surface_velocities[i];
            -onset.dot(&normals[i])
        }));

        Self { matrix, rhs }
    }

    /// Solve for the bound circulations
    ///
    /// `step` is only used to label a singular-system failure.
    pub fn solve(&self, step: usize) -> Result<Array1<f64>, SolverError> {
        lu_solve(&self.matrix, &self.rhs)
            .map_err(|source| SolverError::SingularSystem { step, source })
    }
}
