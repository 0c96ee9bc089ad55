//! # Unsteady ring-vortex-lattice aerodynamic solver
//!
//! Time-marching potential-flow solver for lifting surfaces. Wings are
//! lofted from airfoil cross sections, panelled with ring vortices on the
//! mean camber surface, and marched through time while a force-free (or
//! freestream-frozen) wake grows behind them.
//!
//! - Geometry: airfoils, cross sections, wings, airplanes ([`geometry`])
//! - Kinematics: sinusoidal and triangular movement laws ([`movement`])
//! - Aerodynamics: Biot-Savart induction, one LU solve per step, near-field
//!   Kutta-Joukowski loads ([`influence`], [`system`], [`loads`])
//! - Orchestration: [`solver::UnsteadySolver`] drives the whole run and
//!   records a [`output::Solution`]
//!
//! Axes are x aft, y starboard, z up; angles are degrees at every API
//! boundary and radians inside.

#![allow(clippy::too_many_arguments)] // Scientific code often has many parameters

pub mod error;
pub mod geometry;
pub mod influence;
pub mod loads;
pub mod mesh;
pub mod movement;
pub mod operating_point;
pub mod output;
pub mod scenario;
pub mod solver;
pub mod streamlines;
pub mod system;
pub mod wake;

pub use error::{ConfigError, SolverError};
pub use geometry::{
    Airfoil, Airplane, ControlSurface, ControlSurfaceKind, ReferenceDimensions, Spacing, Wing,
    WingCrossSection,
};
pub use influence::{
    filament_velocity, induced_velocities, influence_matrix, KernelCounters, RingVortex,
    DEFAULT_CORE_RADIUS,
};
pub use loads::{compute_loads, StepLoads};
pub use mesh::{mesh_airplanes, resolve_reference, FlatMesh, Panel, WingRange};
pub use movement::{
    AirplaneMovement, Movement, MovementLaw, OperatingPointMovement, Waveform,
    WingCrossSectionMovement, WingMovement,
};
pub use operating_point::OperatingPoint;
pub use output::{AirplaneLoads, PanelRecord, Solution, TimeStep};
pub use scenario::Scenario;
pub use solver::{RunTiming, SolverSettings, UnsteadySolver};
pub use streamlines::trace_streamlines;
pub use system::InfluenceSystem;
pub use wake::{Wake, WakeMode, WakeRingVortex};

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
