//! Error taxonomy of the lattice solver
//!
//! Two fatal classes: [`ConfigError`] for anything rejected during
//! validation before the first time step, and [`SolverError`] for failures
//! inside the stepping loop. Near-singular kernel evaluations are not
//! errors; they are regularized, counted and logged (see
//! [`crate::influence`]).

use aero_lattice_solvers::LuError;
use thiserror::Error;

/// Invalid geometry, kinematics or run-mode configuration
///
/// Raised during up-front validation; the run never starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("wing '{wing}' needs at least two cross sections, got {got}")]
    TooFewCrossSections { wing: String, got: usize },

    #[error("wing '{wing}' cross sections must be ordered root to tip (section {index} moves inboard)")]
    CrossSectionsNotOutboard { wing: String, index: usize },

    #[error("wing '{wing}' cross section {index} has non-positive chord {chord}")]
    NonPositiveChord {
        wing: String,
        index: usize,
        chord: f64,
    },

    #[error("wing '{wing}' has a zero panel count ({chordwise} chordwise x {spanwise} spanwise)")]
    ZeroPanelCount {
        wing: String,
        chordwise: usize,
        spanwise: usize,
    },

    #[error("symmetric wing '{wing}' must have its root section on the y=0 plane, found y = {y}")]
    SymmetricRootOffPlane { wing: String, y: f64 },

    #[error("airfoil '{name}': {reason}")]
    InvalidAirfoil { name: String, reason: String },

    #[error("control surface hinge fraction {hinge} must lie strictly inside (0, 1)")]
    InvalidHingeFraction { hinge: f64 },

    #[error("operating point: {0}")]
    InvalidOperatingPoint(String),

    #[error("movement: {0}")]
    InvalidMovement(String),

    #[error("delta_time and num_cycles are mutually exclusive")]
    ConflictingTimeControls,

    #[error("num_cycles with an explicit num_steps is ambiguous; supply one of them")]
    CyclesWithExplicitSteps,

    #[error("num_cycles requires oscillatory movement, but every movement law is static")]
    CyclesWithoutOscillation,

    #[error("wing '{wing}' panel ({chordwise}, {spanwise}) is degenerate (zero area)")]
    DegeneratePanel {
        wing: String,
        chordwise: usize,
        spanwise: usize,
    },

    #[error("solver settings: {0}")]
    InvalidSettings(String),
}

/// Fatal failure inside the time-stepping loop; the run aborts
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("configuration rejected: {0}")]
    Config(#[from] ConfigError),

    #[error("influence system is singular at step {step}")]
    SingularSystem {
        step: usize,
        #[source]
        source: LuError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_wraps_into_solver_error() {
        let cfg = ConfigError::ConflictingTimeControls;
        let err: SolverError = cfg.into();
        let msg = format!("{}", err);
        assert!(msg.contains("mutually exclusive"));
    }

    #[test]
    fn test_singular_message_names_step() {
        let err = SolverError::SingularSystem {
            step: 7,
            source: LuError::SingularMatrix,
        };
        assert!(format!("{}", err).contains("step 7"));
    }
}
