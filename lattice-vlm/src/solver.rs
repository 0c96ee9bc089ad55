//! Time-marching solver
//!
//! One [`UnsteadySolver`] owns a [`Movement`] and the run settings. Every
//! step it poses the geometry, meshes it, closes the linear system against
//! the current wake and surface motion, solves for the bound circulations,
//! integrates loads, then convects and grows the wake. The loop is strictly
//! causal: a step only ever sees wake rings shed by earlier steps.
//!
//! Static cases run through the same loop. The wake still builds up row by
//! row, so a static run marched long enough converges to the steady result.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SolverError};
use crate::geometry::{Airplane, ReferenceDimensions};
use crate::influence::{KernelCounters, RingVortex, DEFAULT_CORE_RADIUS};
use crate::loads::compute_loads;
use crate::mesh::{mesh_airplanes, resolve_reference, FlatMesh};
use crate::movement::Movement;
use crate::operating_point::OperatingPoint;
use crate::output::{Solution, TimeStep};
use crate::streamlines::trace_streamlines;
use crate::system::InfluenceSystem;
use crate::wake::{Wake, WakeMode};
use aero_lattice_common::Vec3;

fn default_wake_mode() -> WakeMode {
    WakeMode::Prescribed
}

fn default_core_radius() -> f64 {
    DEFAULT_CORE_RADIUS
}

fn default_streamline_steps() -> usize {
    25
}

/// Numerical controls of a run
///
/// Time stepping is set by at most one of `delta_time` (with an optional
/// explicit `num_steps`) or `num_cycles`; anything left unset is derived
/// from the geometry and the movement when the run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverSettings {
    #[serde(default = "default_wake_mode")]
    pub wake_mode: WakeMode,
    /// Explicit number of steps, derived when `None`
    #[serde(default)]
    pub num_steps: Option<usize>,
    /// Explicit step length [s], derived when `None`
    #[serde(default)]
    pub delta_time: Option<f64>,
    /// March for this many periods of the slowest oscillation
    #[serde(default)]
    pub num_cycles: Option<usize>,
    /// Vortex core radius used by every induction evaluation [m]
    #[serde(default = "default_core_radius")]
    pub core_radius: f64,
    /// Drop wake rows older than this many steps, `None` keeps all
    #[serde(default)]
    pub wake_horizon: Option<usize>,
    /// Trace streamlines through the final flow field
    #[serde(default)]
    pub calculate_streamlines: bool,
    #[serde(default = "default_streamline_steps")]
    pub num_streamline_steps: usize,
    /// Streamline march step [s], the run's step length when `None`
    #[serde(default)]
    pub streamline_delta_time: Option<f64>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            wake_mode: default_wake_mode(),
            num_steps: None,
            delta_time: None,
            num_cycles: None,
            core_radius: default_core_radius(),
            wake_horizon: None,
            calculate_streamlines: false,
            num_streamline_steps: default_streamline_steps(),
            streamline_delta_time: None,
        }
    }
}

impl SolverSettings {
    pub fn with_wake_mode(mut self, mode: WakeMode) -> Self {
        self.wake_mode = mode;
        self
    }

    pub fn with_num_steps(mut self, num_steps: usize) -> Self {
        self.num_steps = Some(num_steps);
        self
    }

    pub fn with_delta_time(mut self, delta_time: f64) -> Self {
        self.delta_time = Some(delta_time);
        self
    }

    pub fn with_num_cycles(mut self, num_cycles: usize) -> Self {
        self.num_cycles = Some(num_cycles);
        self
    }

    pub fn with_wake_horizon(mut self, horizon: usize) -> Self {
        self.wake_horizon = Some(horizon);
        self
    }

    pub fn with_core_radius(mut self, core_radius: f64) -> Self {
        self.core_radius = core_radius;
        self
    }

    pub fn with_streamlines(mut self, calculate: bool) -> Self {
        self.calculate_streamlines = calculate;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delta_time.is_some() && self.num_cycles.is_some() {
            return Err(ConfigError::ConflictingTimeControls);
        }
        if self.num_cycles.is_some() && self.num_steps.is_some() {
            return Err(ConfigError::CyclesWithExplicitSteps);
        }
        if let Some(dt) = self.delta_time {
            if !dt.is_finite() || dt <= 0.0 {
                return Err(ConfigError::InvalidSettings(format!(
                    "delta_time must be positive and finite, got {dt}"
                )));
            }
        }
        if self.num_steps == Some(0) {
            return Err(ConfigError::InvalidSettings(
                "num_steps must be at least 1".to_string(),
            ));
        }
        if self.num_cycles == Some(0) {
            return Err(ConfigError::InvalidSettings(
                "num_cycles must be at least 1".to_string(),
            ));
        }
        if self.wake_horizon == Some(0) {
            return Err(ConfigError::InvalidSettings(
                "wake_horizon must be at least 1".to_string(),
            ));
        }
        if !self.core_radius.is_finite() || self.core_radius <= 0.0 {
            return Err(ConfigError::InvalidSettings(format!(
                "core_radius must be positive and finite, got {}",
                self.core_radius
            )));
        }
        if self.calculate_streamlines && self.num_streamline_steps == 0 {
            return Err(ConfigError::InvalidSettings(
                "num_streamline_steps must be at least 1".to_string(),
            ));
        }
        if let Some(dt) = self.streamline_delta_time {
            if !dt.is_finite() || dt <= 0.0 {
                return Err(ConfigError::InvalidSettings(format!(
                    "streamline_delta_time must be positive and finite, got {dt}"
                )));
            }
        }
        Ok(())
    }
}

/// Resolved step length and count of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunTiming {
    pub delta_time: f64,
    pub num_steps: usize,
}

/// The time-marching ring-lattice solver
#[derive(Debug)]
pub struct UnsteadySolver {
    movement: Movement,
    settings: SolverSettings,
}

impl UnsteadySolver {
    pub fn new(movement: Movement, settings: SolverSettings) -> Result<Self, SolverError> {
        movement.validate()?;
        settings.validate()?;
        if settings.num_cycles.is_some() && movement.is_static() {
            return Err(ConfigError::CyclesWithoutOscillation.into());
        }
        Ok(Self { movement, settings })
    }

    pub fn movement(&self) -> &Movement {
        &self.movement
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Step length and count this run will use
    pub fn resolve_timing(&self) -> Result<RunTiming, SolverError> {
        let airplanes = self.movement.airplanes_at(0.0);
        let operating_point = self.movement.operating_point_at(0.0);
        let mesh = mesh_airplanes(&airplanes)?;
        let references = resolve_references(&airplanes, &mesh);
        Ok(self.timing_from(&mesh, &operating_point, &references))
    }

    fn timing_from(
        &self,
        mesh: &FlatMesh,
        operating_point: &OperatingPoint,
        references: &[ReferenceDimensions],
    ) -> RunTiming {
        let delta_time = self
            .settings
            .delta_time
            .unwrap_or_else(|| mesh.mean_panel_chord() / operating_point.velocity);

        let num_steps = if let Some(num_steps) = self.settings.num_steps {
            num_steps
        } else if let Some(cycles) = self.settings.num_cycles {
            (cycles as f64 * self.movement.max_period() / delta_time).ceil() as usize
        } else if self.movement.is_static() {
            // March until the wake trails ten reference chords
            (10.0 * references[0].c_ref / (operating_point.velocity * delta_time)).ceil()
                as usize
        } else {
            (3.0 * self.movement.max_period() / delta_time).ceil() as usize
        };

        RunTiming {
            delta_time,
            num_steps: num_steps.max(1),
        }
    }

    /// March the whole run and collect the history
    pub fn run(&self) -> Result<Solution, SolverError> {
        let base_airplanes = self.movement.airplanes_at(0.0);
        let base_operating_point = self.movement.operating_point_at(0.0);
        let base_mesh = mesh_airplanes(&base_airplanes)?;
        let references = resolve_references(&base_airplanes, &base_mesh);
        let timing = self.timing_from(&base_mesh, &base_operating_point, &references);

        let trailing_edge = base_mesh.trailing_edge_indices();
        let num_te = trailing_edge.len();
        let mut wake = Wake::new(self.settings.wake_mode, num_te, self.settings.wake_horizon);
        let counters = KernelCounters::new();

        log::info!(
            "run start: {} panels, {} trailing-edge panels, {} steps of {:.4e} s, {:?} wake",
            base_mesh.num_panels(),
            num_te,
            timing.num_steps,
            timing.delta_time,
            self.settings.wake_mode
        );

        let mut solution = Solution::new(timing.delta_time);
        let mut previous_gammas: Option<Array1<f64>> = None;
        let mut previous_collocations: Option<Vec<Vec3>> = None;
        let mut final_state: Option<(FlatMesh, Vec<f64>, OperatingPoint)> = None;

        for step in 0..timing.num_steps {
            let time = step as f64 * timing.delta_time;
            let airplanes = self.movement.airplanes_at(time);
            let operating_point = self.movement.operating_point_at(time);
            let mesh = mesh_airplanes(&airplanes)?;

            let collocations = mesh.collocation_points();
            let normals = mesh.normals();
            let rings = mesh.bound_rings();
            let freestream = operating_point.freestream_velocity();

            // Surface velocity from the collocation points' own motion;
            // zero at the first step, when there is no earlier pose
            let surface_velocities: Vec<Vec3> = match &previous_collocations {
                Some(previous) => collocations
                    .iter()
                    .zip(previous.iter())
                    .map(|(now, before)| (*now - *before).scale(1.0 / timing.delta_time))
                    .collect(),
                None => vec![Vec3::zero(); mesh.num_panels()],
            };

            let wake_induced =
                wake.induced_at(&collocations, self.settings.core_radius, Some(&counters));

            let system = InfluenceSystem::assemble(
                &rings,
                &collocations,
                &normals,
                &freestream,
                &wake_induced,
                &surface_velocities,
                self.settings.core_radius,
                &counters,
            );
            let gammas = system.solve(step)?;

            let loads = compute_loads(
                &mesh,
                &wake,
                &gammas,
                previous_gammas.as_ref(),
                &surface_velocities,
                &operating_point,
                &airplanes,
                &references,
                timing.delta_time,
                self.settings.core_radius,
            );

            let gamma_values = gammas.to_vec();
            wake.convect(
                &rings,
                &gamma_values,
                &freestream,
                timing.delta_time,
                self.settings.core_radius,
            );
            let te_rings: Vec<RingVortex> =
                trailing_edge.iter().map(|&i| rings[i]).collect();
            let te_gammas: Vec<f64> =
                trailing_edge.iter().map(|&i| gamma_values[i]).collect();
            wake.shed(&te_rings, &te_gammas, &freestream, timing.delta_time);

            let regularized = counters.take();
            if regularized > 0 {
                log::warn!(
                    "step {step}: {regularized} near-singular induction evaluations regularized"
                );
            }
            if let Some(first) = loads.airplanes.first() {
                log::debug!(
                    "step {}/{}: t = {:.4} s, CL = {:.4}",
                    step + 1,
                    timing.num_steps,
                    time,
                    first.lift_coefficient
                );
            }

            solution.steps.push(TimeStep {
                step,
                time,
                panels: loads.panels,
                airplanes: loads.airplanes,
                wake_rings: wake.rings().to_vec(),
            });

            previous_gammas = Some(gammas);
            previous_collocations = Some(collocations);
            final_state = Some((mesh, gamma_values, operating_point));
        }

        if self.settings.calculate_streamlines {
            if let Some((mesh, gammas, operating_point)) = &final_state {
                let streamline_dt = self
                    .settings
                    .streamline_delta_time
                    .unwrap_or(timing.delta_time);
                solution.streamlines = trace_streamlines(
                    mesh,
                    gammas,
                    &wake,
                    operating_point,
                    self.settings.num_streamline_steps,
                    streamline_dt,
                    self.settings.core_radius,
                );
            }
        }

        log::info!(
            "run complete: {} steps, {} wake rings in the final state",
            solution.num_steps(),
            wake.num_rings()
        );
        Ok(solution)
    }
}

fn resolve_references(airplanes: &[Airplane], mesh: &FlatMesh) -> Vec<ReferenceDimensions> {
    airplanes
        .iter()
        .enumerate()
        .map(|(index, airplane)| resolve_reference(airplane, index, mesh))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Airfoil, Spacing, Wing, WingCrossSection};
    use crate::movement::{
        AirplaneMovement, MovementLaw, OperatingPointMovement, WingCrossSectionMovement,
        WingMovement,
    };
    use approx::assert_relative_eq;

    fn small_airplane(nc: usize, ns: usize) -> Airplane {
        let wing = Wing::new(
            "main",
            vec![
                WingCrossSection::new(1.0, Airfoil::naca("0012").unwrap())
                    .with_spanwise_panels(ns, Spacing::Uniform),
                WingCrossSection::new(1.0, Airfoil::naca("0012").unwrap())
                    .with_le_offset(0.0, 2.0, 0.0),
            ],
        )
        .with_chordwise_panels(nc, Spacing::Uniform);
        Airplane::new("plane", vec![wing])
    }

    fn steady_movement(alpha: f64) -> Movement {
        Movement::steady(
            vec![small_airplane(2, 2)],
            OperatingPoint::new(1.225, 10.0, alpha, 0.0),
        )
    }

    fn pitching_movement(period: f64) -> Movement {
        let airplane = small_airplane(1, 1);
        let mut wing_movement = WingMovement::fixed(&airplane.wings[0]);
        wing_movement.cross_section_movements = vec![
            WingCrossSectionMovement::fixed().with_pitch(MovementLaw::sine(2.0, period)),
            WingCrossSectionMovement::fixed().with_pitch(MovementLaw::sine(2.0, period)),
        ];
        Movement::new(
            vec![AirplaneMovement::new(airplane, vec![wing_movement])],
            OperatingPointMovement::fixed(OperatingPoint::new(1.225, 10.0, 0.0, 0.0)),
        )
    }

    #[test]
    fn test_delta_time_and_cycles_conflict() {
        let settings = SolverSettings::default()
            .with_delta_time(0.01)
            .with_num_cycles(2);
        let err = UnsteadySolver::new(pitching_movement(0.5), settings).unwrap_err();
        assert!(matches!(
            err,
            SolverError::Config(ConfigError::ConflictingTimeControls)
        ));
    }

    #[test]
    fn test_cycles_with_explicit_steps_rejected() {
        let settings = SolverSettings::default().with_num_steps(10).with_num_cycles(2);
        let err = UnsteadySolver::new(pitching_movement(0.5), settings).unwrap_err();
        assert!(matches!(
            err,
            SolverError::Config(ConfigError::CyclesWithExplicitSteps)
        ));
    }

    #[test]
    fn test_cycles_require_oscillation() {
        let settings = SolverSettings::default().with_num_cycles(2);
        let err = UnsteadySolver::new(steady_movement(5.0), settings).unwrap_err();
        assert!(matches!(
            err,
            SolverError::Config(ConfigError::CyclesWithoutOscillation)
        ));
    }

    #[test]
    fn test_invalid_core_radius_rejected() {
        let settings = SolverSettings::default().with_core_radius(0.0);
        assert!(UnsteadySolver::new(steady_movement(5.0), settings).is_err());
    }

    #[test]
    fn test_static_timing_derivation() {
        // Uniform chordwise split of a unit chord into 2 panels: mean panel
        // chord 0.5, so dt = 0.05 s at 10 m/s, and a 10-chord march at
        // c_ref = 1 needs 20 steps
        let solver =
            UnsteadySolver::new(steady_movement(5.0), SolverSettings::default()).unwrap();
        let timing = solver.resolve_timing().unwrap();
        assert_relative_eq!(timing.delta_time, 0.05, epsilon = 1e-12);
        assert_eq!(timing.num_steps, 20);
    }

    #[test]
    fn test_cycle_timing_derivation() {
        let settings = SolverSettings::default().with_num_cycles(2);
        let solver = UnsteadySolver::new(pitching_movement(0.5), settings).unwrap();
        let timing = solver.resolve_timing().unwrap();
        // Single-panel unit chord at 10 m/s: dt = 0.1 s, two periods of
        // 0.5 s need 10 steps
        assert_relative_eq!(timing.delta_time, 0.1, epsilon = 1e-12);
        assert_eq!(timing.num_steps, 10);
    }

    #[test]
    fn test_oscillating_default_covers_three_periods() {
        let settings = SolverSettings::default().with_delta_time(0.05);
        let solver = UnsteadySolver::new(pitching_movement(0.5), settings).unwrap();
        let timing = solver.resolve_timing().unwrap();
        assert_eq!(timing.num_steps, 30);
    }

    #[test]
    fn test_explicit_timing_passes_through() {
        let settings = SolverSettings::default().with_delta_time(0.02).with_num_steps(7);
        let solver = UnsteadySolver::new(steady_movement(5.0), settings).unwrap();
        let timing = solver.resolve_timing().unwrap();
        assert_relative_eq!(timing.delta_time, 0.02, epsilon = 1e-12);
        assert_eq!(timing.num_steps, 7);
    }

    #[test]
    fn test_short_run_sheds_one_wake_row_per_step() {
        let settings = SolverSettings::default().with_delta_time(0.05).with_num_steps(3);
        let solver = UnsteadySolver::new(steady_movement(5.0), settings).unwrap();
        let solution = solver.run().unwrap();

        assert_eq!(solution.num_steps(), 3);
        // 2 spanwise columns, so every shed adds 2 rings
        for (k, step) in solution.steps.iter().enumerate() {
            assert_eq!(step.wake_rings.len(), (k + 1) * 2);
            assert_eq!(step.step, k);
            assert_relative_eq!(step.time, k as f64 * 0.05, epsilon = 1e-12);
        }
        assert!(solution.steps[2].airplanes[0].lift_coefficient > 0.0);
    }

    #[test]
    fn test_newest_wake_row_carries_trailing_edge_circulation() {
        let settings = SolverSettings::default().with_delta_time(0.05).with_num_steps(2);
        let solver = UnsteadySolver::new(steady_movement(5.0), settings).unwrap();
        let solution = solver.run().unwrap();

        let last = solution.final_step().unwrap();
        let te_gammas: Vec<f64> = last
            .panels
            .iter()
            .filter(|p| p.chordwise == 1)
            .map(|p| p.gamma)
            .collect();
        let newest_row = &last.wake_rings[last.wake_rings.len() - te_gammas.len()..];
        for (wake_ring, te_gamma) in newest_row.iter().zip(te_gammas.iter()) {
            assert_relative_eq!(wake_ring.gamma, *te_gamma, epsilon = 1e-12);
            assert_eq!(wake_ring.age, 0);
        }
    }

    #[test]
    fn test_reruns_are_bit_identical() {
        let settings = SolverSettings::default().with_delta_time(0.05).with_num_steps(3);
        let solver = UnsteadySolver::new(steady_movement(4.0), settings).unwrap();
        let first = solver.run().unwrap();
        let second = solver.run().unwrap();

        for (a, b) in first.steps.iter().zip(second.steps.iter()) {
            assert_eq!(
                a.airplanes[0].lift_coefficient.to_bits(),
                b.airplanes[0].lift_coefficient.to_bits()
            );
            assert_eq!(
                a.airplanes[0].induced_drag_coefficient.to_bits(),
                b.airplanes[0].induced_drag_coefficient.to_bits()
            );
        }
    }

    #[test]
    fn test_streamlines_traced_on_request() {
        let settings = SolverSettings::default()
            .with_delta_time(0.05)
            .with_num_steps(2)
            .with_streamlines(true);
        let solver = UnsteadySolver::new(steady_movement(5.0), settings).unwrap();
        let solution = solver.run().unwrap();
        assert_eq!(solution.streamlines.len(), 2);
        assert_eq!(solution.streamlines[0].len(), 26);
    }

    #[test]
    fn test_wake_horizon_limits_recorded_rings() {
        let settings = SolverSettings::default()
            .with_delta_time(0.05)
            .with_num_steps(5)
            .with_wake_horizon(2);
        let solver = UnsteadySolver::new(steady_movement(5.0), settings).unwrap();
        let solution = solver.run().unwrap();
        let last = solution.final_step().unwrap();
        assert_eq!(last.wake_rings.len(), 2 * 2);
    }
}
