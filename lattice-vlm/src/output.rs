//! Per-step records and whole-run solution export
//!
//! Every step of a run is captured as a [`TimeStep`]: the posed panel
//! lattice with its circulations and forces, the per-airplane load summary,
//! and a snapshot of the wake as it stood after shedding. A [`Solution`]
//! collects the steps and round-trips through JSON for post-processing.

use serde::{Deserialize, Serialize};

use crate::wake::WakeRingVortex;
use aero_lattice_common::Vec3;

/// One panel's state at one step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelRecord {
    pub airplane: usize,
    pub wing: usize,
    pub chordwise: usize,
    pub spanwise: usize,
    pub front_left: Vec3,
    pub front_right: Vec3,
    pub back_left: Vec3,
    pub back_right: Vec3,
    pub collocation: Vec3,
    pub normal: Vec3,
    /// Panel area [m^2]
    pub area: f64,
    /// Ring circulation [m^2/s]
    pub gamma: f64,
    /// Force on this panel, geometry axes [N]
    pub force: Vec3,
    /// Pressure jump across the panel [Pa]
    pub pressure_delta: f64,
}

/// Integrated loads for one airplane at one step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirplaneLoads {
    pub name: String,
    /// Total force, geometry axes [N]
    pub force_geometry: Vec3,
    /// Total moment about the reference point, geometry axes [N m]
    pub moment_geometry: Vec3,
    /// Total force, wind axes [N]
    pub force_wind: Vec3,
    /// Total moment, wind axes [N m]
    pub moment_wind: Vec3,
    pub lift_coefficient: f64,
    pub induced_drag_coefficient: f64,
    pub side_force_coefficient: f64,
    pub rolling_moment_coefficient: f64,
    pub pitching_moment_coefficient: f64,
    pub yawing_moment_coefficient: f64,
}

/// Complete state of the simulation after one step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeStep {
    pub step: usize,
    /// Simulation time at this step [s]
    pub time: f64,
    pub panels: Vec<PanelRecord>,
    pub airplanes: Vec<AirplaneLoads>,
    /// Wake as recorded after this step's shedding
    pub wake_rings: Vec<WakeRingVortex>,
}

/// Full history of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Step length used for the whole run [s]
    pub delta_time: f64,
    pub steps: Vec<TimeStep>,
    /// Streamline polylines through the final flow field, one per
    /// trailing-edge panel, empty unless requested
    #[serde(default)]
    pub streamlines: Vec<Vec<Vec3>>,
}

impl Solution {
    pub fn new(delta_time: f64) -> Self {
        Self {
            delta_time,
            steps: Vec::new(),
            streamlines: Vec::new(),
        }
    }

    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn final_step(&self) -> Option<&TimeStep> {
        self.steps.last()
    }

    /// Lift coefficient of one airplane across all steps
    pub fn lift_history(&self, airplane: usize) -> Vec<f64> {
        self.steps
            .iter()
            .filter_map(|s| s.airplanes.get(airplane))
            .map(|a| a.lift_coefficient)
            .collect()
    }

    /// Mean of a per-step quantity over the final `window` steps
    pub fn trailing_mean<F>(&self, window: usize, f: F) -> Option<f64>
    where
        F: Fn(&TimeStep) -> f64,
    {
        if window == 0 || self.steps.len() < window {
            return None;
        }
        let tail = &self.steps[self.steps.len() - window..];
        Some(tail.iter().map(&f).sum::<f64>() / window as f64)
    }

    /// Save the solution to a JSON file
    pub fn to_file(&self, filename: &str) -> Result<(), String> {
        let json = serde_json::to_string(self)
            .map_err(|e| format!("Failed to serialize solution: {e}"))?;
        std::fs::write(filename, json)
            .map_err(|e| format!("Failed to write solution file {filename}: {e}"))?;
        Ok(())
    }

    /// Load a solution from a JSON file
    pub fn from_file(filename: &str) -> Result<Self, String> {
        let contents = std::fs::read_to_string(filename)
            .map_err(|e| format!("Failed to read solution file {filename}: {e}"))?;
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse solution file {filename}: {e}"))
    }
}
