//! Scenario files: a movement plus solver settings, stored as JSON
//!
//! A scenario is everything a run needs. Geometry, movement laws and the
//! freestream live in the [`Movement`]; stepping and wake controls live in
//! the [`SolverSettings`]. Settings may be omitted from the file entirely,
//! in which case everything is derived.

use serde::{Deserialize, Serialize};

use crate::error::SolverError;
use crate::movement::Movement;
use crate::solver::{SolverSettings, UnsteadySolver};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub movement: Movement,
    #[serde(default)]
    pub settings: SolverSettings,
}

impl Scenario {
    pub fn new(movement: Movement) -> Self {
        Self {
            movement,
            settings: SolverSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Validate and build the solver for this scenario
    pub fn into_solver(self) -> Result<UnsteadySolver, SolverError> {
        UnsteadySolver::new(self.movement, self.settings)
    }

    /// Load a scenario from a JSON file
    pub fn from_file(filename: &str) -> Result<Self, String> {
        let contents = std::fs::read_to_string(filename)
            .map_err(|e| format!("Failed to read scenario file {filename}: {e}"))?;
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse scenario file {filename}: {e}"))
    }

    /// Save a scenario to a JSON file
    pub fn to_file(&self, filename: &str) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize scenario: {e}"))?;
        std::fs::write(filename, json)
            .map_err(|e| format!("Failed to write scenario file {filename}: {e}"))?;
        Ok(())
    }
}
