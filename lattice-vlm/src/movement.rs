//! Open-loop kinematics: time-periodic laws posed onto the geometry
//!
//! Every mobile quantity (cross-section sweep/pitch/heave, wing and
//! airplane translations, freestream speed) carries a [`MovementLaw`]
//! evaluated at absolute time t. Laws are explicit functions of time, never
//! of the flow state. Posing clones the base geometry with the moved fields
//! overridden; panel counts never change, so panel ordering is stable
//! across steps and collocation-point velocities can be finite-differenced
//! index-wise.
//!
//! Composition order is fixed: airplane reference translation first, then
//! wing leading-edge translation, then per-cross-section sweep, pitch and
//! heave in the wing frame.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::{Airplane, Wing, WingCrossSection};
use crate::operating_point::OperatingPoint;
use aero_lattice_common::Vec3;
use std::f64::consts::TAU;

/// Periodic waveform of a movement law
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    /// `base + A sin(2 pi t / P)`
    Sine,
    /// Triangle wave with the same phase and extremes as the sine
    UniformRamp,
}

impl Default for Waveform {
    fn default() -> Self {
        Waveform::Sine
    }
}

/// One scalar degree of freedom oscillating about its base value
///
/// Zero amplitude or zero period means the quantity holds its base value
/// for the whole run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MovementLaw {
    #[serde(default)]
    pub amplitude: f64,
    /// Oscillation period [s]
    #[serde(default)]
    pub period: f64,
    #[serde(default)]
    pub waveform: Waveform,
}

impl Default for MovementLaw {
    fn default() -> Self {
        Self::none()
    }
}

impl MovementLaw {
    /// A law that never moves
    pub fn none() -> Self {
        Self {
            amplitude: 0.0,
            period: 0.0,
            waveform: Waveform::Sine,
        }
    }

    pub fn sine(amplitude: f64, period: f64) -> Self {
        Self {
            amplitude,
            period,
            waveform: Waveform::Sine,
        }
    }

    pub fn uniform_ramp(amplitude: f64, period: f64) -> Self {
        Self {
            amplitude,
            period,
            waveform: Waveform::UniformRamp,
        }
    }

    pub fn is_static(&self) -> bool {
        self.amplitude == 0.0 || self.period == 0.0
    }

    /// Period of this law when it actually oscillates
    pub fn active_period(&self) -> Option<f64> {
        if self.is_static() {
            None
        } else {
            Some(self.period)
        }
    }

    /// Value of the quantity at time t given its base value
    pub fn evaluate(&self, t: f64, base: f64) -> f64 {
        if self.is_static() {
            return base;
        }
        let theta = TAU * t / self.period;
        match self.waveform {
            Waveform::Sine => base + self.amplitude * theta.sin(),
            Waveform::UniformRamp => base + self.amplitude * triangle(theta + 0.25 * TAU),
        }
    }

    fn validate(&self, what: &str) -> Result<(), ConfigError> {
        if !self.amplitude.is_finite() || !self.period.is_finite() {
            return Err(ConfigError::InvalidMovement(format!(
                "{} law has non-finite amplitude or period",
                what
            )));
        }
        if self.period < 0.0 {
            return Err(ConfigError::InvalidMovement(format!(
                "{} law has negative period {}",
                what, self.period
            )));
        }
        Ok(())
    }
}

/// Triangle wave rising from -1 at theta = 0 to +1 at theta = pi
fn triangle(theta: f64) -> f64 {
    let phase = theta.rem_euclid(TAU) / TAU;
    if phase < 0.5 {
        -1.0 + 4.0 * phase
    } else {
        3.0 - 4.0 * phase
    }
}

/// Oscillation of one wing cross section relative to its base placement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WingCrossSectionMovement {
    /// Flapping rotation of the leading-edge offset about the root x-axis [deg]
    #[serde(default)]
    pub sweep: MovementLaw,
    /// Twist added to the section's base twist [deg]
    #[serde(default)]
    pub pitch: MovementLaw,
    /// Vertical offset added after the sweep rotation [m]
    #[serde(default)]
    pub heave: MovementLaw,
}

impl WingCrossSectionMovement {
    /// A section that never moves
    pub fn fixed() -> Self {
        Self::default()
    }

    pub fn with_sweep(mut self, law: MovementLaw) -> Self {
        self.sweep = law;
        self
    }

    pub fn with_pitch(mut self, law: MovementLaw) -> Self {
        self.pitch = law;
        self
    }

    pub fn with_heave(mut self, law: MovementLaw) -> Self {
        self.heave = law;
        self
    }

    /// Pose the base cross section at time t
    pub fn pose(&self, base: &WingCrossSection, t: f64) -> WingCrossSection {
        let mut posed = base.clone();

        let sweep = self.sweep.evaluate(t, 0.0).to_radians();
        if sweep != 0.0 {
            let span = (base.y_le * base.y_le + base.z_le * base.z_le).sqrt();
            let angle = base.z_le.atan2(base.y_le) + sweep;
            posed.y_le = span * angle.cos();
            posed.z_le = span * angle.sin();
        }
        posed.twist = base.twist + self.pitch.evaluate(t, 0.0);
        posed.z_le += self.heave.evaluate(t, 0.0);

        posed
    }

    fn is_static(&self) -> bool {
        self.sweep.is_static() && self.pitch.is_static() && self.heave.is_static()
    }

    fn laws(&self) -> [&MovementLaw; 3] {
        [&self.sweep, &self.pitch, &self.heave]
    }
}

/// Oscillation of a whole wing: leading-edge translation plus its sections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WingMovement {
    #[serde(default)]
    pub x_le: MovementLaw,
    #[serde(default)]
    pub y_le: MovementLaw,
    #[serde(default)]
    pub z_le: MovementLaw,
    pub cross_section_movements: Vec<WingCrossSectionMovement>,
}

impl WingMovement {
    /// A wing that never moves, with fixed sections matching `base`
    pub fn fixed(base: &Wing) -> Self {
        Self {
            x_le: MovementLaw::none(),
            y_le: MovementLaw::none(),
            z_le: MovementLaw::none(),
            cross_section_movements: base
                .cross_sections
                .iter()
                .map(|_| WingCrossSectionMovement::fixed())
                .collect(),
        }
    }

    pub fn with_le_laws(mut self, x_le: MovementLaw, y_le: MovementLaw, z_le: MovementLaw) -> Self {
        self.x_le = x_le;
        self.y_le = y_le;
        self.z_le = z_le;
        self
    }

    /// Pose the base wing at time t
    pub fn pose(&self, base: &Wing, t: f64) -> Wing {
        let mut posed = base.clone();
        posed.x_le = self.x_le.evaluate(t, base.x_le);
        posed.y_le = self.y_le.evaluate(t, base.y_le);
        posed.z_le = self.z_le.evaluate(t, base.z_le);
        posed.cross_sections = base
            .cross_sections
            .iter()
            .zip(self.cross_section_movements.iter())
            .map(|(cs, m)| m.pose(cs, t))
            .collect();
        posed
    }

    fn is_static(&self) -> bool {
        self.x_le.is_static()
            && self.y_le.is_static()
            && self.z_le.is_static()
            && self.cross_section_movements.iter().all(|m| m.is_static())
    }

    fn validate(&self, base: &Wing) -> Result<(), ConfigError> {
        if self.cross_section_movements.len() != base.cross_sections.len() {
            return Err(ConfigError::InvalidMovement(format!(
                "wing '{}' has {} cross sections but {} cross-section movements",
                base.name,
                base.cross_sections.len(),
                self.cross_section_movements.len()
            )));
        }
        for (i, m) in self.cross_section_movements.iter().enumerate() {
            for law in m.laws() {
                law.validate(&format!("wing '{}' section {}", base.name, i))?;
            }
        }
        for law in [&self.x_le, &self.y_le, &self.z_le] {
            law.validate(&format!("wing '{}' leading edge", base.name))?;
        }
        Ok(())
    }
}

/// Oscillation of a whole airplane about its base placement
///
/// The reference-point laws translate the entire rigid airframe; wing and
/// section movements then deform it relative to that frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirplaneMovement {
    /// Base geometry this movement poses
    pub airplane: Airplane,
    #[serde(default)]
    pub x_ref: MovementLaw,
    #[serde(default)]
    pub y_ref: MovementLaw,
    #[serde(default)]
    pub z_ref: MovementLaw,
    pub wing_movements: Vec<WingMovement>,
}

impl AirplaneMovement {
    pub fn new(airplane: Airplane, wing_movements: Vec<WingMovement>) -> Self {
        Self {
            airplane,
            x_ref: MovementLaw::none(),
            y_ref: MovementLaw::none(),
            z_ref: MovementLaw::none(),
            wing_movements,
        }
    }

    /// An airplane that never moves
    pub fn fixed(airplane: Airplane) -> Self {
        let wing_movements = airplane.wings.iter().map(WingMovement::fixed).collect();
        Self::new(airplane, wing_movements)
    }

    pub fn with_ref_laws(mut self, x_ref: MovementLaw, y_ref: MovementLaw, z_ref: MovementLaw) -> Self {
        self.x_ref = x_ref;
        self.y_ref = y_ref;
        self.z_ref = z_ref;
        self
    }

    /// Pose the airplane at time t
    pub fn pose(&self, t: f64) -> Airplane {
        let base = &self.airplane;
        let ref_now = Vec3::new(
            self.x_ref.evaluate(t, base.x_ref),
            self.y_ref.evaluate(t, base.y_ref),
            self.z_ref.evaluate(t, base.z_ref),
        );
        let shift = ref_now - Vec3::new(base.x_ref, base.y_ref, base.z_ref);

        let mut posed = base.clone();
        posed.x_ref = ref_now.x;
        posed.y_ref = ref_now.y;
        posed.z_ref = ref_now.z;
        posed.wings = base
            .wings
            .iter()
            .zip(self.wing_movements.iter())
            .map(|(wing, m)| {
                let mut w = m.pose(wing, t);
                w.x_le += shift.x;
                w.y_le += shift.y;
                w.z_le += shift.z;
                w
            })
            .collect();
        posed
    }

    pub fn is_static(&self) -> bool {
        self.x_ref.is_static()
            && self.y_ref.is_static()
            && self.z_ref.is_static()
            && self.wing_movements.iter().all(|m| m.is_static())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.airplane.validate()?;
        if self.wing_movements.len() != self.airplane.wings.len() {
            return Err(ConfigError::InvalidMovement(format!(
                "airplane '{}' has {} wings but {} wing movements",
                self.airplane.name,
                self.airplane.wings.len(),
                self.wing_movements.len()
            )));
        }
        for (wing, m) in self.airplane.wings.iter().zip(self.wing_movements.iter()) {
            m.validate(wing)?;
        }
        for law in [&self.x_ref, &self.y_ref, &self.z_ref] {
            law.validate(&format!("airplane '{}' reference", self.airplane.name))?;
        }
        Ok(())
    }

    fn periods(&self, out: &mut Vec<f64>) {
        for law in [&self.x_ref, &self.y_ref, &self.z_ref] {
            out.extend(law.active_period());
        }
        for wm in &self.wing_movements {
            for law in [&wm.x_le, &wm.y_le, &wm.z_le] {
                out.extend(law.active_period());
            }
            for csm in &wm.cross_section_movements {
                for law in csm.laws() {
                    out.extend(law.active_period());
                }
            }
        }
    }
}

/// Oscillation of the freestream speed about its base value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatingPointMovement {
    pub operating_point: OperatingPoint,
    #[serde(default)]
    pub velocity: MovementLaw,
}

impl OperatingPointMovement {
    pub fn fixed(operating_point: OperatingPoint) -> Self {
        Self {
            operating_point,
            velocity: MovementLaw::none(),
        }
    }

    pub fn with_velocity_law(mut self, law: MovementLaw) -> Self {
        self.velocity = law;
        self
    }

    /// Operating point at time t
    pub fn pose(&self, t: f64) -> OperatingPoint {
        let mut op = self.operating_point.clone();
        op.velocity = self.velocity.evaluate(t, self.operating_point.velocity);
        op
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.operating_point.validate()?;
        self.velocity.validate("freestream speed")?;
        if !self.velocity.is_static()
            && self.operating_point.velocity - self.velocity.amplitude.abs() <= 0.0
        {
            return Err(ConfigError::InvalidMovement(format!(
                "freestream speed law reaches zero (base {}, amplitude {})",
                self.operating_point.velocity, self.velocity.amplitude
            )));
        }
        Ok(())
    }
}

/// The full kinematic description of a run: one or more airplanes plus the
/// freestream, each with its movement laws
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    pub airplane_movements: Vec<AirplaneMovement>,
    pub operating_point_movement: OperatingPointMovement,
}

impl Movement {
    pub fn new(
        airplane_movements: Vec<AirplaneMovement>,
        operating_point_movement: OperatingPointMovement,
    ) -> Self {
        Self {
            airplane_movements,
            operating_point_movement,
        }
    }

    /// A fully static case: fixed airplanes in a fixed freestream
    pub fn steady(airplanes: Vec<Airplane>, operating_point: OperatingPoint) -> Self {
        Self {
            airplane_movements: airplanes.into_iter().map(AirplaneMovement::fixed).collect(),
            operating_point_movement: OperatingPointMovement::fixed(operating_point),
        }
    }

    /// Pose every airplane at time t
    pub fn airplanes_at(&self, t: f64) -> Vec<Airplane> {
        self.airplane_movements.iter().map(|m| m.pose(t)).collect()
    }

    /// Operating point at time t
    pub fn operating_point_at(&self, t: f64) -> OperatingPoint {
        self.operating_point_movement.pose(t)
    }

    /// True when no law moves anything
    pub fn is_static(&self) -> bool {
        self.operating_point_movement.velocity.is_static()
            && self.airplane_movements.iter().all(|m| m.is_static())
    }

    /// Longest period over all active laws, zero for a static case
    pub fn max_period(&self) -> f64 {
        let mut periods = Vec::new();
        for m in &self.airplane_movements {
            m.periods(&mut periods);
        }
        periods.extend(self.operating_point_movement.velocity.active_period());
        periods.into_iter().fold(0.0, f64::max)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.airplane_movements.is_empty() {
            return Err(ConfigError::InvalidMovement(
                "at least one airplane movement is required".to_string(),
            ));
        }
        for m in &self.airplane_movements {
            m.validate()?;
        }
        self.operating_point_movement.validate()
    }
}
