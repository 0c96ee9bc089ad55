//! Freestream operating conditions and axis conventions
//!
//! Geometry axes: x aft along the fuselage, y out the starboard side,
//! z up. Wind axes: x along the freestream, z perpendicular to it in the
//! aircraft symmetry plane (lift-positive), y completing the right-handed
//! set. Angles are stored in degrees at the configuration surface and
//! converted on evaluation.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use aero_lattice_common::Vec3;

fn default_density() -> f64 {
    1.225
}

fn default_velocity() -> f64 {
    10.0
}

fn default_viscosity() -> f64 {
    15.06e-6
}

/// Freestream state for one instant of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatingPoint {
    /// Air density [kg/m^3]
    #[serde(default = "default_density")]
    pub density: f64,
    /// Freestream speed [m/s]
    #[serde(default = "default_velocity")]
    pub velocity: f64,
    /// Angle of attack [deg]
    #[serde(default)]
    pub alpha: f64,
    /// Sideslip angle [deg]
    #[serde(default)]
    pub beta: f64,
    /// Kinematic viscosity [m^2/s], for Reynolds number reporting only
    #[serde(default = "default_viscosity")]
    pub kinematic_viscosity: f64,
}

impl Default for OperatingPoint {
    fn default() -> Self {
        Self {
            density: default_density(),
            velocity: default_velocity(),
            alpha: 0.0,
            beta: 0.0,
            kinematic_viscosity: default_viscosity(),
        }
    }
}

impl OperatingPoint {
    pub fn new(density: f64, velocity: f64, alpha: f64, beta: f64) -> Self {
        Self {
            density,
            velocity,
            alpha,
            beta,
            kinematic_viscosity: default_viscosity(),
        }
    }

    /// Freestream velocity vector in geometry axes
    pub fn freestream_velocity(&self) -> Vec3 {
        let alpha = self.alpha.to_radians();
        let beta = self.beta.to_radians();
        Vec3::new(
            self.velocity * alpha.cos() * beta.cos(),
            -self.velocity * beta.sin(),
            self.velocity * alpha.sin() * beta.cos(),
        )
    }

    /// Dynamic pressure q = rho V^2 / 2 [Pa]
    pub fn dynamic_pressure(&self) -> f64 {
        0.5 * self.density * self.velocity * self.velocity
    }

    /// Reynolds number based on the given length
    pub fn reynolds(&self, length: f64) -> f64 {
        self.velocity * length / self.kinematic_viscosity
    }

    /// Project a geometry-axes vector into wind axes
    ///
    /// Wind x recovers drag, y side force, z lift.
    pub fn wind_axes(&self, v: &Vec3) -> Vec3 {
        let alpha = self.alpha.to_radians();
        let beta = self.beta.to_radians();
        let (sa, ca) = alpha.sin_cos();
        let (sb, cb) = beta.sin_cos();
        Vec3::new(
            ca * cb * v.x - sb * v.y + sa * cb * v.z,
            ca * sb * v.x + cb * v.y + sa * sb * v.z,
            -sa * v.x + ca * v.z,
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.density > 0.0) {
            return Err(ConfigError::InvalidOperatingPoint(format!(
                "density must be positive, got {}",
                self.density
            )));
        }
        if !(self.velocity > 0.0) {
            return Err(ConfigError::InvalidOperatingPoint(format!(
                "freestream speed must be positive, got {}",
                self.velocity
            )));
        }
        if !self.alpha.is_finite() || !self.beta.is_finite() {
            return Err(ConfigError::InvalidOperatingPoint(
                "alpha and beta must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_freestream_at_zero_angles() {
        let op = OperatingPoint::new(1.225, 12.0, 0.0, 0.0);
        let v = op.freestream_velocity();
        assert_relative_eq!(v.x, 12.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_alpha_tilts_freestream_up() {
        let op = OperatingPoint::new(1.225, 10.0, 5.0, 0.0);
        let v = op.freestream_velocity();
        assert!(v.z > 0.0);
        assert_relative_eq!(v.length(), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_positive_beta_pushes_to_port() {
        let op = OperatingPoint::new(1.225, 10.0, 0.0, 4.0);
        let v = op.freestream_velocity();
        assert!(v.y < 0.0);
    }

    #[test]
    fn test_wind_axes_of_freestream() {
        let op = OperatingPoint::new(1.225, 10.0, 7.0, -3.0);
        let w = op.wind_axes(&op.freestream_velocity());
        assert_relative_eq!(w.x, 10.0, epsilon = 1e-10);
        assert_relative_eq!(w.y, 0.0, epsilon = 1e-10);
        assert_relative_eq!(w.z, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_vertical_force_splits_into_lift_and_drag() {
        let op = OperatingPoint::new(1.225, 10.0, 10.0, 0.0);
        let w = op.wind_axes(&Vec3::new(0.0, 0.0, 100.0));
        let alpha = 10.0_f64.to_radians();
        assert_relative_eq!(w.z, 100.0 * alpha.cos(), epsilon = 1e-10);
        assert_relative_eq!(w.x, 100.0 * alpha.sin(), epsilon = 1e-10);
    }

    #[test]
    fn test_dynamic_pressure() {
        let op = OperatingPoint::new(1.2, 20.0, 0.0, 0.0);
        assert_relative_eq!(op.dynamic_pressure(), 240.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_zero_velocity() {
        let op = OperatingPoint::new(1.225, 0.0, 0.0, 0.0);
        assert!(op.validate().is_err());
    }
}
