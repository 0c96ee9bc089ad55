//! Airfoil sections: coordinate curves, NACA 4-digit generation, camber lines
//!
//! Coordinates are stored in Selig order (upper-surface trailing edge,
//! forward over the upper surface to the leading edge, then aft over the
//! lower surface back to the trailing edge), normalized by chord. The
//! lattice only ever sees the mean camber line: panels are laid on the
//! camber surface, so thickness enters the model solely through the camber
//! distribution of the section.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use aero_lattice_common::cosine_fractions;

/// A 2D airfoil section as a normalized coordinate curve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airfoil {
    /// Section name, e.g. "naca2412"
    pub name: String,
    /// Selig-ordered (x/c, z/c) coordinates
    pub coordinates: Vec<[f64; 2]>,
}

impl Airfoil {
    /// Build an airfoil from explicit Selig-ordered coordinates
    pub fn from_coordinates(name: &str, coordinates: Vec<[f64; 2]>) -> Result<Self, ConfigError> {
        if coordinates.len() < 4 {
            return Err(ConfigError::InvalidAirfoil {
                name: name.to_string(),
                reason: format!("needs at least 4 coordinates, got {}", coordinates.len()),
            });
        }
        for &[x, _] in &coordinates {
            if !(-0.01..=1.01).contains(&x) || !x.is_finite() {
                return Err(ConfigError::InvalidAirfoil {
                    name: name.to_string(),
                    reason: format!("x/c coordinate {} outside [0, 1]", x),
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            coordinates,
        })
    }

    /// Generate a NACA 4-digit section ("2412", "naca2412", "NACA 0012")
    ///
    /// Uses the standard camber and half-thickness polynomials with the
    /// thickness applied normal to the camber line, cosine-clustered with
    /// `points_per_side` stations per surface.
    pub fn naca4(name: &str, points_per_side: usize) -> Result<Self, ConfigError> {
        let digits: String = name.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() != 4 {
            return Err(ConfigError::InvalidAirfoil {
                name: name.to_string(),
                reason: "expected a 4-digit NACA designation".to_string(),
            });
        }
        let d: Vec<u32> = digits.chars().map(|c| c.to_digit(10).unwrap()).collect();
        let m = d[0] as f64 / 100.0;
        let p = d[1] as f64 / 10.0;
        let t = (d[2] * 10 + d[3]) as f64 / 100.0;
        if m > 0.0 && p == 0.0 {
            return Err(ConfigError::InvalidAirfoil {
                name: name.to_string(),
                reason: "cambered section requires a nonzero camber position digit".to_string(),
            });
        }
        if points_per_side < 2 {
            return Err(ConfigError::InvalidAirfoil {
                name: name.to_string(),
                reason: "needs at least 2 points per side".to_string(),
            });
        }

        let stations = cosine_fractions(points_per_side);
        let mut upper = Vec::with_capacity(points_per_side);
        let mut lower = Vec::with_capacity(points_per_side);
        for &x in &stations {
            let (yc, slope) = naca4_camber(m, p, x);
            let yt = naca4_half_thickness(t, x);
            let theta = slope.atan();
            upper.push([x - yt * theta.sin(), yc + yt * theta.cos()]);
            lower.push([x + yt * theta.sin(), yc - yt * theta.cos()]);
        }

        // Selig order: upper TE -> LE, then LE -> lower TE (LE kept once)
        let mut coordinates: Vec<[f64; 2]> = upper.into_iter().rev().collect();
        coordinates.extend(lower.into_iter().skip(1));

        Ok(Self {
            name: name.to_lowercase().replace(' ', ""),
            coordinates,
        })
    }

    /// Shorthand for [`Airfoil::naca4`] with the default surface resolution
    pub fn naca(name: &str) -> Result<Self, ConfigError> {
        Self::naca4(name, 50)
    }

    /// Index of the leading-edge point (minimum x/c)
    pub fn leading_edge_index(&self) -> usize {
        let mut idx = 0;
        let mut min_x = f64::MAX;
        for (i, &[x, _]) in self.coordinates.iter().enumerate() {
            if x < min_x {
                min_x = x;
                idx = i;
            }
        }
        idx
    }

    /// Sample the mean camber line at the given chord fractions
    ///
    /// The upper and lower surfaces are interpolated separately at each
    /// station and averaged. Returns (x/c, z/c) pairs.
    pub fn mean_camber_line(&self, fractions: &[f64]) -> Vec<[f64; 2]> {
        let le = self.leading_edge_index();
        // Upper surface reversed so x ascends from the leading edge
        let upper: Vec<[f64; 2]> = self.coordinates[..=le].iter().rev().copied().collect();
        let lower: Vec<[f64; 2]> = self.coordinates[le..].to_vec();

        fractions
            .iter()
            .map(|&x| {
                let zu = interp_curve(&upper, x);
                let zl = interp_curve(&lower, x);
                [x, 0.5 * (zu + zl)]
            })
            .collect()
    }

    /// Resample both surfaces onto `points_per_side` cosine-clustered stations
    pub fn repanel(&self, points_per_side: usize) -> Airfoil {
        let le = self.leading_edge_index();
        let upper: Vec<[f64; 2]> = self.coordinates[..=le].iter().rev().copied().collect();
        let lower: Vec<[f64; 2]> = self.coordinates[le..].to_vec();

        let stations = cosine_fractions(points_per_side);
        let new_upper: Vec<[f64; 2]> = stations.iter().map(|&x| [x, interp_curve(&upper, x)]).collect();
        let new_lower: Vec<[f64; 2]> = stations.iter().map(|&x| [x, interp_curve(&lower, x)]).collect();

        let mut coordinates: Vec<[f64; 2]> = new_upper.into_iter().rev().collect();
        coordinates.extend(new_lower.into_iter().skip(1));
        Airfoil {
            name: self.name.clone(),
            coordinates,
        }
    }

    /// Deflect the section aft of a chordwise hinge
    ///
    /// Positive deflection rotates the trailing edge down (lift-increasing
    /// for a conventional flap). The hinge sits on the chord line at
    /// `hinge_fraction` of the chord; `deflection` is in radians.
    pub fn with_deflection(&self, hinge_fraction: f64, deflection: f64) -> Airfoil {
        let (sin_d, cos_d) = deflection.sin_cos();
        let coordinates = self
            .coordinates
            .iter()
            .map(|&[x, z]| {
                if x > hinge_fraction {
                    let dx = x - hinge_fraction;
                    [
                        hinge_fraction + dx * cos_d + z * sin_d,
                        -dx * sin_d + z * cos_d,
                    ]
                } else {
                    [x, z]
                }
            })
            .collect();
        Airfoil {
            name: self.name.clone(),
            coordinates,
        }
    }
}

/// NACA 4-digit camber line and its slope at x/c
fn naca4_camber(m: f64, p: f64, x: f64) -> (f64, f64) {
    if m == 0.0 {
        return (0.0, 0.0);
    }
    if x <= p {
        let yc = m / (p * p) * (2.0 * p - x) * x;
        let slope = 2.0 * m / (p * p) * (p - x);
        (yc, slope)
    } else {
        let q = 1.0 - p;
        let yc = m / (q * q) * (1.0 - 2.0 * p + (2.0 * p - x) * x);
        let slope = 2.0 * m / (q * q) * (p - x);
        (yc, slope)
    }
}

/// NACA 4-digit half-thickness distribution at x/c (open trailing edge)
fn naca4_half_thickness(t: f64, x: f64) -> f64 {
    5.0 * t * (0.2969 * x.sqrt() + (-0.1260 + (-0.3516 + (0.2843 - 0.1015 * x) * x) * x) * x)
}

/// Linear interpolation of z along a curve with ascending x, clamped ends
fn interp_curve(curve: &[[f64; 2]], x: f64) -> f64 {
    if curve.is_empty() {
        return 0.0;
    }
    if x <= curve[0][0] {
        return curve[0][1];
    }
    for w in curve.windows(2) {
        let ([x0, z0], [x1, z1]) = (w[0], w[1]);
        if x <= x1 {
            if x1 - x0 < 1e-12 {
                return z1;
            }
            let f = (x - x0) / (x1 - x0);
            return z0 + f * (z1 - z0);
        }
    }
    curve[curve.len() - 1][1]
}
