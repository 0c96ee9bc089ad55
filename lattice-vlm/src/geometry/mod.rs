//! Declarative description of the lifting geometry
//!
//! An [`Airplane`] is a pure value: wings made of spanwise-ordered cross
//! sections, each cross section carrying a chord, twist, airfoil and panel
//! counts. Nothing here knows about time or the flow; the kinematics layer
//! poses clones of these structs and the mesher turns a posed airplane into
//! panels. All structs are serde-serializable so whole scenarios can be
//! written as JSON.

pub mod airfoil;

pub use airfoil::Airfoil;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use aero_lattice_common::{cosine_fractions, lin_fractions};

/// Panel station distribution along a chord or span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spacing {
    Uniform,
    Cosine,
}

impl Default for Spacing {
    fn default() -> Self {
        Spacing::Cosine
    }
}

impl Spacing {
    /// Generate `num` station fractions covering [0, 1]
    pub fn fractions(&self, num: usize) -> Vec<f64> {
        match self {
            Spacing::Uniform => lin_fractions(num),
            Spacing::Cosine => cosine_fractions(num),
        }
    }
}

/// How a control surface deflects across a symmetric wing's two halves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlSurfaceKind {
    /// Both halves deflect the same way (elevator, flap)
    Symmetric,
    /// The mirrored half deflects with opposite sign (aileron)
    Antisymmetric,
}

impl Default for ControlSurfaceKind {
    fn default() -> Self {
        ControlSurfaceKind::Symmetric
    }
}

/// A fixed trailing-edge control surface on a wing cross section
///
/// Deflection is static configuration, not a movement law: it modifies the
/// section camber before meshing and stays constant over the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlSurface {
    /// Hinge position as a fraction of the local chord, strictly in (0, 1)
    pub hinge_fraction: f64,
    /// Deflection in degrees, trailing-edge-down positive
    pub deflection: f64,
    #[serde(default)]
    pub kind: ControlSurfaceKind,
}

impl ControlSurface {
    pub fn new(hinge_fraction: f64, deflection: f64, kind: ControlSurfaceKind) -> Self {
        Self {
            hinge_fraction,
            deflection,
            kind,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.hinge_fraction > 0.0 && self.hinge_fraction < 1.0) {
            return Err(ConfigError::InvalidHingeFraction {
                hinge: self.hinge_fraction,
            });
        }
        Ok(())
    }
}

fn default_panels() -> usize {
    8
}

/// One spanwise station of a wing
///
/// Leading-edge offsets are relative to the wing root leading edge. The
/// spanwise panel count and spacing apply to the segment between this
/// section and the next outboard one (ignored on the last section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WingCrossSection {
    /// Chordwise leading-edge offset from the wing root [m]
    #[serde(default)]
    pub x_le: f64,
    /// Spanwise leading-edge offset from the wing root [m]
    #[serde(default)]
    pub y_le: f64,
    /// Vertical leading-edge offset from the wing root [m]
    #[serde(default)]
    pub z_le: f64,
    /// Local chord [m]
    pub chord: f64,
    /// Local geometric twist in degrees, nose-up positive
    #[serde(default)]
    pub twist: f64,
    /// Section shape; only its mean camber line enters the lattice
    pub airfoil: Airfoil,
    #[serde(default)]
    pub control_surface: Option<ControlSurface>,
    /// Spanwise panels between this section and the next
    #[serde(default = "default_panels")]
    pub num_spanwise_panels: usize,
    #[serde(default)]
    pub spanwise_spacing: Spacing,
}

impl WingCrossSection {
    pub fn new(chord: f64, airfoil: Airfoil) -> Self {
        Self {
            x_le: 0.0,
            y_le: 0.0,
            z_le: 0.0,
            chord,
            twist: 0.0,
            airfoil,
            control_surface: None,
            num_spanwise_panels: default_panels(),
            spanwise_spacing: Spacing::default(),
        }
    }

    pub fn with_le_offset(mut self, x_le: f64, y_le: f64, z_le: f64) -> Self {
        self.x_le = x_le;
        self.y_le = y_le;
        self.z_le = z_le;
        self
    }

    pub fn with_twist(mut self, twist: f64) -> Self {
        self.twist = twist;
        self
    }

    pub fn with_control_surface(mut self, control_surface: ControlSurface) -> Self {
        self.control_surface = Some(control_surface);
        self
    }

    pub fn with_spanwise_panels(mut self, num: usize, spacing: Spacing) -> Self {
        self.num_spanwise_panels = num;
        self.spanwise_spacing = spacing;
        self
    }

    /// Distance of this section's leading edge from the wing root, in the
    /// spanwise (y-z) plane
    pub fn outboard_station(&self) -> f64 {
        (self.y_le * self.y_le + self.z_le * self.z_le).sqrt()
    }
}

/// A lifting surface built from two or more cross sections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wing {
    pub name: String,
    /// Root leading-edge position in the airplane frame [m]
    #[serde(default)]
    pub x_le: f64,
    #[serde(default)]
    pub y_le: f64,
    #[serde(default)]
    pub z_le: f64,
    /// Mirror the wing about the airplane xz-plane
    #[serde(default)]
    pub symmetric: bool,
    #[serde(default = "default_panels")]
    pub num_chordwise_panels: usize,
    #[serde(default)]
    pub chordwise_spacing: Spacing,
    pub cross_sections: Vec<WingCrossSection>,
}

impl Wing {
    pub fn new(name: &str, cross_sections: Vec<WingCrossSection>) -> Self {
        Self {
            name: name.to_string(),
            x_le: 0.0,
            y_le: 0.0,
            z_le: 0.0,
            symmetric: false,
            num_chordwise_panels: default_panels(),
            chordwise_spacing: Spacing::default(),
            cross_sections,
        }
    }

    pub fn with_le_position(mut self, x_le: f64, y_le: f64, z_le: f64) -> Self {
        self.x_le = x_le;
        self.y_le = y_le;
        self.z_le = z_le;
        self
    }

    pub fn with_symmetric(mut self, symmetric: bool) -> Self {
        self.symmetric = symmetric;
        self
    }

    pub fn with_chordwise_panels(mut self, num: usize, spacing: Spacing) -> Self {
        self.num_chordwise_panels = num;
        self.chordwise_spacing = spacing;
        self
    }

    /// Total spanwise panel count over all section pairs (one side)
    pub fn num_spanwise_panels(&self) -> usize {
        if self.cross_sections.len() < 2 {
            return 0;
        }
        self.cross_sections[..self.cross_sections.len() - 1]
            .iter()
            .map(|cs| cs.num_spanwise_panels)
            .sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cross_sections.len() < 2 {
            return Err(ConfigError::TooFewCrossSections {
                wing: self.name.clone(),
                got: self.cross_sections.len(),
            });
        }
        if self.num_chordwise_panels == 0 || self.num_spanwise_panels() == 0 {
            return Err(ConfigError::ZeroPanelCount {
                wing: self.name.clone(),
                chordwise: self.num_chordwise_panels,
                spanwise: self.num_spanwise_panels(),
            });
        }
        let mut station = -1.0;
        for (index, cs) in self.cross_sections.iter().enumerate() {
            if !(cs.chord > 0.0) {
                return Err(ConfigError::NonPositiveChord {
                    wing: self.name.clone(),
                    index,
                    chord: cs.chord,
                });
            }
            let s = cs.outboard_station();
            if s <= station {
                return Err(ConfigError::CrossSectionsNotOutboard {
                    wing: self.name.clone(),
                    index,
                });
            }
            station = s;
            if index + 1 < self.cross_sections.len() && cs.num_spanwise_panels == 0 {
                return Err(ConfigError::ZeroPanelCount {
                    wing: self.name.clone(),
                    chordwise: self.num_chordwise_panels,
                    spanwise: 0,
                });
            }
            if let Some(cs_surface) = &cs.control_surface {
                cs_surface.validate()?;
            }
        }
        if self.symmetric {
            let root_y = self.y_le + self.cross_sections[0].y_le;
            if root_y.abs() > 1e-8 {
                return Err(ConfigError::SymmetricRootOffPlane {
                    wing: self.name.clone(),
                    y: root_y,
                });
            }
        }
        Ok(())
    }
}

/// A complete aircraft configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airplane {
    pub name: String,
    /// Moment reference point in the airplane frame [m]
    #[serde(default)]
    pub x_ref: f64,
    #[serde(default)]
    pub y_ref: f64,
    #[serde(default)]
    pub z_ref: f64,
    /// Reference area [m^2]; derived from the first wing when absent
    #[serde(default)]
    pub s_ref: Option<f64>,
    /// Reference span [m]; derived from the first wing when absent
    #[serde(default)]
    pub b_ref: Option<f64>,
    /// Reference chord [m]; derived from the first wing when absent
    #[serde(default)]
    pub c_ref: Option<f64>,
    pub wings: Vec<Wing>,
}

impl Airplane {
    pub fn new(name: &str, wings: Vec<Wing>) -> Self {
        Self {
            name: name.to_string(),
            x_ref: 0.0,
            y_ref: 0.0,
            z_ref: 0.0,
            s_ref: None,
            b_ref: None,
            c_ref: None,
            wings,
        }
    }

    pub fn with_reference_point(mut self, x_ref: f64, y_ref: f64, z_ref: f64) -> Self {
        self.x_ref = x_ref;
        self.y_ref = y_ref;
        self.z_ref = z_ref;
        self
    }

    pub fn with_reference_dimensions(mut self, s_ref: f64, b_ref: f64, c_ref: f64) -> Self {
        self.s_ref = Some(s_ref);
        self.b_ref = Some(b_ref);
        self.c_ref = Some(c_ref);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wings.is_empty() {
            return Err(ConfigError::InvalidSettings(format!(
                "airplane '{}' has no wings",
                self.name
            )));
        }
        for wing in &self.wings {
            wing.validate()?;
        }
        for (label, value) in [
            ("s_ref", self.s_ref),
            ("b_ref", self.b_ref),
            ("c_ref", self.c_ref),
        ] {
            if let Some(v) = value {
                if !(v > 0.0) {
                    return Err(ConfigError::InvalidSettings(format!(
                        "airplane '{}' {} must be positive, got {}",
                        self.name, label, v
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Reference dimensions after resolution against the meshed geometry
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReferenceDimensions {
    pub s_ref: f64,
    pub b_ref: f64,
    pub c_ref: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_wing(symmetric: bool) -> Wing {
        let foil = Airfoil::naca("0012").unwrap();
        Wing::new(
            "main",
            vec![
                WingCrossSection::new(1.0, foil.clone()),
                WingCrossSection::new(1.0, foil).with_le_offset(0.0, 4.0, 0.0),
            ],
        )
        .with_symmetric(symmetric)
    }

    #[test]
    fn test_valid_wing() {
        assert!(rect_wing(true).validate().is_ok());
    }

    #[test]
    fn test_too_few_sections() {
        let mut wing = rect_wing(false);
        wing.cross_sections.truncate(1);
        assert!(matches!(
            wing.validate(),
            Err(ConfigError::TooFewCrossSections { .. })
        ));
    }

    #[test]
    fn test_sections_must_move_outboard() {
        let mut wing = rect_wing(false);
        wing.cross_sections[1].y_le = 0.0;
        assert!(matches!(
            wing.validate(),
            Err(ConfigError::CrossSectionsNotOutboard { .. })
        ));
    }

    #[test]
    fn test_symmetric_root_off_plane() {
        let mut wing = rect_wing(true);
        wing.y_le = 0.5;
        assert!(matches!(
            wing.validate(),
            Err(ConfigError::SymmetricRootOffPlane { .. })
        ));
    }

    #[test]
    fn test_bad_chord() {
        let mut wing = rect_wing(false);
        wing.cross_sections[0].chord = 0.0;
        assert!(matches!(
            wing.validate(),
            Err(ConfigError::NonPositiveChord { .. })
        ));
    }

    #[test]
    fn test_hinge_fraction_bounds() {
        let mut wing = rect_wing(false);
        wing.cross_sections[0].control_surface =
            Some(ControlSurface::new(1.2, 5.0, ControlSurfaceKind::Symmetric));
        assert!(matches!(
            wing.validate(),
            Err(ConfigError::InvalidHingeFraction { .. })
        ));
    }

    #[test]
    fn test_spanwise_panel_total() {
        let mut wing = rect_wing(false);
        wing.cross_sections[0].num_spanwise_panels = 5;
        assert_eq!(wing.num_spanwise_panels(), 5);
    }

    #[test]
    fn test_airplane_roundtrip_json() {
        let plane = Airplane::new("demo", vec![rect_wing(true)]);
        let json = serde_json::to_string(&plane).unwrap();
        let back: Airplane = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "demo");
        assert_eq!(back.wings.len(), 1);
        assert!(back.wings[0].symmetric);
    }
}
