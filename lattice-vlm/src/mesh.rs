//! Panelization of posed airplanes into a flat ring-vortex lattice
//!
//! Each wing becomes a structured grid of quadrilateral panels lying on the
//! camber surfaces of its cross sections. Panel corners come from bilinear
//! interpolation: chordwise stations sample each section's mean camber line
//! (chord-scaled, twisted about the leading edge, offset to the section's
//! leading-edge position); spanwise stations blend linearly between
//! adjacent sections.
//!
//! Ring vortices live on a second vertex grid shifted aft by a quarter of
//! the local panel chord: a panel's front filament sits on its own
//! quarter-chord line and its rear filament on the next panel's, so
//! chordwise neighbours share legs exactly even when the chordwise spacing
//! is non-uniform. Trailing-edge rings reach a quarter of the last panel's
//! chord behind the wing. The collocation point sits at three-quarter
//! chord, mid-span.
//!
//! Symmetric wings are mirrored about the airplane xz-plane with the
//! column order reversed, which keeps the winding, and therefore the
//! normals, globally consistent: spanwise index always runs from the port
//! tip to the starboard tip.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::{Airplane, ControlSurfaceKind, ReferenceDimensions, Wing};
use crate::influence::RingVortex;
use aero_lattice_common::Vec3;

/// One quadrilateral panel of the bound lattice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panel {
    pub front_left: Vec3,
    pub front_right: Vec3,
    pub back_left: Vec3,
    pub back_right: Vec3,
    /// Quarter-chord-shifted ring vortex of this panel
    pub ring: RingVortex,
    /// Three-quarter-chord, mid-span control point
    pub collocation: Vec3,
    /// Unit normal, +z for a flat wing at rest
    pub normal: Vec3,
    /// Panel area [m^2]
    pub area: f64,
    pub is_leading_edge: bool,
    pub is_trailing_edge: bool,
    /// Owning airplane index
    pub airplane: usize,
    /// Owning wing index within the airplane
    pub wing: usize,
    /// Chordwise grid index, zero at the leading edge
    pub chordwise: usize,
    /// Spanwise grid index, zero at the port-most column
    pub spanwise: usize,
}

impl Panel {
    /// Chordwise extent, averaged between the left and right edges
    pub fn chord_length(&self) -> f64 {
        0.5 * ((self.back_left - self.front_left).length()
            + (self.back_right - self.front_right).length())
    }
}

/// Grid placement of one wing inside the flat panel array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WingRange {
    pub airplane: usize,
    pub wing: usize,
    /// Index of this wing's first panel in the flat array
    pub panel_offset: usize,
    pub num_chordwise: usize,
    /// Spanwise panel count across the full (possibly mirrored) span
    pub num_spanwise: usize,
}

impl WingRange {
    /// Flat index of panel (chordwise, spanwise) in this wing's grid
    pub fn panel_index(&self, chordwise: usize, spanwise: usize) -> usize {
        self.panel_offset + chordwise * self.num_spanwise + spanwise
    }
}

/// All panels of all airplanes for one time step, in a stable order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatMesh {
    pub panels: Vec<Panel>,
    pub wings: Vec<WingRange>,
    /// Panel index range of each airplane
    pub airplane_ranges: Vec<std::ops::Range<usize>>,
}

impl FlatMesh {
    pub fn num_panels(&self) -> usize {
        self.panels.len()
    }

    pub fn collocation_points(&self) -> Vec<Vec3> {
        self.panels.iter().map(|p| p.collocation).collect()
    }

    pub fn normals(&self) -> Vec<Vec3> {
        self.panels.iter().map(|p| p.normal).collect()
    }

    pub fn bound_rings(&self) -> Vec<RingVortex> {
        self.panels.iter().map(|p| p.ring).collect()
    }

    /// Flat indices of trailing-edge panels, in stable spanwise order
    pub fn trailing_edge_indices(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        for wing in &self.wings {
            for j in 0..wing.num_spanwise {
                indices.push(wing.panel_index(wing.num_chordwise - 1, j));
            }
        }
        indices
    }

    /// Mean chordwise panel extent over the whole lattice
    pub fn mean_panel_chord(&self) -> f64 {
        if self.panels.is_empty() {
            return 0.0;
        }
        self.panels.iter().map(|p| p.chord_length()).sum::<f64>() / self.panels.len() as f64
    }
}

/// Mesh every airplane into one flat panel array
pub fn mesh_airplanes(airplanes: &[Airplane]) -> Result<FlatMesh, ConfigError> {
    let mut mesh = FlatMesh {
        panels: Vec::new(),
        wings: Vec::new(),
        airplane_ranges: Vec::new(),
    };
    for (airplane_index, airplane) in airplanes.iter().enumerate() {
        let start = mesh.panels.len();
        for (wing_index, wing) in airplane.wings.iter().enumerate() {
            mesh_wing(wing, airplane_index, wing_index, &mut mesh)?;
        }
        mesh.airplane_ranges.push(start..mesh.panels.len());
    }
    Ok(mesh)
}

/// Resolve reference dimensions against the meshed first wing
///
/// Explicit values on the airplane win; anything missing is derived from
/// wing 0 of the given airplane: area as the panel-area sum, span as the
/// y-extent, chord as area over span.
pub fn resolve_reference(
    airplane: &Airplane,
    airplane_index: usize,
    mesh: &FlatMesh,
) -> ReferenceDimensions {
    let first_wing = mesh
        .wings
        .iter()
        .find(|w| w.airplane == airplane_index && w.wing == 0);

    let (area, span) = match first_wing {
        Some(range) => {
            let panels =
                &mesh.panels[range.panel_offset..range.panel_offset + range.num_chordwise * range.num_spanwise];
            let area = panels.iter().map(|p| p.area).sum::<f64>();
            let mut y_min = f64::MAX;
            let mut y_max = f64::MIN;
            for p in panels {
                for v in [p.front_left, p.front_right, p.back_left, p.back_right] {
                    y_min = y_min.min(v.y);
                    y_max = y_max.max(v.y);
                }
            }
            (area, (y_max - y_min).max(1e-12))
        }
        None => (1.0, 1.0),
    };

    let s_ref = airplane.s_ref.unwrap_or(area);
    let b_ref = airplane.b_ref.unwrap_or(span);
    let c_ref = airplane.c_ref.unwrap_or(s_ref / b_ref);
    ReferenceDimensions { s_ref, b_ref, c_ref }
}

/// Camber-surface curves of every cross section, in airplane coordinates
///
/// `mirror` selects the curve variant used for the reflected half of a
/// symmetric wing: antisymmetric control surfaces flip their deflection
/// there. The returned curves are not yet y-reflected.
fn section_curves(wing: &Wing, chord_fractions: &[f64], mirror: bool) -> Vec<Vec<Vec3>> {
    wing.cross_sections
        .iter()
        .map(|cs| {
            let airfoil = match &cs.control_surface {
                Some(surface) => {
                    let sign = if mirror && surface.kind == ControlSurfaceKind::Antisymmetric {
                        -1.0
                    } else {
                        1.0
                    };
                    cs.airfoil
                        .with_deflection(surface.hinge_fraction, (sign * surface.deflection).to_radians())
                }
                None => cs.airfoil.clone(),
            };
            let camber = airfoil.mean_camber_line(chord_fractions);
            let twist = cs.twist.to_radians();
            let (st, ct) = twist.sin_cos();
            camber
                .iter()
                .map(|&[xf, zf]| {
                    let x = xf * cs.chord;
                    let z = zf * cs.chord;
                    // Nose-up rotation about the leading edge
                    let xr = x * ct + z * st;
                    let zr = -x * st + z * ct;
                    Vec3::new(
                        wing.x_le + cs.x_le + xr,
                        wing.y_le + cs.y_le,
                        wing.z_le + cs.z_le + zr,
                    )
                })
                .collect()
        })
        .collect()
}

/// Blend section curves into spanwise vertex columns, root to tip
fn span_columns(wing: &Wing, curves: &[Vec<Vec3>]) -> Vec<Vec<Vec3>> {
    let mut columns: Vec<Vec<Vec3>> = Vec::new();
    for k in 0..curves.len() - 1 {
        let cs = &wing.cross_sections[k];
        let fractions = cs.spanwise_spacing.fractions(cs.num_spanwise_panels + 1);
        let skip = usize::from(k > 0);
        for &f in fractions.iter().skip(skip) {
            let column = curves[k]
                .iter()
                .zip(curves[k + 1].iter())
                .map(|(a, b)| *a + (*b - *a).scale(f))
                .collect();
            columns.push(column);
        }
    }
    columns
}

fn mesh_wing(
    wing: &Wing,
    airplane_index: usize,
    wing_index: usize,
    mesh: &mut FlatMesh,
) -> Result<(), ConfigError> {
    let num_chordwise = wing.num_chordwise_panels;
    let chord_fractions = wing.chordwise_spacing.fractions(num_chordwise + 1);

    let curves = section_curves(wing, &chord_fractions, false);
    let mut columns = span_columns(wing, &curves);

    if wing.symmetric {
        let needs_flip = wing.cross_sections.iter().any(|cs| {
            cs.control_surface
                .as_ref()
                .is_some_and(|s| s.kind == ControlSurfaceKind::Antisymmetric)
        });
        let mirror_columns = if needs_flip {
            span_columns(wing, &section_curves(wing, &chord_fractions, true))
        } else {
            columns.clone()
        };
        // Reflect, reverse so columns still run port to starboard, and
        // drop the duplicated root column
        let mut full: Vec<Vec<Vec3>> = mirror_columns
            .iter()
            .skip(1)
            .rev()
            .map(|col| col.iter().map(|p| Vec3::new(p.x, -p.y, p.z)).collect())
            .collect();
        full.append(&mut columns);
        columns = full;
    }

    let num_spanwise = columns.len() - 1;
    let panel_offset = mesh.panels.len();

    // Quarter-chord-shifted grid the rings are built on. One shared station
    // per vertex keeps neighbouring rings' legs coincident for any chordwise
    // spacing; the station past the trailing edge extrapolates the last
    // panel's chord.
    let ring_columns: Vec<Vec<Vec3>> = columns
        .iter()
        .map(|col| {
            (0..=num_chordwise)
                .map(|i| {
                    if i < num_chordwise {
                        col[i] + (col[i + 1] - col[i]).scale(0.25)
                    } else {
                        col[i] + (col[i] - col[i - 1]).scale(0.25)
                    }
                })
                .collect()
        })
        .collect();

    for i in 0..num_chordwise {
        for j in 0..num_spanwise {
            let front_left = columns[j][i];
            let front_right = columns[j + 1][i];
            let back_left = columns[j][i + 1];
            let back_right = columns[j + 1][i + 1];

            let left_chord = back_left - front_left;
            let right_chord = back_right - front_right;

            let ring = RingVortex::new(
                ring_columns[j][i],
                ring_columns[j + 1][i],
                ring_columns[j][i + 1],
                ring_columns[j + 1][i + 1],
            );

            let collocation = (front_left + left_chord.scale(0.75))
                .midpoint(&(front_right + right_chord.scale(0.75)));

            let diag_cross = (back_left - front_right).cross(&(back_right - front_left));
            let area = 0.5 * diag_cross.length();
            let normal = diag_cross
                .normalize()
                .ok_or_else(|| ConfigError::DegeneratePanel {
                    wing: wing.name.clone(),
                    chordwise: i,
                    spanwise: j,
                })?;

            mesh.panels.push(Panel {
                front_left,
                front_right,
                back_left,
                back_right,
                ring,
                collocation,
                normal,
                area,
                is_leading_edge: i == 0,
                is_trailing_edge: i + 1 == num_chordwise,
                airplane: airplane_index,
                wing: wing_index,
                chordwise: i,
                spanwise: j,
            });
        }
    }

    mesh.wings.push(WingRange {
        airplane: airplane_index,
        wing: wing_index,
        panel_offset,
        num_chordwise,
        num_spanwise,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Airfoil, ControlSurface, Spacing, WingCrossSection};
    use approx::assert_relative_eq;

    fn flat_wing(symmetric: bool, nc: usize, ns: usize) -> Airplane {
        let foil = Airfoil::naca("0012").unwrap();
        let wing = Wing::new(
            "main",
            vec![
                WingCrossSection::new(1.0, foil.clone())
                    .with_spanwise_panels(ns, Spacing::Uniform),
                WingCrossSection::new(1.0, foil).with_le_offset(0.0, 2.0, 0.0),
            ],
        )
        .with_symmetric(symmetric)
        .with_chordwise_panels(nc, Spacing::Uniform);
        Airplane::new("demo", vec![wing])
    }

    #[test]
    fn test_panel_counts_and_ranges() {
        let mesh = mesh_airplanes(&[flat_wing(false, 3, 4)]).unwrap();
        assert_eq!(mesh.num_panels(), 12);
        assert_eq!(mesh.wings.len(), 1);
        assert_eq!(mesh.wings[0].num_chordwise, 3);
        assert_eq!(mesh.wings[0].num_spanwise, 4);
        assert_eq!(mesh.airplane_ranges[0], 0..12);
        assert_eq!(mesh.trailing_edge_indices(), vec![8, 9, 10, 11]);
    }

    #[test]
    fn test_symmetric_wing_doubles_span() {
        let mesh = mesh_airplanes(&[flat_wing(true, 2, 3)]).unwrap();
        assert_eq!(mesh.wings[0].num_spanwise, 6);
        assert_eq!(mesh.num_panels(), 12);
        // Columns run port to starboard
        let first = &mesh.panels[0];
        let last = &mesh.panels[5];
        assert!(first.front_left.y < 0.0);
        assert!(last.front_right.y > 0.0);
        assert_relative_eq!(first.front_left.y, -2.0, epsilon = 1e-12);
        assert_relative_eq!(last.front_right.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_wing_normals_point_up() {
        let mesh = mesh_airplanes(&[flat_wing(true, 2, 2)]).unwrap();
        for p in &mesh.panels {
            assert_relative_eq!(p.normal.z, 1.0, epsilon = 1e-9);
            assert_relative_eq!(p.normal.x, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_flat_wing_areas_sum_to_planform() {
        let mesh = mesh_airplanes(&[flat_wing(true, 4, 5)]).unwrap();
        let total: f64 = mesh.panels.iter().map(|p| p.area).sum();
        // 1 m chord x 4 m full span
        assert_relative_eq!(total, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ring_shifted_quarter_chord() {
        let mesh = mesh_airplanes(&[flat_wing(false, 4, 1)]).unwrap();
        let p = &mesh.panels[0];
        // Uniform chordwise spacing of a unit chord: panel length 0.25
        assert_relative_eq!(p.front_left.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.ring.front_left.x, 0.0625, epsilon = 1e-12);
        assert_relative_eq!(p.ring.back_left.x, 0.3125, epsilon = 1e-12);
        // Collocation at three-quarter chord of the panel, mid-span
        assert_relative_eq!(p.collocation.x, 0.1875, epsilon = 1e-12);
        assert_relative_eq!(p.collocation.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cosine_rings_share_legs_with_neighbours() {
        // Non-uniform chordwise spacing: adjacent rings must still sit on
        // the same shifted stations, leg for leg, or the net vorticity
        // between them stops being the single quarter-chord line
        let foil = Airfoil::naca("0012").unwrap();
        let wing = Wing::new(
            "main",
            vec![
                WingCrossSection::new(1.0, foil.clone())
                    .with_spanwise_panels(3, Spacing::Cosine),
                WingCrossSection::new(1.0, foil).with_le_offset(0.0, 2.0, 0.0),
            ],
        )
        .with_symmetric(true)
        .with_chordwise_panels(5, Spacing::Cosine);
        let mesh = mesh_airplanes(&[Airplane::new("demo", vec![wing])]).unwrap();

        let range = &mesh.wings[0];
        for i in 0..range.num_chordwise - 1 {
            for j in 0..range.num_spanwise {
                let ahead = &mesh.panels[range.panel_index(i, j)];
                let behind = &mesh.panels[range.panel_index(i + 1, j)];
                assert_eq!(ahead.ring.back_left, behind.ring.front_left);
                assert_eq!(ahead.ring.back_right, behind.ring.front_right);
            }
        }

        // Front filament still on the panel quarter-chord line
        let first = &mesh.panels[range.panel_index(0, 0)];
        let quarter = first.front_left + (first.back_left - first.front_left).scale(0.25);
        assert_relative_eq!(first.ring.front_left.x, quarter.x, epsilon = 1e-12);
        assert_relative_eq!(first.ring.front_left.z, quarter.z, epsilon = 1e-12);
    }

    #[test]
    fn test_trailing_ring_extends_behind_wing() {
        let mesh = mesh_airplanes(&[flat_wing(false, 4, 1)]).unwrap();
        let te = &mesh.panels[mesh.trailing_edge_indices()[0]];
        assert_relative_eq!(te.back_left.x, 1.0, epsilon = 1e-12);
        assert!(te.ring.back_left.x > 1.0);
    }

    #[test]
    fn test_edge_flags() {
        let mesh = mesh_airplanes(&[flat_wing(false, 3, 2)]).unwrap();
        for p in &mesh.panels {
            assert_eq!(p.is_leading_edge, p.chordwise == 0);
            assert_eq!(p.is_trailing_edge, p.chordwise == 2);
        }
    }

    #[test]
    fn test_antisymmetric_surface_flips_on_mirror() {
        let foil = Airfoil::naca("0012").unwrap();
        let aileron = ControlSurface::new(0.7, 10.0, ControlSurfaceKind::Antisymmetric);
        let wing = Wing::new(
            "main",
            vec![
                WingCrossSection::new(1.0, foil.clone())
                    .with_control_surface(aileron.clone())
                    .with_spanwise_panels(2, Spacing::Uniform),
                WingCrossSection::new(1.0, foil)
                    .with_le_offset(0.0, 2.0, 0.0)
                    .with_control_surface(aileron),
            ],
        )
        .with_symmetric(true)
        .with_chordwise_panels(6, Spacing::Uniform);
        let mesh = mesh_airplanes(&[Airplane::new("demo", vec![wing])]).unwrap();

        let range = &mesh.wings[0];
        // Aft panels on opposite halves bend opposite ways
        let port = &mesh.panels[range.panel_index(5, 0)];
        let starboard = &mesh.panels[range.panel_index(5, 3)];
        assert!(starboard.back_left.z < -1e-3);
        assert!(port.back_left.z > 1e-3);
        assert_relative_eq!(port.back_left.z, -starboard.back_right.z, epsilon = 1e-9);
    }

    #[test]
    fn test_reference_resolution_from_first_wing() {
        let plane = flat_wing(true, 3, 4);
        let mesh = mesh_airplanes(&[plane.clone()]).unwrap();
        let dims = resolve_reference(&plane, 0, &mesh);
        assert_relative_eq!(dims.s_ref, 4.0, epsilon = 1e-9);
        assert_relative_eq!(dims.b_ref, 4.0, epsilon = 1e-9);
        assert_relative_eq!(dims.c_ref, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_explicit_reference_wins() {
        let plane = flat_wing(true, 3, 4).with_reference_dimensions(10.0, 8.0, 1.25);
        let mesh = mesh_airplanes(&[plane.clone()]).unwrap();
        let dims = resolve_reference(&plane, 0, &mesh);
        assert_relative_eq!(dims.s_ref, 10.0);
        assert_relative_eq!(dims.b_ref, 8.0);
        assert_relative_eq!(dims.c_ref, 1.25);
    }

    #[test]
    fn test_twist_pitches_sections_nose_up() {
        let foil = Airfoil::naca("0012").unwrap();
        let wing = Wing::new(
            "main",
            vec![
                WingCrossSection::new(1.0, foil.clone()).with_twist(10.0),
                WingCrossSection::new(1.0, foil)
                    .with_le_offset(0.0, 2.0, 0.0)
                    .with_twist(10.0),
            ],
        )
        .with_chordwise_panels(2, Spacing::Uniform);
        let mesh = mesh_airplanes(&[Airplane::new("demo", vec![wing])]).unwrap();
        // Trailing edge drops below the leading edge when pitched nose-up
        let te = &mesh.panels[mesh.trailing_edge_indices()[0]];
        assert!(te.back_left.z < -0.1);
        // Normal tilts forward
        assert!(mesh.panels[0].normal.x > 0.1);
    }
}
