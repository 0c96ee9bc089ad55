//! Near-field force and moment integration
//!
//! Forces come from the vortex-lattice form of the Kutta-Joukowski theorem
//! applied to net bound filaments: every physical vortex segment is counted
//! exactly once, with the circulation difference between the rings that
//! share it. For panel (i, j) that means
//!
//!   front leg    gamma(i, j) - gamma(i-1, j)   (full gamma on the leading
//!                                               edge row)
//!   right leg    gamma(i, j) - gamma(i, j+1)   (full gamma on the rightmost
//!                                               column)
//!   left leg     full gamma, leftmost column only
//!
//! Trailing-edge aft legs carry no force: the freshly shed wake row holds
//! the same circulation at the same location, so the pair cancels.
//!
//! Each segment sees the local velocity (freestream plus bound and wake
//! induction at its midpoint) relative to the moving surface. The unsteady
//! pressure contribution acts along each panel's normal with magnitude
//! rho * d(gamma)/dt * area. Sums run sequentially in panel order so a
//! given scenario always integrates to the same bits.

use ndarray::Array1;

use crate::geometry::{Airplane, ReferenceDimensions};
use crate::influence::induced_velocities;
use crate::mesh::FlatMesh;
use crate::operating_point::OperatingPoint;
use crate::output::{AirplaneLoads, PanelRecord};
use crate::wake::Wake;
use aero_lattice_common::Vec3;

/// Loads of one step: per-panel records plus per-airplane totals
#[derive(Debug, Clone)]
pub struct StepLoads {
    pub panels: Vec<PanelRecord>,
    pub airplanes: Vec<AirplaneLoads>,
}

struct Leg {
    owner: usize,
    airplane: usize,
    net_gamma: f64,
    start: Vec3,
    end: Vec3,
}

/// Integrate forces and moments for one just-solved step
///
/// `gammas` are the circulations solved at this step and `previous_gammas`
/// those of the step before; `None` means there is no prior circulation and
/// the unsteady term is zero. `airplanes` must be the posed airplanes whose
/// mesh was solved, so moments are taken about the posed reference points.
pub fn compute_loads(
    mesh: &FlatMesh,
    wake: &Wake,
    gammas: &Array1<f64>,
    previous_gammas: Option<&Array1<f64>>,
    surface_velocities: &[Vec3],
    operating_point: &OperatingPoint,
    airplanes: &[Airplane],
    references: &[ReferenceDimensions],
    delta_time: f64,
    core_radius: f64,
) -> StepLoads {
    let num_panels = mesh.num_panels();
    debug_assert_eq!(gammas.len(), num_panels);
    debug_assert_eq!(surface_velocities.len(), num_panels);
    debug_assert_eq!(airplanes.len(), references.len());
    debug_assert!(delta_time > 0.0);

    let legs = collect_legs(mesh, gammas);
    let midpoints: Vec<Vec3> = legs.iter().map(|l| l.start.midpoint(&l.end)).collect();

    // Leg midpoints sit on bound filaments; the affected self-terms are
    // regularized to zero, so no counters here.
    let gamma_values = gammas.to_vec();
    let bound_induced = induced_velocities(
        &midpoints,
        &mesh.bound_rings(),
        &gamma_values,
        core_radius,
        None,
    );
    let wake_induced = wake.induced_at(&midpoints, core_radius, None);

    let freestream = operating_point.freestream_velocity();
    let density = operating_point.density;

    let mut panel_forces = vec![Vec3::zero(); num_panels];
    let mut airplane_forces = vec![Vec3::zero(); airplanes.len()];
    let mut airplane_moments = vec![Vec3::zero(); airplanes.len()];
    let reference_points: Vec<Vec3> = airplanes
        .iter()
        .map(|a| Vec3::new(a.x_ref, a.y_ref, a.z_ref))
        .collect();

    for (i, leg) in legs.iter().enumerate() {
        let local = freestream + bound_induced[i] + wake_induced[i]
            - surface_velocities[leg.owner];
        let segment = leg.end - leg.start;
        let force = local.cross(&segment).scale(density * leg.net_gamma);

        panel_forces[leg.owner] += force;
        airplane_forces[leg.airplane] += force;
        let arm = midpoints[i] - reference_points[leg.airplane];
        airplane_moments[leg.airplane] += arm.cross(&force);
    }

    if let Some(previous) = previous_gammas {
        debug_assert_eq!(previous.len(), num_panels);
        for (idx, panel) in mesh.panels.iter().enumerate() {
            let gamma_rate = (gammas[idx] - previous[idx]) / delta_time;
            let force = panel.normal.scale(density * gamma_rate * panel.area);
            panel_forces[idx] += force;
            airplane_forces[panel.airplane] += force;
            let arm = panel.collocation - reference_points[panel.airplane];
            airplane_moments[panel.airplane] += arm.cross(&force);
        }
    }

    let panels = mesh
        .panels
        .iter()
        .enumerate()
        .map(|(idx, panel)| PanelRecord {
            airplane: panel.airplane,
            wing: panel.wing,
            chordwise: panel.chordwise,
            spanwise: panel.spanwise,
            front_left: panel.front_left,
            front_right: panel.front_right,
            back_left: panel.back_left,
            back_right: panel.back_right,
            collocation: panel.collocation,
            normal: panel.normal,
            area: panel.area,
            gamma: gammas[idx],
            force: panel_forces[idx],
            pressure_delta: panel_forces[idx].dot(&panel.normal) / panel.area,
        })
        .collect();

    let q = operating_point.dynamic_pressure();
    let airplane_loads = airplanes
        .iter()
        .enumerate()
        .map(|(a, airplane)| {
            let reference = references[a];
            let force_wind = operating_point.wind_axes(&airplane_forces[a]);
            let moment_wind = operating_point.wind_axes(&airplane_moments[a]);
            let qs = q * reference.s_ref;
            AirplaneLoads {
                name: airplane.name.clone(),
                force_geometry: airplane_forces[a],
                moment_geometry: airplane_moments[a],
                force_wind,
                moment_wind,
                lift_coefficient: force_wind.z / qs,
                induced_drag_coefficient: force_wind.x / qs,
                side_force_coefficient: force_wind.y / qs,
                rolling_moment_coefficient: moment_wind.x / (qs * reference.b_ref),
                pitching_moment_coefficient: moment_wind.y / (qs * reference.c_ref),
                yawing_moment_coefficient: moment_wind.z / (qs * reference.b_ref),
            }
        })
        .collect();

    StepLoads {
        panels,
        airplanes: airplane_loads,
    }
}

/// Net bound filaments, each physical segment exactly once
fn collect_legs(mesh: &FlatMesh, gammas: &Array1<f64>) -> Vec<Leg> {
    let mut legs = Vec::new();
    for range in &mesh.wings {
        for chordwise in 0..range.num_chordwise {
            for spanwise in 0..range.num_spanwise {
                let idx = range.panel_index(chordwise, spanwise);
                let ring = &mesh.panels[idx].ring;
                let gamma = gammas[idx];

                let ahead = if chordwise > 0 {
                    gammas[range.panel_index(chordwise - 1, spanwise)]
                } else {
                    0.0
                };
                legs.push(Leg {
                    owner: idx,
                    airplane: range.airplane,
                    net_gamma: gamma - ahead,
                    start: ring.front_left,
                    end: ring.front_right,
                });

                let right = if spanwise + 1 < range.num_spanwise {
                    gammas[range.panel_index(chordwise, spanwise + 1)]
                } else {
                    0.0
                };
                legs.push(Leg {
                    owner: idx,
                    airplane: range.airplane,
                    net_gamma: gamma - right,
                    start: ring.front_right,
                    end: ring.back_right,
                });

                if spanwise == 0 {
                    legs.push(Leg {
                        owner: idx,
                        airplane: range.airplane,
                        net_gamma: gamma,
                        start: ring.back_left,
                        end: ring.front_left,
                    });
                }
            }
        }
    }
    legs
}
