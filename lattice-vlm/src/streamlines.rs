//! Streamline tracing through the solved flow field
//!
//! Streamlines seed at the trailing-edge midpoints of the lifted surfaces
//! and march downstream through the combined freestream, bound and wake
//! velocity field with forward Euler steps. Each returned polyline starts
//! at its seed point.

use rayon::prelude::*;

use crate::mesh::FlatMesh;
use crate::operating_point::OperatingPoint;
use crate::wake::Wake;
use aero_lattice_common::Vec3;

pub fn trace_streamlines(
    mesh: &FlatMesh,
    gammas: &[f64],
    wake: &Wake,
    operating_point: &OperatingPoint,
    num_steps: usize,
    delta_time: f64,
    core_radius: f64,
) -> Vec<Vec<Vec3>> {
    let seeds: Vec<Vec3> = mesh
        .trailing_edge_indices()
        .iter()
        .map(|&i| {
            let panel = &mesh.panels[i];
            panel.back_left.midpoint(&panel.back_right)
        })
        .collect();

    let bound_rings = mesh.bound_rings();
    let wake_rings = wake.ring_elements();
    let wake_gammas = wake.gammas();
    let freestream = operating_point.freestream_velocity();

    seeds
        .par_iter()
        .map(|seed| {
            let mut line = Vec::with_capacity(num_steps + 1);
            let mut point = *seed;
            line.push(point);
            for _ in 0..num_steps {
                let mut velocity = freestream;
                for (ring, &gamma) in bound_rings.iter().zip(gammas.iter()) {
                    velocity += ring.velocity_at(&point, gamma, core_radius, None);
                }
                for (ring, &gamma) in wake_rings.iter().zip(wake_gammas.iter()) {
                    velocity += ring.velocity_at(&point, gamma, core_radius, None);
                }
                point += velocity.scale(delta_time);
                line.push(point);
            }
            line
        })
        .collect()
}
