//! Wake shedding, convection and truncation
//!
//! The wake is a growing lattice of ring vortices trailing the
//! trailing-edge panels. One row is shed at the end of every step, so after
//! step k the wake holds `k * te_panel_count` rings (unless truncated by the
//! horizon). A shed ring's circulation is frozen forever; only its vertices
//! move. In free mode vertices ride the full velocity field (freestream
//! plus bound plus wake induction); in prescribed mode they ride the
//! freestream alone.
//!
//! Rows are stored oldest first, each row one ring per trailing-edge panel
//! in the mesh's stable trailing-edge order. Adjacent rings keep their own
//! copies of shared corners; identical positions see identical velocity
//! sums, so the lattice cannot tear.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::influence::{induced_velocities, KernelCounters, RingVortex};
use aero_lattice_common::Vec3;

// Wake vertices are filament corners, so during convection a vertex always
// sits on its own ring's legs. Those self-terms regularize to zero and are
// expected, so convection never feeds the kernel counters.

/// Wake convection model, fixed for a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WakeMode {
    /// Vertices convect with freestream + bound + wake induction
    Free,
    /// Vertices convect with the freestream only
    Prescribed,
}

/// One shed ring: frozen circulation, mobile vertices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WakeRingVortex {
    pub ring: RingVortex,
    /// Circulation frozen at shedding [m^2/s]
    pub gamma: f64,
    /// Steps since this ring was shed
    pub age: usize,
}

/// The whole trailing wake of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wake {
    pub mode: WakeMode,
    rings: Vec<WakeRingVortex>,
    /// Rings per row: one per trailing-edge panel
    num_te: usize,
    /// Maximum ring age kept, `None` for an unbounded wake
    horizon: Option<usize>,
}

impl Wake {
    pub fn new(mode: WakeMode, num_te: usize, horizon: Option<usize>) -> Self {
        Self {
            mode,
            rings: Vec::new(),
            num_te,
            horizon,
        }
    }

    pub fn rings(&self) -> &[WakeRingVortex] {
        &self.rings
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    pub fn num_rows(&self) -> usize {
        if self.num_te == 0 {
            0
        } else {
            self.rings.len() / self.num_te
        }
    }

    /// Ring geometry only, for induction kernels
    pub fn ring_elements(&self) -> Vec<RingVortex> {
        self.rings.iter().map(|r| r.ring).collect()
    }

    /// Frozen circulations, in lockstep with [`Wake::ring_elements`]
    pub fn gammas(&self) -> Vec<f64> {
        self.rings.iter().map(|r| r.gamma).collect()
    }

    /// Wake-induced velocity at each point
    pub fn induced_at(
        &self,
        points: &[Vec3],
        core_radius: f64,
        counters: Option<&KernelCounters>,
    ) -> Vec<Vec3> {
        if self.rings.is_empty() {
            return vec![Vec3::zero(); points.len()];
        }
        induced_velocities(
            points,
            &self.ring_elements(),
            &self.gammas(),
            core_radius,
            counters,
        )
    }

    /// Move every wake vertex one step downstream
    ///
    /// `bound_rings`/`bound_gammas` describe the just-solved bound lattice;
    /// they only matter in free mode.
    pub fn convect(
        &mut self,
        bound_rings: &[RingVortex],
        bound_gammas: &[f64],
        freestream: &Vec3,
        delta_time: f64,
        core_radius: f64,
    ) {
        if self.rings.is_empty() {
            return;
        }

        let displacements: Vec<[Vec3; 4]> = match self.mode {
            WakeMode::Prescribed => {
                let shift = freestream.scale(delta_time);
                vec![[shift; 4]; self.rings.len()]
            }
            WakeMode::Free => {
                let points: Vec<Vec3> = self
                    .rings
                    .iter()
                    .flat_map(|r| r.ring.vertices())
                    .collect();
                let wake_rings = self.ring_elements();
                let wake_gammas = self.gammas();

                let velocities: Vec<Vec3> = points
                    .par_iter()
                    .map(|point| {
                        let mut v = *freestream;
                        for (ring, &g) in bound_rings.iter().zip(bound_gammas.iter()) {
                            v += ring.velocity_at(point, g, core_radius, None);
                        }
                        for (ring, &g) in wake_rings.iter().zip(wake_gammas.iter()) {
                            v += ring.velocity_at(point, g, core_radius, None);
                        }
                        v
                    })
                    .collect();

                velocities
                    .chunks_exact(4)
                    .map(|c| {
                        [
                            c[0].scale(delta_time),
                            c[1].scale(delta_time),
                            c[2].scale(delta_time),
                            c[3].scale(delta_time),
                        ]
                    })
                    .collect()
            }
        };

        for (wake_ring, shift) in self.rings.iter_mut().zip(displacements.iter()) {
            wake_ring.ring.front_left += shift[0];
            wake_ring.ring.front_right += shift[1];
            wake_ring.ring.back_left += shift[2];
            wake_ring.ring.back_right += shift[3];
        }
    }

    /// Shed one new row behind the trailing edge and apply the horizon
    ///
    /// `te_rings` are the trailing-edge bound rings at the current pose and
    /// `te_gammas` their just-solved circulations, both in the mesh's
    /// stable trailing-edge order. Call after [`Wake::convect`] so the new
    /// row bridges the gap the old rows left behind.
    pub fn shed(
        &mut self,
        te_rings: &[RingVortex],
        te_gammas: &[f64],
        freestream: &Vec3,
        delta_time: f64,
    ) {
        debug_assert_eq!(te_rings.len(), self.num_te);
        debug_assert_eq!(te_gammas.len(), self.num_te);

        for ring in &mut self.rings {
            ring.age += 1;
        }

        let prior_newest_start = self.rings.len().checked_sub(self.num_te);
        let mut new_row = Vec::with_capacity(self.num_te);
        for (j, (te, &gamma)) in te_rings.iter().zip(te_gammas.iter()).enumerate() {
            let front_left = te.back_left;
            let front_right = te.back_right;
            let (back_left, back_right) = match prior_newest_start {
                Some(start) => {
                    let prior = &self.rings[start + j].ring;
                    (prior.front_left, prior.front_right)
                }
                None => (
                    front_left + freestream.scale(delta_time),
                    front_right + freestream.scale(delta_time),
                ),
            };
            new_row.push(WakeRingVortex {
                ring: RingVortex::new(front_left, front_right, back_left, back_right),
                gamma,
                age: 0,
            });
        }
        self.rings.extend(new_row);

        if let Some(horizon) = self.horizon {
            self.rings.retain(|r| r.age < horizon);
        }
    }
}
