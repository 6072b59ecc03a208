//! Position-Verlet integration and wall clamping
//!
//! Velocity is implicit in `position - previous_position`, so a step only
//! needs the accumulated acceleration:
//!
//! x_n+1 = 2 x_n - x_n-1 + a dt²
//!
//! Clamping moves `position` back inside the walls but leaves
//! `previous_position` alone, so the particle loses the velocity that pushed
//! it out (an inelastic wall).

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::simulation::forces::AccelSet;
use crate::simulation::params::SolverParams;
use crate::simulation::partition::chunk_len;
use crate::simulation::states::{NVec2, Particle};

/// Advance one particle by `dt` and reset its acceleration
pub fn verlet_step(p: &mut Particle, dt: f32) {
    let new_position = 2.0 * p.position - p.previous_position + p.acceleration * (dt * dt);
    p.previous_position = p.position;
    p.position = new_position;
    p.acceleration = NVec2::zeros();
}

/// Clamp each axis of `p.position` into `[margin, size - margin]`
pub fn clamp_to_world(p: &mut Particle, world_size: &NVec2, margin: f32) {
    for axis in 0..2 {
        let hi = world_size[axis] - margin;
        if p.position[axis] > hi {
            p.position[axis] = hi;
        } else if p.position[axis] < margin {
            p.position[axis] = margin;
        }
    }
}

/// Accelerate, step and clamp every particle of `particles`
pub fn integrate_slice(particles: &mut [Particle], forces: &AccelSet, params: &SolverParams, dt: f32) {
    for p in particles.iter_mut() {
        forces.accumulate(p);
        verlet_step(p, dt);
        clamp_to_world(p, &params.world_size, params.margin);
    }
}

/// [`integrate_slice`] on `pool`, one contiguous chunk per task.
///
/// Each task owns its chunk exclusively; nothing else is written.
pub fn integrate_parallel(
    pool: &ThreadPool,
    tasks: usize,
    particles: &mut [Particle],
    forces: &AccelSet,
    params: &SolverParams,
    dt: f32,
) {
    if particles.is_empty() {
        return;
    }
    let chunk = chunk_len(particles.len(), tasks);
    pool.install(|| {
        particles
            .par_chunks_mut(chunk)
            .for_each(|range| integrate_slice(range, forces, params, dt));
    });
}
