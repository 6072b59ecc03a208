use std::time::Instant;

use crate::configuration::config::{IndexConfig, PartitionConfig};
use crate::simulation::engine::Engine;
use crate::simulation::params::SolverParams;
use crate::simulation::quadtree::{Probe, QuadTree};
use crate::simulation::solver::PhysicsSolver;
use crate::simulation::states::{NVec2, CONTACT_DISTANCE};

/// Square world that fits `n` particles at roughly 0.6 per unit area
fn world_for(n: usize) -> NVec2 {
    let side = ((n as f32) / 0.6).sqrt().max(8.0);
    NVec2::new(side, side)
}

/// Deterministic positions spread over `world`, no rand needed
fn make_positions(n: usize, world: NVec2) -> Vec<NVec2> {
    (0..n)
        .map(|i| {
            let i_f = i as f32;
            NVec2::new(
                (0.5 + 0.5 * (i_f * 0.37).sin()) * (world.x - 2.0) + 1.0,
                (0.5 + 0.5 * (i_f * 0.13).cos()) * (world.y - 2.0) + 1.0,
            )
        })
        .collect()
}

/// Build a solver filled with `n` resting particles
fn make_solver(n: usize, partition: PartitionConfig, index: IndexConfig) -> Option<PhysicsSolver> {
    let world = world_for(n);
    let params = SolverParams {
        world_size: world,
        ..SolverParams::default()
    };
    let engine = Engine {
        threads: 0,
        partition,
        index,
    };

    let mut solver = match PhysicsSolver::new(params, engine) {
        Ok(solver) => solver,
        Err(err) => {
            log::error!("benchmark solver for N = {n} failed: {err}");
            return None;
        }
    };
    for p in make_positions(n, world) {
        solver.create_particle(p);
    }
    Some(solver)
}

/// Quadtree build + contact queries against a brute-force pair scan
pub fn bench_index() {
    let ns = [500, 1000, 2000, 4000, 8000, 16000];

    for n in ns {
        let world = world_for(n);
        let positions = make_positions(n, world);

        // Brute force
        let t0 = Instant::now();
        let mut brute_pairs = 0usize;
        for i in 0..n {
            for j in (i + 1)..n {
                if (positions[i] - positions[j]).norm_squared() < CONTACT_DISTANCE * CONTACT_DISTANCE {
                    brute_pairs += 1;
                }
            }
        }
        let dt_brute = t0.elapsed().as_secs_f64();

        // Quadtree
        let t1 = Instant::now();
        let mut tree = QuadTree::with_size(world);
        for (id, p) in positions.iter().enumerate() {
            tree.insert(*p, id);
        }
        let mut found = Vec::new();
        let mut tree_hits = 0usize;
        for (id, p) in positions.iter().enumerate() {
            found.clear();
            tree.query_into(&Probe::new(*p), &mut found);
            tree_hits += found.iter().filter(|&&other| other != id).count();
        }
        let dt_tree = t1.elapsed().as_secs_f64();

        // every pair is found once from each side
        println!(
            "N = {n:6}, brute = {:8.6} s ({brute_pairs} pairs), quadtree = {:8.6} s ({} pairs)",
            dt_brute,
            dt_tree,
            tree_hits / 2
        );
    }
}

/// One `update` with serial vs strip-parallel collision resolve
pub fn bench_update() {
    let ns = [1000, 2000, 4000, 8000, 16000, 32000];
    let steps = 5; // updates per model

    for n in ns {
        let mut per_update = [0.0f64; 2];
        for (slot, partition) in [PartitionConfig::Serial, PartitionConfig::Strips].into_iter().enumerate() {
            let Some(mut solver) = make_solver(n, partition, IndexConfig::Rebuild) else {
                return;
            };

            // Warm up
            solver.update(1.0 / 60.0);

            let t0 = Instant::now();
            for _ in 0..steps {
                solver.update(1.0 / 60.0);
            }
            per_update[slot] = t0.elapsed().as_secs_f64() / steps as f64;
        }

        println!(
            "N = {:6}, serial update = {:8.6} s,   strips update = {:8.6} s",
            n, per_update[0], per_update[1]
        );
    }
}

/// Update time against N for both index modes
/// Paste output directly into a spreadsheet to graph
pub fn bench_update_curve() {
    println!("N,rebuild_ms,incremental_ms");

    for n in (1000..=30000).step_by(1000) {
        let mut ms = [0.0f64; 2];
        for (slot, index) in [IndexConfig::Rebuild, IndexConfig::Incremental].into_iter().enumerate() {
            let Some(mut solver) = make_solver(n, PartitionConfig::Strips, index) else {
                return;
            };
            // let the pile settle a little so incremental updates see small moves
            solver.update(1.0 / 60.0);

            let steps = if n <= 5000 { 3 } else { 1 };
            let t0 = Instant::now();
            for _ in 0..steps {
                solver.update(1.0 / 60.0);
            }
            ms[slot] = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;
        }

        println!("{},{:.6},{:.6}", n, ms[0], ms[1]);
    }
}
