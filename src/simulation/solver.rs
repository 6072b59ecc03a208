//! The physics solver
//!
//! Owns the particle array and the quadtree and advances both together.
//! One `update(dt)` runs `sub_steps` sub-steps of `dt / sub_steps`, each in
//! three phases:
//!
//! 1. index: rebuild (or incrementally refresh) the quadtree from particles
//!    strictly inside the world; the rest sleep this sub-step
//! 2. resolve: push overlapping particles apart
//! 3. integrate: gravity + Verlet + wall clamp
//!
//! Particle ids are indices into the particle array and never change.

use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::configuration::config::{IndexConfig, PartitionConfig};
use crate::error::SimError;
use crate::simulation::collision::{resolve_serial, resolve_strips};
use crate::simulation::engine::Engine;
use crate::simulation::forces::{AccelSet, UniformGravity};
use crate::simulation::integrator::integrate_parallel;
use crate::simulation::params::SolverParams;
use crate::simulation::partition::Strips;
use crate::simulation::quadtree::{QuadCell, QuadTree};
use crate::simulation::states::{NVec2, Particle};

/// Counters from the last `update`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepStats {
    pub sub_steps: u32,
    pub indexed: usize, // entries in the index during the last sub-step
    pub contacts: usize, // corrections applied over all sub-steps
    pub nodes: usize, // reachable quadtree nodes after the last sub-step
    pub max_bucket: usize, // largest leaf after the last sub-step
    pub elapsed_ms: f64,
}

pub struct PhysicsSolver {
    particles: Vec<Particle>,
    tree: QuadTree,
    params: SolverParams,
    engine: Engine,
    forces: AccelSet,
    pool: ThreadPool,
    tasks: usize,
    strips: Strips,
    indexed: Vec<bool>, // incremental mode: is particle i in the tree
    stats: StepStats,
}

impl PhysicsSolver {
    /// Solver with uniform gravity from `params`.
    pub fn new(params: SolverParams, engine: Engine) -> Result<Self, SimError> {
        let forces = AccelSet::new().with(UniformGravity { g: params.gravity });
        Self::with_forces(params, engine, forces)
    }

    /// Solver with a custom set of acceleration terms.
    pub fn with_forces(params: SolverParams, engine: Engine, forces: AccelSet) -> Result<Self, SimError> {
        validate(&params)?;

        let tasks = engine.resolved_threads();
        let pool = ThreadPoolBuilder::new()
            .num_threads(tasks)
            .thread_name(|i| format!("vqsim-worker-{i}"))
            .build()?;

        let strips = Strips::new(params.world_size.x, tasks);
        if engine.partition == PartitionConfig::Strips && strips.is_reduced(tasks) {
            log::warn!(
                "world width {} only fits {} collision strips for {} workers",
                params.world_size.x,
                strips.count,
                tasks
            );
        }

        let tree = QuadTree::with_limits(
            QuadCell::from_size(params.world_size),
            params.max_objects,
            params.max_depth,
        );

        log::info!(
            "solver ready: world {}x{}, {} sub-steps, {} workers, {:?} resolve, {:?} index",
            params.world_size.x,
            params.world_size.y,
            params.sub_steps,
            tasks,
            engine.partition,
            engine.index
        );

        Ok(Self {
            particles: Vec::new(),
            tree,
            params,
            engine,
            forces,
            pool,
            tasks,
            strips,
            indexed: Vec::new(),
            stats: StepStats::default(),
        })
    }

    /// Add a particle at rest at `position` and return its id.
    pub fn create_particle(&mut self, position: NVec2) -> usize {
        self.add_particle(Particle::new(position))
    }

    /// Add a prepared particle and return its id.
    pub fn add_particle(&mut self, particle: Particle) -> usize {
        self.particles.push(particle);
        self.indexed.push(false);
        self.particles.len() - 1
    }

    /// Read access for drawing. Ids are indices into this slice.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle(&self, id: usize) -> Option<&Particle> {
        self.particles.get(id)
    }

    pub fn particle_mut(&mut self, id: usize) -> Option<&mut Particle> {
        self.particles.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn workers(&self) -> usize {
        self.tasks
    }

    pub fn stats(&self) -> StepStats {
        self.stats
    }

    /// Change the sub-step count used by later updates. Zero is ignored.
    pub fn set_sub_steps(&mut self, sub_steps: u32) {
        if sub_steps > 0 {
            self.params.sub_steps = sub_steps;
        }
    }

    /// Advance the whole system by `dt`, split into `sub_steps` sub-steps.
    pub fn update(&mut self, dt: f32) {
        let start = Instant::now();
        let sub_dt = dt / self.params.sub_steps as f32;

        let mut contacts = 0;
        for _ in 0..self.params.sub_steps {
            self.update_index();
            contacts += self.solve_collisions();
            self.integrate(sub_dt);
        }

        self.stats = StepStats {
            sub_steps: self.params.sub_steps,
            indexed: self.tree.len(),
            contacts,
            nodes: self.tree.live_node_count(),
            max_bucket: self.tree.max_bucket(),
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        log::debug!(
            "update: {} particles, {} indexed, {} contacts, {:.3} ms",
            self.particles.len(),
            self.stats.indexed,
            contacts,
            self.stats.elapsed_ms
        );
    }

    /// Phase 1: bring the quadtree in line with current positions.
    pub fn update_index(&mut self) {
        match self.engine.index {
            IndexConfig::Rebuild => self.rebuild_index(),
            IndexConfig::Incremental => self.refresh_index(),
        }
    }

    /// Clear the tree and insert every particle strictly inside the world.
    pub fn rebuild_index(&mut self) {
        self.tree.clear();
        for (id, p) in self.particles.iter().enumerate() {
            if self.params.in_world(&p.position) {
                self.tree.insert(p.position, id);
            }
        }
    }

    /// Move entries that changed leaf, drop the ones that left the world,
    /// add particles that are not indexed yet, then fold empty branches.
    pub fn refresh_index(&mut self) {
        let PhysicsSolver { particles, tree, params, indexed, .. } = self;

        let evicted = tree.update_leafs(|id| {
            let p = particles[id].position;
            params.in_world(&p).then_some(p)
        });
        for id in evicted {
            indexed[id] = false;
        }

        for (id, p) in particles.iter().enumerate() {
            if !indexed[id] && params.in_world(&p.position) {
                tree.insert(p.position, id);
                indexed[id] = true;
            }
        }

        tree.cleanup();
    }

    /// Phase 2: resolve contacts. Returns the number of corrections.
    pub fn solve_collisions(&mut self) -> usize {
        match self.engine.partition {
            PartitionConfig::Serial => resolve_serial(&mut self.particles, &self.tree),
            PartitionConfig::Strips => resolve_strips(&self.pool, &self.strips, &mut self.particles, &self.tree),
        }
    }

    /// Phase 3: accelerate, step and clamp every particle by `dt`.
    pub fn integrate(&mut self, dt: f32) {
        let PhysicsSolver { particles, forces, params, pool, tasks, .. } = self;
        integrate_parallel(pool, *tasks, particles, forces, params, dt);
    }
}

fn validate(params: &SolverParams) -> Result<(), SimError> {
    let size = params.world_size;
    if !(size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0) {
        return Err(SimError::InvalidWorldSize { width: size.x, height: size.y });
    }
    if params.sub_steps == 0 {
        return Err(SimError::ZeroSubSteps);
    }
    if !(params.margin >= 0.0 && 2.0 * params.margin < size.x.min(size.y)) {
        return Err(SimError::InvalidMargin {
            margin: params.margin,
            width: size.x,
            height: size.y,
        });
    }
    if params.max_objects == 0 {
        return Err(SimError::InvalidQuadtreeLimits);
    }
    if !(params.gravity.x.is_finite() && params.gravity.y.is_finite()) {
        return Err(SimError::InvalidGravity { x: params.gravity.x, y: params.gravity.y });
    }
    Ok(())
}
