//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! used by the driver:
//! - a ready `PhysicsSolver` (parameters, engine settings, gravity)
//! - the `Spawner` that feeds particles in
//! - the run settings (frame count, fixed frame rate)

use crate::configuration::config::{RunConfig, ScenarioConfig, SpawnerConfig};
use crate::error::SimError;
use crate::simulation::engine::Engine;
use crate::simulation::params::SolverParams;
use crate::simulation::solver::PhysicsSolver;
use crate::simulation::states::{Color, NVec2, Particle};

/// Adds a vertical column of moving particles each frame until a cap is hit.
#[derive(Debug, Clone)]
pub struct Spawner {
    pub origin: NVec2, // first particle of a column
    pub spacing: f32, // vertical distance within a column
    pub per_frame: usize,
    pub max_particles: usize,
    pub velocity: NVec2, // displacement per sub-step
    pub color: Color,
}

impl Spawner {
    /// Add one column to `solver` if it is below the cap. Returns how many
    /// particles were added.
    pub fn spawn(&self, solver: &mut PhysicsSolver) -> usize {
        let room = self.max_particles.saturating_sub(solver.len());
        let count = self.per_frame.min(room);
        for i in 0..count {
            let position = self.origin + NVec2::new(0.0, self.spacing * i as f32);
            let mut particle = Particle::new(position).with_color(self.color);
            particle.set_velocity(self.velocity);
            solver.add_particle(particle);
        }
        count
    }

    pub fn is_done(&self, solver: &PhysicsSolver) -> bool {
        solver.len() >= self.max_particles
    }
}

impl From<&SpawnerConfig> for Spawner {
    fn from(cfg: &SpawnerConfig) -> Self {
        Self {
            origin: NVec2::new(cfg.origin[0], cfg.origin[1]),
            spacing: cfg.spacing,
            per_frame: cfg.per_frame,
            max_particles: cfg.max_particles,
            velocity: NVec2::new(cfg.velocity[0], cfg.velocity[1]),
            color: Color::from(cfg.color),
        }
    }
}

/// Runtime bundle built from a [`ScenarioConfig`]
pub struct Scenario {
    pub solver: PhysicsSolver,
    pub spawner: Spawner,
    pub run: RunConfig,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, SimError> {
        if cfg.run.fps == 0 {
            return Err(SimError::ZeroFrameRate);
        }

        // Parameters (runtime) from the world / solver / quadtree sections
        let parameters = SolverParams {
            world_size: NVec2::new(cfg.world.width, cfg.world.height),
            gravity: NVec2::new(cfg.solver.gravity[0], cfg.solver.gravity[1]),
            sub_steps: cfg.solver.sub_steps,
            margin: cfg.solver.margin,
            max_objects: cfg.quadtree.max_objects,
            max_depth: cfg.quadtree.max_depth,
        };

        // Engine (runtime) from EngineConfig
        let engine = Engine {
            threads: cfg.engine.threads,
            partition: cfg.engine.partition,
            index: cfg.engine.index,
        };

        let solver = PhysicsSolver::new(parameters, engine)?;
        let spawner = Spawner::from(&cfg.spawner);

        Ok(Self {
            solver,
            spawner,
            run: cfg.run,
        })
    }

    /// Fixed frame time.
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.run.fps as f32
    }
}
