//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`WorldConfig`]    – world extent
//! - [`SolverConfig`]   – sub-steps, gravity, wall margin
//! - [`QuadtreeConfig`] – spatial index split limits
//! - [`EngineConfig`]   – worker count, collision partitioning, index mode
//! - [`SpawnerConfig`]  – how the driver feeds new particles in
//! - [`RunConfig`]      – how long the driver runs and at what frame rate
//! - [`ScenarioConfig`] – top-level wrapper used to load a scenario from YAML
//!
//! Every section and field is optional and falls back to the defaults below.
//!
//! # YAML format
//!
//! ```yaml
//! world:
//!   width: 150.0
//!   height: 150.0
//!
//! solver:
//!   sub_steps: 8            # sub-steps per frame
//!   gravity: [0.0, 20.0]    # +y points down
//!   margin: 0.5             # distance kept from the walls
//!
//! quadtree:
//!   max_objects: 8          # leaf occupancy that triggers a split
//!   max_depth: 4            # leaves at this depth never split
//!
//! engine:
//!   threads: 0              # 0 -> available parallelism
//!   partition: "strips"     # or "serial"
//!   index: "rebuild"        # or "incremental"
//!
//! spawner:
//!   origin: [2.0, 1.0]      # first particle of each column
//!   spacing: 1.1            # vertical distance within a column
//!   per_frame: 10           # particles per column
//!   max_particles: 15000
//!   velocity: [0.14, 0.0]   # displacement per sub-step
//!   color: [255, 255, 255, 255]
//!
//! run:
//!   frames: 600
//!   fps: 60
//! ```
//!
//! The solver maps this configuration into its runtime types
//! (`SolverParams`, `Engine`, `Spawner`) in `simulation::scenario`.

use serde::Deserialize;

/// How the collision phase is spread over the workers
/// `partition: "serial"` or `partition: "strips"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartitionConfig {
    #[serde(rename = "serial")] // one task, index storage order
    Serial,

    #[default]
    #[serde(rename = "strips")] // vertical strips, even then odd, one task per strip
    Strips,
}

/// How the spatial index follows the particles between sub-steps
/// `index: "rebuild"` or `index: "incremental"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexConfig {
    #[default]
    #[serde(rename = "rebuild")] // clear and re-insert everything
    Rebuild,

    #[serde(rename = "incremental")] // move only entries that changed leaf, fold empty branches
    Incremental,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self { width: 150.0, height: 150.0 }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SolverConfig {
    pub sub_steps: u32, // sub-steps per update
    pub gravity: [f32; 2], // constant acceleration
    pub margin: f32, // distance kept from the walls
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            sub_steps: 8,
            gravity: [0.0, 20.0],
            margin: 0.5,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct QuadtreeConfig {
    pub max_objects: usize,
    pub max_depth: u32,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self { max_objects: 8, max_depth: 4 }
    }
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub threads: usize, // 0 - use available parallelism
    pub partition: PartitionConfig,
    pub index: IndexConfig,
}

/// Particle source used by the driver
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SpawnerConfig {
    pub origin: [f32; 2], // position of the first particle of a column
    pub spacing: f32, // vertical distance between particles of a column
    pub per_frame: usize, // particles added per frame
    pub max_particles: usize, // stop spawning at this count
    pub velocity: [f32; 2], // initial displacement per sub-step
    pub color: [u8; 4], // RGBA
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            origin: [2.0, 1.0],
            spacing: 1.1,
            per_frame: 10,
            max_particles: 15000,
            velocity: [0.14, 0.0],
            color: [255, 255, 255, 255],
        }
    }
}

/// Driver loop settings
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RunConfig {
    pub frames: u64, // frames to simulate
    pub fps: u32, // fixed frame rate, dt = 1 / fps
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { frames: 600, fps: 60 }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ScenarioConfig {
    pub world: WorldConfig,
    pub solver: SolverConfig,
    pub quadtree: QuadtreeConfig,
    pub engine: EngineConfig,
    pub spawner: SpawnerConfig,
    pub run: RunConfig,
}
