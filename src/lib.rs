pub mod simulation;
pub mod configuration;
pub mod benchmark;
pub mod error;

pub use simulation::states::{Particle, Color, NVec2, PARTICLE_RADIUS, CONTACT_DISTANCE};
pub use simulation::free_list::FreeList;
pub use simulation::quadtree::{QuadTree, QuadCell, QuadNode, QuadObject, NodeState, Probe, QueryBounds};
pub use simulation::forces::{Acceleration, AccelSet, UniformGravity};
pub use simulation::params::SolverParams;
pub use simulation::engine::Engine;
pub use simulation::solver::{PhysicsSolver, StepStats};
pub use simulation::scenario::{Scenario, Spawner};

pub use configuration::config::{ScenarioConfig, WorldConfig, SolverConfig, QuadtreeConfig, EngineConfig, SpawnerConfig, RunConfig, PartitionConfig, IndexConfig};

pub use error::SimError;

pub use benchmark::benchmark::{bench_index, bench_update, bench_update_curve};
