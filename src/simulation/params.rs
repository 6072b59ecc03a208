//! Numerical and physical parameters for the solver
//!
//! `SolverParams` holds runtime settings:
//! - world size (the world spans `[0, width] x [0, height]`),
//! - gravity and sub-step count,
//! - wall margin used when clamping,
//! - quadtree split limits

use crate::simulation::states::NVec2;
use crate::simulation::quadtree::{MAX_DEPTH, MAX_OBJECTS};

#[derive(Debug, Clone)]
pub struct SolverParams {
    pub world_size: NVec2, // world extent
    pub gravity: NVec2, // constant acceleration, +y points down
    pub sub_steps: u32, // sub-steps per update
    pub margin: f32, // distance kept from the walls
    pub max_objects: usize, // leaf occupancy that triggers a split
    pub max_depth: u32, // leaves at this depth never split
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            world_size: NVec2::new(150.0, 150.0),
            gravity: NVec2::new(0.0, 20.0),
            sub_steps: 8,
            margin: 0.5,
            max_objects: MAX_OBJECTS,
            max_depth: MAX_DEPTH,
        }
    }
}

impl SolverParams {
    /// Is `p` strictly inside the world? Only such particles are indexed.
    pub fn in_world(&self, p: &NVec2) -> bool {
        p.x > 0.0 && p.x < self.world_size.x && p.y > 0.0 && p.y < self.world_size.y
    }
}
