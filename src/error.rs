//! Error types for building a solver.
//!
//! The simulation loop itself cannot fail; everything here is raised while
//! validating parameters or setting up the worker pool.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("world size must be finite and positive, got {width} x {height}")]
    InvalidWorldSize { width: f32, height: f32 },

    #[error("sub_steps must be at least 1")]
    ZeroSubSteps,

    #[error("margin {margin} does not fit a {width} x {height} world")]
    InvalidMargin { margin: f32, width: f32, height: f32 },

    #[error("quadtree max_objects must be at least 1")]
    InvalidQuadtreeLimits,

    #[error("gravity must be finite, got ({x}, {y})")]
    InvalidGravity { x: f32, y: f32 },

    #[error("frame rate must be at least 1")]
    ZeroFrameRate,

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
