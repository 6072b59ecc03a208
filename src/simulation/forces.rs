//! Per-particle acceleration sources
//!
//! Every sub-step, right before the Verlet step, each source adds its
//! contribution to `Particle::acceleration`. Integration then consumes the
//! sum and resets it to zero.

use crate::simulation::states::{NVec2, Particle};

type Source = Box<dyn Acceleration + Send + Sync>;

/// Acceleration sources applied to every particle each sub-step.
///
/// Integration walks disjoint chunks of particles on several workers, all
/// sharing one set.
#[derive(Default)]
pub struct AccelSet {
    sources: Vec<Source>,
}

impl AccelSet {
    /// No sources: particles keep their velocity until they hit something.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append `source` after the existing ones.
    pub fn with<A>(mut self, source: A) -> Self
    where
        A: Acceleration + Send + Sync + 'static,
    {
        self.sources.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Add every source's pull on `particle` to its pending acceleration.
    pub fn accumulate(&self, particle: &mut Particle) {
        let pull: NVec2 = self.sources.iter().map(|s| s.acceleration(particle)).sum();
        particle.acceleration += pull;
    }
}

/// Acceleration acting on one particle, read from its current state.
pub trait Acceleration {
    fn acceleration(&self, particle: &Particle) -> NVec2;
}

/// The same acceleration everywhere. `+y` points down the screen.
pub struct UniformGravity {
    pub g: NVec2,
}

impl Acceleration for UniformGravity {
    fn acceleration(&self, _particle: &Particle) -> NVec2 {
        self.g
    }
}
