//! Core state types for the particle simulation.
//!
//! Defines the particle record owned by the solver:
//! - `Particle` with Verlet state (`position`, `previous_position`)
//! - `Color`, an opaque RGBA payload for whoever draws the particles
//!
//! Velocity is never stored, it is `position - previous_position`.

use nalgebra::Vector2;
pub type NVec2 = Vector2<f32>;

/// Every particle is a circle of this radius.
pub const PARTICLE_RADIUS: f32 = 1.0;

/// Minimum allowed distance between two particle centers.
///
/// Contacts are resolved against this value, not against `2 * PARTICLE_RADIUS`.
/// The contact probe has unit radius as well, so the broad phase and the
/// correction agree.
pub const CONTACT_DISTANCE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl From<[u8; 4]> for Color {
    fn from(c: [u8; 4]) -> Self {
        Color::rgba(c[0], c[1], c[2], c[3])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: NVec2, // current position
    pub previous_position: NVec2, // position one sub-step ago
    pub acceleration: NVec2, // accumulated for the current sub-step
    pub color: Color, // not used by physics
}

impl Particle {
    /// Particle at rest at `position`.
    pub fn new(position: NVec2) -> Self {
        Self {
            position,
            previous_position: position,
            acceleration: NVec2::zeros(),
            color: Color::default(),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Teleport without imparting velocity.
    pub fn set_position(&mut self, position: NVec2) {
        self.position = position;
        self.previous_position = position;
    }

    /// Displacement per sub-step.
    pub fn velocity(&self) -> NVec2 {
        self.position - self.previous_position
    }

    /// Set the displacement per sub-step by moving `previous_position`.
    pub fn set_velocity(&mut self, velocity: NVec2) {
        self.previous_position = self.position - velocity;
    }
}
