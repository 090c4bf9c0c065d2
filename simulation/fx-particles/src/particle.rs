//! Individual particle representation

use fx_data::Rgba;
use glam::Vec2;

use crate::time::Timestamp;

/// A single pooled particle.
///
/// Particles live in an emitter's buffer slots and are fully re-initialized
/// each time a slot is released again.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    /// Position relative to the owning effect
    pub position: Vec2,
    /// Velocity in units per second
    pub velocity: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    /// Uniform scale
    pub scale: f32,
    /// Current color
    pub color: Rgba,
    /// Time the particle was released
    pub life_start: Timestamp,
    /// Time the particle expires
    pub life_end: Timestamp,
}

impl Particle {
    /// Check if the particle is still alive at `now`
    #[inline]
    pub fn is_alive(&self, now: Timestamp) -> bool {
        now < self.life_end
    }

    /// Total lifespan in milliseconds
    #[inline]
    pub fn life_span(&self) -> i64 {
        self.life_end - self.life_start
    }

    /// Age at `now` as a fraction of the lifespan (0.0 to 1.0)
    #[inline]
    pub fn age_percent(&self, now: Timestamp) -> f32 {
        let span = self.life_span();
        if span > 0 {
            ((now - self.life_start) as f32 / span as f32).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Advance the position by the current velocity
    ///
    /// # Arguments
    /// * `dt` - Delta time in seconds
    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }
}
