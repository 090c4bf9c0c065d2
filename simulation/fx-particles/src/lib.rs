//! Pooled 2D particle emitters.
//!
//! An [`Effect`] owns a set of [`ParticleEmitter`]s and gives them unique
//! names and a world position. Each emitter releases particles from its
//! [`EmitterShape`] on a sampled schedule, keeps at most `budget` of them
//! alive in a power-of-two buffer, and persists its configuration through the
//! `fx-data` value contract.
//!
//! # Architecture
//!
//! - `Particle`: pooled record with position, velocity, rotation, scale,
//!   color and life window
//! - `Variable`: uniformly sampled range used for every release parameter
//! - `ParticleModifier` / `EmitterModifier`: per-particle and per-emitter
//!   adjustments
//! - `ShapeStrategy`: where particles appear and which way they travel
//! - `ParticleBufferPool`: process-wide recycler of particle buffers
//!
//! # Usage
//!
//! ```
//! use fx_particles::{ConeShape, Effect, Timestamp, Variable};
//!
//! let mut effect = Effect::new("Campfire");
//! let sparks = effect.create_emitter("Sparks", ConeShape::default())?;
//! sparks.set_budget(200)?;
//! sparks.release_mut().amount = Variable::new(1, 3);
//! sparks.reseed(7);
//!
//! let mut instances = Vec::new();
//! for frame in 0..60 {
//!     effect.update(Timestamp::from_millis(frame * 16));
//!     instances.clear();
//!     effect.fill_instance_data(&mut instances);
//! }
//! assert!(effect.active_particles() <= 200);
//! # Ok::<(), fx_particles::ParticleError>(())
//! ```

pub mod effect;
pub mod emitter;
pub mod error;
pub mod modifier;
pub mod particle;
pub mod pool;
pub mod shape;
pub mod time;
pub mod variable;

pub use effect::{Effect, EffectOwner, EffectState};
pub use emitter::{BlendMode, ParticleEmitter, RemainingLife, SpriteRef};
pub use error::{ParticleError, Result};
pub use modifier::{
    EmitterModifier, EmitterModifierCollection, Modifier, ModifierCollection, ModifierStages,
    ParticleModifier, ParticleModifierCollection, ReleaseParams, ReleaseTarget,
};
pub use particle::Particle;
pub use pool::ParticleBufferPool;
pub use shape::{
    ConeShape, Emission, EmitterShape, PolygonOrigin, PolygonShape, RectShape, ShapeKind,
    ShapeStrategy,
};
pub use time::{BOOTSTRAP_DELTA_TIME, MAX_DELTA_TIME, Timestamp};
pub use variable::{Variable, VariableValue};

/// Floats written per particle by `fill_instance_data`:
/// world position xy, rotation, scale, color rgba
pub const FLOATS_PER_PARTICLE: usize = 8;
