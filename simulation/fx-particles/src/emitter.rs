//! Particle emitter runtime state

use fx_data::{PersistEnum, ValueReader, ValueWriter, read_enum, write_enum};
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::FLOATS_PER_PARTICLE;
use crate::effect::EffectOwner;
use crate::error::{ParticleError, Result};
use crate::modifier::{
    EmitterContext, EmitterModifierCollection, ModifierStages, ParticleModifierCollection,
    ReleaseParams, UpdateContext,
};
use crate::particle::Particle;
use crate::pool::ParticleBufferPool;
use crate::shape::{EmitterShape, ShapeKind, ShapeStrategy};
use crate::time::{BOOTSTRAP_DELTA_TIME, MAX_DELTA_TIME, Timestamp, millis_to_secs};
use crate::variable::Variable;

/// Blending mode for particles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendMode {
    /// Alpha blending (src * alpha + dst * (1-alpha))
    #[default]
    Alpha,
    /// Additive blending (src + dst)
    Additive,
    /// Subtractive blending (dst - src)
    Subtractive,
    /// Modulate blending (src * dst)
    Multiply,
    /// No blending
    Opaque,
}

impl PersistEnum for BlendMode {
    const TYPE_NAME: &'static str = "BlendMode";

    fn to_u32(self) -> u32 {
        match self {
            Self::Alpha => 0,
            Self::Additive => 1,
            Self::Subtractive => 2,
            Self::Multiply => 3,
            Self::Opaque => 4,
        }
    }

    fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Alpha),
            1 => Some(Self::Additive),
            2 => Some(Self::Subtractive),
            3 => Some(Self::Multiply),
            4 => Some(Self::Opaque),
            _ => None,
        }
    }
}

/// Index into the owner's sprite table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpriteRef(pub u32);

impl SpriteRef {
    pub const NONE: Self = Self(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// How much longer an emitter keeps releasing particles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingLife {
    Infinite,
    Millis(i64),
}

impl RemainingLife {
    pub fn is_depleted(self) -> bool {
        matches!(self, Self::Millis(ms) if ms <= 0)
    }
}

impl fmt::Display for RemainingLife {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infinite => f.write_str("infinite"),
            Self::Millis(ms) => write!(f, "{}ms", ms),
        }
    }
}

type DisposedCallback = Box<dyn FnOnce(&str) + Send>;

/// Configuration parsed from a persisted definition before it is applied
struct Definition {
    name: String,
    blend_mode: BlendMode,
    budget: i32,
    emitter_life: i32,
    origin: Vec2,
    release: ReleaseParams,
    sprite: SpriteRef,
    shape: EmitterShape,
    particle_modifiers: ParticleModifierCollection,
    emitter_modifiers: EmitterModifierCollection,
}

impl Definition {
    /// Parse a definition whose custom values belong to `shape`'s kind
    fn read(shape: &EmitterShape, reader: &mut dyn ValueReader) -> Result<Self> {
        let name = reader.read_string("Name")?;
        let blend_mode = read_enum(reader, "BlendMode")?;
        let budget = reader.read_i32("Budget")?;
        if budget < 1 {
            return Err(ParticleError::InvalidBudget(i64::from(budget)));
        }
        let emitter_life = reader.read_i32("EmitterLife")?;
        let life = Variable::read(reader, "ParticleLife")?;
        let origin = reader.read_vec2("Origin")?;
        let amount = Variable::read(reader, "ReleaseAmount")?;
        let color = Variable::read(reader, "ReleaseColor")?;
        let rate = Variable::read(reader, "ReleaseRate")?;
        let rotation = Variable::read(reader, "ReleaseRotation")?;
        let scale = Variable::read(reader, "ReleaseScale")?;
        let speed = Variable::read(reader, "ReleaseSpeed")?;
        let sprite = SpriteRef(reader.read_u32("SpriteReference")?);

        reader.begin_block("CustomValues")?;
        let shape = read_custom_block(shape, reader).map_err(|source| {
            ParticleError::ShapeMismatch {
                shape: shape.kind(),
                source: Box::new(source),
            }
        })?;

        let particle_modifiers = ParticleModifierCollection::read(reader, "ParticleModifiers")?;
        let emitter_modifiers = EmitterModifierCollection::read(reader, "EmitterModifiers")?;

        Ok(Self {
            name,
            blend_mode,
            budget,
            emitter_life,
            origin,
            release: ReleaseParams {
                life,
                amount,
                rate,
                rotation,
                scale,
                speed,
                color,
            },
            sprite,
            shape,
            particle_modifiers,
            emitter_modifiers,
        })
    }
}

fn read_custom_block(shape: &EmitterShape, reader: &mut dyn ValueReader) -> Result<EmitterShape> {
    let shape = shape.read_custom_values(reader)?;
    reader.end_block()?;
    Ok(shape)
}

/// A pooled particle source.
///
/// Emitters are driven by their owner: every frame the owner calls
/// [`update`](Self::update) with its current time. Live particles occupy the
/// first [`active_particles`](Self::active_particles) slots of a buffer whose
/// length is always a power of two and never exceeds the budget rounded up to
/// one. Expired particles are swapped with the last live one, so slot indices
/// are not stable across updates.
pub struct ParticleEmitter {
    name: String,
    owner: Weak<dyn EffectOwner>,
    shape: EmitterShape,
    budget: i32,
    blend_mode: BlendMode,
    emitter_life: i32,
    origin: Vec2,
    release: ReleaseParams,
    sprite: SpriteRef,
    particle_modifiers: ParticleModifierCollection,
    emitter_modifiers: EmitterModifierCollection,

    particles: Vec<Particle>,
    live_count: usize,
    rng: StdRng,
    /// `None` until the first update after construction or reset
    time_created: Option<Timestamp>,
    next_release: Timestamp,
    last_update: Timestamp,
    killed: bool,
    disposed: bool,
    disposed_callbacks: Vec<DisposedCallback>,
}

impl ParticleEmitter {
    /// Default particle budget of new emitters
    pub const DEFAULT_BUDGET: i32 = 100;

    /// Create an emitter with default settings.
    ///
    /// The final name is whatever the owner resolves `name` to.
    pub fn new(
        owner: Weak<dyn EffectOwner>,
        name: &str,
        shape: impl Into<EmitterShape>,
    ) -> Result<Self> {
        let live_owner = owner.upgrade().ok_or(ParticleError::OwnerUnavailable)?;
        let name = live_owner.resolve_name(name);

        Ok(Self {
            name,
            owner,
            shape: shape.into(),
            budget: Self::DEFAULT_BUDGET,
            blend_mode: BlendMode::default(),
            emitter_life: -1,
            origin: Vec2::ZERO,
            release: ReleaseParams::default(),
            sprite: SpriteRef::NONE,
            particle_modifiers: ParticleModifierCollection::new(),
            emitter_modifiers: EmitterModifierCollection::new(),
            particles: Vec::new(),
            live_count: 0,
            rng: StdRng::from_os_rng(),
            time_created: None,
            next_release: Timestamp::ZERO,
            last_update: Timestamp::ZERO,
            killed: false,
            disposed: false,
            disposed_callbacks: Vec::new(),
        })
    }

    /// Build an emitter of `kind` from a persisted definition.
    ///
    /// Nothing is registered with the owner unless the whole definition
    /// parses.
    pub fn read(
        owner: Weak<dyn EffectOwner>,
        kind: ShapeKind,
        reader: &mut dyn ValueReader,
    ) -> Result<Self> {
        let definition = Definition::read(&kind.default_shape(), reader)?;
        let mut emitter = Self::new(owner, &definition.name, definition.shape.clone())?;
        emitter.apply(definition);
        Ok(emitter)
    }

    /// Persist the configuration (not the particles)
    pub fn write_state(&self, writer: &mut dyn ValueWriter) -> Result<()> {
        writer.write_string("Name", &self.name)?;
        write_enum(writer, "BlendMode", self.blend_mode)?;
        writer.write_i32("Budget", self.budget)?;
        writer.write_i32("EmitterLife", self.emitter_life)?;
        self.release.life.write(writer, "ParticleLife")?;
        writer.write_vec2("Origin", self.origin)?;
        self.release.amount.write(writer, "ReleaseAmount")?;
        self.release.color.write(writer, "ReleaseColor")?;
        self.release.rate.write(writer, "ReleaseRate")?;
        self.release.rotation.write(writer, "ReleaseRotation")?;
        self.release.scale.write(writer, "ReleaseScale")?;
        self.release.speed.write(writer, "ReleaseSpeed")?;
        writer.write_u32("SpriteReference", self.sprite.0)?;

        writer.begin_block("CustomValues")?;
        self.shape.write_custom_values(writer)?;
        writer.end_block()?;

        self.particle_modifiers.write(writer, "ParticleModifiers")?;
        self.emitter_modifiers.write(writer, "EmitterModifiers")?;
        Ok(())
    }

    /// Replace the configuration with a persisted definition.
    ///
    /// The definition is parsed completely first; on error the emitter is
    /// left unchanged.
    pub fn read_state(&mut self, reader: &mut dyn ValueReader) -> Result<()> {
        let definition = Definition::read(&self.shape, reader)?;
        let owner = self.live_owner()?;
        owner.release_name(&self.name);
        self.name = owner.resolve_name(&definition.name);
        self.apply(definition);
        Ok(())
    }

    fn apply(&mut self, definition: Definition) {
        self.blend_mode = definition.blend_mode;
        self.apply_budget(definition.budget);
        self.emitter_life = definition.emitter_life;
        self.origin = definition.origin;
        self.release = definition.release;
        self.sprite = definition.sprite;
        self.shape = definition.shape;
        self.particle_modifiers = definition.particle_modifiers;
        self.emitter_modifiers = definition.emitter_modifiers;
    }

    /// A copy bound to `owner` with the same configuration, no particles and
    /// fresh timing state
    pub fn deep_copy(&self, owner: Weak<dyn EffectOwner>) -> Result<Self> {
        let mut copy = Self::new(owner, &self.name, self.shape.clone())?;
        copy.budget = self.budget;
        copy.blend_mode = self.blend_mode;
        copy.emitter_life = self.emitter_life;
        copy.origin = self.origin;
        copy.release = self.release;
        copy.sprite = self.sprite;
        copy.particle_modifiers = self.particle_modifiers.clone();
        copy.emitter_modifiers = self.emitter_modifiers.clone();
        Ok(copy)
    }

    fn live_owner(&self) -> Result<Arc<dyn EffectOwner>> {
        self.owner.upgrade().ok_or(ParticleError::OwnerUnavailable)
    }

    /// The owning effect, if it still exists
    pub fn owner(&self) -> Option<Arc<dyn EffectOwner>> {
        self.owner.upgrade()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename through the owner, which may adjust `requested` to keep names
    /// unique
    pub fn set_name(&mut self, requested: &str) -> Result<()> {
        let owner = self.live_owner()?;
        owner.release_name(&self.name);
        self.name = owner.resolve_name(requested);
        Ok(())
    }

    pub fn shape(&self) -> &EmitterShape {
        &self.shape
    }

    pub fn shape_mut(&mut self) -> &mut EmitterShape {
        &mut self.shape
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn budget(&self) -> i32 {
        self.budget
    }

    /// Change the live particle cap.
    ///
    /// Lowering the budget drops the particles in slots past the new budget
    /// and shrinks the buffer to the new ceiling.
    pub fn set_budget(&mut self, budget: i32) -> Result<()> {
        if budget < 1 {
            return Err(ParticleError::InvalidBudget(i64::from(budget)));
        }
        self.apply_budget(budget);
        Ok(())
    }

    fn apply_budget(&mut self, budget: i32) {
        self.budget = budget;
        let cap = budget as usize;
        self.live_count = self.live_count.min(cap);
        let ceiling = cap.next_power_of_two();
        if self.particles.len() > ceiling {
            self.reallocate(ceiling);
        }
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn set_blend_mode(&mut self, blend_mode: BlendMode) {
        self.blend_mode = blend_mode;
    }

    /// Emitter life in milliseconds, negative for infinite
    pub fn emitter_life(&self) -> i32 {
        self.emitter_life
    }

    pub fn set_emitter_life(&mut self, emitter_life: i32) {
        self.emitter_life = emitter_life;
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    /// Samplers used for every release
    pub fn release(&self) -> &ReleaseParams {
        &self.release
    }

    pub fn release_mut(&mut self) -> &mut ReleaseParams {
        &mut self.release
    }

    pub fn sprite(&self) -> SpriteRef {
        self.sprite
    }

    pub fn set_sprite(&mut self, sprite: SpriteRef) {
        self.sprite = sprite;
    }

    pub fn particle_modifiers(&self) -> &ParticleModifierCollection {
        &self.particle_modifiers
    }

    pub fn particle_modifiers_mut(&mut self) -> &mut ParticleModifierCollection {
        &mut self.particle_modifiers
    }

    pub fn emitter_modifiers(&self) -> &EmitterModifierCollection {
        &self.emitter_modifiers
    }

    pub fn emitter_modifiers_mut(&mut self) -> &mut EmitterModifierCollection {
        &mut self.emitter_modifiers
    }

    /// Make future releases deterministic
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Number of live particles
    pub fn active_particles(&self) -> usize {
        self.live_count
    }

    /// The live particles; order and indices change between updates
    pub fn particles(&self) -> &[Particle] {
        &self.particles[..self.live_count]
    }

    /// Allocated particle slots
    pub fn buffer_len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Time left before releases stop
    pub fn remaining_life(&self) -> RemainingLife {
        if self.killed {
            return RemainingLife::Millis(0);
        }
        if self.emitter_life < 0 {
            return RemainingLife::Infinite;
        }
        let age = self
            .time_created
            .map_or(0, |created| self.last_update - created);
        RemainingLife::Millis((i64::from(self.emitter_life) - age).max(0))
    }

    /// No more releases will happen and every particle has expired
    pub fn is_expired(&self) -> bool {
        self.remaining_life().is_depleted() && self.live_count == 0
    }

    /// Advance the simulation to `now`
    pub fn update(&mut self, now: Timestamp) {
        if self.disposed {
            log::debug!("Ignoring update of disposed emitter '{}'", self.name);
            return;
        }

        let elapsed = match self.time_created {
            None => {
                self.time_created = Some(now);
                self.next_release = now;
                BOOTSTRAP_DELTA_TIME
            }
            Some(_) => (now - self.last_update).clamp(0, MAX_DELTA_TIME),
        };
        self.last_update = now;

        let configured = self.release;
        if !self.emitter_modifiers.is_empty() {
            let ctx = self.emitter_context();
            self.emitter_modifiers.apply(&mut self.release, &ctx);
        }

        let released = self.schedule_releases(now);
        self.update_particles(now, elapsed);

        self.release = configured;

        log::trace!(
            "Emitter '{}' at {}: released {}, {} active",
            self.name,
            now,
            released,
            self.live_count
        );
    }

    fn emitter_context(&self) -> EmitterContext {
        let age = self
            .time_created
            .map_or(0, |created| self.last_update - created);
        let life_fraction = match self.emitter_life {
            life if life < 0 => None,
            0 => Some(1.0),
            life => Some(age as f32 / life as f32),
        };
        EmitterContext { age, life_fraction }
    }

    /// Run the catch-up release loop, returning how many particles were
    /// released
    fn schedule_releases(&mut self, now: Timestamp) -> usize {
        let floor = now - MAX_DELTA_TIME;
        if self.remaining_life().is_depleted()
            || self.release.amount.upper() == 0
            || self.release.rate.upper() == 0
        {
            self.next_release = floor;
            return 0;
        }

        if self.next_release < floor {
            self.next_release = floor;
        }

        let mut pending = 0usize;
        while self.next_release <= now {
            pending += usize::from(self.release.amount.sample(&mut self.rng));
            let step = i64::from(self.release.rate.sample(&mut self.rng)).max(1);
            let previous = self.next_release;
            self.next_release += step;
            // Saturated at the end of the clock
            if self.next_release == previous {
                break;
            }
        }

        if pending == 0 {
            return 0;
        }
        let before = self.live_count;
        self.release_particles(now, pending);
        self.live_count - before
    }

    /// Number of live particles after releasing up to `amount` more
    fn release_capacity(&self, amount: usize) -> usize {
        self.live_count
            .saturating_add(amount)
            .min(self.budget as usize)
    }

    /// Grow the buffer to the next power of two holding `required` slots
    fn ensure_capacity(&mut self, required: usize) {
        if self.particles.len() >= required {
            return;
        }
        self.reallocate(required.next_power_of_two());
    }

    /// Move the live particles into a pooled buffer of `len` slots
    fn reallocate(&mut self, len: usize) {
        let pool = ParticleBufferPool::shared();
        let mut buffer = pool.acquire(len);
        let keep = self.live_count.min(len);
        buffer[..keep].copy_from_slice(&self.particles[..keep]);

        let old = std::mem::replace(&mut self.particles, buffer);
        log::debug!(
            "Emitter '{}' buffer resized from {} to {} slots",
            self.name,
            old.len(),
            len
        );
        pool.release(old);
    }

    fn release_particles(&mut self, now: Timestamp, amount: usize) {
        let target = self.release_capacity(amount);
        if target <= self.live_count {
            return;
        }
        self.ensure_capacity(target);

        let run_release_stage = self
            .particle_modifiers
            .stages()
            .contains(ModifierStages::RELEASE);

        for index in self.live_count..target {
            let life = i64::from(self.release.life.sample(&mut self.rng).max(0));
            let emission = self.shape.generate(&mut self.rng);
            let speed = self.release.speed.sample(&mut self.rng);

            let mut particle = Particle {
                position: self.origin + emission.offset,
                velocity: emission.force * speed,
                rotation: self.release.rotation.sample(&mut self.rng),
                scale: self.release.scale.sample(&mut self.rng),
                color: self.release.color.sample(&mut self.rng),
                life_start: now,
                life_end: now + life,
            };
            if run_release_stage {
                self.particle_modifiers.apply_release(&mut particle);
            }
            self.particles[index] = particle;
        }

        self.live_count = target;
    }

    /// Expire dead particles and advance the survivors
    fn update_particles(&mut self, now: Timestamp, elapsed: i64) {
        let ctx = UpdateContext {
            now,
            dt: millis_to_secs(elapsed),
        };

        let mut index = 0;
        while index < self.live_count {
            if !self.particles[index].is_alive(now) {
                self.live_count -= 1;
                self.particles.swap(index, self.live_count);
                continue;
            }

            let particle = &mut self.particles[index];
            self.particle_modifiers.apply_update(particle, &ctx);
            particle.integrate(ctx.dt);
            index += 1;
        }
    }

    /// Stop releasing; existing particles age out normally
    pub fn kill(&mut self) {
        if !self.killed {
            log::debug!("Emitter '{}' killed", self.name);
        }
        self.killed = true;
    }

    /// Restart timing as if newly created, keeping configuration and
    /// live particles
    pub fn reset(&mut self) {
        if self.disposed {
            log::warn!("Cannot reset disposed emitter '{}'", self.name);
            return;
        }
        self.time_created = None;
        self.next_release = Timestamp::ZERO;
        self.last_update = Timestamp::ZERO;
        self.killed = false;
    }

    /// Release the particle buffer and notify listeners. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.live_count = 0;
        ParticleBufferPool::shared().release(std::mem::take(&mut self.particles));
        log::debug!("Emitter '{}' disposed", self.name);

        for callback in std::mem::take(&mut self.disposed_callbacks) {
            callback(&self.name);
        }
    }

    /// Run `callback` with the emitter's name once it is disposed.
    ///
    /// Runs immediately if the emitter is already disposed.
    pub fn on_disposed<F>(&mut self, callback: F)
    where
        F: FnOnce(&str) + Send + 'static,
    {
        if self.disposed {
            callback(&self.name);
        } else {
            self.disposed_callbacks.push(Box::new(callback));
        }
    }

    /// Shrink the buffer to the smallest power of two holding the live
    /// particles
    pub fn shrink_to_fit(&mut self) {
        let target = match self.live_count {
            0 => 0,
            live => live.next_power_of_two(),
        };
        if target < self.particles.len() {
            self.reallocate(target);
        }
    }

    /// Append [`FLOATS_PER_PARTICLE`] floats per live particle to `out`:
    /// world x, world y, rotation, scale, then normalized r, g, b, a.
    pub fn fill_instance_data(&self, out: &mut Vec<f32>) {
        let base = self.owner.upgrade().map_or(Vec2::ZERO, |owner| owner.position());
        out.reserve(self.live_count * FLOATS_PER_PARTICLE);

        for particle in self.particles() {
            let world = base + particle.position;
            let [r, g, b, a] = particle.color.to_f32_array();
            out.extend_from_slice(&[world.x, world.y, particle.rotation, particle.scale, r, g, b, a]);
        }
    }
}

impl Drop for ParticleEmitter {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for ParticleEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleEmitter")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("budget", &self.budget)
            .field("blend_mode", &self.blend_mode)
            .field("emitter_life", &self.emitter_life)
            .field("origin", &self.origin)
            .field("release", &self.release)
            .field("sprite", &self.sprite)
            .field("particle_modifiers", &self.particle_modifiers)
            .field("emitter_modifiers", &self.emitter_modifiers)
            .field("active_particles", &self.live_count)
            .field("buffer_len", &self.particles.len())
            .field("killed", &self.killed)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
