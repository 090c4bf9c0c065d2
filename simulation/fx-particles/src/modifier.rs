//! Emitter-level and particle-level modifiers
//!
//! Particle modifiers adjust a particle when it is released and/or on every
//! update tick. Emitter modifiers adjust the release parameters of an emitter
//! for the duration of one update; the emitter restores the configured values
//! afterwards, so emitter modifiers never accumulate.
//!
//! Both kinds persist as a list of `Modifier` blocks, each starting with a
//! `Type` string followed by the modifier's own fields.

use bitflags::bitflags;
use fx_data::{PersistEnum, Rgba, ValueReader, ValueWriter, read_enum, write_enum};
use glam::Vec2;
use std::f32::consts::TAU;

use crate::error::{ParticleError, Result};
use crate::particle::Particle;
use crate::time::Timestamp;
use crate::variable::Variable;

bitflags! {
    /// Points in a particle's life at which a modifier runs
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModifierStages: u8 {
        /// Right after the particle is initialized
        const RELEASE = 0x1;
        /// On every update tick while the particle is alive
        const UPDATE = 0x2;
    }
}

/// Common behavior of both modifier kinds
pub trait Modifier: Clone + Sized {
    /// Persisted `Type` value
    fn type_name(&self) -> &'static str;

    /// Stages this modifier participates in
    fn stages(&self) -> ModifierStages;

    /// Write the fields following `Type`
    fn write_fields(&self, writer: &mut dyn ValueWriter) -> Result<()>;

    /// Read the fields of the modifier registered as `type_name`
    fn read_fields(type_name: &str, reader: &mut dyn ValueReader) -> Result<Self>;
}

/// Timing information passed to particle modifiers on update
#[derive(Debug, Clone, Copy)]
pub struct UpdateContext {
    /// Current emitter time
    pub now: Timestamp,
    /// Elapsed time of this update in seconds
    pub dt: f32,
}

/// Adjusts individual particles
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParticleModifier {
    /// Interpolate the color from `start` to `end` over the particle's life
    ColorOverLife { start: Rgba, end: Rgba },
    /// Interpolate the scale from `start` to `end` over the particle's life
    ScaleOverLife { start: f32, end: f32 },
    /// Constant angular velocity in radians per second
    Spin { rate: f32 },
    /// Constant acceleration in units per second squared
    Gravity { force: Vec2 },
    /// Fraction of velocity lost per second
    Drag { factor: f32 },
    /// Velocity added once at release
    Impulse { velocity: Vec2 },
}

impl ParticleModifier {
    /// Apply the release stage
    pub fn on_release(&self, particle: &mut Particle) {
        match *self {
            Self::ColorOverLife { start, .. } => particle.color = start,
            Self::ScaleOverLife { start, .. } => particle.scale = start,
            Self::Impulse { velocity } => particle.velocity += velocity,
            Self::Spin { .. } | Self::Gravity { .. } | Self::Drag { .. } => {}
        }
    }

    /// Apply the update stage
    pub fn on_update(&self, particle: &mut Particle, ctx: &UpdateContext) {
        match *self {
            Self::ColorOverLife { start, end } => {
                particle.color = start.lerp(end, particle.age_percent(ctx.now));
            }
            Self::ScaleOverLife { start, end } => {
                let t = particle.age_percent(ctx.now);
                particle.scale = start + (end - start) * t;
            }
            Self::Spin { rate } => particle.rotation += rate * ctx.dt,
            Self::Gravity { force } => particle.velocity += force * ctx.dt,
            Self::Drag { factor } => {
                let retained = (1.0 - factor.clamp(0.0, 1.0)).powf(ctx.dt);
                particle.velocity *= retained;
            }
            Self::Impulse { .. } => {}
        }
    }
}

impl Modifier for ParticleModifier {
    fn type_name(&self) -> &'static str {
        match self {
            Self::ColorOverLife { .. } => "ColorOverLife",
            Self::ScaleOverLife { .. } => "ScaleOverLife",
            Self::Spin { .. } => "Spin",
            Self::Gravity { .. } => "Gravity",
            Self::Drag { .. } => "Drag",
            Self::Impulse { .. } => "Impulse",
        }
    }

    fn stages(&self) -> ModifierStages {
        match self {
            Self::ColorOverLife { .. } | Self::ScaleOverLife { .. } => {
                ModifierStages::RELEASE | ModifierStages::UPDATE
            }
            Self::Spin { .. } | Self::Gravity { .. } | Self::Drag { .. } => ModifierStages::UPDATE,
            Self::Impulse { .. } => ModifierStages::RELEASE,
        }
    }

    fn write_fields(&self, writer: &mut dyn ValueWriter) -> Result<()> {
        match *self {
            Self::ColorOverLife { start, end } => {
                start.write(writer, "Start")?;
                end.write(writer, "End")?;
            }
            Self::ScaleOverLife { start, end } => {
                writer.write_f32("Start", start)?;
                writer.write_f32("End", end)?;
            }
            Self::Spin { rate } => writer.write_f32("Rate", rate)?,
            Self::Gravity { force } => writer.write_vec2("Force", force)?,
            Self::Drag { factor } => writer.write_f32("Factor", factor)?,
            Self::Impulse { velocity } => writer.write_vec2("Velocity", velocity)?,
        }
        Ok(())
    }

    fn read_fields(type_name: &str, reader: &mut dyn ValueReader) -> Result<Self> {
        let modifier = match type_name {
            "ColorOverLife" => Self::ColorOverLife {
                start: Rgba::read(reader, "Start")?,
                end: Rgba::read(reader, "End")?,
            },
            "ScaleOverLife" => Self::ScaleOverLife {
                start: reader.read_f32("Start")?,
                end: reader.read_f32("End")?,
            },
            "Spin" => Self::Spin {
                rate: reader.read_f32("Rate")?,
            },
            "Gravity" => Self::Gravity {
                force: reader.read_vec2("Force")?,
            },
            "Drag" => Self::Drag {
                factor: reader.read_f32("Factor")?,
            },
            "Impulse" => Self::Impulse {
                velocity: reader.read_vec2("Velocity")?,
            },
            other => return Err(ParticleError::UnknownModifier(other.to_string())),
        };
        Ok(modifier)
    }
}

/// Release parameter adjusted by an emitter modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReleaseTarget {
    Speed,
    Scale,
    Rotation,
}

impl PersistEnum for ReleaseTarget {
    const TYPE_NAME: &'static str = "ReleaseTarget";

    fn to_u32(self) -> u32 {
        match self {
            Self::Speed => 0,
            Self::Scale => 1,
            Self::Rotation => 2,
        }
    }

    fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Speed),
            1 => Some(Self::Scale),
            2 => Some(Self::Rotation),
            _ => None,
        }
    }
}

/// Samplers used to initialize released particles.
///
/// The emitter snapshots these before running its emitter modifiers and
/// restores the snapshot once the update is complete.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReleaseParams {
    /// Particle life in milliseconds
    pub life: Variable<i32>,
    /// Particles per release
    pub amount: Variable<u16>,
    /// Milliseconds between releases
    pub rate: Variable<u16>,
    /// Initial rotation in radians
    pub rotation: Variable<f32>,
    pub scale: Variable<f32>,
    /// Initial speed in units per second
    pub speed: Variable<f32>,
    pub color: Variable<Rgba>,
}

impl Default for ReleaseParams {
    fn default() -> Self {
        Self {
            life: Variable::constant(1_000),
            amount: Variable::constant(1),
            rate: Variable::constant(50),
            rotation: Variable::constant(0.0),
            scale: Variable::constant(1.0),
            speed: Variable::constant(100.0),
            color: Variable::constant(Rgba::WHITE),
        }
    }
}

impl ReleaseParams {
    fn target_mut(&mut self, target: ReleaseTarget) -> &mut Variable<f32> {
        match target {
            ReleaseTarget::Speed => &mut self.speed,
            ReleaseTarget::Scale => &mut self.scale,
            ReleaseTarget::Rotation => &mut self.rotation,
        }
    }
}

/// Emitter state passed to emitter modifiers
#[derive(Debug, Clone, Copy)]
pub struct EmitterContext {
    /// Milliseconds since the emitter's first update
    pub age: i64,
    /// Fraction of the emitter's life that has passed, `None` if infinite
    pub life_fraction: Option<f32>,
}

/// Adjusts an emitter's release parameters for one update
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EmitterModifier {
    /// Add a sine wave to `target`; `period` in milliseconds
    Oscillate {
        target: ReleaseTarget,
        amplitude: f32,
        period: i32,
    },
    /// Multiply `target` by a constant factor
    Multiply { target: ReleaseTarget, factor: f32 },
    /// Fade the release amount towards `end_factor` as the emitter ages
    AmountOverLife { end_factor: f32 },
}

impl EmitterModifier {
    pub fn apply(&self, params: &mut ReleaseParams, ctx: &EmitterContext) {
        match *self {
            Self::Oscillate {
                target,
                amplitude,
                period,
            } => {
                if period <= 0 {
                    return;
                }
                let phase = (ctx.age % i64::from(period)) as f32 / period as f32;
                params
                    .target_mut(target)
                    .offset(amplitude * (phase * TAU).sin());
            }
            Self::Multiply { target, factor } => params.target_mut(target).scale(factor),
            Self::AmountOverLife { end_factor } => {
                if let Some(t) = ctx.life_fraction {
                    let t = t.clamp(0.0, 1.0);
                    params.amount.scale(1.0 + (end_factor - 1.0) * t);
                }
            }
        }
    }
}

impl Modifier for EmitterModifier {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Oscillate { .. } => "Oscillate",
            Self::Multiply { .. } => "Multiply",
            Self::AmountOverLife { .. } => "AmountOverLife",
        }
    }

    fn stages(&self) -> ModifierStages {
        ModifierStages::UPDATE
    }

    fn write_fields(&self, writer: &mut dyn ValueWriter) -> Result<()> {
        match *self {
            Self::Oscillate {
                target,
                amplitude,
                period,
            } => {
                write_enum(writer, "Target", target)?;
                writer.write_f32("Amplitude", amplitude)?;
                writer.write_i32("Period", period)?;
            }
            Self::Multiply { target, factor } => {
                write_enum(writer, "Target", target)?;
                writer.write_f32("Factor", factor)?;
            }
            Self::AmountOverLife { end_factor } => writer.write_f32("EndFactor", end_factor)?,
        }
        Ok(())
    }

    fn read_fields(type_name: &str, reader: &mut dyn ValueReader) -> Result<Self> {
        let modifier = match type_name {
            "Oscillate" => Self::Oscillate {
                target: read_enum(reader, "Target")?,
                amplitude: reader.read_f32("Amplitude")?,
                period: reader.read_i32("Period")?,
            },
            "Multiply" => Self::Multiply {
                target: read_enum(reader, "Target")?,
                factor: reader.read_f32("Factor")?,
            },
            "AmountOverLife" => Self::AmountOverLife {
                end_factor: reader.read_f32("EndFactor")?,
            },
            other => return Err(ParticleError::UnknownModifier(other.to_string())),
        };
        Ok(modifier)
    }
}

/// Ordered list of modifiers of one kind
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ModifierCollection<M> {
    items: Vec<M>,
}

pub type ParticleModifierCollection = ModifierCollection<ParticleModifier>;
pub type EmitterModifierCollection = ModifierCollection<EmitterModifier>;

impl<M> Default for ModifierCollection<M> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<M: Modifier> ModifierCollection<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, modifier: M) {
        self.items.push(modifier);
    }

    /// Remove the modifier at `index`, if any
    pub fn remove(&mut self, index: usize) -> Option<M> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, M> {
        self.items.iter()
    }

    /// Union of the stages of all modifiers
    pub fn stages(&self) -> ModifierStages {
        self.items
            .iter()
            .fold(ModifierStages::empty(), |acc, m| acc | m.stages())
    }

    /// Persist as a list of `Modifier` blocks
    pub fn write(&self, writer: &mut dyn ValueWriter, key: &str) -> Result<()> {
        writer.begin_list(key, self.items.len())?;
        for modifier in &self.items {
            writer.begin_block("Modifier")?;
            writer.write_string("Type", modifier.type_name())?;
            modifier.write_fields(writer)?;
            writer.end_block()?;
        }
        writer.end_list()?;
        Ok(())
    }

    pub fn read(reader: &mut dyn ValueReader, key: &str) -> Result<Self> {
        let len = reader.begin_list(key)?;
        let mut items = Vec::with_capacity(len.min(64));
        for _ in 0..len {
            reader.begin_block("Modifier")?;
            let type_name = reader.read_string("Type")?;
            items.push(M::read_fields(&type_name, reader)?);
            reader.end_block()?;
        }
        reader.end_list()?;
        Ok(Self { items })
    }
}

impl ParticleModifierCollection {
    /// Run the release stage of every modifier, in order
    pub fn apply_release(&self, particle: &mut Particle) {
        for modifier in &self.items {
            if modifier.stages().contains(ModifierStages::RELEASE) {
                modifier.on_release(particle);
            }
        }
    }

    /// Run the update stage of every modifier, in order
    pub fn apply_update(&self, particle: &mut Particle, ctx: &UpdateContext) {
        for modifier in &self.items {
            if modifier.stages().contains(ModifierStages::UPDATE) {
                modifier.on_update(particle, ctx);
            }
        }
    }
}

impl EmitterModifierCollection {
    pub fn apply(&self, params: &mut ReleaseParams, ctx: &EmitterContext) {
        for modifier in &self.items {
            modifier.apply(params, ctx);
        }
    }
}

impl<M> FromIterator<M> for ModifierCollection<M> {
    fn from_iter<I: IntoIterator<Item = M>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, M> IntoIterator for &'a ModifierCollection<M> {
    type Item = &'a M;
    type IntoIter = std::slice::Iter<'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
