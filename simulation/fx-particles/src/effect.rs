//! Effects: named groups of emitters sharing a world position

use fx_data::{ValueReader, ValueWriter};
use glam::Vec2;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::{Arc, Weak};

use crate::emitter::ParticleEmitter;
use crate::error::{ParticleError, Result};
use crate::shape::{EmitterShape, ShapeKind};
use crate::time::Timestamp;

/// What an emitter needs from whatever owns it
pub trait EffectOwner: Send + Sync {
    /// Reserve a unique emitter name, adjusting `requested` if it is taken
    fn resolve_name(&self, requested: &str) -> String;

    /// Give back a name reserved by [`resolve_name`](Self::resolve_name)
    fn release_name(&self, name: &str);

    /// World position added to every particle when rendering
    fn position(&self) -> Vec2;
}

/// Shared state of an [`Effect`], referenced weakly by its emitters
#[derive(Debug, Default)]
pub struct EffectState {
    names: Mutex<HashSet<String>>,
    position: Mutex<Vec2>,
}

impl EffectState {
    fn set_position(&self, position: Vec2) {
        *self.position.lock() = position;
    }
}

impl EffectOwner for EffectState {
    fn resolve_name(&self, requested: &str) -> String {
        let base = if requested.trim().is_empty() {
            "Emitter"
        } else {
            requested
        };

        let mut names = self.names.lock();
        let mut name = base.to_string();
        let mut suffix = 2;
        while names.contains(&name) {
            name = format!("{} ({})", base, suffix);
            suffix += 1;
        }
        names.insert(name.clone());
        name
    }

    fn release_name(&self, name: &str) {
        self.names.lock().remove(name);
    }

    fn position(&self) -> Vec2 {
        *self.position.lock()
    }
}

/// A named collection of emitters
#[derive(Debug)]
pub struct Effect {
    name: String,
    state: Arc<EffectState>,
    emitters: Vec<ParticleEmitter>,
}

impl Effect {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(EffectState::default()),
            emitters: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn position(&self) -> Vec2 {
        self.state.position()
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.state.set_position(position);
    }

    /// Handle to pass when constructing emitters for this effect
    pub fn owner_handle(&self) -> Weak<dyn EffectOwner> {
        let handle: Weak<EffectState> = Arc::downgrade(&self.state);
        handle
    }

    /// Create an emitter with default settings and add it
    pub fn create_emitter(
        &mut self,
        name: &str,
        shape: impl Into<EmitterShape>,
    ) -> Result<&mut ParticleEmitter> {
        let emitter = ParticleEmitter::new(self.owner_handle(), name, shape)?;
        self.add_emitter(emitter)
    }

    /// Take ownership of an emitter built with [`owner_handle`](Self::owner_handle).
    ///
    /// The emitter's name is released again when it is disposed. Emitters of
    /// other effects are rejected; move them with
    /// [`ParticleEmitter::deep_copy`] instead.
    pub fn add_emitter(&mut self, mut emitter: ParticleEmitter) -> Result<&mut ParticleEmitter> {
        let owned = emitter
            .owner()
            .is_some_and(|owner| std::ptr::addr_eq(Arc::as_ptr(&owner), Arc::as_ptr(&self.state)));
        if !owned {
            return Err(ParticleError::ForeignEmitter(emitter.name().to_string()));
        }

        let state = Arc::downgrade(&self.state);
        emitter.on_disposed(move |name| {
            if let Some(state) = state.upgrade() {
                state.release_name(name);
            }
        });

        let index = self.emitters.len();
        self.emitters.push(emitter);
        Ok(&mut self.emitters[index])
    }

    pub fn emitters(&self) -> &[ParticleEmitter] {
        &self.emitters
    }

    pub fn emitters_mut(&mut self) -> &mut [ParticleEmitter] {
        &mut self.emitters
    }

    pub fn emitter(&self, name: &str) -> Option<&ParticleEmitter> {
        self.emitters.iter().find(|e| e.name() == name)
    }

    pub fn emitter_mut(&mut self, name: &str) -> Option<&mut ParticleEmitter> {
        self.emitters.iter_mut().find(|e| e.name() == name)
    }

    /// Detach an emitter; its name stays reserved until it is disposed
    pub fn remove_emitter(&mut self, name: &str) -> Option<ParticleEmitter> {
        let index = self.emitters.iter().position(|e| e.name() == name)?;
        Some(self.emitters.remove(index))
    }

    pub fn update(&mut self, now: Timestamp) {
        for emitter in &mut self.emitters {
            emitter.update(now);
        }
    }

    pub fn kill(&mut self) {
        for emitter in &mut self.emitters {
            emitter.kill();
        }
    }

    pub fn reset(&mut self) {
        for emitter in &mut self.emitters {
            emitter.reset();
        }
    }

    /// Dispose and drop every emitter
    pub fn dispose(&mut self) {
        for mut emitter in self.emitters.drain(..) {
            emitter.dispose();
        }
    }

    /// Dispose expired emitters, returning how many were removed
    pub fn remove_expired(&mut self) -> usize {
        let before = self.emitters.len();
        self.emitters.retain(|e| !e.is_expired());
        let removed = before - self.emitters.len();
        if removed > 0 {
            log::debug!("Effect '{}' removed {} expired emitters", self.name, removed);
        }
        removed
    }

    /// True when every emitter has expired
    pub fn is_expired(&self) -> bool {
        self.emitters.iter().all(ParticleEmitter::is_expired)
    }

    pub fn active_particles(&self) -> usize {
        self.emitters.iter().map(ParticleEmitter::active_particles).sum()
    }

    /// Fill instance data for every emitter in order
    pub fn fill_instance_data(&self, out: &mut Vec<f32>) {
        for emitter in &self.emitters {
            emitter.fill_instance_data(out);
        }
    }

    /// An independent copy with the same configuration and no particles
    pub fn deep_copy(&self) -> Result<Self> {
        let mut copy = Self::new(self.name.clone());
        copy.set_position(self.position());
        for emitter in &self.emitters {
            let emitter = emitter.deep_copy(copy.owner_handle())?;
            copy.add_emitter(emitter)?;
        }
        Ok(copy)
    }

    pub fn write(&self, writer: &mut dyn ValueWriter) -> Result<()> {
        writer.write_string("Name", &self.name)?;
        writer.write_vec2("Position", self.position())?;
        writer.begin_list("Emitters", self.emitters.len())?;
        for emitter in &self.emitters {
            writer.begin_block("Emitter")?;
            writer.write_string("EmitterType", emitter.kind().name())?;
            emitter.write_state(writer)?;
            writer.end_block()?;
        }
        writer.end_list()?;
        Ok(())
    }

    pub fn read(reader: &mut dyn ValueReader) -> Result<Self> {
        let mut effect = Self::new(reader.read_string("Name")?);
        effect.set_position(reader.read_vec2("Position")?);

        let count = reader.begin_list("Emitters")?;
        for _ in 0..count {
            reader.begin_block("Emitter")?;
            let kind = ShapeKind::from_name(&reader.read_string("EmitterType")?)?;
            let emitter = ParticleEmitter::read(effect.owner_handle(), kind, reader)?;
            reader.end_block()?;
            effect.add_emitter(emitter)?;
        }
        reader.end_list()?;

        log::debug!(
            "Read effect '{}' with {} emitters",
            effect.name,
            effect.emitters.len()
        );
        Ok(effect)
    }
}
