//! Effect-level behavior across emitters and threads

use fx_particles::{
    ConeShape, Effect, EmitterModifier, ParticleEmitter, ParticleError, PolygonShape, Timestamp,
    Variable,
};
use glam::Vec2;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;

/// Route engine logs through the test harness; `RUST_LOG=debug` shows them
fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .is_test(true)
        .try_init();
}

fn campfire() -> Effect {
    init_logging();
    let mut effect = Effect::new("Campfire");
    let flames = effect.create_emitter("Flames", ConeShape::default()).unwrap();
    flames.release_mut().amount = Variable::new(1, 4);
    flames.set_emitter_life(500);
    flames.reseed(3);

    let embers = effect
        .create_emitter(
            "Embers",
            PolygonShape::new(vec![Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0)], false),
        )
        .unwrap();
    embers.set_emitter_life(300);
    embers
        .emitter_modifiers_mut()
        .push(EmitterModifier::AmountOverLife { end_factor: 0.0 });
    embers.reseed(4);

    effect
}

#[test]
fn test_effect_runs_to_expiry() {
    let mut effect = campfire();
    let mut now = 0;
    let mut peak = 0;
    while !effect.is_expired() {
        effect.update(Timestamp::from_millis(now));
        peak = peak.max(effect.active_particles());
        now += 16;
        assert!(now < 10_000, "effect never expired");
    }

    assert!(peak > 0);
    assert_eq!(effect.remove_expired(), 2);
    assert!(effect.emitters().is_empty());
}

#[test]
fn test_independent_effects_on_threads() {
    let handles: Vec<_> = (0..4)
        .map(|seed| {
            thread::spawn(move || {
                let mut effect = campfire();
                for emitter in effect.emitters_mut() {
                    emitter.reseed(seed);
                }
                for frame in 0..30 {
                    effect.update(Timestamp::from_millis(frame * 16));
                }
                effect.active_particles()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap() > 0);
    }
}

#[test]
fn test_emitter_outliving_effect() {
    let mut effect = campfire();
    let mut emitter = effect.remove_emitter("Flames").unwrap();
    drop(effect);

    assert!(emitter.owner().is_none());
    assert!(matches!(
        emitter.set_name("Orphan"),
        Err(ParticleError::OwnerUnavailable)
    ));

    // Still simulates, rendered at the origin
    emitter.update(Timestamp::ZERO);
    let mut data = Vec::new();
    emitter.fill_instance_data(&mut data);
    assert!(!data.is_empty());
}

#[test]
fn test_owner_trait_object() {
    init_logging();
    let effect = Effect::new("Owner");
    let handle = effect.owner_handle();
    let owner = handle.upgrade().unwrap();
    assert_eq!(owner.resolve_name("A"), "A");
    assert_eq!(owner.resolve_name("A"), "A (2)");
    assert!(Arc::strong_count(&owner) >= 2);

    drop(owner);
    drop(effect);
    assert!(handle.upgrade().is_none());
    assert!(ParticleEmitter::new(handle, "Late", ConeShape::default()).is_err());
}
