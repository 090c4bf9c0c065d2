//! Run an effect and report pool usage

use anyhow::Result;
use clap::Args;
use console::style;
use fx_particles::{Effect, FLOATS_PER_PARTICLE, Timestamp};
use std::path::PathBuf;

use crate::utils::{add_table_row, create_table, load_effect};

#[derive(Args)]
pub struct SimulateArgs {
    /// Effect file
    pub file: PathBuf,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 120)]
    pub frames: u32,

    /// Milliseconds between frames
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u32).range(1..))]
    pub frame_ms: u32,

    /// Seed for reproducible runs; emitter `n` uses `seed + n`
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Kill the effect after this many frames
    #[arg(long)]
    pub kill_after: Option<u32>,
}

/// Per-emitter results of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterStats {
    pub name: String,
    pub peak_active: usize,
    pub final_active: usize,
    pub buffer_len: usize,
    /// Clock time of the first frame at which the emitter had expired
    pub expired_at: Option<i64>,
}

pub fn execute(args: SimulateArgs) -> Result<()> {
    let mut effect = load_effect(&args.file)?;
    if let Some(seed) = args.seed {
        reseed(&mut effect, seed);
    }

    let stats = run(&mut effect, args.frames, args.frame_ms, args.kill_after);

    println!(
        "Simulated '{}' for {} frames of {}ms",
        style(effect.name()).cyan(),
        style(args.frames).yellow(),
        args.frame_ms
    );

    let mut table = create_table(&["Emitter", "Peak", "Active", "Buffer", "Expired"]);
    for stat in &stats {
        add_table_row(
            &mut table,
            vec![
                stat.name.clone(),
                stat.peak_active.to_string(),
                stat.final_active.to_string(),
                stat.buffer_len.to_string(),
                stat.expired_at
                    .map_or_else(|| "-".to_string(), |at| format!("at {at}ms")),
            ],
        );
    }
    table.printstd();

    let mut instances = Vec::new();
    effect.fill_instance_data(&mut instances);
    println!(
        "Active particles: {} ({} instance floats)",
        style(effect.active_particles()).green(),
        instances.len()
    );
    debug_assert_eq!(instances.len(), effect.active_particles() * FLOATS_PER_PARTICLE);

    Ok(())
}

/// Give every emitter a deterministic seed derived from `seed`
pub fn reseed(effect: &mut Effect, seed: u64) {
    for (index, emitter) in effect.emitters_mut().iter_mut().enumerate() {
        emitter.reseed(seed.wrapping_add(index as u64));
    }
}

/// Update the effect once per frame starting at time zero
pub fn run(
    effect: &mut Effect,
    frames: u32,
    frame_ms: u32,
    kill_after: Option<u32>,
) -> Vec<EmitterStats> {
    let mut stats: Vec<EmitterStats> = effect
        .emitters()
        .iter()
        .map(|emitter| EmitterStats {
            name: emitter.name().to_string(),
            peak_active: 0,
            final_active: 0,
            buffer_len: 0,
            expired_at: None,
        })
        .collect();

    for frame in 0..frames {
        if kill_after == Some(frame) {
            log::info!("Killing effect at frame {frame}");
            effect.kill();
        }

        let now = i64::from(frame) * i64::from(frame_ms);
        effect.update(Timestamp::from_millis(now));

        for (stat, emitter) in stats.iter_mut().zip(effect.emitters()) {
            stat.peak_active = stat.peak_active.max(emitter.active_particles());
            if stat.expired_at.is_none() && emitter.is_expired() {
                stat.expired_at = Some(now);
            }
        }
        log::trace!("Frame {frame}: {} active particles", effect.active_particles());
    }

    for (stat, emitter) in stats.iter_mut().zip(effect.emitters()) {
        stat.final_active = emitter.active_particles();
        stat.buffer_len = emitter.buffer_len();
    }
    stats
}
