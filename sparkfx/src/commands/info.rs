//! Show the contents of an effect file

use anyhow::Result;
use clap::Args;
use console::style;
use fx_particles::{Effect, ParticleEmitter};
use std::path::PathBuf;

use crate::utils::{
    add_table_row, create_property_table, create_table, format_color, format_emitter_life,
    format_modifiers, format_shape, format_variable, format_vec2, load_effect,
};

#[derive(Args)]
pub struct InfoArgs {
    /// Effect file
    pub file: PathBuf,

    /// Print the configuration as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: InfoArgs) -> Result<()> {
    let effect = load_effect(&args.file)?;

    if args.json {
        return print_json(&effect);
    }

    println!("Effect: {}", style(args.file.display()).cyan());
    create_property_table(&[
        ("Name", effect.name().to_string()),
        ("Position", format_vec2(effect.position())),
        ("Emitters", effect.emitters().len().to_string()),
    ])
    .printstd();

    if effect.emitters().is_empty() {
        return Ok(());
    }

    println!("\n{}", style("Emitters").bold());
    let mut table = create_table(&[
        "Name", "Shape", "Budget", "Blend", "Life", "Origin", "Sprite",
    ]);
    for emitter in effect.emitters() {
        add_table_row(
            &mut table,
            vec![
                emitter.name().to_string(),
                format_shape(emitter.shape()),
                emitter.budget().to_string(),
                format!("{:?}", emitter.blend_mode()),
                format_emitter_life(emitter.emitter_life()),
                format_vec2(emitter.origin()),
                emitter.sprite().0.to_string(),
            ],
        );
    }
    table.printstd();

    println!("\n{}", style("Release").bold());
    let mut table = create_table(&[
        "Name", "Particle life", "Amount", "Rate", "Speed", "Scale", "Rotation", "Color",
    ]);
    for emitter in effect.emitters() {
        add_table_row(&mut table, release_row(emitter));
    }
    table.printstd();

    println!("\n{}", style("Modifiers").bold());
    let mut table = create_table(&["Name", "Particle", "Emitter"]);
    for emitter in effect.emitters() {
        add_table_row(
            &mut table,
            vec![
                emitter.name().to_string(),
                format_modifiers(emitter.particle_modifiers()),
                format_modifiers(emitter.emitter_modifiers()),
            ],
        );
    }
    table.printstd();

    Ok(())
}

fn release_row(emitter: &ParticleEmitter) -> Vec<String> {
    let release = emitter.release();
    vec![
        emitter.name().to_string(),
        format_variable(&release.life, |v| format!("{v}ms")),
        format_variable(&release.amount, |v| v.to_string()),
        format_variable(&release.rate, |v| format!("{v}ms")),
        format_variable(&release.speed, |v| format!("{v:.1}")),
        format_variable(&release.scale, |v| format!("{v:.2}")),
        format_variable(&release.rotation, |v| format!("{:.1}°", v.to_degrees())),
        format_variable(&release.color, format_color),
    ]
}

#[cfg(feature = "serde")]
fn print_json(effect: &Effect) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&summary::EffectSummary::new(effect))?
    );
    Ok(())
}

#[cfg(not(feature = "serde"))]
fn print_json(_effect: &Effect) -> Result<()> {
    anyhow::bail!("JSON output requires the 'serde' feature")
}

#[cfg(feature = "serde")]
mod summary {
    use fx_particles::{
        BlendMode, Effect, EmitterModifierCollection, EmitterShape, ParticleEmitter,
        ParticleModifierCollection, ReleaseParams, ShapeKind, SpriteRef,
    };
    use glam::Vec2;
    use serde::Serialize;

    #[derive(Serialize)]
    pub struct EffectSummary<'a> {
        name: &'a str,
        position: Vec2,
        emitters: Vec<EmitterSummary<'a>>,
    }

    impl<'a> EffectSummary<'a> {
        pub fn new(effect: &'a Effect) -> Self {
            Self {
                name: effect.name(),
                position: effect.position(),
                emitters: effect.emitters().iter().map(EmitterSummary::new).collect(),
            }
        }
    }

    #[derive(Serialize)]
    struct EmitterSummary<'a> {
        name: &'a str,
        kind: ShapeKind,
        shape: &'a EmitterShape,
        budget: i32,
        blend_mode: BlendMode,
        emitter_life: i32,
        origin: Vec2,
        sprite: SpriteRef,
        release: &'a ReleaseParams,
        particle_modifiers: &'a ParticleModifierCollection,
        emitter_modifiers: &'a EmitterModifierCollection,
    }

    impl<'a> EmitterSummary<'a> {
        fn new(emitter: &'a ParticleEmitter) -> Self {
            Self {
                name: emitter.name(),
                kind: emitter.kind(),
                shape: emitter.shape(),
                budget: emitter.budget(),
                blend_mode: emitter.blend_mode(),
                emitter_life: emitter.emitter_life(),
                origin: emitter.origin(),
                sprite: emitter.sprite(),
                release: emitter.release(),
                particle_modifiers: emitter.particle_modifiers(),
                emitter_modifiers: emitter.emitter_modifiers(),
            }
        }
    }
}
