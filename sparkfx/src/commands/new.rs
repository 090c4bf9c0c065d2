//! Create a new effect file

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use console::style;
use fx_particles::{
    Effect, EmitterShape, ParticleEmitter, PolygonOrigin, PolygonShape, ShapeKind,
};
use glam::Vec2;
use std::path::{Path, PathBuf};

use crate::utils::{format_shape, save_effect};

#[derive(Args)]
pub struct NewArgs {
    /// Output effect file
    pub output: PathBuf,

    /// Emitter shape
    #[arg(short, long, value_enum, default_value_t = ShapeArg::Cone)]
    pub shape: ShapeArg,

    /// Emitter name
    #[arg(short, long, default_value = "Emitter")]
    pub name: String,

    /// Maximum number of live particles
    #[arg(short, long, default_value_t = ParticleEmitter::DEFAULT_BUDGET)]
    pub budget: i32,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ShapeArg {
    Cone,
    Rect,
    Polygon,
}

impl From<ShapeArg> for ShapeKind {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::Cone => Self::Cone,
            ShapeArg::Rect => Self::Rect,
            ShapeArg::Polygon => Self::Polygon,
        }
    }
}

pub fn execute(args: NewArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        anyhow::bail!(
            "Output file already exists: {} (use --force to overwrite)",
            args.output.display()
        );
    }

    let effect = build_effect(&args)?;
    save_effect(&effect, &args.output)?;

    let emitter = &effect.emitters()[0];
    println!(
        "✓ Created effect '{}' in {}",
        style(effect.name()).cyan(),
        style(args.output.display()).cyan()
    );
    println!(
        "  Emitter '{}': {}, budget {}",
        emitter.name(),
        format_shape(emitter.shape()),
        style(emitter.budget()).yellow()
    );

    Ok(())
}

/// Single-emitter effect named after the output file
pub fn build_effect(args: &NewArgs) -> Result<Effect> {
    let mut effect = Effect::new(effect_name(&args.output));
    let emitter = effect
        .create_emitter(&args.name, starter_shape(args.shape.into()))
        .context("Failed to create emitter")?;
    emitter
        .set_budget(args.budget)
        .with_context(|| format!("Invalid budget: {}", args.budget))?;
    Ok(effect)
}

fn effect_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("Effect")
        .to_string()
}

/// Default shape for a kind; polygons start as a 100x100 square
fn starter_shape(kind: ShapeKind) -> EmitterShape {
    match kind {
        ShapeKind::Polygon => {
            let mut polygon = PolygonShape::new(
                vec![
                    Vec2::new(0.0, 0.0),
                    Vec2::new(100.0, 0.0),
                    Vec2::new(100.0, 100.0),
                    Vec2::new(0.0, 100.0),
                ],
                true,
            );
            polygon.set_origin(PolygonOrigin::Center);
            polygon.into()
        }
        _ => kind.default_shape(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_particles::ShapeStrategy;

    fn args(output: &str, shape: ShapeArg, budget: i32) -> NewArgs {
        NewArgs {
            output: PathBuf::from(output),
            shape,
            name: "Sparks".to_string(),
            budget,
            force: false,
        }
    }

    #[test]
    fn test_build_effect() {
        let effect = build_effect(&args("out/campfire.fx", ShapeArg::Rect, 250)).unwrap();
        assert_eq!(effect.name(), "campfire");

        let emitter = &effect.emitters()[0];
        assert_eq!(emitter.name(), "Sparks");
        assert_eq!(emitter.kind(), ShapeKind::Rect);
        assert_eq!(emitter.budget(), 250);
    }

    #[test]
    fn test_invalid_budget() {
        assert!(build_effect(&args("bad.fx", ShapeArg::Cone, 0)).is_err());
    }

    #[test]
    fn test_polygon_starts_centered() {
        let EmitterShape::Polygon(polygon) = starter_shape(ShapeKind::Polygon) else {
            panic!("expected a polygon");
        };
        assert_eq!(polygon.kind(), ShapeKind::Polygon);
        assert_eq!(polygon.points().len(), 4);
        assert!(polygon.closed());
        // The square's center lands on the emitter origin
        assert_eq!(
            polygon.transform().transform_point2(Vec2::new(50.0, 50.0)),
            Vec2::ZERO
        );
    }
}
