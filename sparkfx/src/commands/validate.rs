//! Validate an effect file

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use fx_particles::{Effect, EmitterShape};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::utils::{decode_effect, encode_effect, load_effect};

#[derive(Args)]
pub struct ValidateArgs {
    /// Effect file
    pub file: PathBuf,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Findings for one effect
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self, strict: bool) -> bool {
        self.errors.is_empty() && (!strict || self.warnings.is_empty())
    }
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    let effect = load_effect(&args.file)?;
    let mut report = check_effect(&effect);

    if let Err(err) = check_round_trip(&effect) {
        report.errors.push(format!("{err:#}"));
    }

    for warning in &report.warnings {
        println!("{} {}", style("warning:").yellow().bold(), warning);
    }
    for error in &report.errors {
        println!("{} {}", style("error:").red().bold(), error);
    }

    if !report.is_valid(args.strict) {
        anyhow::bail!(
            "Validation failed: {} errors, {} warnings",
            report.errors.len(),
            report.warnings.len()
        );
    }

    println!(
        "✓ Effect '{}' is valid ({} emitters)",
        style(args.file.display()).cyan(),
        style(effect.emitters().len()).yellow()
    );
    Ok(())
}

/// Check the configuration of every emitter
pub fn check_effect(effect: &Effect) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut names = HashSet::new();

    for emitter in effect.emitters() {
        let name = emitter.name();
        if !names.insert(name) {
            report.errors.push(format!("Duplicate emitter name '{name}'"));
        }
        if emitter.budget() < 1 {
            report
                .errors
                .push(format!("'{name}': budget must be positive, got {}", emitter.budget()));
        }

        let release = emitter.release();
        if release.amount.upper() == 0 {
            report
                .warnings
                .push(format!("'{name}': release amount is zero, no particles are released"));
        }
        if emitter.emitter_life() == 0 {
            report
                .warnings
                .push(format!("'{name}': emitter life is zero, no particles are released"));
        }
        if release.life.min.max(release.life.max) <= 0 {
            report
                .warnings
                .push(format!("'{name}': particle life is not positive, particles expire at once"));
        }
        match emitter.shape() {
            EmitterShape::Cone(cone) => {
                if !cone.direction.is_finite() || !cone.cone_angle.is_finite() {
                    report.warnings.push(format!(
                        "'{name}': cone direction or angle is not finite, falling back to a fixed direction"
                    ));
                }
            }
            EmitterShape::Polygon(polygon) => {
                if polygon.points().is_empty() {
                    report
                        .warnings
                        .push(format!("'{name}': polygon has no points, particles start at the origin"));
                }
            }
            EmitterShape::Rect(_) => {}
        }
    }

    report
}

/// Write, read back and write again; both encodings must match
pub fn check_round_trip(effect: &Effect) -> Result<()> {
    let first = encode_effect(effect).context("Failed to encode effect")?;
    let decoded = decode_effect(&first).context("Failed to decode written effect")?;
    let second = encode_effect(&decoded).context("Failed to encode decoded effect")?;

    if first != second {
        anyhow::bail!(
            "Round trip mismatch: {} bytes written, {} bytes after reading back",
            first.len(),
            second.len()
        );
    }
    Ok(())
}
