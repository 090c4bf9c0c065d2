//! Command-line interface definitions

use clap::{Parser, Subcommand};

use crate::commands::{info, new, simulate, validate};

#[derive(Parser)]
#[command(name = "sparkfx")]
#[command(about = "Create, inspect, validate and simulate particle effect files", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a single-emitter effect file with default settings
    New(new::NewArgs),

    /// Show the configuration of every emitter in an effect file
    Info(info::InfoArgs),

    /// Parse an effect file, check its invariants and verify it round trips
    Validate(validate::ValidateArgs),

    /// Run an effect for a number of frames and report pool usage
    Simulate(simulate::SimulateArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_is_global() {
        let cli = Cli::try_parse_from(["sparkfx", "info", "fire.fx", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }
}
