//! sparkfx library
//!
//! Command definitions and helpers behind the `sparkfx` binary.

pub mod cli;
pub mod commands;
pub mod utils;
