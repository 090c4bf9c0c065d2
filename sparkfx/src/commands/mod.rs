//! Command implementations

pub mod info;
pub mod new;
pub mod simulate;
pub mod validate;
