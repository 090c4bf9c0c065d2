use fx_data::DataError;
use thiserror::Error;

use crate::shape::ShapeKind;

/// Error types for emitter configuration and persistence
#[derive(Error, Debug)]
pub enum ParticleError {
    /// Error from the underlying value reader or writer
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// The owning effect no longer exists (or never did)
    #[error("Emitter owner is unavailable")]
    OwnerUnavailable,

    /// Budgets must allow at least one live particle
    #[error("Invalid budget: {0} (must be at least 1)")]
    InvalidBudget(i64),

    /// A shape dimension that must be positive was not
    #[error("Invalid {name}: {value} (must be at least 1)")]
    InvalidDimension { name: &'static str, value: i32 },

    /// The persisted custom values block does not belong to the expected shape
    #[error("Custom values do not match a {shape} emitter: {source}")]
    ShapeMismatch {
        shape: ShapeKind,
        #[source]
        source: Box<ParticleError>,
    },

    /// No shape is registered under this name
    #[error("Unknown emitter shape: {0}")]
    UnknownShape(String),

    /// No modifier is registered under this name
    #[error("Unknown modifier type: {0}")]
    UnknownModifier(String),

    /// The emitter reserved its name with a different owner
    #[error("Emitter '{0}' belongs to another effect")]
    ForeignEmitter(String),
}

/// Result type using ParticleError
pub type Result<T> = std::result::Result<T, ParticleError>;
