//! Emitter shapes
//!
//! A shape only decides where a new particle appears relative to the emitter
//! origin and which way it initially travels. Everything else about a release
//! (life, speed, color, modifiers) is handled by the emitter.
//!
//! # Adding a shape
//!
//! 1. Implement [`ShapeStrategy`] for the new shape type
//! 2. Add a variant to [`ShapeKind`] and to [`EmitterShape`]
//! 3. Extend [`ShapeKind::from_name`] and [`ShapeKind::default_shape`]

mod cone;
mod polygon;
mod rect;

pub use cone::ConeShape;
pub use polygon::{PolygonOrigin, PolygonShape};
pub use rect::RectShape;

use fx_data::{ValueReader, ValueWriter};
use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use crate::error::{ParticleError, Result};

/// Where a released particle starts and where it is heading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emission {
    /// Offset from the emitter origin
    pub offset: Vec2,
    /// Unit direction of the initial velocity
    pub force: Vec2,
}

/// Sampling and persistence contract of an emitter shape
pub trait ShapeStrategy: Sized {
    /// Registered kind of this shape
    fn kind(&self) -> ShapeKind;

    /// Sample the offset and direction of one new particle
    fn generate<G: Rng + ?Sized>(&self, rng: &mut G) -> Emission;

    /// Write the shape's own parameters
    fn write_custom_values(&self, writer: &mut dyn ValueWriter) -> Result<()>;

    /// Read parameters written by [`write_custom_values`](Self::write_custom_values).
    ///
    /// Returns the updated shape and leaves `self` untouched, so a failed
    /// read never leaves a shape half-configured.
    fn read_custom_values(&self, reader: &mut dyn ValueReader) -> Result<Self>;
}

/// Registered shape kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeKind {
    Cone,
    Rect,
    Polygon,
}

impl ShapeKind {
    /// All registered kinds
    pub const ALL: [Self; 3] = [Self::Cone, Self::Rect, Self::Polygon];

    /// Persisted type name
    pub fn name(self) -> &'static str {
        match self {
            Self::Cone => "Cone",
            Self::Rect => "Rect",
            Self::Polygon => "Polygon",
        }
    }

    /// Look up a kind by its persisted name (case-insensitive)
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ParticleError::UnknownShape(name.to_string()))
    }

    /// A shape of this kind with default parameters
    pub fn default_shape(self) -> EmitterShape {
        match self {
            Self::Cone => EmitterShape::Cone(ConeShape::default()),
            Self::Rect => EmitterShape::Rect(RectShape::default()),
            Self::Polygon => EmitterShape::Polygon(PolygonShape::default()),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = ParticleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// The shape of an emitter
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EmitterShape {
    Cone(ConeShape),
    Rect(RectShape),
    Polygon(PolygonShape),
}

impl ShapeStrategy for EmitterShape {
    fn kind(&self) -> ShapeKind {
        match self {
            Self::Cone(shape) => shape.kind(),
            Self::Rect(shape) => shape.kind(),
            Self::Polygon(shape) => shape.kind(),
        }
    }

    fn generate<G: Rng + ?Sized>(&self, rng: &mut G) -> Emission {
        match self {
            Self::Cone(shape) => shape.generate(rng),
            Self::Rect(shape) => shape.generate(rng),
            Self::Polygon(shape) => shape.generate(rng),
        }
    }

    fn write_custom_values(&self, writer: &mut dyn ValueWriter) -> Result<()> {
        match self {
            Self::Cone(shape) => shape.write_custom_values(writer),
            Self::Rect(shape) => shape.write_custom_values(writer),
            Self::Polygon(shape) => shape.write_custom_values(writer),
        }
    }

    fn read_custom_values(&self, reader: &mut dyn ValueReader) -> Result<Self> {
        Ok(match self {
            Self::Cone(shape) => Self::Cone(shape.read_custom_values(reader)?),
            Self::Rect(shape) => Self::Rect(shape.read_custom_values(reader)?),
            Self::Polygon(shape) => Self::Polygon(shape.read_custom_values(reader)?),
        })
    }
}

impl Default for EmitterShape {
    fn default() -> Self {
        Self::Cone(ConeShape::default())
    }
}

impl From<ConeShape> for EmitterShape {
    fn from(shape: ConeShape) -> Self {
        Self::Cone(shape)
    }
}

impl From<RectShape> for EmitterShape {
    fn from(shape: RectShape) -> Self {
        Self::Rect(shape)
    }
}

impl From<PolygonShape> for EmitterShape {
    fn from(shape: PolygonShape) -> Self {
        Self::Polygon(shape)
    }
}

/// Unit vector with a uniformly random angle
pub(crate) fn random_direction<G: Rng + ?Sized>(rng: &mut G) -> Vec2 {
    Vec2::from_angle(rng.random_range(0.0..TAU))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_kind_names() {
        for kind in ShapeKind::ALL {
            assert_eq!(ShapeKind::from_name(kind.name()).unwrap(), kind);
            assert_eq!(kind.default_shape().kind(), kind);
        }
        assert_eq!("rect".parse::<ShapeKind>().unwrap(), ShapeKind::Rect);
        assert!(matches!(
            ShapeKind::from_name("Spiral"),
            Err(ParticleError::UnknownShape(name)) if name == "Spiral"
        ));
        assert_eq!(ShapeKind::Polygon.to_string(), "Polygon");
    }

    #[test]
    fn test_random_direction_is_unit() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let dir = random_direction(&mut rng);
            assert!((dir.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_enum_dispatch() {
        let mut rng = StdRng::seed_from_u64(2);
        let shape: EmitterShape = ConeShape::new(0.5, 0.0).into();
        assert_eq!(shape.kind(), ShapeKind::Cone);
        let emission = shape.generate(&mut rng);
        assert_eq!(emission.offset, Vec2::ZERO);
        assert_eq!(emission.force, Vec2::from_angle(0.5));
    }
}
