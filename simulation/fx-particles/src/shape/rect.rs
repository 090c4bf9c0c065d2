use fx_data::{ValueReader, ValueWriter};
use glam::Vec2;
use rand::Rng;

use super::{Emission, ShapeKind, ShapeStrategy, random_direction};
use crate::error::{ParticleError, Result};

/// Releases inside, or on the outline of, an origin-centered rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RectShape {
    width: i32,
    height: i32,
    /// Release on the outline only
    pub perimeter: bool,
}

fn check_dimension(name: &'static str, value: i32) -> Result<i32> {
    if value < 1 {
        return Err(ParticleError::InvalidDimension { name, value });
    }
    Ok(value)
}

impl RectShape {
    pub fn new(width: i32, height: i32, perimeter: bool) -> Result<Self> {
        Ok(Self {
            width: check_dimension("width", width)?,
            height: check_dimension("height", height)?,
            perimeter,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn set_width(&mut self, width: i32) -> Result<()> {
        self.width = check_dimension("width", width)?;
        Ok(())
    }

    pub fn set_height(&mut self, height: i32) -> Result<()> {
        self.height = check_dimension("height", height)?;
        Ok(())
    }

    fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * 0.5
    }
}

impl Default for RectShape {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            perimeter: false,
        }
    }
}

impl ShapeStrategy for RectShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Rect
    }

    // The perimeter picks an edge pair with a coin flip regardless of edge
    // length, so the shorter pair receives the same share of releases.
    fn generate<G: Rng + ?Sized>(&self, rng: &mut G) -> Emission {
        let half = self.half_extents();
        let offset = if self.perimeter {
            let sign = |rng: &mut G| if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            if rng.random_bool(0.5) {
                let x = rng.random_range(-half.x..=half.x);
                Vec2::new(x, half.y * sign(rng))
            } else {
                let y = rng.random_range(-half.y..=half.y);
                Vec2::new(half.x * sign(rng), y)
            }
        } else {
            Vec2::new(
                rng.random_range(-half.x..=half.x),
                rng.random_range(-half.y..=half.y),
            )
        };

        Emission {
            offset,
            force: random_direction(rng),
        }
    }

    fn write_custom_values(&self, writer: &mut dyn ValueWriter) -> Result<()> {
        writer.write_i32("Height", self.height)?;
        writer.write_i32("Width", self.width)?;
        writer.write_bool("Perimeter", self.perimeter)?;
        Ok(())
    }

    fn read_custom_values(&self, reader: &mut dyn ValueReader) -> Result<Self> {
        let height = reader.read_i32("Height")?;
        let width = reader.read_i32("Width")?;
        let perimeter = reader.read_bool("Perimeter")?;
        Self::new(width, height, perimeter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use test_case::test_case;

    #[test]
    fn test_perimeter_offsets_on_outline() {
        let mut rng = StdRng::seed_from_u64(21);
        let rect = RectShape::new(100, 50, true).unwrap();
        let mut horizontal = 0;
        for _ in 0..1_000 {
            let offset = rect.generate(&mut rng).offset;
            assert!(offset.x.abs() == 50.0 || offset.y.abs() == 25.0);
            assert!(offset.x.abs() <= 50.0 && offset.y.abs() <= 25.0);
            if offset.y.abs() == 25.0 {
                horizontal += 1;
            }
        }
        // Both edge pairs get used
        assert!(horizontal > 0 && horizontal < 1_000);
    }

    #[test]
    fn test_filled_offsets_inside() {
        let mut rng = StdRng::seed_from_u64(22);
        let rect = RectShape::new(30, 10, false).unwrap();
        for _ in 0..1_000 {
            let emission = rect.generate(&mut rng);
            assert!(emission.offset.x.abs() <= 15.0);
            assert!(emission.offset.y.abs() <= 5.0);
            assert!((emission.force.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test_case(0, 10, "width" ; "zero width")]
    #[test_case(10, -3, "height" ; "negative height")]
    fn test_invalid_dimensions(width: i32, height: i32, expected: &str) {
        match RectShape::new(width, height, false) {
            Err(ParticleError::InvalidDimension { name, .. }) => assert_eq!(name, expected),
            other => panic!("expected invalid dimension, got {:?}", other),
        }
    }

    #[test]
    fn test_setters_validate() {
        let mut rect = RectShape::default();
        assert!(rect.set_width(0).is_err());
        assert_eq!(rect.width(), 100);
        rect.set_height(7).unwrap();
        assert_eq!(rect.height(), 7);
    }
}
