use fx_data::{ValueReader, ValueWriter};
use glam::Vec2;
use rand::Rng;

use super::{Emission, ShapeKind, ShapeStrategy};
use crate::error::Result;

/// Releases from a single point, spreading around a direction.
///
/// Angles are in radians; `direction` 0 points along +X.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConeShape {
    /// Center of the cone
    pub direction: f32,
    /// Full opening angle of the cone
    pub cone_angle: f32,
}

impl ConeShape {
    pub const fn new(direction: f32, cone_angle: f32) -> Self {
        Self {
            direction,
            cone_angle,
        }
    }
}

impl Default for ConeShape {
    /// Straight up with a 45 degree spread
    fn default() -> Self {
        Self::new(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_4)
    }
}

impl ShapeStrategy for ConeShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Cone
    }

    fn generate<G: Rng + ?Sized>(&self, rng: &mut G) -> Emission {
        // A NaN or unbounded direction points along +x
        let direction = if self.direction.is_finite() {
            self.direction
        } else {
            0.0
        };
        let half = self.cone_angle.abs() * 0.5;
        let (lo, hi) = (direction - half, direction + half);
        let angle = if lo < hi && lo.is_finite() && hi.is_finite() {
            rng.random_range(lo..=hi)
        } else {
            direction
        };

        Emission {
            offset: Vec2::ZERO,
            force: Vec2::from_angle(angle),
        }
    }

    fn write_custom_values(&self, writer: &mut dyn ValueWriter) -> Result<()> {
        writer.write_f32("ConeAngle", self.cone_angle)?;
        writer.write_f32("Direction", self.direction)?;
        Ok(())
    }

    fn read_custom_values(&self, reader: &mut dyn ValueReader) -> Result<Self> {
        let cone_angle = reader.read_f32("ConeAngle")?;
        let direction = reader.read_f32("Direction")?;
        Ok(Self {
            direction,
            cone_angle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use test_case::test_case;

    #[test_case(0.0 ; "along x")]
    #[test_case(1.2 ; "arbitrary")]
    #[test_case(-std::f32::consts::PI ; "backwards")]
    fn test_zero_angle_is_exact(direction: f32) {
        let mut rng = StdRng::seed_from_u64(4);
        let cone = ConeShape::new(direction, 0.0);
        for _ in 0..50 {
            let emission = cone.generate(&mut rng);
            assert_eq!(emission.offset, Vec2::ZERO);
            assert_eq!(emission.force, Vec2::from_angle(direction));
        }
    }

    #[test]
    fn test_spread_stays_inside_cone() {
        let mut rng = StdRng::seed_from_u64(8);
        let cone = ConeShape::new(0.0, 1.0);
        for _ in 0..500 {
            let force = cone.generate(&mut rng).force;
            assert!((force.length() - 1.0).abs() < 1e-5);
            // Half-angle of 0.5 rad
            assert!(force.y.atan2(force.x).abs() <= 0.5 + 1e-5);
        }
    }

    #[test_case(f32::INFINITY, 0.5 ; "infinite direction")]
    #[test_case(f32::NEG_INFINITY, 0.0 ; "negative infinite direction")]
    #[test_case(f32::NAN, 1.0 ; "nan direction")]
    #[test_case(0.0, f32::NAN ; "nan angle")]
    #[test_case(f32::MAX, f32::MAX ; "overflowing spread")]
    fn test_non_finite_values_fall_back(direction: f32, cone_angle: f32) {
        let mut rng = StdRng::seed_from_u64(5);
        let cone = ConeShape::new(direction, cone_angle);
        for _ in 0..20 {
            let force = cone.generate(&mut rng).force;
            assert!(force.is_finite());
            assert!((force.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_negative_angle_spreads_like_positive() {
        let mut rng = StdRng::seed_from_u64(12);
        let cone = ConeShape::new(0.0, -0.4);
        for _ in 0..200 {
            let force = cone.generate(&mut rng).force;
            assert!(force.y.atan2(force.x).abs() <= 0.2 + 1e-5);
        }
    }
}
