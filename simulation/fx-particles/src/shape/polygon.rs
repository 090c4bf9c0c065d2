use fx_data::{PersistEnum, ValueReader, ValueWriter, read_enum, write_enum};
use glam::{Affine2, Vec2};
use rand::Rng;

use super::{Emission, ShapeKind, ShapeStrategy, random_direction};
use crate::error::Result;

/// How polygon points are aligned with the emitter origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PolygonOrigin {
    /// Points are used as authored
    #[default]
    Default,
    /// The center of the points' bounding box sits on the origin
    Center,
    /// The first point sits on the origin
    FirstPoint,
}

impl PersistEnum for PolygonOrigin {
    const TYPE_NAME: &'static str = "PolygonOrigin";

    fn to_u32(self) -> u32 {
        match self {
            Self::Default => 0,
            Self::Center => 1,
            Self::FirstPoint => 2,
        }
    }

    fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Default),
            1 => Some(Self::Center),
            2 => Some(Self::FirstPoint),
            _ => None,
        }
    }
}

/// Releases along the outline of a polyline or polygon.
///
/// Points are translated according to the [`PolygonOrigin`], then scaled,
/// then rotated (radians). The combined transform is cached and rebuilt by
/// every setter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PolygonShape {
    points: Vec<Vec2>,
    closed: bool,
    rotation: f32,
    scale: f32,
    origin: PolygonOrigin,
    #[cfg_attr(feature = "serde", serde(skip))]
    transform: Affine2,
}

impl PolygonShape {
    pub fn new(points: Vec<Vec2>, closed: bool) -> Self {
        let mut shape = Self {
            points,
            closed,
            ..Self::default()
        };
        shape.rebuild_transform();
        shape
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn origin(&self) -> PolygonOrigin {
        self.origin
    }

    /// Transform applied to every sampled point
    pub fn transform(&self) -> Affine2 {
        self.transform
    }

    pub fn set_points(&mut self, points: Vec<Vec2>) {
        self.points = points;
        self.rebuild_transform();
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
        self.rebuild_transform();
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
        self.rebuild_transform();
    }

    pub fn set_origin(&mut self, origin: PolygonOrigin) {
        self.origin = origin;
        self.rebuild_transform();
    }

    /// Point mapped onto the emitter origin
    fn origin_point(&self) -> Vec2 {
        match self.origin {
            PolygonOrigin::Default => Vec2::ZERO,
            PolygonOrigin::FirstPoint => self.points.first().copied().unwrap_or(Vec2::ZERO),
            PolygonOrigin::Center => {
                let Some(&first) = self.points.first() else {
                    return Vec2::ZERO;
                };
                let (min, max) = self
                    .points
                    .iter()
                    .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
                (min + max) * 0.5
            }
        }
    }

    fn rebuild_transform(&mut self) {
        self.transform = Affine2::from_angle(self.rotation)
            * Affine2::from_scale(Vec2::splat(self.scale))
            * Affine2::from_translation(-self.origin_point());
    }

    /// Number of segments sampled for three or more points
    fn segment_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    fn sample_point<G: Rng + ?Sized>(&self, rng: &mut G) -> Vec2 {
        match self.points.as_slice() {
            [] => return Vec2::ZERO,
            [point] => return self.transform.transform_point2(*point),
            [a, b] => {
                let t = rng.random_range(0.0..=1.0);
                return self.transform.transform_point2(a.lerp(*b, t));
            }
            _ => {}
        }

        let index = rng.random_range(0..self.segment_count());
        let a = self.points[index];
        let b = self.points[(index + 1) % self.points.len()];
        let t = rng.random_range(0.0..=1.0);
        self.transform.transform_point2(a.lerp(b, t))
    }
}

impl Default for PolygonShape {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            closed: true,
            rotation: 0.0,
            scale: 1.0,
            origin: PolygonOrigin::Default,
            transform: Affine2::IDENTITY,
        }
    }
}

impl ShapeStrategy for PolygonShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Polygon
    }

    fn generate<G: Rng + ?Sized>(&self, rng: &mut G) -> Emission {
        Emission {
            offset: self.sample_point(rng),
            force: random_direction(rng),
        }
    }

    fn write_custom_values(&self, writer: &mut dyn ValueWriter) -> Result<()> {
        writer.write_bool("Closed", self.closed)?;
        writer.write_f32("Scale", self.scale)?;
        writer.write_f32("Rotation", self.rotation)?;
        write_enum(writer, "PolygonOrigin", self.origin)?;
        writer.begin_list("Points", self.points.len())?;
        for point in &self.points {
            writer.write_vec2("Point", *point)?;
        }
        writer.end_list()?;
        Ok(())
    }

    fn read_custom_values(&self, reader: &mut dyn ValueReader) -> Result<Self> {
        let closed = reader.read_bool("Closed")?;
        let scale = reader.read_f32("Scale")?;
        let rotation = reader.read_f32("Rotation")?;
        let origin = read_enum(reader, "PolygonOrigin")?;
        let len = reader.begin_list("Points")?;
        let mut points = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            points.push(reader.read_vec2("Point")?);
        }
        reader.end_list()?;

        let mut shape = Self {
            points,
            closed,
            rotation,
            scale,
            origin,
            transform: Affine2::IDENTITY,
        };
        shape.rebuild_transform();
        Ok(shape)
    }
}
