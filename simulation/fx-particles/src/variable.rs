//! Range-based value samplers
//!
//! A [`Variable`] describes a range; every call to [`Variable::sample`]
//! returns a new value drawn uniformly from it. Emitters use them for every
//! per-release parameter (life, amount, rate, rotation, scale, speed, color).

use fx_data::{Rgba, ValueReader, ValueWriter};
use rand::Rng;
use std::fmt;

/// Values that can be sampled from a range and persisted
pub trait VariableValue: Copy + PartialEq + fmt::Debug {
    /// Uniform sample between `a` and `b` inclusive, in either order
    fn sample_between<G: Rng + ?Sized>(a: Self, b: Self, rng: &mut G) -> Self;

    fn write_value<W: ValueWriter + ?Sized>(self, writer: &mut W, key: &str) -> fx_data::Result<()>;

    fn read_value<R: ValueReader + ?Sized>(reader: &mut R, key: &str) -> fx_data::Result<Self>;
}

macro_rules! ordered_sample {
    ($a:expr, $b:expr, $rng:expr) => {{
        let (lo, hi) = if $a <= $b { ($a, $b) } else { ($b, $a) };
        $rng.random_range(lo..=hi)
    }};
}

impl VariableValue for i32 {
    fn sample_between<G: Rng + ?Sized>(a: Self, b: Self, rng: &mut G) -> Self {
        ordered_sample!(a, b, rng)
    }

    fn write_value<W: ValueWriter + ?Sized>(self, writer: &mut W, key: &str) -> fx_data::Result<()> {
        writer.write_i32(key, self)
    }

    fn read_value<R: ValueReader + ?Sized>(reader: &mut R, key: &str) -> fx_data::Result<Self> {
        reader.read_i32(key)
    }
}

impl VariableValue for u16 {
    fn sample_between<G: Rng + ?Sized>(a: Self, b: Self, rng: &mut G) -> Self {
        ordered_sample!(a, b, rng)
    }

    fn write_value<W: ValueWriter + ?Sized>(self, writer: &mut W, key: &str) -> fx_data::Result<()> {
        writer.write_u32(key, u32::from(self))
    }

    fn read_value<R: ValueReader + ?Sized>(reader: &mut R, key: &str) -> fx_data::Result<Self> {
        let raw = reader.read_u32(key)?;
        Ok(Self::try_from(raw).unwrap_or(Self::MAX))
    }
}

impl VariableValue for f32 {
    fn sample_between<G: Rng + ?Sized>(a: Self, b: Self, rng: &mut G) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        // Empty, NaN or unbounded ranges collapse to their lower end
        let usable = lo < hi && lo.is_finite() && hi.is_finite();
        if !usable {
            return lo;
        }
        rng.random_range(lo..=hi)
    }

    fn write_value<W: ValueWriter + ?Sized>(self, writer: &mut W, key: &str) -> fx_data::Result<()> {
        writer.write_f32(key, self)
    }

    fn read_value<R: ValueReader + ?Sized>(reader: &mut R, key: &str) -> fx_data::Result<Self> {
        reader.read_f32(key)
    }
}

impl VariableValue for Rgba {
    fn sample_between<G: Rng + ?Sized>(a: Self, b: Self, rng: &mut G) -> Self {
        Self {
            r: ordered_sample!(a.r, b.r, rng),
            g: ordered_sample!(a.g, b.g, rng),
            b: ordered_sample!(a.b, b.b, rng),
            a: ordered_sample!(a.a, b.a, rng),
        }
    }

    fn write_value<W: ValueWriter + ?Sized>(self, writer: &mut W, key: &str) -> fx_data::Result<()> {
        self.write(writer, key)
    }

    fn read_value<R: ValueReader + ?Sized>(reader: &mut R, key: &str) -> fx_data::Result<Self> {
        Self::read(reader, key)
    }
}

/// A uniformly sampled range of values
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable<T> {
    pub min: T,
    pub max: T,
}

impl<T: VariableValue> Variable<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// A range that always yields `value`
    pub const fn constant(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.min == self.max
    }

    /// Draw the next value
    pub fn sample<G: Rng + ?Sized>(&self, rng: &mut G) -> T {
        if self.is_constant() {
            return self.min;
        }
        T::sample_between(self.min, self.max, rng)
    }

    /// Persist as a block holding `Min` and `Max`
    pub fn write<W: ValueWriter + ?Sized>(&self, writer: &mut W, key: &str) -> fx_data::Result<()> {
        writer.begin_block(key)?;
        self.min.write_value(writer, "Min")?;
        self.max.write_value(writer, "Max")?;
        writer.end_block()
    }

    pub fn read<R: ValueReader + ?Sized>(reader: &mut R, key: &str) -> fx_data::Result<Self> {
        reader.begin_block(key)?;
        let min = T::read_value(reader, "Min")?;
        let max = T::read_value(reader, "Max")?;
        reader.end_block()?;
        Ok(Self { min, max })
    }
}

impl Variable<u16> {
    /// Largest value this range can yield
    pub fn upper(&self) -> u16 {
        self.min.max(self.max)
    }

    /// Scale both ends, saturating at the type bounds
    pub fn scale(&mut self, factor: f32) {
        let scale = |v: u16| (v as f32 * factor).round().clamp(0.0, u16::MAX as f32) as u16;
        self.min = scale(self.min);
        self.max = scale(self.max);
    }
}

impl Variable<f32> {
    /// Shift both ends by `amount`
    pub fn offset(&mut self, amount: f32) {
        self.min += amount;
        self.max += amount;
    }

    /// Scale both ends by `factor`
    pub fn scale(&mut self, factor: f32) {
        self.min *= factor;
        self.max *= factor;
    }
}
