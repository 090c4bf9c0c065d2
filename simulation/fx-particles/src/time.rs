//! Simulation clock values
//!
//! Emitters never read a clock themselves. The owner passes the current
//! [`Timestamp`] into every update; durations are plain `i64` milliseconds.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Largest elapsed time a single update will simulate, in milliseconds.
///
/// Also bounds release catch-up: an emitter that was not updated for a long
/// time releases at most this much worth of particles on its next update.
pub const MAX_DELTA_TIME: i64 = 100;

/// Elapsed time assumed for the first update after construction or reset
pub const BOOTSTRAP_DELTA_TIME: i64 = 16;

/// A point on the owner's clock, in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(i64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier` (negative if `earlier` is later)
    pub const fn millis_since(self, earlier: Self) -> i64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<i64> for Timestamp {
    type Output = Self;

    fn add(self, millis: i64) -> Self {
        Self(self.0.saturating_add(millis))
    }
}

impl AddAssign<i64> for Timestamp {
    fn add_assign(&mut self, millis: i64) {
        self.0 = self.0.saturating_add(millis);
    }
}

impl Sub<i64> for Timestamp {
    type Output = Self;

    fn sub(self, millis: i64) -> Self {
        Self(self.0.saturating_sub(millis))
    }
}

impl Sub for Timestamp {
    type Output = i64;

    fn sub(self, other: Self) -> i64 {
        self.millis_since(other)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Convert milliseconds to seconds for integration
#[inline]
pub fn millis_to_secs(millis: i64) -> f32 {
    millis as f32 / 1000.0
}
