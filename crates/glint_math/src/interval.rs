use serde::{Deserialize, Serialize};

/// A closed scalar range `[min, max]`.
///
/// Used for every "lo/hi" pair in the generation settings (radius,
/// smoothness, emissive size band).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns true if x is within the interval [min, max] (inclusive).
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Clamps x to be within the interval [min, max].
    ///
    /// Unlike `f32::clamp` this never panics on an inverted interval;
    /// `min` wins.
    pub fn clamp(&self, x: f32) -> f32 {
        x.min(self.max).max(self.min)
    }

    /// Linear interpolation between min and max by `t`.
    #[inline]
    pub fn lerp(&self, t: f32) -> f32 {
        self.min + t * (self.max - self.min)
    }

    /// Clamp both endpoints into `bounds`.
    pub fn clamped_to(&self, bounds: Interval) -> Interval {
        Interval::new(bounds.clamp(self.min), bounds.clamp(self.max))
    }

    /// Pull `min` down to `max` when the interval is inverted.
    ///
    /// An inverted interval collapses onto its upper endpoint rather than
    /// being swapped, so editing one endpoint past the other drags it along.
    pub fn ordered(&self) -> Interval {
        let min = self.min.min(self.max);
        let max = self.max.max(min);
        Interval::new(min, max)
    }

    /// The unit interval [0, 1].
    pub const UNIT: Interval = Interval { min: 0.0, max: 1.0 };
}

/// Replace NaN or an infinity with `fallback`.
#[inline]
pub fn finite_or(x: f32, fallback: f32) -> f32 {
    if !x.is_finite() {
        fallback
    } else {
        x
    }
}

/// Clamp to [0, 1], mapping non-finite input to 0.
#[inline]
pub fn saturate(x: f32) -> f32 {
    finite_or(x, 0.0).clamp(0.0, 1.0)
}
