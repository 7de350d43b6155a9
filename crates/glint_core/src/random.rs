//! Seeded random source for scene generation.

use std::f32::consts::TAU;

use glint_math::{hsv_to_rgb, Interval, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Sequential random draws for one generation run.
///
/// Every helper documents how many `value()` draws it consumes, since the
/// draw sequence is what makes generation reproducible.
pub struct SceneRng {
    rng: StdRng,
}

impl SceneRng {
    pub fn from_seed(seed: i32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed as i64 as u64),
        }
    }

    /// Uniform in [0, 1). One draw.
    #[inline]
    pub fn value(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Uniform in `range`. One draw.
    #[inline]
    pub fn range(&mut self, range: Interval) -> f32 {
        range.lerp(self.value())
    }

    /// Uniform point inside the unit disc. Two draws.
    pub fn inside_unit_circle(&mut self) -> Vec2 {
        let r = self.value().sqrt();
        let theta = self.value() * TAU;
        Vec2::new(r * theta.cos(), r * theta.sin())
    }

    /// Random colour from uniform hue, saturation and value. Three draws.
    pub fn color_hsv(&mut self) -> Vec3 {
        let h = self.value();
        let s = self.value();
        let v = self.value();
        hsv_to_rgb(h, s, v)
    }
}
