//! Configuration records for scene generation and the ground plane.

use glint_math::{finite_or, saturate, Interval, Vec3};
use serde::{Deserialize, Serialize};

use crate::watch::Validate;

/// How generated spheres are chosen as light sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EmissivePolicy {
    /// No sphere emits light.
    Off,
    /// Each accepted sphere emits with the given probability.
    Chance { probability: f32 },
    /// Spheres whose radius falls inside `range` emit.
    SizeRange { range: Interval },
}

impl Default for EmissivePolicy {
    fn default() -> Self {
        EmissivePolicy::Chance { probability: 0.05 }
    }
}

/// Parameters for one sphere generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereGenerationSettings {
    /// Seed for the generation RNG
    pub seed: i32,

    /// Min and max sphere radius
    pub radius: Interval,

    /// Number of placement attempts (overlapping candidates are dropped)
    pub count: u32,

    /// Radius of the disc around the origin spheres are placed in
    pub placement_radius: f32,

    /// Light source selection
    pub emissive: EmissivePolicy,

    /// Brightness of the white emission given to light sources
    pub emission_intensity: f32,

    /// Probability that a sphere is metallic
    pub metallic_chance: f32,

    /// Uniform specular tint for non-metals
    pub non_metal_reflectiveness: f32,

    pub metallic_smoothness: Interval,
    pub non_metallic_smoothness: Interval,
}

impl Default for SphereGenerationSettings {
    fn default() -> Self {
        Self {
            seed: 1_000_000,
            radius: Interval::new(3.0, 8.0),
            count: 100,
            placement_radius: 100.0,
            emissive: EmissivePolicy::default(),
            emission_intensity: 1.0,
            metallic_chance: 0.5,
            non_metal_reflectiveness: 0.2,
            metallic_smoothness: Interval::UNIT,
            non_metallic_smoothness: Interval::UNIT,
        }
    }
}

impl Validate for SphereGenerationSettings {
    fn validate(&mut self) {
        let min = finite_or(self.radius.min, 0.0).max(0.0);
        let max = finite_or(self.radius.max, min).max(min);
        self.radius = Interval::new(min, max);

        self.placement_radius = finite_or(self.placement_radius, 0.0).max(0.0);
        self.emission_intensity = finite_or(self.emission_intensity, 0.0).max(0.0);

        self.metallic_chance = saturate(self.metallic_chance);
        self.non_metal_reflectiveness = saturate(self.non_metal_reflectiveness);

        self.metallic_smoothness = unit_range(self.metallic_smoothness);
        self.non_metallic_smoothness = unit_range(self.non_metallic_smoothness);

        self.emissive = match self.emissive {
            EmissivePolicy::Off => EmissivePolicy::Off,
            EmissivePolicy::Chance { probability } => EmissivePolicy::Chance {
                probability: saturate(probability),
            },
            EmissivePolicy::SizeRange { range } => {
                let range = Interval::new(
                    finite_or(range.min, self.radius.min),
                    finite_or(range.max, self.radius.max),
                );
                EmissivePolicy::SizeRange {
                    range: range.clamped_to(self.radius).ordered(),
                }
            }
        };
    }
}

fn unit_range(range: Interval) -> Interval {
    Interval::new(saturate(range.min), saturate(range.max)).ordered()
}

/// Material terms for the ground plane at y = 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundSettings {
    pub albedo: Vec3,
    pub specular: Vec3,
    pub smoothness: f32,
    pub emission: Vec3,
}

impl Default for GroundSettings {
    fn default() -> Self {
        Self {
            albedo: Vec3::splat(0.5),
            specular: Vec3::splat(0.05),
            smoothness: 0.2,
            emission: Vec3::ZERO,
        }
    }
}

impl Validate for GroundSettings {
    fn validate(&mut self) {
        self.albedo = saturate3(self.albedo);
        self.specular = saturate3(self.specular);
        self.smoothness = saturate(self.smoothness);
        self.emission = saturate3(self.emission);
    }
}

fn saturate3(v: Vec3) -> Vec3 {
    Vec3::new(saturate(v.x), saturate(v.y), saturate(v.z))
}
