//! Procedural sphere placement.
//!
//! Spheres are placed by rejection sampling: each attempt draws a radius
//! and a spot inside the placement disc, and is dropped (never retried) if
//! it overlaps a sphere that was already accepted. Accepted spheres are
//! then given a random colour, a metal/non-metal classification, an
//! optional emission and a smoothness.

use glint_math::Vec3;

use crate::random::SceneRng;
use crate::settings::{EmissivePolicy, SphereGenerationSettings};
use crate::sphere::{spheres_overlap, Sphere};

/// Generate the sphere field described by `settings`.
///
/// Deterministic: the same settings (seed included) always produce the
/// same spheres in the same order. The result holds at most
/// `settings.count` spheres.
pub fn generate_spheres(settings: &SphereGenerationSettings) -> Vec<Sphere> {
    let mut rng = SceneRng::from_seed(settings.seed);
    let mut spheres: Vec<Sphere> = Vec::with_capacity(settings.count.min(4096) as usize);

    for _ in 0..settings.count {
        let radius = rng.range(settings.radius);
        let disc = rng.inside_unit_circle() * settings.placement_radius;
        let position = Vec3::new(disc.x, radius, disc.y);

        let blocked = spheres
            .iter()
            .any(|other| spheres_overlap(position, radius, other.position, other.radius));
        if blocked {
            continue;
        }

        let color = rng.color_hsv();
        let metal = rng.value() < settings.metallic_chance;
        let (albedo, specular) = if metal {
            (Vec3::ZERO, color)
        } else {
            (color, Vec3::splat(settings.non_metal_reflectiveness))
        };

        // Only the chance policy consumes a draw here.
        let light_source = match settings.emissive {
            EmissivePolicy::Off => false,
            EmissivePolicy::Chance { probability } => rng.value() < probability,
            EmissivePolicy::SizeRange { range } => range.contains(radius),
        };
        let emission = if light_source {
            Vec3::splat(settings.emission_intensity)
        } else {
            Vec3::ZERO
        };

        let smoothness = if metal {
            rng.range(settings.metallic_smoothness)
        } else {
            rng.range(settings.non_metallic_smoothness)
        };

        spheres.push(Sphere {
            position,
            radius,
            albedo,
            specular,
            smoothness,
            emission,
        });
    }

    log::debug!(
        "Generated {} of {} spheres (seed {})",
        spheres.len(),
        settings.count,
        settings.seed
    );

    spheres
}
