//! The sphere record shared between scene generation and the kernel.

use bytemuck::{Pod, Zeroable};
use glint_math::Vec3;
use serde::{Deserialize, Serialize};

/// Byte stride of one [`Sphere`] in a GPU structured buffer.
pub const SPHERE_STRIDE: usize = 56;

/// A sphere resting on the ground plane.
///
/// Field order and `repr(C)` match the structured buffer layout the
/// kernel reads, so a slice can be uploaded with [`Sphere::as_bytes`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Sphere {
    /// Centre. `y` equals `radius` for generated spheres.
    pub position: Vec3,
    pub radius: f32,
    /// Diffuse colour (zero for metals)
    pub albedo: Vec3,
    /// Reflection tint
    pub specular: Vec3,
    /// 0 = rough, 1 = mirror
    pub smoothness: f32,
    /// Emitted radiance (zero unless the sphere is a light source)
    pub emission: Vec3,
}

impl Sphere {
    /// Check if this sphere emits light.
    pub fn is_emissive(&self) -> bool {
        self.emission.length_squared() > 0.0
    }

    /// True when the two spheres overlap (touching does not count).
    pub fn intersects(&self, other: &Sphere) -> bool {
        spheres_overlap(self.position, self.radius, other.position, other.radius)
    }

    /// View a sphere slice as the raw bytes of a structured buffer.
    pub fn as_bytes(spheres: &[Sphere]) -> &[u8] {
        bytemuck::cast_slice(spheres)
    }
}

/// Squared-distance overlap test used by rejection sampling.
#[inline]
pub(crate) fn spheres_overlap(a: Vec3, ra: f32, b: Vec3, rb: f32) -> bool {
    let min_dist = ra + rb;
    a.distance_squared(b) < min_dist * min_dist
}
