//! Colour helpers.

use glam::Vec3;

/// Convert hue/saturation/value (each in [0, 1]) to linear RGB.
///
/// Hue wraps, so 0.0 and 1.0 are both red.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    if s <= 0.0 {
        return Vec3::splat(v);
    }

    let h6 = (h - h.floor()) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector as u32 {
        0 => Vec3::new(v, t, p),
        1 => Vec3::new(q, v, p),
        2 => Vec3::new(p, v, t),
        3 => Vec3::new(p, q, v),
        4 => Vec3::new(t, p, v),
        _ => Vec3::new(v, p, q),
    }
}
