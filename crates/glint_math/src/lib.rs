// Re-export glam for convenience
pub use glam::*;

// Glint math types
mod camera;
mod color;
mod interval;
mod transform;

pub use camera::Camera;
pub use color::hsv_to_rgb;
pub use interval::{finite_or, saturate, Interval};
pub use transform::TransformTracker;
