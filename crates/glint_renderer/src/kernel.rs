//! The seam between the accumulation loop and whatever traces rays.

use std::sync::Arc;

use glint_core::{GroundSettings, Sphere};
use glint_math::{Mat4, Vec2};

use crate::error::KernelError;
use crate::image::ImageBuffer;

/// Parameters that only change when the scene does.
#[derive(Debug, Clone)]
pub struct StaticParams {
    /// Bounce budget: configured reflections plus the primary ray
    pub max_bounces: u32,
    /// Opaque skybox reference, resolved by the kernel
    pub skybox: Option<String>,
    pub spheres: Arc<[Sphere]>,
    pub ground: GroundSettings,
}

/// Parameters pushed on every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    /// Sub-pixel jitter in [0, 1)²
    pub pixel_offset: Vec2,
    pub camera_to_world: Mat4,
    pub inverse_projection: Mat4,
    /// Per-frame random value in [0, 1) for the kernel's own RNG
    pub seed: f32,
    pub skybox_lighting: f32,
    /// Index of the sample being produced (0 after a reset)
    pub sample_index: u32,
}

/// A compute routine that writes one noisy sample per pixel.
pub trait Kernel {
    /// Receive scene-level parameters. Called once after every scene change,
    /// before the next dispatch.
    fn upload_static(&mut self, params: &StaticParams);

    /// Write one sample per pixel into `target`.
    fn dispatch(&mut self, target: &mut ImageBuffer, frame: &FrameParams) -> Result<(), KernelError>;
}

/// A surface that shows the converged image.
pub trait Presenter {
    fn present(&mut self, image: &ImageBuffer);
}
