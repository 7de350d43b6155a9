//! Glint Renderer - progressive sample accumulation.
//!
//! Feeds a pluggable [`Kernel`] one frame at a time and keeps a running
//! mean of its output, restarting whenever the accumulated image goes
//! stale (resize, camera motion, scene edits).
//!
//! The kernel itself (the per-pixel ray tracer) lives outside this crate.

mod error;
mod image;
mod kernel;
mod progressive;

pub use error::{KernelError, RenderError, RenderResult};
pub use image::{color_to_rgba, linear_to_gamma, ImageBuffer, Rgba};
pub use kernel::{FrameParams, Kernel, Presenter, StaticParams};
pub use progressive::{
    AccumulationState, FrameStatus, MissingDependencies, ProgressiveRenderer, RenderSettings,
    SkipReason, Viewport, MAX_REFLECTIONS, MAX_SKYBOX_LIGHTING,
};

/// Re-export common math types from glint_math
pub use glint_math::{Camera, Vec3, Vec4};
