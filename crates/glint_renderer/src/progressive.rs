//! Progressive accumulation.
//!
//! Each frame the kernel writes one noisy sample per pixel into a target
//! buffer, which is folded into a converged buffer as a running mean. Any
//! change that invalidates the accumulated image (resize, camera motion,
//! scene or settings edits) restarts the mean at zero samples.

use std::fmt;
use std::sync::Arc;

use glint_core::{generate_spheres, GroundSettings, Sphere, SphereGenerationSettings, Validate, Watched};
use glint_math::{finite_or, Camera, TransformTracker, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::RenderResult;
use crate::image::ImageBuffer;
use crate::kernel::{FrameParams, Kernel, Presenter, StaticParams};

/// Upper bound for `RenderSettings::max_reflections`.
pub const MAX_REFLECTIONS: u32 = 7;

/// Upper bound for `RenderSettings::skybox_lighting`.
pub const MAX_SKYBOX_LIGHTING: f32 = 3.0;

/// Renderer-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Reflections after the primary hit (0..=7)
    pub max_reflections: u32,
    /// Skybox light multiplier (0..=3)
    pub skybox_lighting: f32,
    /// Skybox reference handed to the kernel as-is
    pub skybox: Option<String>,
    /// When false every frame restarts at sample 0 (live preview)
    pub accumulate: bool,
    /// Seed for pixel jitter and per-frame seeds; `None` uses entropy
    pub frame_seed: Option<u64>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_reflections: 2,
            skybox_lighting: 1.0,
            skybox: None,
            accumulate: true,
            frame_seed: None,
        }
    }
}

impl Validate for RenderSettings {
    fn validate(&mut self) {
        self.max_reflections = self.max_reflections.min(MAX_REFLECTIONS);
        self.skybox_lighting = finite_or(self.skybox_lighting, 0.0).clamp(0.0, MAX_SKYBOX_LIGHTING);
    }
}

/// Output size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Where the renderer is in its accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulationState {
    /// No frame has been rendered yet.
    Uninitialized,
    /// The converged buffer holds the mean of this many samples.
    Accumulating(u32),
}

/// Collaborators a frame cannot run without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MissingDependencies {
    pub kernel: bool,
    pub scene: bool,
    pub ground: bool,
}

impl MissingDependencies {
    pub fn is_empty(&self) -> bool {
        !(self.kernel || self.scene || self.ground)
    }
}

impl fmt::Display for MissingDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (self.kernel, "kernel"),
            (self.scene, "sphere scene"),
            (self.ground, "ground settings"),
        ]
        .iter()
        .filter(|(missing, _)| *missing)
        .map(|(_, name)| *name)
        .collect();
        write!(f, "no {} attached", names.join(", "))
    }
}

/// Why a frame was not rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Width or height is zero.
    ZeroArea,
    Missing(MissingDependencies),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ZeroArea => write!(f, "viewport has zero area"),
            SkipReason::Missing(missing) => missing.fmt(f),
        }
    }
}

/// Result of one [`ProgressiveRenderer::render_frame`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// A sample was accumulated; `sample_count` samples are now in the mean.
    Rendered { sample_count: u32 },
    Skipped(SkipReason),
}

/// Kernel target plus running mean, always the same size.
struct Buffers {
    target: ImageBuffer,
    converged: ImageBuffer,
}

impl Buffers {
    fn empty() -> Self {
        Self {
            target: ImageBuffer::empty(),
            converged: ImageBuffer::empty(),
        }
    }
}

/// Drives a [`Kernel`] frame by frame and averages its output.
pub struct ProgressiveRenderer {
    settings: RenderSettings,
    kernel: Option<Box<dyn Kernel>>,
    presenter: Option<Box<dyn Presenter>>,
    spheres: Option<Arc<[Sphere]>>,
    ground: Option<GroundSettings>,

    buffers: Buffers,
    state: AccumulationState,
    static_dirty: bool,
    camera_tracker: TransformTracker,
    projection_tracker: TransformTracker,
    rng: StdRng,
    last_skip: Option<SkipReason>,
}

impl ProgressiveRenderer {
    /// Create a renderer with no kernel, scene or ground attached.
    pub fn new(mut settings: RenderSettings) -> Self {
        settings.validate();
        let rng = frame_rng(settings.frame_seed);
        Self {
            settings,
            kernel: None,
            presenter: None,
            spheres: None,
            ground: None,
            buffers: Buffers::empty(),
            state: AccumulationState::Uninitialized,
            static_dirty: true,
            camera_tracker: TransformTracker::new(),
            projection_tracker: TransformTracker::new(),
            rng,
            last_skip: None,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn state(&self) -> AccumulationState {
        self.state
    }

    /// Samples currently in the converged image.
    pub fn sample_count(&self) -> u32 {
        match self.state {
            AccumulationState::Uninitialized => 0,
            AccumulationState::Accumulating(n) => n,
        }
    }

    /// The display-ready image.
    pub fn converged(&self) -> &ImageBuffer {
        &self.buffers.converged
    }

    /// Current buffer size (0x0 before the first frame).
    pub fn buffer_size(&self) -> (u32, u32) {
        self.buffers.converged.size()
    }

    pub fn set_kernel(&mut self, kernel: Box<dyn Kernel>) {
        self.kernel = Some(kernel);
        self.notify_scene_changed();
    }

    pub fn set_presenter(&mut self, presenter: Box<dyn Presenter>) {
        self.presenter = Some(presenter);
    }

    /// Replace the sphere list. Counts as a scene change.
    pub fn set_scene(&mut self, spheres: impl Into<Arc<[Sphere]>>) {
        let spheres = spheres.into();
        log::info!("Scene updated: {} spheres", spheres.len());
        self.spheres = Some(spheres);
        self.notify_scene_changed();
    }

    /// Replace the ground material. Counts as a scene change.
    pub fn set_ground(&mut self, ground: GroundSettings) {
        self.ground = Some(ground);
        self.notify_scene_changed();
    }

    /// Replace the renderer settings. Counts as a scene change.
    pub fn set_settings(&mut self, mut settings: RenderSettings) {
        settings.validate();
        if settings.frame_seed != self.settings.frame_seed {
            self.rng = frame_rng(settings.frame_seed);
        }
        self.settings = settings;
        self.notify_scene_changed();
    }

    /// Regenerate and upload whatever configuration changed since the last
    /// call. Returns true if anything was re-uploaded.
    pub fn on_config_changed(
        &mut self,
        spheres: &mut Watched<SphereGenerationSettings>,
        ground: &mut Watched<GroundSettings>,
    ) -> bool {
        let mut changed = false;
        if spheres.take_changed() {
            self.set_scene(generate_spheres(spheres.get()));
            changed = true;
        }
        if ground.take_changed() {
            self.set_ground(*ground.get());
            changed = true;
        }
        changed
    }

    /// Discard accumulated samples and re-push static parameters before the
    /// next dispatch.
    pub fn notify_scene_changed(&mut self) {
        self.static_dirty = true;
        self.reset_accumulation();
    }

    /// Discard accumulated samples, e.g. after a light moved.
    pub fn notify_camera_moved(&mut self) {
        self.reset_accumulation();
    }

    /// Resize both buffers now. A zero-area size is ignored until it
    /// becomes non-empty again.
    pub fn notify_viewport_changed(&mut self, width: u32, height: u32) -> RenderResult<()> {
        let viewport = Viewport::new(width, height);
        if viewport.is_empty() {
            log::debug!("Ignoring zero-area viewport {}x{}", width, height);
            return Ok(());
        }
        self.ensure_buffers(viewport)?;
        Ok(())
    }

    /// Render and accumulate one frame.
    ///
    /// Missing collaborators and zero-area viewports skip the frame with a
    /// diagnostic. Buffer allocation and kernel failures are returned.
    pub fn render_frame(&mut self, viewport: Viewport, camera: &Camera) -> RenderResult<FrameStatus> {
        if viewport.is_empty() {
            return Ok(self.skip(SkipReason::ZeroArea));
        }

        let missing = self.missing_dependencies();
        if !missing.is_empty() {
            return Ok(self.skip(SkipReason::Missing(missing)));
        }

        if let Some(reason) = self.last_skip.take() {
            log::info!("Resuming rendering after skip ({})", reason);
        }

        self.ensure_buffers(viewport)?;

        let camera_to_world = camera.camera_to_world();
        let inverse_projection = camera.inverse_projection();
        let moved = self.camera_tracker.observe(camera_to_world);
        let reprojected = self.projection_tracker.observe(inverse_projection);
        if moved || reprojected || !self.settings.accumulate {
            self.reset_accumulation();
        }

        if self.static_dirty {
            self.push_static_params();
        }

        let sample_index = self.sample_count();
        let frame = FrameParams {
            pixel_offset: Vec2::new(self.rng.gen(), self.rng.gen()),
            camera_to_world,
            inverse_projection,
            seed: self.rng.gen(),
            skybox_lighting: self.settings.skybox_lighting,
            sample_index,
        };

        if let Some(kernel) = self.kernel.as_deref_mut() {
            kernel.dispatch(&mut self.buffers.target, &frame)?;
        }

        self.buffers
            .converged
            .blend_running_mean(&self.buffers.target, sample_index);

        if let Some(presenter) = self.presenter.as_deref_mut() {
            presenter.present(&self.buffers.converged);
        }

        let sample_count = sample_index + 1;
        self.state = AccumulationState::Accumulating(sample_count);
        Ok(FrameStatus::Rendered { sample_count })
    }

    fn missing_dependencies(&self) -> MissingDependencies {
        MissingDependencies {
            kernel: self.kernel.is_none(),
            scene: self.spheres.is_none(),
            ground: self.ground.is_none(),
        }
    }

    fn skip(&mut self, reason: SkipReason) -> FrameStatus {
        if self.last_skip != Some(reason) {
            log::warn!("Skipping frame: {}", reason);
            self.last_skip = Some(reason);
        }
        FrameStatus::Skipped(reason)
    }

    fn reset_accumulation(&mut self) {
        if let AccumulationState::Accumulating(n) = self.state {
            if n > 0 {
                log::debug!("Accumulation reset after {} samples", n);
            }
        }
        self.state = AccumulationState::Accumulating(0);
    }

    /// Reallocate both buffers if the viewport size changed.
    fn ensure_buffers(&mut self, viewport: Viewport) -> RenderResult<()> {
        if self.buffers.converged.size() == (viewport.width, viewport.height) {
            return Ok(());
        }

        // Never keep rendering into buffers of the old size.
        self.buffers = Buffers::empty();
        self.state = AccumulationState::Uninitialized;

        let target = ImageBuffer::try_new(viewport.width, viewport.height)?;
        let converged = ImageBuffer::try_new(viewport.width, viewport.height)?;
        self.buffers = Buffers { target, converged };
        self.reset_accumulation();

        log::info!("Accumulation buffers resized to {}x{}", viewport.width, viewport.height);
        Ok(())
    }

    fn push_static_params(&mut self) {
        let (Some(kernel), Some(spheres), Some(ground)) =
            (self.kernel.as_deref_mut(), self.spheres.as_ref(), self.ground)
        else {
            return;
        };

        let params = StaticParams {
            max_bounces: self.settings.max_reflections + 1,
            skybox: self.settings.skybox.clone(),
            spheres: Arc::clone(spheres),
            ground,
        };
        kernel.upload_static(&params);
        self.static_dirty = false;
    }
}

fn frame_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{KernelError, RenderError};
    use crate::image::Rgba;
    use glint_math::Vec3;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct Record {
        uploads: Vec<StaticParams>,
        frames: Vec<FrameParams>,
        presented: usize,
    }

    /// Writes the same colour into every pixel.
    struct ConstantKernel {
        color: Rgba,
        fail: bool,
        record: Rc<RefCell<Record>>,
    }

    impl Kernel for ConstantKernel {
        fn upload_static(&mut self, params: &StaticParams) {
            self.record.borrow_mut().uploads.push(params.clone());
        }

        fn dispatch(&mut self, target: &mut ImageBuffer, frame: &FrameParams) -> Result<(), KernelError> {
            if self.fail {
                return Err(KernelError("device lost".to_string()));
            }
            self.record.borrow_mut().frames.push(*frame);
            target.fill(self.color);
            Ok(())
        }
    }

    /// Fills the target with whatever colour the test last set.
    struct SharedColorKernel(Rc<Cell<Rgba>>);

    impl Kernel for SharedColorKernel {
        fn upload_static(&mut self, _params: &StaticParams) {}

        fn dispatch(&mut self, target: &mut ImageBuffer, _frame: &FrameParams) -> Result<(), KernelError> {
            target.fill(self.0.get());
            Ok(())
        }
    }

    struct CountingPresenter(Rc<RefCell<Record>>);

    impl Presenter for CountingPresenter {
        fn present(&mut self, _image: &ImageBuffer) {
            self.0.borrow_mut().presented += 1;
        }
    }

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn camera() -> Camera {
        Camera::new(Vec3::new(0.0, 40.0, 120.0), Vec3::ZERO, 4.0 / 3.0)
    }

    fn settings() -> RenderSettings {
        RenderSettings {
            frame_seed: Some(7),
            ..Default::default()
        }
    }

    fn ready_renderer(color: Rgba) -> (ProgressiveRenderer, Rc<RefCell<Record>>) {
        let record = Rc::new(RefCell::new(Record::default()));
        let mut renderer = ProgressiveRenderer::new(settings());
        renderer.set_kernel(Box::new(ConstantKernel {
            color,
            fail: false,
            record: Rc::clone(&record),
        }));
        renderer.set_presenter(Box::new(CountingPresenter(Rc::clone(&record))));
        renderer.set_scene(generate_spheres(&SphereGenerationSettings {
            count: 10,
            ..Default::default()
        }));
        renderer.set_ground(GroundSettings::default());
        (renderer, record)
    }

    #[test]
    fn test_new_renderer_is_uninitialized() {
        let renderer = ProgressiveRenderer::new(settings());
        assert_eq!(renderer.state(), AccumulationState::Uninitialized);
        assert_eq!(renderer.buffer_size(), (0, 0));
    }

    #[test]
    fn test_missing_dependencies_skip() {
        init_logger();
        let mut renderer = ProgressiveRenderer::new(settings());
        let status = renderer.render_frame(Viewport::new(64, 64), &camera()).unwrap();

        let expected = MissingDependencies {
            kernel: true,
            scene: true,
            ground: true,
        };
        assert_eq!(status, FrameStatus::Skipped(SkipReason::Missing(expected)));
        assert_eq!(renderer.buffer_size(), (0, 0));
        assert_eq!(
            expected.to_string(),
            "no kernel, sphere scene, ground settings attached"
        );
    }

    #[test]
    fn test_missing_ground_only() {
        init_logger();
        let record = Rc::new(RefCell::new(Record::default()));
        let mut renderer = ProgressiveRenderer::new(settings());
        renderer.set_kernel(Box::new(ConstantKernel {
            color: Rgba::ONE,
            fail: false,
            record: Rc::clone(&record),
        }));
        renderer.set_scene(Vec::<Sphere>::new());

        let status = renderer.render_frame(Viewport::new(8, 8), &camera()).unwrap();
        let FrameStatus::Skipped(SkipReason::Missing(missing)) = status else {
            panic!("expected skip, got {:?}", status);
        };
        assert!(missing.ground && !missing.kernel && !missing.scene);
        assert!(record.borrow().frames.is_empty());
        assert!(record.borrow().uploads.is_empty());

        renderer.set_ground(GroundSettings::default());
        let status = renderer.render_frame(Viewport::new(8, 8), &camera()).unwrap();
        assert_eq!(status, FrameStatus::Rendered { sample_count: 1 });
    }

    #[test]
    fn test_zero_area_skips_without_allocation() {
        let (mut renderer, record) = ready_renderer(Rgba::ONE);
        let status = renderer.render_frame(Viewport::new(0, 600), &camera()).unwrap();

        assert_eq!(status, FrameStatus::Skipped(SkipReason::ZeroArea));
        assert_eq!(renderer.buffer_size(), (0, 0));
        assert!(record.borrow().frames.is_empty());
    }

    #[test]
    fn test_sample_count_advances() {
        let (mut renderer, record) = ready_renderer(Rgba::ONE);
        let viewport = Viewport::new(16, 9);
        let cam = camera();

        for expected in 1..=5 {
            let status = renderer.render_frame(viewport, &cam).unwrap();
            assert_eq!(status, FrameStatus::Rendered { sample_count: expected });
        }
        assert_eq!(renderer.state(), AccumulationState::Accumulating(5));

        let record = record.borrow();
        let indices: Vec<u32> = record.frames.iter().map(|f| f.sample_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(record.presented, 5);
    }

    #[test]
    fn test_constant_sample_converges_to_itself() {
        let color = Rgba::new(0.37, 0.5, 0.81, 1.0);
        let (mut renderer, _) = ready_renderer(color);
        let cam = camera();

        for k in 1..=20 {
            renderer.render_frame(Viewport::new(12, 12), &cam).unwrap();
            for pixel in &renderer.converged().pixels {
                assert!((*pixel - color).abs().max_element() < 1e-5, "diverged after {} samples", k);
            }
        }
    }

    #[test]
    fn test_reset_discards_non_finite_samples() {
        init_logger();
        let color = Rc::new(Cell::new(Rgba::splat(f32::NAN)));
        let (mut renderer, _) = ready_renderer(Rgba::ONE);
        renderer.set_kernel(Box::new(SharedColorKernel(Rc::clone(&color))));
        let cam = camera();
        let viewport = Viewport::new(4, 4);

        renderer.render_frame(viewport, &cam).unwrap();
        assert!(renderer.converged().get(0, 0).is_nan());

        renderer.notify_scene_changed();
        color.set(Rgba::splat(0.5));
        let status = renderer.render_frame(viewport, &cam).unwrap();
        assert_eq!(status, FrameStatus::Rendered { sample_count: 1 });
        assert!(renderer.converged().pixels.iter().all(|p| *p == Rgba::splat(0.5)));

        color.set(Rgba::splat(f32::INFINITY));
        renderer.render_frame(viewport, &cam).unwrap();
        renderer.notify_camera_moved();
        color.set(Rgba::splat(0.25));
        renderer.render_frame(viewport, &cam).unwrap();
        assert!(renderer.converged().pixels.iter().all(|p| *p == Rgba::splat(0.25)));
    }

    #[test]
    fn test_static_params_pushed_once_per_scene_change() {
        let (mut renderer, record) = ready_renderer(Rgba::ONE);
        let cam = camera();
        for _ in 0..4 {
            renderer.render_frame(Viewport::new(8, 8), &cam).unwrap();
        }
        assert_eq!(record.borrow().uploads.len(), 1);

        renderer.notify_scene_changed();
        assert_eq!(renderer.sample_count(), 0);
        let status = renderer.render_frame(Viewport::new(8, 8), &cam).unwrap();
        assert_eq!(status, FrameStatus::Rendered { sample_count: 1 });
        assert_eq!(record.borrow().uploads.len(), 2);
    }

    #[test]
    fn test_static_params_contents() {
        let (mut renderer, record) = ready_renderer(Rgba::ONE);
        renderer.set_settings(RenderSettings {
            max_reflections: 2,
            skybox: Some("sky.hdr".to_string()),
            ..settings()
        });
        renderer.render_frame(Viewport::new(4, 4), &camera()).unwrap();

        let record = record.borrow();
        let upload = &record.uploads[0];
        assert_eq!(upload.max_bounces, 3);
        assert_eq!(upload.skybox.as_deref(), Some("sky.hdr"));
        assert_eq!(upload.ground, GroundSettings::default());
        assert!(!upload.spheres.is_empty());
    }

    #[test]
    fn test_frame_params_ranges() {
        let (mut renderer, record) = ready_renderer(Rgba::ONE);
        let cam = camera();
        for _ in 0..50 {
            renderer.render_frame(Viewport::new(4, 4), &cam).unwrap();
        }

        for frame in &record.borrow().frames {
            assert!((0.0..1.0).contains(&frame.pixel_offset.x));
            assert!((0.0..1.0).contains(&frame.pixel_offset.y));
            assert!((0.0..1.0).contains(&frame.seed));
            assert_eq!(frame.camera_to_world, cam.camera_to_world());
            assert_eq!(frame.inverse_projection, cam.inverse_projection());
            assert_eq!(frame.skybox_lighting, 1.0);
        }
    }

    #[test]
    fn test_frame_seed_is_reproducible() {
        let (mut a, record_a) = ready_renderer(Rgba::ONE);
        let (mut b, record_b) = ready_renderer(Rgba::ONE);
        let cam = camera();
        for _ in 0..3 {
            a.render_frame(Viewport::new(4, 4), &cam).unwrap();
            b.render_frame(Viewport::new(4, 4), &cam).unwrap();
        }
        assert_eq!(record_a.borrow().frames, record_b.borrow().frames);
    }

    #[test]
    fn test_camera_motion_resets() {
        let (mut renderer, _) = ready_renderer(Rgba::ONE);
        let mut cam = camera();
        for _ in 0..3 {
            renderer.render_frame(Viewport::new(8, 8), &cam).unwrap();
        }
        assert_eq!(renderer.sample_count(), 3);

        cam.orbit_y(0.1);
        let status = renderer.render_frame(Viewport::new(8, 8), &cam).unwrap();
        assert_eq!(status, FrameStatus::Rendered { sample_count: 1 });

        let status = renderer.render_frame(Viewport::new(8, 8), &cam).unwrap();
        assert_eq!(status, FrameStatus::Rendered { sample_count: 2 });
    }

    #[test]
    fn test_camera_moved_notification_resets() {
        let (mut renderer, record) = ready_renderer(Rgba::ONE);
        let cam = camera();
        renderer.render_frame(Viewport::new(8, 8), &cam).unwrap();
        renderer.render_frame(Viewport::new(8, 8), &cam).unwrap();

        renderer.notify_camera_moved();
        assert_eq!(renderer.state(), AccumulationState::Accumulating(0));
        renderer.render_frame(Viewport::new(8, 8), &cam).unwrap();

        assert_eq!(renderer.sample_count(), 1);
        // A light moving does not re-push scene parameters.
        assert_eq!(record.borrow().uploads.len(), 1);
    }

    #[test]
    fn test_viewport_change_resets_and_resizes() {
        let (mut renderer, _) = ready_renderer(Rgba::splat(0.5));
        let cam = camera();
        for _ in 0..50 {
            renderer.render_frame(Viewport::new(800, 600), &cam).unwrap();
        }
        assert_eq!(renderer.sample_count(), 50);
        assert_eq!(renderer.buffer_size(), (800, 600));

        renderer.notify_viewport_changed(1024, 768).unwrap();
        assert_eq!(renderer.sample_count(), 0);
        assert_eq!(renderer.buffer_size(), (1024, 768));
        assert_eq!(renderer.converged().pixels.len(), 1024 * 768);
    }

    #[test]
    fn test_render_frame_detects_resize() {
        let (mut renderer, _) = ready_renderer(Rgba::ONE);
        let cam = camera();
        for _ in 0..4 {
            renderer.render_frame(Viewport::new(32, 24), &cam).unwrap();
        }

        let status = renderer.render_frame(Viewport::new(40, 30), &cam).unwrap();
        assert_eq!(status, FrameStatus::Rendered { sample_count: 1 });
        assert_eq!(renderer.buffer_size(), (40, 30));
    }

    #[test]
    fn test_zero_area_viewport_notification_ignored() {
        let (mut renderer, _) = ready_renderer(Rgba::ONE);
        renderer.render_frame(Viewport::new(8, 8), &camera()).unwrap();
        renderer.notify_viewport_changed(0, 0).unwrap();
        assert_eq!(renderer.buffer_size(), (8, 8));
        assert_eq!(renderer.sample_count(), 1);
    }

    #[test]
    fn test_allocation_failure_propagates() {
        let (mut renderer, _) = ready_renderer(Rgba::ONE);
        renderer.render_frame(Viewport::new(8, 8), &camera()).unwrap();

        let result = renderer.notify_viewport_changed(u32::MAX, u32::MAX);
        assert!(matches!(result, Err(RenderError::Allocation { .. })));
        assert_eq!(renderer.state(), AccumulationState::Uninitialized);
        assert_eq!(renderer.buffer_size(), (0, 0));
    }

    #[test]
    fn test_no_accumulation_mode() {
        let (mut renderer, _) = ready_renderer(Rgba::ONE);
        renderer.set_settings(RenderSettings {
            accumulate: false,
            ..settings()
        });
        let cam = camera();
        for _ in 0..3 {
            let status = renderer.render_frame(Viewport::new(8, 8), &cam).unwrap();
            assert_eq!(status, FrameStatus::Rendered { sample_count: 1 });
        }
    }

    #[test]
    fn test_dispatch_error_propagates() {
        let record = Rc::new(RefCell::new(Record::default()));
        let (mut renderer, _) = ready_renderer(Rgba::ONE);
        renderer.set_kernel(Box::new(ConstantKernel {
            color: Rgba::ONE,
            fail: true,
            record,
        }));

        let result = renderer.render_frame(Viewport::new(8, 8), &camera());
        assert!(matches!(result, Err(RenderError::Dispatch(_))));
        assert_eq!(renderer.sample_count(), 0);
    }

    #[test]
    fn test_render_settings_clamped() {
        let renderer = ProgressiveRenderer::new(RenderSettings {
            max_reflections: 12,
            skybox_lighting: 9.0,
            ..Default::default()
        });
        assert_eq!(renderer.settings().max_reflections, MAX_REFLECTIONS);
        assert_eq!(renderer.settings().skybox_lighting, MAX_SKYBOX_LIGHTING);
    }

    #[test]
    fn test_render_settings_from_json() {
        let settings: RenderSettings = glint_core::settings_from_str(
            r#"{ "max_reflections": 12, "skybox_lighting": 0.5, "accumulate": false }"#,
        )
        .unwrap();

        assert_eq!(settings.max_reflections, MAX_REFLECTIONS);
        assert_eq!(settings.skybox_lighting, 0.5);
        assert!(!settings.accumulate);
        assert_eq!(settings.skybox, None);
        assert_eq!(settings.frame_seed, None);
    }

    #[test]
    fn test_on_config_changed_regenerates() {
        let (mut renderer, record) = ready_renderer(Rgba::ONE);
        let mut spheres = Watched::new(SphereGenerationSettings {
            count: 5,
            seed: 42,
            ..Default::default()
        });
        let mut ground = Watched::new(GroundSettings::default());
        let cam = camera();

        assert!(renderer.on_config_changed(&mut spheres, &mut ground));
        renderer.render_frame(Viewport::new(8, 8), &cam).unwrap();
        renderer.render_frame(Viewport::new(8, 8), &cam).unwrap();
        assert!(!renderer.on_config_changed(&mut spheres, &mut ground));
        assert_eq!(renderer.sample_count(), 2);

        ground.edit(|g| g.smoothness = 0.9);
        assert!(renderer.on_config_changed(&mut spheres, &mut ground));
        assert_eq!(renderer.sample_count(), 0);

        renderer.render_frame(Viewport::new(8, 8), &cam).unwrap();
        let record = record.borrow();
        let last = record.uploads.last().unwrap();
        assert_eq!(last.ground.smoothness, 0.9);
        assert_eq!(&*last.spheres, generate_spheres(&spheres).as_slice());
    }
}
