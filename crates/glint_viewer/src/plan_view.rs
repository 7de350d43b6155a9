//! Stand-in kernel: a jittered top-down view of the sphere field.
//!
//! This is not a ray tracer. It looks straight down the Y axis, shades the
//! highest surface under each sample with a single directional light, and
//! ignores the camera matrices. Its only job is to give the accumulation
//! loop something with edges to anti-alias.

use std::sync::Arc;

use glint_core::{GroundSettings, Sphere};
use glint_math::{Vec3, Vec4};
use glint_renderer::{FrameParams, ImageBuffer, Kernel, KernelError, StaticParams};
use rayon::prelude::*;

/// Extra border around the field, as a fraction of its extent.
const MARGIN: f32 = 0.05;

pub struct PlanViewKernel {
    spheres: Arc<[Sphere]>,
    ground: GroundSettings,
    extent: f32,
    light_dir: Vec3,
}

impl PlanViewKernel {
    pub fn new() -> Self {
        Self {
            spheres: Vec::<Sphere>::new().into(),
            ground: GroundSettings::default(),
            extent: 1.0,
            light_dir: Vec3::new(0.4, 1.0, 0.3).normalize(),
        }
    }

    /// Colour of the topmost surface at world (x, z).
    fn shade(&self, x: f32, z: f32, ambient: f32) -> Vec3 {
        let mut top: Option<(f32, Vec3, &Sphere)> = None;

        for sphere in self.spheres.iter() {
            let dx = x - sphere.position.x;
            let dz = z - sphere.position.z;
            let d2 = dx * dx + dz * dz;
            let r2 = sphere.radius * sphere.radius;
            if d2 >= r2 {
                continue;
            }

            let dy = (r2 - d2).sqrt();
            let height = sphere.position.y + dy;
            if top.map_or(true, |(best, _, _)| height > best) {
                let normal = Vec3::new(dx, dy, dz) / sphere.radius;
                top = Some((height, normal, sphere));
            }
        }

        match top {
            Some((_, normal, sphere)) => {
                let diffuse = normal.dot(self.light_dir).max(0.0);
                let highlight = diffuse.powf(1.0 + 63.0 * sphere.smoothness);
                sphere.albedo * (ambient + diffuse) + sphere.specular * highlight + sphere.emission
            }
            None => self.ground.albedo * (ambient + self.light_dir.y) + self.ground.emission,
        }
    }
}

impl Default for PlanViewKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for PlanViewKernel {
    fn upload_static(&mut self, params: &StaticParams) {
        self.spheres = Arc::clone(&params.spheres);
        self.ground = params.ground;
        self.extent = field_extent(&params.spheres) * (1.0 + MARGIN);
        log::debug!(
            "Plan view covers ±{:.1} units ({} spheres)",
            self.extent,
            self.spheres.len()
        );
    }

    fn dispatch(&mut self, target: &mut ImageBuffer, frame: &FrameParams) -> Result<(), KernelError> {
        let (width, height) = target.size();
        if width == 0 || height == 0 {
            return Err(KernelError(format!("empty target {}x{}", width, height)));
        }

        let scale = 2.0 * self.extent / width.max(height) as f32;
        let half_w = width as f32 / 2.0;
        let half_h = height as f32 / 2.0;
        let ambient = 0.15 * frame.skybox_lighting;
        let jitter = frame.pixel_offset;
        let kernel = &*self;

        target
            .pixels
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                let z = (y as f32 + jitter.y - half_h) * scale;
                for (x, pixel) in row.iter_mut().enumerate() {
                    let wx = (x as f32 + jitter.x - half_w) * scale;
                    let color = kernel.shade(wx, z, ambient);
                    *pixel = Vec4::new(color.x, color.y, color.z, 1.0);
                }
            });

        Ok(())
    }
}

/// Half-width of the square that contains every sphere's footprint.
fn field_extent(spheres: &[Sphere]) -> f32 {
    spheres
        .iter()
        .map(|s| s.position.x.abs().max(s.position.z.abs()) + s.radius)
        .fold(1.0, f32::max)
}
