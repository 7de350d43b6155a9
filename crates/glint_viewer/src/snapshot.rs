//! Presenter that periodically writes the converged image to disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glint_renderer::{ImageBuffer, Presenter};

/// Save a converged buffer as an 8-bit PNG.
pub fn save_png(image: &ImageBuffer, path: &Path) -> Result<()> {
    let bytes = image.to_rgba8();
    image::save_buffer(path, &bytes, image.width, image.height, image::ColorType::Rgba8)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Writes every `every`-th presented frame to `path`.
pub struct SnapshotPresenter {
    path: PathBuf,
    every: u32,
    presented: u32,
}

impl SnapshotPresenter {
    pub fn new(path: PathBuf, every: u32) -> Self {
        Self {
            path,
            every,
            presented: 0,
        }
    }
}

impl Presenter for SnapshotPresenter {
    fn present(&mut self, image: &ImageBuffer) {
        self.presented += 1;
        if self.every == 0 || self.presented % self.every != 0 {
            return;
        }

        match save_png(image, &self.path) {
            Ok(()) => log::info!("Checkpoint {} written to {}", self.presented, self.path.display()),
            Err(e) => log::error!("{:#}", e),
        }
    }
}
