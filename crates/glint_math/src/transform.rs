// Change detection for Mat4 transforms
//
// Stands in for an engine's "transform has changed" flag: the tracker
// remembers the last observed matrix and reports whether a new one differs.

use glam::Mat4;

/// Remembers the last observed transform and reports movement.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformTracker {
    last: Option<Mat4>,
}

impl TransformTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `current` and return true if it differs from the previous
    /// observation. The first observation always counts as a change.
    pub fn observe(&mut self, current: Mat4) -> bool {
        let changed = self.last != Some(current);
        self.last = Some(current);
        changed
    }

    /// Forget the stored transform so the next observation reports a change.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn last(&self) -> Option<Mat4> {
        self.last
    }
}
