//! Validated values with change notification.
//!
//! Settings objects are edited through [`Watched::edit`], which re-runs
//! validation and raises a changed flag the host polls once per tick.

use std::ops::Deref;

/// Values that can correct themselves into a valid state.
///
/// Implementations must be idempotent: validating twice gives the same
/// result as validating once.
pub trait Validate {
    fn validate(&mut self);
}

/// A validated value plus a "changed since last poll" flag.
#[derive(Debug, Clone)]
pub struct Watched<T> {
    value: T,
    changed: bool,
}

impl<T: Validate> Watched<T> {
    /// Wrap and validate `value`. A fresh value counts as changed.
    pub fn new(mut value: T) -> Self {
        value.validate();
        Self {
            value,
            changed: true,
        }
    }

    /// Mutate the value, then validate it and mark it changed.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.value);
        self.value.validate();
        self.changed = true;
        result
    }

    /// Replace the whole value.
    pub fn replace(&mut self, value: T) {
        self.edit(|current| *current = value);
    }
}

impl<T> Watched<T> {
    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Return the changed flag and clear it.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

impl<T: Validate + Default> Default for Watched<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Deref for Watched<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}
