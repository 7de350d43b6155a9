//! Glint Core - procedural sphere scenes.
//!
//! This crate provides:
//!
//! - **Settings**: `SphereGenerationSettings`, `GroundSettings` with
//!   self-correcting validation and change tracking (`Watched`)
//! - **Generation**: `generate_spheres`, a seeded rejection sampler that
//!   places non-overlapping spheres on a ground plane
//! - **Persistence**: JSON loading/saving of settings and sphere lists
//!
//! # Example
//!
//! ```ignore
//! use glint_core::{generate_spheres, SphereGenerationSettings, Watched};
//!
//! let mut settings = Watched::new(SphereGenerationSettings::default());
//! settings.edit(|s| s.count = 250);
//! if settings.take_changed() {
//!     let spheres = generate_spheres(&settings);
//!     println!("Placed {} spheres", spheres.len());
//! }
//! ```

pub mod generator;
pub mod io;
pub mod random;
pub mod settings;
pub mod sphere;
pub mod watch;

// Re-export commonly used types
pub use generator::generate_spheres;
pub use io::{load_settings, save_json, settings_from_str, spheres_to_json, SettingsError, SettingsResult};
pub use random::SceneRng;
pub use settings::{EmissivePolicy, GroundSettings, SphereGenerationSettings};
pub use sphere::{Sphere, SPHERE_STRIDE};
pub use watch::{Validate, Watched};
