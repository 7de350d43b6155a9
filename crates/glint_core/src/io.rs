//! JSON persistence for settings and generated scenes.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::sphere::Sphere;
use crate::watch::Validate;

/// Errors that can occur while reading or writing settings files.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Parse settings from a JSON string. Missing fields take their defaults
/// and the result is validated.
pub fn settings_from_str<T>(json: &str) -> SettingsResult<T>
where
    T: DeserializeOwned + Validate,
{
    let mut value: T = serde_json::from_str(json)?;
    value.validate();
    Ok(value)
}

/// Load settings from a JSON file.
pub fn load_settings<T>(path: impl AsRef<Path>) -> SettingsResult<T>
where
    T: DeserializeOwned + Validate,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let value = settings_from_str(&text)?;
    log::info!("Loaded settings from {}", path.display());
    Ok(value)
}

/// Write any serializable value as pretty JSON.
pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> SettingsResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Serialize a generated sphere list for inspection.
pub fn spheres_to_json(spheres: &[Sphere]) -> SettingsResult<String> {
    Ok(serde_json::to_string_pretty(spheres)?)
}
