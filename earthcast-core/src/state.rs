use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::config::Config;

/// City picked from the device position. Coordinates are kept at `f32` precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentCity {
    pub name: String,
    pub latitude: f32,
    pub longitude: f32,
}

/// User-level state that survives between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default = "first_run_default")]
    pub first_run: bool,
    pub current_city: Option<CurrentCity>,
}

fn first_run_default() -> bool {
    true
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            first_run: true,
            current_city: None,
        }
    }
}

impl AppState {
    pub fn complete_welcome(&mut self) {
        self.first_run = false;
    }

    pub fn set_current_city(&mut self, name: impl Into<String>, latitude: f64, longitude: f64) {
        self.current_city = Some(CurrentCity {
            name: name.into(),
            latitude: latitude as f32,
            longitude: longitude as f32,
        });
    }
}

/// Where [`AppState`] is loaded from and saved to.
pub trait StatePersistence {
    fn load(&self) -> Result<AppState>;
    fn save(&self, state: &AppState) -> Result<()>;
}

/// [`AppState`] stored as a TOML file.
#[derive(Debug, Clone)]
pub struct TomlStateFile {
    path: PathBuf,
}

impl TomlStateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// State file in the platform data directory.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(Config::state_file_path()?))
    }
}

impl StatePersistence for TomlStateFile {
    fn load(&self) -> Result<AppState> {
        if !self.path.exists() {
            return Ok(AppState::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file: {}", self.path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse state file: {}", self.path.display()))
    }

    fn save(&self, state: &AppState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create state directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(state).context("Failed to serialize state to TOML")?;
        fs::write(&self.path, toml)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_install_is_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let file = TomlStateFile::new(dir.path().join("state.toml"));

        let state = file.load().unwrap();
        assert!(state.first_run);
        assert!(state.current_city.is_none());
    }

    #[test]
    fn welcome_and_current_city_persist() {
        let dir = tempfile::tempdir().unwrap();
        let file = TomlStateFile::new(dir.path().join("data").join("state.toml"));

        let mut state = AppState::default();
        state.complete_welcome();
        state.set_current_city("Springfield", 39.799_123_456, -89.644_987_654);
        file.save(&state).unwrap();

        let loaded = file.load().unwrap();
        assert!(!loaded.first_run);
        let city = loaded.current_city.unwrap();
        assert_eq!(city.name, "Springfield");
        assert_eq!(city.latitude, 39.799_123_456_f64 as f32);
        assert_eq!(city.longitude, -89.644_987_654_f64 as f32);
    }

    #[test]
    fn missing_flag_defaults_to_first_run() {
        let state: AppState = toml::from_str("").unwrap();
        assert!(state.first_run);
    }
}
