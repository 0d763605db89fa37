use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::provider::EndpointId;

/// Client identification sent to the reverse geocoder (required by its usage policy).
pub const DEFAULT_USER_AGENT: &str = "EarthCastApp";

/// Override for a single endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Value of the `User-Agent` header; defaults to [`DEFAULT_USER_AGENT`].
    pub user_agent: Option<String>,

    /// Location of the saved-cities database; defaults to the platform data dir.
    pub database_path: Option<PathBuf>,

    /// Example TOML:
    /// [endpoints.forecast]
    /// url = "https://api.open-meteo.com/v1/forecast"
    #[serde(default)]
    pub endpoints: HashMap<String, EndpointConfig>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        for key in cfg.endpoints.keys() {
            EndpointId::try_from(key.as_str())
                .with_context(|| format!("Invalid endpoint in {}", path.display()))?;
        }

        Ok(cfg)
    }

    /// Load config for editing. An unreadable file or unknown endpoint keys
    /// are logged and skipped so that saving afterwards repairs the file.
    pub fn load_repairable() -> Result<Self> {
        Ok(Self::load_repairable_from(&Self::config_file_path()?))
    }

    pub fn load_repairable_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let parsed = fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|contents| toml::from_str::<Config>(&contents).map_err(anyhow::Error::from));

        let mut cfg = match parsed {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("Ignoring unreadable config {}: {e}", path.display());
                return Self::default();
            }
        };

        cfg.endpoints.retain(|key, _| match EndpointId::try_from(key.as_str()) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Dropping endpoint override from {}: {e}", path.display());
                false
            }
        });
        cfg
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "example", "earthcast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the persisted application state (first-run flag, current city).
    pub fn state_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("state.toml"))
    }

    /// Saved-cities database path, honouring the `database_path` override.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("cities.db")),
        }
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Configured URL for an endpoint, falling back to the public default.
    pub fn endpoint_url(&self, id: EndpointId) -> &str {
        self.endpoints
            .get(id.as_str())
            .map(|cfg| cfg.url.as_str())
            .unwrap_or_else(|| id.default_url())
    }

    /// Set/replace an endpoint override.
    pub fn set_endpoint_url(&mut self, id: EndpointId, url: String) {
        self.endpoints.insert(id.as_str().to_string(), EndpointConfig { url });
    }

    /// Drop an override so the endpoint goes back to its default.
    pub fn reset_endpoint(&mut self, id: EndpointId) {
        self.endpoints.remove(id.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_configured() {
        let cfg = Config::default();

        assert_eq!(cfg.user_agent(), DEFAULT_USER_AGENT);
        assert_eq!(
            cfg.endpoint_url(EndpointId::Forecast),
            "https://api.open-meteo.com/v1/forecast"
        );
        assert!(!cfg.endpoints.contains_key(EndpointId::Geocoding.as_str()));
    }

    #[test]
    fn override_and_reset_endpoint() {
        let mut cfg = Config::default();

        cfg.set_endpoint_url(EndpointId::Reverse, "http://localhost:9000/reverse".into());
        assert_eq!(cfg.endpoint_url(EndpointId::Reverse), "http://localhost:9000/reverse");
        assert!(cfg.endpoints.contains_key("reverse"));

        cfg.reset_endpoint(EndpointId::Reverse);
        assert!(cfg.endpoints.is_empty());
        assert_eq!(cfg.endpoint_url(EndpointId::Reverse), EndpointId::Reverse.default_url());
    }

    #[test]
    fn save_and_load_preserve_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.user_agent = Some("EarthCastTest/1.0".into());
        cfg.set_endpoint_url(EndpointId::Geocoding, "http://127.0.0.1:1/search".into());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.user_agent(), "EarthCastTest/1.0");
        assert_eq!(loaded.endpoint_url(EndpointId::Geocoding), "http://127.0.0.1:1/search");
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.endpoints.is_empty());
    }

    #[test]
    fn unknown_endpoint_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[endpoints.radar]\nurl = \"http://x\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Unknown endpoint"));
    }

    #[test]
    fn repairable_load_drops_unknown_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "user_agent = \"Mine/2.0\"\n\
             [endpoints.radar]\nurl = \"http://x\"\n\
             [endpoints.forecast]\nurl = \"http://127.0.0.1:1/forecast\"\n",
        )
        .unwrap();

        let cfg = Config::load_repairable_from(&path);
        assert_eq!(cfg.user_agent(), "Mine/2.0");
        assert_eq!(cfg.endpoint_url(EndpointId::Forecast), "http://127.0.0.1:1/forecast");
        assert_eq!(cfg.endpoints.len(), 1);

        cfg.save_to(&path).unwrap();
        assert!(Config::load_from(&path).is_ok());
    }

    #[test]
    fn repairable_load_survives_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "endpoints = [not toml").unwrap();

        assert!(Config::load_from(&path).is_err());
        let cfg = Config::load_repairable_from(&path);
        assert!(cfg.endpoints.is_empty());
        assert_eq!(cfg.user_agent(), DEFAULT_USER_AGENT);

        let absent = Config::load_repairable_from(&dir.path().join("absent.toml"));
        assert!(absent.endpoints.is_empty());
    }

    #[test]
    fn explicit_database_path_wins() {
        let cfg = Config {
            database_path: Some(PathBuf::from("/tmp/cities.db")),
            ..Config::default()
        };
        assert_eq!(cfg.database_path().unwrap(), PathBuf::from("/tmp/cities.db"));
    }
}
