//! SQLite-backed list of saved cities.
//!
//! Every operation opens its own connection, runs a single statement and
//! drops the connection again; nothing is held between calls.

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};

use crate::model::City;

/// Storage collaborator used by the geocoder to persist lookups.
pub trait CityRepository: Send + Sync {
    /// Insert a city unless one with the same name exists. Returns `true` if a row was added.
    fn insert_or_ignore(&self, city: &City) -> Result<bool>;
}

#[derive(Debug, Clone)]
pub struct CityStore {
    path: PathBuf,
}

impl CityStore {
    /// Open (or create) the database at `path` and make sure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let store = Self { path };
        store.init_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.path)
            .with_context(|| format!("Failed to open city database: {}", self.path.display()))
    }

    fn init_schema(&self) -> Result<()> {
        self.connect()?
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS cities (
                    city_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    city_name TEXT UNIQUE,
                    city_lat REAL,
                    city_long REAL
                );
                "#,
            )
            .context("Failed to create cities table")?;
        Ok(())
    }

    /// Remove a city by name. Returns `true` if a row was deleted.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let changed = self
            .connect()?
            .execute("DELETE FROM cities WHERE city_name = ?1", params![name])
            .with_context(|| format!("Failed to delete city '{name}'"))?;
        Ok(changed > 0)
    }

    /// All saved cities in insertion order. Stored rows carry no region.
    pub fn list(&self) -> Result<Vec<City>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT city_name, city_lat, city_long FROM cities ORDER BY city_id")?;

        let cities = stmt
            .query_map([], |row| {
                Ok(City::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read saved cities")?;

        Ok(cities)
    }
}

impl CityRepository for CityStore {
    fn insert_or_ignore(&self, city: &City) -> Result<bool> {
        let changed = self
            .connect()?
            .execute(
                "INSERT OR IGNORE INTO cities (city_name, city_lat, city_long) VALUES (?1, ?2, ?3)",
                params![city.name, city.latitude, city.longitude],
            )
            .with_context(|| format!("Failed to insert city '{}'", city.name))?;
        Ok(changed > 0)
    }
}
