//! Core library for the `earthcast` CLI.
//!
//! This crate defines:
//! - Geocoding (city search, suggestions, reverse lookup)
//! - Forecast fetching and normalization for Open-Meteo
//! - Weather-code icons/descriptions and day/night classification
//! - Saved-city storage and persisted application state
//!
//! It is used by `earthcast-cli`, but can also be reused by other front ends.

pub mod conditions;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod present;
pub mod provider;
pub mod state;
pub mod store;

pub use conditions::{WeatherIcon, classify_day_or_night, describe, icon_for};
pub use config::Config;
pub use error::FetchError;
pub use model::{City, DailyPoint, ForecastBundle, HourlyPoint};
pub use provider::{
    EndpointId, ForecastSource,
    geocoding::GeocodingFetcher,
    openmeteo::{WeatherFetcher, nearest_future_hour_point},
};
pub use state::{AppState, CurrentCity, StatePersistence, TomlStateFile};
pub use store::{CityRepository, CityStore};
