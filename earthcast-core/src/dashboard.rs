//! Forecasts for the whole saved-city list.
//!
//! Each city gets its own task. Results are delivered as tasks complete, so
//! callers must not rely on the input order.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::{
    conditions::WeatherIcon,
    model::{City, ForecastBundle},
    provider::ForecastSource,
};

#[derive(Debug, Clone)]
pub struct CityForecast {
    pub city: City,
    pub forecast: ForecastBundle,
}

/// What a city card shows.
#[derive(Debug, Clone, PartialEq)]
pub struct CitySummary {
    pub name: String,
    pub current_temp: f64,
    pub max_temp: f64,
    pub min_temp: f64,
    pub icon: WeatherIcon,
}

impl CityForecast {
    pub fn summary_at(&self, now: DateTime<Utc>) -> CitySummary {
        CitySummary {
            name: self.city.name.clone(),
            current_temp: self.forecast.current_temp,
            max_temp: self.forecast.max_temp,
            min_temp: self.forecast.min_temp,
            icon: self.forecast.icon_at(now),
        }
    }

    pub fn summary(&self) -> CitySummary {
        self.summary_at(Utc::now())
    }
}

/// Fetch every city concurrently and hand each successful result to
/// `on_ready` as soon as it arrives. Cities whose fetch fails are skipped.
pub async fn fetch_each<F>(source: Arc<dyn ForecastSource>, cities: Vec<City>, mut on_ready: F)
where
    F: FnMut(CityForecast),
{
    let mut tasks = JoinSet::new();

    for city in cities {
        let source = Arc::clone(&source);
        tasks.spawn(async move {
            let forecast = source.forecast(city.latitude, city.longitude).await;
            (city, forecast)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((city, Some(forecast))) => on_ready(CityForecast { city, forecast }),
            Ok((city, None)) => tracing::warn!("No weather data for {}", city.name),
            Err(e) => tracing::error!("Forecast task failed: {}", e),
        }
    }
}

/// [`fetch_each`], collected in completion order.
pub async fn fetch_all(source: Arc<dyn ForecastSource>, cities: Vec<City>) -> Vec<CityForecast> {
    let mut ready = Vec::new();
    fetch_each(source, cities, |cf| ready.push(cf)).await;
    ready
}
