use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conditions::{WeatherIcon, icon_for, is_daytime_at};

/// A named place with coordinates. `region` is empty when unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            region: String::new(),
            latitude,
            longitude,
        }
    }

    /// "Name, Region", or just the name when the region is empty.
    pub fn display_name(&self) -> String {
        if self.region.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.region)
        }
    }
}

/// One retained hour of the forecast, already localized to the resolved zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    /// Hour of day, "HH".
    pub hour_label: String,
    /// "dd/MM".
    pub date_label: String,
    /// Local wall-clock time the labels were formatted from.
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub weather_code: i32,
    pub precipitation_probability: Option<f64>,
    pub uv_index: Option<f64>,
    pub pressure: Option<f64>,
    pub visibility: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    /// English weekday name, e.g. "Monday".
    pub day_name: String,
    pub max_temp: f64,
    pub min_temp: f64,
    pub weather_code: i32,
    /// Local ISO stamp as sent by the provider, e.g. "2024-01-01T07:00".
    pub sunrise: String,
    pub sunset: String,
    /// "dd/MM".
    pub date_label: String,
}

/// Normalized result of a single forecast fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub current_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub weather_code: i32,
    pub sunrise: String,
    pub sunset: String,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub description: String,
    pub timezone_name: String,
    pub hourly: Vec<HourlyPoint>,
    pub daily: Vec<DailyPoint>,
}

impl ForecastBundle {
    /// Whether `now` falls between today's sunrise and sunset in the bundle's zone.
    pub fn is_daytime_at(&self, now: DateTime<Utc>) -> bool {
        is_daytime_at(
            Some(self.sunrise.as_str()),
            Some(self.sunset.as_str()),
            &self.timezone_name,
            now,
        )
    }

    /// Icon for the live weather code at `now`.
    pub fn icon_at(&self, now: DateTime<Utc>) -> WeatherIcon {
        icon_for(self.weather_code, self.is_daytime_at(now))
    }
}
