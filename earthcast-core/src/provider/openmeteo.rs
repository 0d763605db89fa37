use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    conditions::{describe, local_now, parse_local, resolve_timezone},
    config::Config,
    error::FetchError,
    model::{DailyPoint, ForecastBundle, HourlyPoint},
    provider::{EndpointId, ForecastSource, get_json},
};

/// Upper bound on retained future hours.
pub const MAX_HOURLY_POINTS: usize = 48;

const HOURLY_FIELDS: &str = "temperature_2m,weathercode,windspeed_10m,winddirection_10m,\
pressure_msl,uv_index,visibility,precipitation_probability";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,weathercode,sunrise,sunset,\
uv_index_max,precipitation_sum,pressure_msl_mean";

const SERVICE: &str = "forecast";

/// Client for the Open-Meteo forecast endpoint.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    http: Client,
    forecast_url: String,
}

impl WeatherFetcher {
    pub fn new(forecast_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            forecast_url: forecast_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.endpoint_url(EndpointId::Forecast))
    }

    pub async fn try_fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastBundle, FetchError> {
        let request = self.http.get(&self.forecast_url).query(&[
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current_weather", "true".to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
        ]);

        let response: ForecastResponse = get_json(request, SERVICE).await?;
        normalize(response, Utc::now())
    }

    /// Fetch and normalize the forecast; `None` on any failure.
    pub async fn fetch_forecast(&self, latitude: f64, longitude: f64) -> Option<ForecastBundle> {
        match self.try_fetch_forecast(latitude, longitude).await {
            Ok(bundle) => Some(bundle),
            Err(e) => {
                tracing::warn!("Error fetching weather for ({}, {}): {}", latitude, longitude, e);
                None
            }
        }
    }
}

#[async_trait]
impl ForecastSource for WeatherFetcher {
    async fn forecast(&self, latitude: f64, longitude: f64) -> Option<ForecastBundle> {
        self.fetch_forecast(latitude, longitude).await
    }
}

/// Raw Open-Meteo forecast payload.
#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    timezone: Option<String>,
    current_weather: OmCurrent,
    hourly: OmHourly,
    daily: OmDaily,
}

#[cfg(test)]
impl ForecastResponse {
    fn from_json(body: &str) -> Result<Self, FetchError> {
        serde_json::from_str(body).map_err(|e| FetchError::malformed(SERVICE, e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature: f64,
    weathercode: i32,
    windspeed: Option<f64>,
    winddirection: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
    weathercode: Vec<i32>,
    precipitation_probability: Option<Vec<Option<f64>>>,
    uv_index: Option<Vec<Option<f64>>>,
    visibility: Option<Vec<Option<f64>>>,
    pressure_msl: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<String>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    weathercode: Vec<i32>,
    sunrise: Vec<String>,
    sunset: Vec<String>,
}

/// Turn a raw response into display-ready values, using `now` as the clock
/// for dropping past hours.
pub(crate) fn normalize(
    response: ForecastResponse,
    now: DateTime<Utc>,
) -> Result<ForecastBundle, FetchError> {
    let timezone_name = response.timezone.unwrap_or_else(|| "UTC".to_string());
    let now = local_now(resolve_timezone(&timezone_name), now);

    let hourly = collect_hourly(&response.hourly, now)?;
    let daily = collect_daily(&response.daily)?;

    let today = daily
        .first()
        .ok_or_else(|| FetchError::malformed(SERVICE, "daily series is empty"))?;

    let current = response.current_weather;
    Ok(ForecastBundle {
        current_temp: current.temperature,
        min_temp: today.min_temp,
        max_temp: today.max_temp,
        weather_code: current.weathercode,
        sunrise: today.sunrise.clone(),
        sunset: today.sunset.clone(),
        wind_speed: current.windspeed,
        wind_direction: current.winddirection,
        description: describe(current.weathercode).to_string(),
        timezone_name,
        hourly,
        daily,
    })
}

fn collect_hourly(hourly: &OmHourly, now: NaiveDateTime) -> Result<Vec<HourlyPoint>, FetchError> {
    let mut points = Vec::new();

    for (i, &temperature) in hourly.temperature_2m.iter().enumerate() {
        let stamp = required(&hourly.time, i, "hourly.time")?;
        let time = parse_local(stamp)?;
        if time < now {
            continue;
        }

        points.push(HourlyPoint {
            hour_label: time.format("%H").to_string(),
            date_label: time.format("%d/%m").to_string(),
            time,
            temperature,
            weather_code: *required(&hourly.weathercode, i, "hourly.weathercode")?,
            precipitation_probability: optional(&hourly.precipitation_probability, i),
            uv_index: optional(&hourly.uv_index, i),
            pressure: optional(&hourly.pressure_msl, i),
            visibility: optional(&hourly.visibility, i),
        });

        if points.len() >= MAX_HOURLY_POINTS {
            break;
        }
    }

    Ok(points)
}

fn collect_daily(daily: &OmDaily) -> Result<Vec<DailyPoint>, FetchError> {
    daily
        .temperature_2m_max
        .iter()
        .enumerate()
        .map(|(i, &max_temp)| {
            let stamp = required(&daily.time, i, "daily.time")?;
            let date = NaiveDate::parse_from_str(stamp, "%Y-%m-%d")
                .map_err(|e| FetchError::parse(stamp, e))?;

            Ok(DailyPoint {
                day_name: date.format("%A").to_string(),
                max_temp,
                min_temp: *required(&daily.temperature_2m_min, i, "daily.temperature_2m_min")?,
                weather_code: *required(&daily.weathercode, i, "daily.weathercode")?,
                sunrise: required(&daily.sunrise, i, "daily.sunrise")?.clone(),
                sunset: required(&daily.sunset, i, "daily.sunset")?.clone(),
                date_label: date.format("%d/%m").to_string(),
            })
        })
        .collect()
}

fn required<'a, T>(series: &'a [T], index: usize, name: &str) -> Result<&'a T, FetchError> {
    series.get(index).ok_or_else(|| {
        FetchError::malformed(
            SERVICE,
            format!("{name} has {} entries, expected at least {}", series.len(), index + 1),
        )
    })
}

fn optional(series: &Option<Vec<Option<f64>>>, index: usize) -> Option<f64> {
    series.as_ref().and_then(|s| s.get(index).copied().flatten())
}

/// The retained hour with the earliest timestamp; ties go to the first in
/// source order.
///
/// Stands in for "current" precipitation, UV and pressure, which the live
/// weather object does not carry.
pub fn nearest_future_hour_point(bundle: &ForecastBundle) -> Option<&HourlyPoint> {
    bundle.hourly.iter().min_by_key(|p| p.time)
}
