//! WMO weather-code lookups and day/night classification.
//!
//! Codes follow the Open-Meteo documentation:
//! <https://open-meteo.com/en/docs#weathervariables>

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::FetchError;

const LOCAL_MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";
const LOCAL_SECOND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Icon identifiers for rendering a weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherIcon {
    Sun,
    Night,
    Cloudy,
    NightOvercast,
    Foggy,
    Drizzle,
    Rain,
    RainShowers,
    FreezingRain,
    Snow,
    SnowGrains,
    SnowShowers,
    Thunder,
    Hail,
    Empty,
}

impl WeatherIcon {
    /// A terminal-friendly glyph for the icon.
    pub fn symbol(&self) -> &'static str {
        match self {
            WeatherIcon::Sun => "\u{2600}",
            WeatherIcon::Night => "\u{1F319}",
            WeatherIcon::Cloudy => "\u{26C5}",
            WeatherIcon::NightOvercast => "\u{2601}",
            WeatherIcon::Foggy => "\u{1F32B}",
            WeatherIcon::Drizzle | WeatherIcon::Rain | WeatherIcon::RainShowers => "\u{1F327}",
            WeatherIcon::FreezingRain => "\u{1F9CA}",
            WeatherIcon::Snow => "\u{2744}",
            WeatherIcon::SnowGrains | WeatherIcon::SnowShowers => "\u{1F328}",
            WeatherIcon::Thunder => "\u{26C8}",
            WeatherIcon::Hail => "\u{1F329}",
            WeatherIcon::Empty => "?",
        }
    }
}

/// Icon for a weather code. Only clear (0) and partly cloudy (1-3) have a
/// night variant; unknown codes map to [`WeatherIcon::Empty`].
pub fn icon_for(weather_code: i32, is_daytime: bool) -> WeatherIcon {
    match weather_code {
        0 if is_daytime => WeatherIcon::Sun,
        0 => WeatherIcon::Night,
        1..=3 if is_daytime => WeatherIcon::Cloudy,
        1..=3 => WeatherIcon::NightOvercast,
        45 | 48 => WeatherIcon::Foggy,
        51 | 53 | 55 => WeatherIcon::Drizzle,
        61 | 63 | 65 => WeatherIcon::Rain,
        66 | 67 => WeatherIcon::FreezingRain,
        71 | 73 | 75 => WeatherIcon::Snow,
        77 => WeatherIcon::SnowGrains,
        80..=82 => WeatherIcon::RainShowers,
        85 | 86 => WeatherIcon::SnowShowers,
        95 => WeatherIcon::Thunder,
        96 | 99 => WeatherIcon::Hail,
        _ => WeatherIcon::Empty,
    }
}

/// Human-readable description for a weather code.
pub fn describe(weather_code: i32) -> &'static str {
    match weather_code {
        0 => "Clear sky",
        1..=3 => "Partly cloudy",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 => "Snow",
        77 => "Snow grains",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}

/// Look up an IANA zone name. Unknown names resolve to UTC.
pub fn resolve_timezone(name: &str) -> Tz {
    match name.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            tracing::debug!("unknown timezone '{}', using UTC", name);
            Tz::UTC
        }
    }
}

/// Parse a provider-local timestamp such as `2024-01-01T07:00`.
pub fn parse_local(value: &str) -> Result<NaiveDateTime, FetchError> {
    NaiveDateTime::parse_from_str(value, LOCAL_MINUTE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, LOCAL_SECOND_FORMAT))
        .map_err(|e| FetchError::parse(value, e))
}

/// Wall-clock time in `tz` at the instant `now`.
pub fn local_now(tz: Tz, now: DateTime<Utc>) -> NaiveDateTime {
    now.with_timezone(&tz).naive_local()
}

/// Whether `now` falls strictly between sunrise and sunset in `timezone`.
///
/// Missing or unparsable stamps count as daytime.
pub fn is_daytime_at(
    sunrise: Option<&str>,
    sunset: Option<&str>,
    timezone: &str,
    now: DateTime<Utc>,
) -> bool {
    let (Some(sunrise), Some(sunset)) = (sunrise, sunset) else {
        return true;
    };

    match (parse_local(sunrise), parse_local(sunset)) {
        (Ok(rise), Ok(set)) => {
            let now = local_now(resolve_timezone(timezone), now);
            rise < now && now < set
        }
        _ => true,
    }
}

/// [`is_daytime_at`] evaluated against the system clock.
pub fn classify_day_or_night(sunrise: Option<&str>, sunset: Option<&str>, timezone: &str) -> bool {
    is_daytime_at(sunrise, sunset, timezone, Utc::now())
}
