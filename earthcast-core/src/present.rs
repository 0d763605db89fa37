//! Small formatting helpers for rendering a forecast.

use chrono::Timelike;

use crate::{conditions::parse_local, model::HourlyPoint};

const FALLBACK_SUNRISE_HOUR: u32 = 6;
const FALLBACK_SUNSET_HOUR: u32 = 18;

/// 8-point compass label for a bearing in degrees.
pub fn wind_direction(degrees: f64) -> &'static str {
    match (degrees % 360.0) as i32 {
        0..=22 => "N",
        23..=67 => "NE",
        68..=112 => "E",
        113..=157 => "SE",
        158..=202 => "S",
        203..=247 => "SW",
        248..=292 => "W",
        293..=337 => "NW",
        338..=359 => "N",
        _ => "--",
    }
}

/// "HH:mm" for a provider-local stamp, "--:--" if it can't be read.
pub fn clock_label(stamp: &str) -> String {
    parse_local(stamp)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|_| "--:--".to_string())
}

/// "HH:00" for an hourly point.
pub fn hour_label(point: &HourlyPoint) -> String {
    let hour: u32 = point.hour_label.parse().unwrap_or(0);
    format!("{hour:02}:00")
}

fn hour_of(stamp: &str) -> Option<u32> {
    parse_local(stamp).ok().map(|t| t.hour())
}

/// Day/night for an hourly card: the point's hour within `[sunrise hour, sunset hour)`
/// of today. Unreadable stamps fall back to 06 and 18.
pub fn hourly_is_daytime(point: &HourlyPoint, sunrise: &str, sunset: &str) -> bool {
    let rise = hour_of(sunrise).unwrap_or(FALLBACK_SUNRISE_HOUR);
    let set = hour_of(sunset).unwrap_or(FALLBACK_SUNSET_HOUR);
    (rise..set).contains(&point.time.hour())
}

/// Whole degrees, truncated toward zero, with the unit.
pub fn celsius(value: f64) -> String {
    format!("{}°C", value as i64)
}
