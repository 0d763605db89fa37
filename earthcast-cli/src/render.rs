use chrono::{Local, Utc};
use earthcast_core::{
    ForecastBundle, icon_for, nearest_future_hour_point,
    dashboard::CitySummary,
    present::{celsius, clock_label, hour_label, hourly_is_daytime, wind_direction},
};

/// One-line city card, as shown on the home screen.
pub fn card(summary: &CitySummary) -> String {
    let current = format!("{}°C", summary.current_temp);
    format!(
        "{} {:<20} {:>7}   Max: {}  Min: {}   Updated: {}",
        summary.icon.symbol(),
        summary.name,
        current,
        celsius(summary.max_temp),
        celsius(summary.min_temp),
        Local::now().format("%H:%M"),
    )
}

/// Full forecast view for a single place.
pub fn info(name: &str, bundle: &ForecastBundle) -> String {
    let mut out = String::new();
    let icon = bundle.icon_at(Utc::now());

    out.push_str(&format!("{name}\n"));
    out.push_str(&format!(
        "{} {}  {}\n",
        icon.symbol(),
        celsius(bundle.current_temp),
        bundle.description
    ));
    out.push_str(&format!(
        "Max {} · Min {}\n",
        celsius(bundle.max_temp),
        celsius(bundle.min_temp)
    ));

    out.push_str("\nHourly\n");
    for point in &bundle.hourly {
        let day = hourly_is_daytime(point, &bundle.sunrise, &bundle.sunset);
        out.push_str(&format!(
            "  {} {}  {} {:>6}\n",
            point.date_label,
            hour_label(point),
            icon_for(point.weather_code, day).symbol(),
            celsius(point.temperature),
        ));
    }

    out.push_str("\nDaily\n");
    for day in &bundle.daily {
        out.push_str(&format!(
            "  {:<10} {}  {} {:>6} {:>6}\n",
            day.day_name,
            day.date_label,
            icon_for(day.weather_code, true).symbol(),
            celsius(day.max_temp),
            celsius(day.min_temp),
        ));
    }

    let now_hour = nearest_future_hour_point(bundle);
    let metric = |value: Option<f64>| value.unwrap_or(0.0);

    out.push('\n');
    out.push_str(&format!("Sunrise        {}\n", clock_label(&bundle.sunrise)));
    out.push_str(&format!("Sunset         {}\n", clock_label(&bundle.sunset)));
    out.push_str(&format!(
        "Precipitation  {} %\n",
        metric(now_hour.and_then(|p| p.precipitation_probability))
    ));
    match (bundle.wind_speed, bundle.wind_direction) {
        (Some(speed), Some(dir)) => {
            out.push_str(&format!("Wind           {speed} km/h {}\n", wind_direction(dir)))
        }
        (Some(speed), None) => out.push_str(&format!("Wind           {speed} km/h\n")),
        _ => out.push_str("Wind           --\n"),
    }
    out.push_str(&format!(
        "UV Index       {}\n",
        metric(now_hour.and_then(|p| p.uv_index))
    ));
    out.push_str(&format!(
        "Pressure       {} hPa\n",
        metric(now_hour.and_then(|p| p.pressure))
    ));

    out
}
