//! Plain-text rendering of lookup results.

use std::fmt;

use chrono::{DateTime, Utc};
use weatherdash_core::{ApiError, FetchResult, WeatherReport};

/// Whole floats keep their `.0`: `5.0`, not `5`.
fn num(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 { format!("{v:.1}") } else { v.to_string() }
}

fn timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

pub fn outcome(result: &FetchResult) -> String {
    match result {
        Ok(report) => report_text(report),
        Err(err) => error_text(err),
    }
}

pub fn error_text(err: &ApiError) -> String {
    let status = err.status_code.map_or_else(|| "None".to_string(), |s| s.to_string());
    format!("API error: {} (status: {status})", err.message)
}

pub fn report_text(report: &WeatherReport) -> String {
    ReportView(report).to_string()
}

struct ReportView<'a>(&'a WeatherReport);

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let loc = &report.location;
        let cur = &report.current;

        writeln!(f, "{}, {}", loc.name, loc.country)?;
        if let Some(localtime) = &loc.localtime {
            writeln!(f, "Local time: {localtime}")?;
        }
        writeln!(f, "Temperature (°C): {}", num(cur.temp_c))?;
        writeln!(f, "Feels like: {}°C", num(cur.feelslike_c))?;
        writeln!(f, "Humidity: {} %", cur.humidity)?;
        writeln!(f, "Pressure: {} hPa", num(cur.pressure_mb))?;
        writeln!(f, "Wind: {} kph", num(cur.wind_kph))?;
        if let Some(ts) = report.last_updated() {
            writeln!(f, "Last updated: {}", timestamp(ts))?;
        }

        writeln!(f)?;
        writeln!(f, "Conditions")?;
        writeln!(f, "  {}", cur.condition.text)?;
        writeln!(f, "  Icon: {}", report.icon_url())?;

        writeln!(f)?;
        let rows = [
            ("temp_c", num(cur.temp_c)),
            ("feelslike_c", num(cur.feelslike_c)),
            ("humidity", cur.humidity.to_string()),
            ("pressure_mb", num(cur.pressure_mb)),
            ("wind_kph", num(cur.wind_kph)),
        ];
        writeln!(f, "{:<12} {:>8}", "metric", "value")?;
        writeln!(f, "{:<12} {:>8}", "-".repeat(12), "-".repeat(8))?;
        for (metric, value) in rows {
            writeln!(f, "{metric:<12} {value:>8}")?;
        }
        Ok(())
    }
}
