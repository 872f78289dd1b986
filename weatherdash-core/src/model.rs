use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single current-weather lookup.
pub type FetchResult = Result<WeatherReport, ApiError>;

/// City identifier passed verbatim to the weather API, e.g. `Stockholm` or `London,uk`.
///
/// The only check is that the string is not blank. The input is kept untouched
/// since it doubles as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Please enter a city name.")]
    Empty,
}

impl Query {
    pub fn new(city: impl Into<String>) -> Result<Self, QueryError> {
        let city = city.into();
        if city.trim().is_empty() {
            return Err(QueryError::Empty);
        }
        Ok(Self(city))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Query {
    type Error = QueryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Failed lookup: transport failure, timeout, non-2xx status or undecodable body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    /// HTTP status, when a response was received at all.
    pub status_code: Option<u16>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self { message: message.into(), status_code }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub region: Option<String>,
    /// Local wall-clock time at the location, as reported by the API (`2024-01-01 12:00`).
    #[serde(default)]
    pub localtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    /// Scheme-less icon reference, e.g. `//cdn.weatherapi.com/weather/64x64/day/116.png`.
    pub icon: String,
    #[serde(default)]
    pub code: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub humidity: u8,
    pub pressure_mb: f64,
    pub wind_kph: f64,
    pub condition: Condition,
    #[serde(default)]
    pub last_updated_epoch: Option<i64>,
}

/// Successful current-weather response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: Location,
    pub current: Current,
    /// Untouched response body, kept for the raw JSON dump.
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl WeatherReport {
    pub fn from_json(raw: serde_json::Value) -> serde_json::Result<Self> {
        let mut report = WeatherReport::deserialize(&raw)?;
        report.raw = raw;
        Ok(report)
    }

    /// Icon URL with the `http:` scheme the API leaves off.
    pub fn icon_url(&self) -> String {
        let icon = &self.current.condition.icon;
        if icon.starts_with("//") {
            format!("http:{icon}")
        } else {
            icon.clone()
        }
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.current.last_updated_epoch.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}
