use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    config::Settings,
    model::{ApiError, FetchResult, Query, WeatherReport},
};

use super::WeatherProvider;

/// WeatherAPI.com current-conditions client.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    endpoint: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to build HTTP client for WeatherAPI.com")?;

        Ok(Self {
            api_key: settings.api_key.clone(),
            endpoint: settings.endpoint.clone(),
            http,
        })
    }

    async fn fetch_current(&self, query: &Query) -> FetchResult {
        let res = self
            .http
            .get(&self.endpoint)
            .query(&[("key", self.api_key.as_str()), ("q", query.as_str()), ("aqi", "no")])
            .send()
            .await
            .map_err(transport_error)?;

        let status = res.status();
        let body = res.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let raw: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            ApiError::new(
                format!("Failed to parse WeatherAPI current JSON: {e}"),
                Some(status.as_u16()),
            )
        })?;

        WeatherReport::from_json(raw).map_err(|e| {
            ApiError::new(
                format!("Unexpected WeatherAPI current response shape: {e}"),
                Some(status.as_u16()),
            )
        })
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current(&self, query: &Query) -> FetchResult {
        tracing::debug!(city = %query, "requesting current weather");

        let result = self.fetch_current(query).await;
        if let Err(err) = &result {
            tracing::warn!(city = %query, status = ?err.status_code, "weather lookup failed: {err}");
        }
        result
    }
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    error: WaErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WaErrorDetail {
    message: String,
}

/// The request URL carries the credential, so it is stripped from the message.
fn transport_error(err: reqwest::Error) -> ApiError {
    let status_code = err.status().map(|s| s.as_u16());
    let err = err.without_url();

    let message = if err.is_timeout() {
        format!("WeatherAPI request timed out: {err}")
    } else {
        format!("Failed to send request to WeatherAPI.com: {err}")
    };

    ApiError::new(message, status_code)
}

fn status_error(status: StatusCode, body: &str) -> ApiError {
    let detail = serde_json::from_str::<WaErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| truncate_body(body));

    ApiError::new(
        format!("WeatherAPI current request failed with status {status}: {detail}"),
        Some(status.as_u16()),
    )
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
