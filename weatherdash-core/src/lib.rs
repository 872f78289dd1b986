//! Core library for the `weatherdash` terminal dashboard.
//!
//! This crate defines:
//! - Settings resolution (environment, config file, defaults)
//! - The WeatherAPI.com current-weather fetcher behind the [`WeatherProvider`] trait
//! - A TTL cache over any provider ([`CachedFetcher`])
//! - Shared domain models (queries, reports, errors)
//!
//! It is used by `weatherdash-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod model;
pub mod provider;

pub use cache::CachedFetcher;
pub use config::{Config, ConfigError, Settings};
pub use model::{ApiError, FetchResult, Query, QueryError, WeatherReport};
pub use provider::{WeatherApiProvider, WeatherProvider};
