use crate::model::{FetchResult, Query};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod weatherapi;

pub use weatherapi::WeatherApiProvider;

/// Source of current weather conditions.
///
/// Implementations never fail past this boundary: transport problems and API
/// errors come back as the `Err` side of [`FetchResult`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, query: &Query) -> FetchResult;
}

#[async_trait]
impl<P: WeatherProvider + ?Sized> WeatherProvider for Arc<P> {
    async fn current(&self, query: &Query) -> FetchResult {
        (**self).current(query).await
    }
}

