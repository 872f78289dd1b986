use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::time::Instant;

use crate::{
    config::Settings,
    model::{FetchResult, Query},
    provider::WeatherProvider,
};

#[derive(Debug)]
struct CacheEntry {
    result: Arc<FetchResult>,
    stored_at: Instant,
}

impl CacheEntry {
    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stored_at)
    }
}

/// Memoizes provider lookups per exact city string for a fixed TTL.
///
/// Failed lookups are cached like successful ones, so a failing city is not
/// retried until its entry expires. There is no coalescing of concurrent
/// misses: the cache is owned and needs `&mut self`.
#[derive(Debug)]
pub struct CachedFetcher<P> {
    provider: P,
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl<P: WeatherProvider> CachedFetcher<P> {
    pub fn new(provider: P, ttl: Duration) -> Self {
        Self { provider, ttl, entries: HashMap::new() }
    }

    pub fn from_settings(provider: P, settings: &Settings) -> Self {
        Self::new(provider, settings.cache_ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Age of the live entry for `query`; `None` if absent or expired.
    pub fn age_of(&self, query: &Query) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .get(query.as_str())
            .map(|entry| entry.age(now))
            .filter(|age| *age < self.ttl)
    }

    pub async fn fetch(&mut self, query: &Query) -> Arc<FetchResult> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(query.as_str()) {
            let age = entry.age(now);
            if age < self.ttl {
                tracing::debug!(city = %query, ?age, "cache hit");
                return Arc::clone(&entry.result);
            }
            tracing::debug!(city = %query, "cache entry expired");
        }

        // Misses also drop stale entries for other cities.
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.age(now) < ttl);

        let result = Arc::new(self.provider.current(query).await);
        self.entries.insert(
            query.as_str().to_owned(),
            CacheEntry { result: Arc::clone(&result), stored_at: Instant::now() },
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiError, WeatherReport};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingProvider {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherProvider for CountingProvider {
        async fn current(&self, query: &Query) -> FetchResult {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ApiError::new("connection refused", None));
            }
            let raw = serde_json::json!({
                "location": { "name": query.as_str(), "country": "Nowhere" },
                "current": {
                    "temp_c": n as f64,
                    "feelslike_c": 0.0,
                    "humidity": 50,
                    "pressure_mb": 1000.0,
                    "wind_kph": 0.0,
                    "condition": { "text": "Clear", "icon": "//icon.png" }
                }
            });
            Ok(WeatherReport::from_json(raw).expect("fixture parses"))
        }
    }

    fn cached(ttl_secs: u64) -> (Arc<CountingProvider>, CachedFetcher<Arc<CountingProvider>>) {
        let provider = Arc::new(CountingProvider::default());
        let cache = CachedFetcher::new(Arc::clone(&provider), Duration::from_secs(ttl_secs));
        (provider, cache)
    }

    #[tokio::test(start_paused = true)]
    async fn second_lookup_within_ttl_reuses_result() {
        let (provider, mut cache) = cached(30);
        let london = Query::new("London,uk").unwrap();

        let first = cache.fetch(&london).await;
        tokio::time::advance(Duration::from_secs(5)).await;
        let second = cache.fetch(&london).await;

        assert_eq!(provider.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_after_ttl_refetches() {
        let (provider, mut cache) = cached(30);
        let city = Query::new("Stockholm").unwrap();

        let first = cache.fetch(&city).await;
        tokio::time::advance(Duration::from_secs(31)).await;
        let second = cache.fetch(&city).await;

        assert_eq!(provider.calls(), 2);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!((*second).as_ref().unwrap().current.temp_c, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_is_stale_exactly_at_ttl() {
        let (provider, mut cache) = cached(30);
        let city = Query::new("Oslo").unwrap();

        cache.fetch(&city).await;
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(cache.age_of(&city), None);
        cache.fetch(&city).await;
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn key_is_the_exact_city_string() {
        let (provider, mut cache) = cached(30);

        cache.fetch(&Query::new("london").unwrap()).await;
        cache.fetch(&Query::new("London").unwrap()).await;
        cache.fetch(&Query::new("London ").unwrap()).await;

        assert_eq!(provider.calls(), 3);
        assert_eq!(cache.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn errors_are_cached_for_the_ttl() {
        let provider = Arc::new(CountingProvider { fail: true, ..Default::default() });
        let mut cache = CachedFetcher::new(Arc::clone(&provider), Duration::from_secs(30));
        let city = Query::new("Atlantis").unwrap();

        let first = cache.fetch(&city).await;
        tokio::time::advance(Duration::from_secs(10)).await;
        let second = cache.fetch(&city).await;

        assert_eq!(provider.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        let err = (*second).as_ref().unwrap_err();
        assert_eq!(err.status_code, None);
    }

    #[tokio::test(start_paused = true)]
    async fn age_of_reports_live_entries() {
        let (_provider, mut cache) = cached(30);
        let city = Query::new("Bergen").unwrap();

        assert!(cache.is_empty());
        assert_eq!(cache.age_of(&city), None);

        cache.fetch(&city).await;
        tokio::time::advance(Duration::from_secs(12)).await;

        assert_eq!(cache.age_of(&city), Some(Duration::from_secs(12)));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_ttl_never_serves_from_cache() {
        let (provider, mut cache) = cached(0);
        let city = Query::new("Paris").unwrap();

        cache.fetch(&city).await;
        cache.fetch(&city).await;

        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn miss_evicts_expired_entries_for_other_cities() {
        let (provider, mut cache) = cached(30);
        let oslo = Query::new("Oslo").unwrap();
        let bergen = Query::new("Bergen").unwrap();
        let paris = Query::new("Paris").unwrap();

        cache.fetch(&oslo).await;
        tokio::time::advance(Duration::from_secs(20)).await;
        cache.fetch(&bergen).await;
        assert_eq!(cache.len(), 2);

        tokio::time::advance(Duration::from_secs(15)).await;
        cache.fetch(&paris).await;

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.age_of(&oslo), None);
        assert_eq!(cache.age_of(&bergen), Some(Duration::from_secs(15)));
        assert_eq!(provider.calls(), 3);
    }

    #[test]
    fn ttl_comes_from_settings() {
        let settings = Settings { cache_ttl: Duration::from_secs(90), ..Settings::new("KEY") };
        let cache = CachedFetcher::from_settings(CountingProvider::default(), &settings);
        assert_eq!(cache.ttl(), Duration::from_secs(90));
    }
}
