use crate::config::Config;
use crate::forecast::openweather::{FetchError, OpenWeatherClient};
use crate::forecast::{cache_key, init_cache, WeatherBundle, WeatherCache};
use crate::prefs;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub type FetchResult = Result<Arc<WeatherBundle>, FetchError>;

/// Fetch orchestrator: owns the HTTP client and the TTL cache, so no state
/// lives at module level.
pub struct WeatherService {
    client: OpenWeatherClient,
    cache: WeatherCache,
    prefs_path: String,
}

impl WeatherService {
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let cache = init_cache(Duration::from_secs(config.cache_ttl_secs));
        let prefs_path = config.prefs_path.clone();
        let client = OpenWeatherClient::new(config)?;
        Ok(Self {
            client,
            cache,
            prefs_path,
        })
    }

    /// Return a fresh cache entry verbatim, or issue the two provider calls
    /// (current conditions, then forecast) and cache the combined bundle under
    /// the normalized location key. The searched city is persisted only after
    /// a successful network fetch; a cache hit leaves the preference untouched.
    pub async fn fetch(&self, location: &str) -> FetchResult {
        let key = cache_key(location);

        if let Some(bundle) = self.cache.get(&key).await {
            tracing::debug!(%key, "serving cached weather");
            return Ok(bundle);
        }

        tracing::info!(%location, "fetching weather from provider");
        let current = self.client.get_current(location).await?;
        let forecast = self.client.get_forecast(location).await?;

        let bundle = Arc::new(WeatherBundle {
            current,
            forecast,
            fetched_at: Utc::now(),
        });
        self.cache.insert(key, Arc::clone(&bundle)).await;
        prefs::save(&self.prefs_path, location);

        Ok(bundle)
    }
}

/// Run one fetch on a background task and post the outcome to the UI's
/// channel. If the receiver is gone the result is dropped; the task is never
/// cancelled mid-flight.
pub fn spawn_fetch(
    service: Arc<WeatherService>,
    location: String,
    tx: mpsc::Sender<FetchResult>,
) {
    tokio::spawn(async move {
        let outcome = service.fetch(&location).await;
        if tx.send(outcome).await.is_err() {
            tracing::debug!(%location, "fetch result dropped, receiver closed");
        }
    });
}
