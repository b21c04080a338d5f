pub mod daily;
pub mod hourly;
pub mod openweather;
pub mod suggest;
pub mod types;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use types::{CurrentResponse, ForecastResponse, RawSample};

/// Combined result of one fetch: both endpoint payloads plus the completion
/// timestamp. Shared immutably once built.
#[derive(Clone, Debug)]
pub struct WeatherBundle {
    pub current: CurrentResponse,
    pub forecast: ForecastResponse,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherBundle {
    /// Timezone offset in seconds reported by the forecast endpoint.
    pub fn tz_offset_secs(&self) -> i32 {
        self.forecast.city.timezone
    }

    pub fn samples(&self) -> Vec<RawSample> {
        self.forecast.list.iter().map(RawSample::from_item).collect()
    }
}

pub type WeatherCache = Cache<String, Arc<WeatherBundle>>;

/// Locations are cached case-insensitively.
pub fn cache_key(location: &str) -> String {
    location.trim().to_lowercase()
}

pub fn init_cache(ttl: Duration) -> WeatherCache {
    Cache::builder().max_capacity(1000).time_to_live(ttl).build()
}
