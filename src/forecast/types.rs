use serde::{Deserialize, Serialize};
use std::fmt;

/// Current conditions payload from `/data/2.5/weather`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentResponse {
    pub name: String,
    pub coord: Coord,
    pub main: CurrentMain,
    pub weather: Vec<WeatherDescriptor>,
    pub wind: Wind,
    pub sys: CurrentSys,
    pub timezone: i32,
    /// UV index; only present on providers that include it.
    pub uvi: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentMain {
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentSys {
    pub country: Option<String>,
    pub sunrise: i64,
    pub sunset: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    pub deg: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherDescriptor {
    pub id: i32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// 5-day/3-hour forecast payload from `/data/2.5/forecast`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub list: Vec<ForecastItem>,
    pub city: ForecastCity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    pub main: ForecastMain,
    pub weather: Vec<WeatherDescriptor>,
    pub pop: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastCity {
    pub name: String,
    pub coord: Coord,
    pub country: Option<String>,
    pub timezone: i32,
    pub sunrise: i64,
    pub sunset: i64,
}

/// Weather condition category as reported in the payload's `weather[0].main`
/// field. Unknown categories collapse into `Default`, which doubles as the
/// sentinel for empty aggregation buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Smoke,
    Haze,
    Dust,
    Fog,
    Sand,
    Ash,
    Squall,
    Tornado,
    Default,
}

impl Condition {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Clear" => Condition::Clear,
            "Clouds" => Condition::Clouds,
            "Rain" => Condition::Rain,
            "Drizzle" => Condition::Drizzle,
            "Thunderstorm" => Condition::Thunderstorm,
            "Snow" => Condition::Snow,
            "Mist" => Condition::Mist,
            "Smoke" => Condition::Smoke,
            "Haze" => Condition::Haze,
            "Dust" => Condition::Dust,
            "Fog" => Condition::Fog,
            "Sand" => Condition::Sand,
            "Ash" => Condition::Ash,
            "Squall" => Condition::Squall,
            "Tornado" => Condition::Tornado,
            _ => Condition::Default,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Condition::Clear => "☀",
            Condition::Clouds => "☁",
            Condition::Rain => "🌧",
            Condition::Drizzle => "🌦",
            Condition::Thunderstorm => "⛈",
            Condition::Snow => "❄",
            Condition::Mist | Condition::Smoke => "🌫",
            Condition::Haze | Condition::Fog => "🌁",
            Condition::Dust | Condition::Tornado => "🌪",
            Condition::Sand => "🏜",
            Condition::Ash => "🌋",
            Condition::Squall => "🌬",
            Condition::Default => "?",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Condition::Clear => "Clear",
            Condition::Clouds => "Clouds",
            Condition::Rain => "Rain",
            Condition::Drizzle => "Drizzle",
            Condition::Thunderstorm => "Thunderstorm",
            Condition::Snow => "Snow",
            Condition::Mist => "Mist",
            Condition::Smoke => "Smoke",
            Condition::Haze => "Haze",
            Condition::Dust => "Dust",
            Condition::Fog => "Fog",
            Condition::Sand => "Sand",
            Condition::Ash => "Ash",
            Condition::Squall => "Squall",
            Condition::Tornado => "Tornado",
            Condition::Default => "Unknown",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One forecast entry reduced to the fields the bucketing logic consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// UTC epoch seconds.
    pub dt: i64,
    /// Temperature in degrees Celsius.
    pub temp: f64,
    pub condition: Condition,
    /// Probability of precipitation, 0..=1.
    pub pop: Option<f64>,
}

impl RawSample {
    pub fn from_item(item: &ForecastItem) -> Self {
        let condition = item
            .weather
            .first()
            .map(|w| Condition::from_name(&w.main))
            .unwrap_or(Condition::Default);

        RawSample {
            dt: item.dt,
            temp: item.main.temp,
            condition,
            pop: item.pop,
        }
    }
}
