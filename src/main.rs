use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod forecast;
mod prefs;
mod service;
mod ui;

use config::{Config, DEFAULT_CITY};
use service::WeatherService;

#[derive(Parser, Debug)]
#[command(name = "weatherscope")]
#[command(about = "Terminal weather dashboard backed by OpenWeatherMap")]
struct Cli {
    /// City to load on startup; defaults to the last searched city.
    city: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Logs go to stderr so they cannot corrupt the alternate screen.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weatherscope=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let initial_city = cli
        .city
        .unwrap_or_else(|| prefs::load(&config.prefs_path, DEFAULT_CITY));

    let service = Arc::new(WeatherService::new(config)?);
    ui::run(service, initial_city).await
}
