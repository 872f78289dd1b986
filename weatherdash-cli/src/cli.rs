use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{CustomType, InquireError, Password, PasswordDisplayMode, Text};
use weatherdash_core::{
    CachedFetcher, Config, Query, QueryError, Settings, WeatherApiProvider, WeatherProvider,
    config::DEFAULT_CACHE_TTL,
};

use crate::render;

const DEFAULT_CITY: &str = "Stockholm";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Current weather dashboard (WeatherAPI.com)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and cache TTL in the config file.
    Configure,

    /// Show current weather for a city once.
    Show {
        /// City name, optionally with a country code, e.g. "London,uk".
        city: String,

        /// Also print the raw JSON response.
        #[arg(long)]
        raw: bool,
    },

    /// Interactive dashboard; every submitted city is a refresh.
    Dashboard {
        /// City to pre-fill in the first prompt.
        #[arg(long, default_value = DEFAULT_CITY)]
        city: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, raw } => show(city, raw).await,
            Command::Dashboard { city } => dashboard(city).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("WeatherAPI.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_validator(inquire::required!("An API key is required"))
        .prompt()
        .context("Failed to read API key")?;

    let current_ttl = cfg.cache_ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL.as_secs());
    let ttl = CustomType::<u64>::new("Cache TTL in seconds:")
        .with_default(current_ttl)
        .with_error_message("Please enter a whole number of seconds")
        .prompt()
        .context("Failed to read cache TTL")?;

    cfg.api_key = Some(api_key.trim().to_string());
    cfg.cache_ttl_seconds = Some(ttl);
    let path = cfg.save()?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn show(city: String, raw: bool) -> Result<()> {
    let Ok(query) = Query::new(city) else {
        println!("{}", QueryError::Empty);
        return Ok(());
    };

    let settings = Settings::load()?;
    let provider = WeatherApiProvider::new(&settings)?;

    let result = provider.current(&query).await;
    println!("{}", render::outcome(&result));

    if let (true, Ok(report)) = (raw, &result) {
        let json = serde_json::to_string_pretty(&report.raw)
            .context("Failed to format raw JSON response")?;
        println!("\n{json}");
    }

    Ok(())
}

async fn dashboard(initial_city: String) -> Result<()> {
    let settings = Settings::load()?;
    let provider = WeatherApiProvider::new(&settings)?;
    let mut cache = CachedFetcher::from_settings(provider, &settings);
    tracing::info!(ttl_secs = cache.ttl().as_secs(), "dashboard started");

    let mut last_city = initial_city;
    loop {
        let input = match Text::new("City (name,country optional):")
            .with_default(&last_city)
            .with_help_message("Enter to refresh, Esc to quit")
            .prompt()
        {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city"),
        };

        let query = match Query::new(input.as_str()) {
            Ok(query) => query,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        let cached_age = cache.age_of(&query);
        let result = cache.fetch(&query).await;

        println!();
        if let Some(age) = cached_age {
            println!("(cached {}s ago, refreshes after {}s)", age.as_secs(), cache.ttl().as_secs());
        }
        println!("{}", render::outcome(&result));

        last_city = input;
    }

    Ok(())
}
