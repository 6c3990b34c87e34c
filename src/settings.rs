use chrono_tz::Tz;
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

use crate::error::BookingError;
use crate::validation::resolve_timezone;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub enable_swagger: bool,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// IANA zone used when a request does not name one.
    pub default_timezone: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // APP_DATABASE_URL, APP_DEFAULT_TIMEZONE, ...
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("debug", false)?
            .set_default("enable_swagger", true)?
            .set_default("port", 8080)?
            .set_default("database_url", "sqlite://data/fitness_studio.db")?
            .set_default("max_connections", 5)?
            .set_default("default_timezone", "Asia/Kolkata")?
            .build()?;

        config.try_deserialize()
    }

    pub fn default_tz(&self) -> Result<Tz, BookingError> {
        resolve_timezone(Some(&self.default_timezone), Tz::UTC)
    }
}
