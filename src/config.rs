//! Runtime configuration read from the environment.
//!
//! `.env` files are honoured through `dotenvy`; every value except the
//! database URL has a default matching production.

use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::i18n::Locale;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    /// TTL applied when a cache write does not name one
    pub cache_default_ttl: Duration,
    pub locations_ttl: Duration,
    pub routes_ttl: Duration,
    /// WhatsApp number without the leading `+`
    pub whatsapp_number: String,
    pub app_name: String,
    pub default_locale: Locale,
    pub trip_max_passengers: u32,
    pub circuit_max_passengers: u32,
    /// Price of one room for one night on a circuit
    pub nightly_rate: Decimal,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            cache_default_ttl: Duration::from_secs(5 * 60),
            locations_ttl: Duration::from_secs(30 * 60),
            routes_ttl: Duration::from_secs(10 * 60),
            whatsapp_number: "5352375007".to_string(),
            app_name: "Kubaxi".to_string(),
            default_locale: Locale::Es,
            trip_max_passengers: 8,
            circuit_max_passengers: 8,
            nightly_rate: Decimal::from(30),
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment (and `.env` if present)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let secs = |key: &str, default: Duration| -> Result<Duration> {
            parse_or(&lookup, key, default.as_secs()).map(Duration::from_secs)
        };

        let default_locale = match lookup("DEFAULT_LOCALE") {
            Some(raw) => Locale::from_code(&raw)
                .ok_or_else(|| AppError::Config(format!("DEFAULT_LOCALE: unsupported locale '{}'", raw)))?,
            None => defaults.default_locale,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            cache_default_ttl: secs("CACHE_DEFAULT_TTL_SECS", defaults.cache_default_ttl)?,
            locations_ttl: secs("LOCATIONS_TTL_SECS", defaults.locations_ttl)?,
            routes_ttl: secs("ROUTES_TTL_SECS", defaults.routes_ttl)?,
            whatsapp_number: lookup("WHATSAPP_NUMBER")
                .map(|n| n.trim().trim_start_matches('+').to_string())
                .unwrap_or(defaults.whatsapp_number),
            app_name: lookup("APP_NAME").unwrap_or(defaults.app_name),
            default_locale,
            trip_max_passengers: parse_or(&lookup, "TRIP_MAX_PASSENGERS", defaults.trip_max_passengers)?,
            circuit_max_passengers: parse_or(
                &lookup,
                "CIRCUIT_MAX_PASSENGERS",
                defaults.circuit_max_passengers,
            )?,
            nightly_rate: parse_or(&lookup, "NIGHTLY_RATE", defaults.nightly_rate)?,
        })
    }

    /// Database URL, required by anything that talks to the backend
    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| AppError::Config("DATABASE_URL must be set".to_string()))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::Config(format!("{}: {} ({})", key, e, raw))),
        None => Ok(default),
    }
}
