//! Process configuration read from the environment (and `.env` via dotenvy).

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::domain::order_id::{OrderIdGenerator, DEFAULT_UTC_OFFSET_MINUTES};
use crate::infrastructure::retry::RetryPolicy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub order_id_prefix: String,
    /// Store timezone as minutes east of UTC; decides the order id year.
    pub store_utc_offset_minutes: i32,
    pub pool_size: u32,
    pub retry: RetryPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let backoff_ms: u64 = parse_or(&lookup, "CHECKOUT_BACKOFF_MS", 20)?;
        let max_backoff_ms: u64 = parse_or(&lookup, "CHECKOUT_MAX_BACKOFF_MS", 500)?;
        let max_attempts: u32 = parse_or(&lookup, "CHECKOUT_MAX_ATTEMPTS", 5)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "CHECKOUT_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }
        let store_utc_offset_minutes: i32 =
            parse_or(&lookup, "STORE_UTC_OFFSET_MINUTES", DEFAULT_UTC_OFFSET_MINUTES)?;
        if !(-720..=840).contains(&store_utc_offset_minutes) {
            return Err(ConfigError::Invalid {
                name: "STORE_UTC_OFFSET_MINUTES",
                value: store_utc_offset_minutes.to_string(),
            });
        }

        Ok(AppConfig {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            order_id_prefix: lookup("ORDER_ID_PREFIX").unwrap_or_else(|| "DP".to_string()),
            store_utc_offset_minutes,
            pool_size: parse_or(&lookup, "DB_POOL_SIZE", 10)?,
            retry: RetryPolicy {
                max_attempts,
                base_delay: Duration::from_millis(backoff_ms),
                max_delay: Duration::from_millis(max_backoff_ms),
            },
        })
    }

    pub fn order_ids(&self) -> OrderIdGenerator {
        OrderIdGenerator::new(self.order_id_prefix.clone())
            .with_utc_offset_minutes(self.store_utc_offset_minutes)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
