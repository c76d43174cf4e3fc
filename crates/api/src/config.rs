//! Application configuration loaded from environment variables.

use checkout::EventRouting;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set to a value that cannot be used.
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Names of the store tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub product: String,
    pub basket: String,
    pub order: String,
}

/// Server configuration.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
/// - `DATABASE_URL`: Postgres connection string; the in-memory store is used
///   when unset
/// - `QUEUE_MAX_RECEIVE_COUNT`: deliveries before a message is dead-lettered
///   (default: `3`)
/// - `QUEUE_DEAD_LETTER_LIMIT`: dead letters kept before the oldest is dropped
///   (default: `1000`)
/// - `PRODUCT_TABLE_NAME`, `BASKET_TABLE_NAME`, `ORDER_TABLE_NAME`: required
/// - `EVENT_BUSNAME`, `EVENT_SOURCE`, `EVENT_DETAILTYPE`: required
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub queue_max_receive_count: u32,
    pub queue_dead_letter_limit: usize,
    pub tables: TableNames,
    pub checkout_events: EventRouting,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through a variable lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let port: u16 = match optional("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            None => 3000,
        };
        let queue_max_receive_count: u32 = match optional("QUEUE_MAX_RECEIVE_COUNT") {
            Some(value) => match value.parse() {
                Ok(count) if count > 0 => count,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "QUEUE_MAX_RECEIVE_COUNT",
                        value,
                    });
                }
            },
            None => 3,
        };
        let queue_dead_letter_limit: usize = match optional("QUEUE_DEAD_LETTER_LIMIT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "QUEUE_DEAD_LETTER_LIMIT",
                value,
            })?,
            None => event_bus::DEFAULT_DEAD_LETTER_LIMIT,
        };
        let log_format = match optional("LOG_FORMAT") {
            None => LogFormat::Pretty,
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "LOG_FORMAT",
                        value,
                    });
                }
            },
        };

        Ok(Self {
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            log_level: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            log_format,
            database_url: optional("DATABASE_URL"),
            queue_max_receive_count,
            queue_dead_letter_limit,
            tables: TableNames {
                product: required("PRODUCT_TABLE_NAME")?,
                basket: required("BASKET_TABLE_NAME")?,
                order: required("ORDER_TABLE_NAME")?,
            },
            checkout_events: EventRouting::new(
                required("EVENT_BUSNAME")?,
                required("EVENT_SOURCE")?,
                required("EVENT_DETAILTYPE")?,
            ),
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
