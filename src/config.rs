//! Service settings read from the process environment.

use crate::error::ConfigError;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5555";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Postgres connection string. `None` runs the service on the memory store.
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub max_connections: u32,
    /// Insert the demo catalog when the store has no restaurants.
    pub seed_data: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: None,
            bind_addr: DEFAULT_BIND_ADDR.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            seed_data: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let database_url = lookup("DATABASE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let bind_addr = lookup("BIND_ADDR").unwrap_or(defaults.bind_addr);
        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>().ok() {
                Some(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "DB_MAX_CONNECTIONS",
                        value: raw,
                    })
                }
            },
            None => defaults.max_connections,
        };
        let seed_data = match lookup("SEED_DATA") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidValue { key: "SEED_DATA", value: raw })?,
            None => defaults.seed_data,
        };
        Ok(Settings {
            database_url,
            bind_addr,
            max_connections,
            seed_data,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
