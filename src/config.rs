use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: PgConnectOptions,
    pub max_connections: u32,
    pub jwt_secret: String,
    pub bcrypt_min_cost: u32,
    pub bcrypt_max_cost: u32,
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let jwt_secret = get("PRIV_KEY")
            .or_else(|| get("JWT_SECRET"))
            .ok_or(ConfigError::Missing("PRIV_KEY or JWT_SECRET"))?;

        // Parts are handed to the driver individually so credentials need no URL escaping
        let database = match get("DATABASE_URL") {
            Some(url) => PgConnectOptions::from_str(&url).map_err(|_| ConfigError::Invalid {
                name: "DATABASE_URL",
                value: url,
            })?,
            None => {
                let name = get("DB_NAME").ok_or(ConfigError::Missing("DATABASE_URL or DB_NAME"))?;
                let mut options = PgConnectOptions::new()
                    .host(&get("DB_HOST").unwrap_or_else(|| "localhost".to_string()))
                    .port(parse_or(get("DB_PORT"), "DB_PORT", 5432)?)
                    .username(&get("DB_USER").unwrap_or_else(|| "postgres".to_string()))
                    .database(&name)
                    .ssl_mode(PgSslMode::Disable);
                if let Some(password) = lookup("DB_PASSWORD").filter(|value| !value.is_empty()) {
                    options = options.password(&password);
                }
                options
            }
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(get("PORT"), "PORT", 3000)?,
            database,
            max_connections: parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?,
            jwt_secret,
            bcrypt_min_cost: parse_or(get("BCRYPT_MIN_COST"), "BCRYPT_MIN_COST", 10)?,
            bcrypt_max_cost: parse_or(get("BCRYPT_MAX_COST"), "BCRYPT_MAX_COST", 12)?,
            cookie_secure: parse_or(get("COOKIE_SECURE"), "COOKIE_SECURE", true)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
