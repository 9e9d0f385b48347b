use std::env;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub secret: String,
    pub bind_address: String,
    pub session_ttl_hours: i64,
    //when set, one user per role is seeded with this password
    pub seed_password: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let session_ttl_hours = match env::var("SESSION_TTL_HOURS") {
            Ok(value) => value
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours > 0)
                .ok_or(ConfigError::Invalid {
                    name: "SESSION_TTL_HOURS",
                    value,
                })?,
            Err(_) => 24,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            secret: required("SECRET")?,
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3001".into()),
            session_ttl_hours,
            seed_password: env::var("SEED_PASSWORD").ok().filter(|p| !p.is_empty()),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(name))
}
