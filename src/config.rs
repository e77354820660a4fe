use std::{fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::info;

use crate::services::scoring::ScoringPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub mongodb_db_name: String,
    pub jwt_secret: String,
    pub jwt_expire_minutes: i64,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub scoring: ScoringPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let scoring = ScoringPolicy {
            winner_points: try_load(&lookup, "SCORING_WINNER_POINTS", 1)?,
            method_bonus: try_load(&lookup, "SCORING_METHOD_BONUS", 1)?,
            round_bonus: try_load(&lookup, "SCORING_ROUND_BONUS", 1)?,
        };
        if scoring.winner_points == 0 {
            return Err(ConfigError::Invalid {
                key: "SCORING_WINNER_POINTS",
                message: "a correct winner must be worth at least one point".to_string(),
            });
        }

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Config {
            mongodb_uri: required(&lookup, "MONGODB_URI")?,
            mongodb_db_name: lookup("MONGODB_DB_NAME").unwrap_or_else(|| "fight_picks".to_string()),
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            jwt_expire_minutes: try_load(&lookup, "JWT_EXPIRE_MINUTES", 60 * 24 * 7)?,
            port: try_load(&lookup, "PORT", 8000)?,
            cors_origins,
            scoring,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
