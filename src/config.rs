use crate::storage::DEFAULT_RETENTION;
use std::{env, path::PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/logs.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub retention: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT);
        let data_path = lookup("APP_DATA_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let retention = parse_or("LOG_RETENTION", lookup("LOG_RETENTION"), DEFAULT_RETENTION);
        let retention = if retention == 0 {
            warn!("LOG_RETENTION must be at least 1, using {DEFAULT_RETENTION}");
            DEFAULT_RETENTION
        } else {
            retention
        };

        Self {
            port,
            data_path,
            retention,
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring invalid {key}={value:?}, using {default}");
            default
        }),
    }
}
