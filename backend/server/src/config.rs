use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};
use upstream::{
    CredentialError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, UpstreamConfig, resolve_credential,
};

use crate::window::DEFAULT_WINDOW_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Ranking,
    Numbers,
}

impl Service {
    fn default_port(&self) -> &'static str {
        match self {
            Service::Ranking => "8080",
            Service::Numbers => "9876",
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub upstream: UpstreamConfig,
    pub fanout_limit: usize,
    pub window_size: usize,
}

impl Config {
    pub fn load(service: Service) -> Result<Self, ConfigError> {
        Self::from_lookup(service, |key| env::var(key).ok())
    }

    pub fn from_lookup<F>(service: Service, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token_path: PathBuf = try_load(&lookup, "AUTH_TOKEN_PATH", "auth_token.json")?;
        let require_token = try_load::<Flag, _>(&lookup, "REQUIRE_TOKEN", "false")?.0;
        let timeout_ms: u64 = try_load(
            &lookup,
            "UPSTREAM_TIMEOUT_MS",
            &DEFAULT_TIMEOUT.as_millis().to_string(),
        )?;

        let config = Self {
            port: try_load(&lookup, "RUST_PORT", service.default_port())?,
            upstream: UpstreamConfig {
                base_url: try_load(&lookup, "UPSTREAM_URL", DEFAULT_BASE_URL)?,
                timeout: Duration::from_millis(timeout_ms),
                credential: resolve_credential(&token_path, require_token)?,
            },
            fanout_limit: try_load(&lookup, "FANOUT_LIMIT", "1")?,
            window_size: try_load(&lookup, "WINDOW_SIZE", &DEFAULT_WINDOW_SIZE.to_string())?,
        };

        if config.fanout_limit == 0 {
            return Err(invalid("FANOUT_LIMIT", "must be at least 1"));
        }
        if config.window_size == 0 {
            return Err(invalid("WINDOW_SIZE", "must be at least 1"));
        }
        if timeout_ms == 0 {
            return Err(invalid("UPSTREAM_TIMEOUT_MS", "must be at least 1"));
        }

        Ok(config)
    }
}

fn invalid(key: &'static str, reason: impl Display) -> ConfigError {
    warn!("Invalid {key} value: {reason}");
    ConfigError::Invalid {
        key,
        reason: reason.to_string(),
    }
}

fn try_load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .trim()
        .parse()
        .map_err(|e| invalid(key, e))
}

struct Flag(bool);

impl FromStr for Flag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Flag(true)),
            "0" | "false" | "no" | "off" | "" => Ok(Flag(false)),
            other => Err(format!("expected a boolean, got {other:?}")),
        }
    }
}
