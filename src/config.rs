use crate::errors::ConfigError;
use reqwest::Url;
use std::{env, time::Duration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000/";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: BackendConfig,
}

/// Where the `/api/*` endpoints live and which board the unscoped pages query.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: Url,
    pub board_slug: Option<String>,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let raw_url = lookup("BACKEND_BASE_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let base_url = parse_base_url(&raw_url)?;

        let board_slug = lookup("BOARD_SLUG")
            .map(|slug| slug.trim().to_string())
            .filter(|slug| !slug.is_empty());

        let timeout = match lookup("BACKEND_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|err| ConfigError::invalid("BACKEND_TIMEOUT_SECS", err))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            port,
            backend: BackendConfig {
                base_url,
                board_slug,
                timeout: Duration::from_secs(timeout),
            },
        })
    }
}

/// Endpoint paths are joined relative to the base, so it must end with `/`.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    let url = Url::parse(&raw).map_err(|err| ConfigError::invalid("BACKEND_BASE_URL", err))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::invalid("BACKEND_BASE_URL", "not a base url"));
    }
    Ok(url)
}
