//! Settings for the solver endpoint, CSRF handling and playback.
//!
//! Each setting is looked up in the runtime configuration first (a TOML file
//! and command line flags), then in the environment, then falls back to a
//! built-in default.
use std::fs;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderName, InvalidHeaderName};
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::i18n::{Language, UnsupportedLanguage};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/solve";
pub const DEFAULT_CSRF_COOKIE: &str = "csrf_token";
pub const DEFAULT_CSRF_HEADER: &str = "X-CSRF-Token";
pub const DEFAULT_PLAYBACK_MS: u64 = 750;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_COOKIE_DAYS: u64 = 1;

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

const ENV_API_URL: &str = "KRUBIK_API_URL";
const ENV_CSRF_COOKIE: &str = "KRUBIK_CSRF_COOKIE";
const ENV_CSRF_HEADER: &str = "KRUBIK_CSRF_HEADER";
const ENV_LANGUAGE: &str = "KRUBIK_LANGUAGE";
const ENV_PLAYBACK_MS: &str = "KRUBIK_PLAYBACK_MS";
const ENV_TIMEOUT_SECS: &str = "KRUBIK_TIMEOUT_SECS";
const ENV_COOKIE_DAYS: &str = "KRUBIK_COOKIE_DAYS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{key} is not a valid URL ({value:?}): {source}")]
    Url {
        key: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("{key} is not a valid header name ({value:?})")]
    HeaderName {
        key: &'static str,
        value: String,
        source: InvalidHeaderName,
    },
    #[error("{key} is not a number ({value:?}): {source}")]
    Number {
        key: &'static str,
        value: String,
        source: ParseIntError,
    },
    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
    #[error("{key} must be at most {max}, got {value}")]
    TooLarge {
        key: &'static str,
        value: u64,
        max: u64,
    },
    #[error(transparent)]
    Language(#[from] UnsupportedLanguage),
}

/// Settings supplied at runtime. Every field is optional; unset fields fall
/// through to the environment.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    pub api_url: Option<String>,
    pub csrf_cookie: Option<String>,
    pub csrf_header: Option<String>,
    pub language: Option<String>,
    pub playback_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub cookie_days: Option<u64>,
}

impl RuntimeConfig {
    /// Load runtime settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Fill the fields unset in `self` from `fallback`.
    pub fn or(self, fallback: RuntimeConfig) -> RuntimeConfig {
        RuntimeConfig {
            api_url: self.api_url.or(fallback.api_url),
            csrf_cookie: self.csrf_cookie.or(fallback.csrf_cookie),
            csrf_header: self.csrf_header.or(fallback.csrf_header),
            language: self.language.or(fallback.language),
            playback_ms: self.playback_ms.or(fallback.playback_ms),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
            cookie_days: self.cookie_days.or(fallback.cookie_days),
        }
    }
}

/// Fully resolved settings.
#[derive(Clone, Debug)]
pub struct Config {
    /// Solve endpoint.
    pub api_url: Url,
    /// Cookie holding the CSRF token.
    pub csrf_cookie: String,
    /// Header the CSRF token is echoed in.
    pub csrf_header: HeaderName,
    /// Language for messages and `Accept-Language`.
    pub language: Language,
    /// Time between playback steps.
    pub playback_interval: Duration,
    /// Timeout for a whole solve request.
    pub timeout: Duration,
    /// Lifetime of a freshly generated CSRF cookie, in days.
    pub cookie_days: u64,
}

impl Config {
    /// Resolve settings against the process environment.
    pub fn load(runtime: RuntimeConfig) -> Result<Self, ConfigError> {
        Self::resolve(runtime, |key| std::env::var(key).ok())
    }

    /// Resolve settings, using `env` to look up environment variables.
    pub fn resolve<E>(runtime: RuntimeConfig, env: E) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let lookup = |value: Option<String>, var: &str| value.or_else(|| env(var));

        let api_url = lookup(runtime.api_url, ENV_API_URL);
        let api_url = match api_url {
            Some(value) => Url::parse(&value).map_err(|source| ConfigError::Url {
                key: "api_url",
                value,
                source,
            })?,
            None => Url::parse(DEFAULT_API_URL).map_err(|source| ConfigError::Url {
                key: "api_url",
                value: DEFAULT_API_URL.to_string(),
                source,
            })?,
        };

        let csrf_cookie = lookup(runtime.csrf_cookie, ENV_CSRF_COOKIE)
            .unwrap_or_else(|| DEFAULT_CSRF_COOKIE.to_string());

        let csrf_header = lookup(runtime.csrf_header, ENV_CSRF_HEADER)
            .unwrap_or_else(|| DEFAULT_CSRF_HEADER.to_string());
        let csrf_header =
            HeaderName::from_bytes(csrf_header.as_bytes()).map_err(|source| {
                ConfigError::HeaderName {
                    key: "csrf_header",
                    value: csrf_header.clone(),
                    source,
                }
            })?;

        let language = match lookup(runtime.language, ENV_LANGUAGE) {
            Some(tag) => tag.parse()?,
            None => Language::default(),
        };

        let playback_ms = number(
            "playback_ms",
            runtime.playback_ms,
            env(ENV_PLAYBACK_MS),
            DEFAULT_PLAYBACK_MS,
        )?;
        let timeout_secs = number(
            "timeout_secs",
            runtime.timeout_secs,
            env(ENV_TIMEOUT_SECS),
            DEFAULT_TIMEOUT_SECS,
        )?;
        let cookie_days = number(
            "cookie_days",
            runtime.cookie_days,
            env(ENV_COOKIE_DAYS),
            DEFAULT_COOKIE_DAYS,
        )?;
        // The cookie lifetime is sent in seconds.
        if cookie_days.checked_mul(SECONDS_PER_DAY).is_none() {
            return Err(ConfigError::TooLarge {
                key: "cookie_days",
                value: cookie_days,
                max: u64::MAX / SECONDS_PER_DAY,
            });
        }

        let config = Config {
            api_url,
            csrf_cookie,
            csrf_header,
            language,
            playback_interval: Duration::from_millis(playback_ms),
            timeout: Duration::from_secs(timeout_secs),
            cookie_days,
        };
        debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: Url::parse(DEFAULT_API_URL).expect("default URL is valid"),
            csrf_cookie: DEFAULT_CSRF_COOKIE.to_string(),
            csrf_header: HeaderName::from_static("x-csrf-token"),
            language: Language::default(),
            playback_interval: Duration::from_millis(DEFAULT_PLAYBACK_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cookie_days: DEFAULT_COOKIE_DAYS,
        }
    }
}

/// Resolve a positive integer setting.
fn number(
    key: &'static str,
    runtime: Option<u64>,
    env: Option<String>,
    default: u64,
) -> Result<u64, ConfigError> {
    let value = match (runtime, env) {
        (Some(value), _) => value,
        (None, Some(raw)) => raw.trim().parse().map_err(|source| ConfigError::Number {
            key,
            value: raw.clone(),
            source,
        })?,
        (None, None) => default,
    };
    if value == 0 {
        return Err(ConfigError::Zero { key });
    }
    Ok(value)
}
