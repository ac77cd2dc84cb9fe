/*
 * Responsibility
 * - Read environment / .env (port, key document location, extraction options, ticket key)
 * - Validate values (startup fails on anything unusable)
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderName;
use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::services::auth::extractor::{
    ACCESS_COOKIE_NAME, ACCESS_TOKEN_ARGUMENT, CSRF_COOKIE_NAME, CSRF_HEADER_NAME, CsrfPolicy,
    ExtractorConfig,
};
use crate::services::keys::{DEFAULT_FILE_NAME, KeySource, StoreOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub key_config_dirs: Vec<PathBuf>,
    pub key_config_name: String,
    pub key_config_watch: bool,

    pub accept_cookie: bool,
    pub cookie_name: String,
    pub argument_name: String,
    pub csrf_cookie_name: String,
    pub csrf_header_name: HeaderName,

    pub ticket_key: Option<Vec<u8>>,
    pub ticket_validity: Duration,
}

// Do not print the ticket key
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("key_config_dirs", &self.key_config_dirs)
            .field("key_config_name", &self.key_config_name)
            .field("key_config_watch", &self.key_config_watch)
            .field("accept_cookie", &self.accept_cookie)
            .field("ticket_key", &self.ticket_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key -> value lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(&lookup("APP_ENV").unwrap_or_else(|| "development".into()));

        let mut key_config_dirs = lookup("KEY_CONFIG_DIRS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect::<Vec<_>>();
        if key_config_dirs.is_empty() {
            key_config_dirs.push(PathBuf::from("."));
        }

        let key_config_name = lookup("KEY_CONFIG_NAME")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

        let key_config_watch = flag(&lookup, "KEY_CONFIG_WATCH", true)?;
        let accept_cookie = flag(&lookup, "AUTH_ACCEPT_COOKIE", false)?;

        let cookie_name = lookup("AUTH_COOKIE_NAME").unwrap_or_else(|| ACCESS_COOKIE_NAME.into());
        let argument_name =
            lookup("AUTH_ARGUMENT_NAME").unwrap_or_else(|| ACCESS_TOKEN_ARGUMENT.into());
        let csrf_cookie_name = lookup("CSRF_COOKIE_NAME").unwrap_or_else(|| CSRF_COOKIE_NAME.into());
        let csrf_header_name = lookup("CSRF_HEADER_NAME")
            .unwrap_or_else(|| CSRF_HEADER_NAME.into())
            .trim()
            .parse::<HeaderName>()
            .map_err(|_| ConfigError::Invalid("CSRF_HEADER_NAME"))?;

        let ticket_key = match lookup("TICKET_KEY").filter(|s| !s.trim().is_empty()) {
            Some(encoded) => Some(
                STANDARD
                    .decode(encoded.trim())
                    .ok()
                    .filter(|k| !k.is_empty())
                    .ok_or(ConfigError::Invalid("TICKET_KEY"))?,
            ),
            None => None,
        };

        let ticket_validity = match lookup("TICKET_VALIDITY_SECONDS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid("TICKET_VALIDITY_SECONDS"))?,
            None => Duration::from_secs(300),
        };

        Ok(Self {
            addr,
            app_env,
            key_config_dirs,
            key_config_name,
            key_config_watch,
            accept_cookie,
            cookie_name,
            argument_name,
            csrf_cookie_name,
            csrf_header_name,
            ticket_key,
            ticket_validity,
        })
    }

    pub fn key_source(&self) -> KeySource {
        KeySource::search(self.key_config_dirs.clone(), self.key_config_name.clone())
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::default().watch_changes(self.key_config_watch)
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            accept_cookie: self.accept_cookie,
            cookie_name: self.cookie_name.clone(),
            argument_name: self.argument_name.clone(),
            csrf: CsrfPolicy {
                cookie_name: self.csrf_cookie_name.clone(),
                header_name: self.csrf_header_name.clone(),
                ..CsrfPolicy::default()
            },
        }
    }
}

fn flag<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(v) => match v.trim().to_ascii_lowercase().as_str() {
            "" => Ok(default),
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid(key)),
        },
    }
}
