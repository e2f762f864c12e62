// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, default values, and the [`ServerConfig`]
//! loaded from them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8443` |
//! | `MODE` | Deployment mode, substituted for `{mode}` in `CONFIG_URL` | `dev` |
//! | `DATABASE_URL` | SQLite connection URL | `sqlite://data/todo.db` |
//! | `DATABASE_MAX_CONNECTIONS` | Connection pool size | `5` |
//! | `RAPIDAPI_PROXY_SECRET` | Expected `X-RapidAPI-Proxy-Secret` value | Required |
//! | `TLS_CERT_PATH` | PEM certificate chain | Optional, with `TLS_KEY_PATH` |
//! | `TLS_KEY_PATH` | PEM private key | Optional, with `TLS_CERT_PATH` |
//! | `WEB_CONTENT_DIR` | Static files served at `/` | Optional |
//! | `CONFIG_URL` | Remote settings document polled at runtime | Optional |
//! | `CONFIG_REFRESH_SECS` | Remote settings poll interval | `120` |
//! | `SEED_API_KEY` | `apikey:user_id:TIER` provisioned at startup | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::auth::Subscription;
use crate::models::ApiKey;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const MODE_ENV: &str = "MODE";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const DATABASE_MAX_CONNECTIONS_ENV: &str = "DATABASE_MAX_CONNECTIONS";

/// Environment variable name for the shared secret the RapidAPI proxy sends.
///
/// Requests authenticated through proxy headers must carry exactly this value
/// in `X-RapidAPI-Proxy-Secret`. May be replaced at runtime by the remote
/// settings document.
pub const PROXY_SECRET_ENV: &str = "RAPIDAPI_PROXY_SECRET";

pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const WEB_CONTENT_DIR_ENV: &str = "WEB_CONTENT_DIR";

/// Environment variable name for the remote settings document URL.
///
/// The literal `{mode}` is replaced with the value of `MODE`, so one URL
/// template can serve every deployment.
pub const CONFIG_URL_ENV: &str = "CONFIG_URL";
pub const CONFIG_REFRESH_SECS_ENV: &str = "CONFIG_REFRESH_SECS";
pub const SEED_API_KEY_ENV: &str = "SEED_API_KEY";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8443;
pub const DEFAULT_MODE: &str = "dev";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/todo.db";
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CONFIG_REFRESH: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{} and {} must be set together", TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)]
    IncompleteTls,
}

/// PEM files for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Server configuration loaded at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub mode: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub proxy_secret: String,
    pub tls: Option<TlsPaths>,
    pub web_content_dir: Option<PathBuf>,
    /// Remote settings URL with `{mode}` already substituted.
    pub config_url: Option<Url>,
    pub config_refresh: Duration,
    pub seed_api_key: Option<ApiKey>,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let ip: IpAddr = host.parse().map_err(|e| invalid(HOST_ENV, &host, e))?;
        let port = match get(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| invalid(PORT_ENV, &raw, e))?,
            None => DEFAULT_PORT,
        };

        let mode = get(MODE_ENV).unwrap_or_else(|| DEFAULT_MODE.to_string());

        let database_url = get(DATABASE_URL_ENV).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let database_max_connections = match get(DATABASE_MAX_CONNECTIONS_ENV) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(0) => return Err(invalid(DATABASE_MAX_CONNECTIONS_ENV, &raw, "must be at least 1")),
                Ok(n) => n,
                Err(e) => return Err(invalid(DATABASE_MAX_CONNECTIONS_ENV, &raw, e)),
            },
            None => DEFAULT_DATABASE_MAX_CONNECTIONS,
        };

        let proxy_secret = get(PROXY_SECRET_ENV).ok_or(ConfigError::Missing(PROXY_SECRET_ENV))?;

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        let web_content_dir = get(WEB_CONTENT_DIR_ENV).map(PathBuf::from);

        let config_url = match get(CONFIG_URL_ENV) {
            Some(template) => {
                let raw = template.replace("{mode}", &mode);
                Some(Url::parse(&raw).map_err(|e| invalid(CONFIG_URL_ENV, &raw, e))?)
            }
            None => None,
        };

        let config_refresh = match get(CONFIG_REFRESH_SECS_ENV) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => return Err(invalid(CONFIG_REFRESH_SECS_ENV, &raw, "must be at least 1")),
                Ok(secs) => Duration::from_secs(secs),
                Err(e) => return Err(invalid(CONFIG_REFRESH_SECS_ENV, &raw, e)),
            },
            None => DEFAULT_CONFIG_REFRESH,
        };

        let seed_api_key = get(SEED_API_KEY_ENV)
            .map(|raw| parse_seed_api_key(&raw))
            .transpose()?;

        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
            mode,
            database_url,
            database_max_connections,
            proxy_secret,
            tls,
            web_content_dir,
            config_url,
            config_refresh,
            seed_api_key,
        })
    }
}

fn invalid(var: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse `apikey:user_id:TIER`.
fn parse_seed_api_key(raw: &str) -> Result<ApiKey, ConfigError> {
    let mut parts = raw.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(apikey), Some(user_id), Some(tier)) if !apikey.is_empty() && !user_id.is_empty() => {
            let subscription = Subscription::from_str(tier)
                .ok_or_else(|| invalid(SEED_API_KEY_ENV, raw, "unknown subscription tier"))?;
            Ok(ApiKey::new(apikey, user_id, subscription))
        }
        _ => Err(invalid(SEED_API_KEY_ENV, raw, "expected apikey:user_id:TIER")),
    }
}
