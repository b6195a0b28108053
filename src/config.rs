use std::{env, net::SocketAddr, path::PathBuf};

use axum::http::HeaderValue;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_SECRET: &str = "todo-app-secret-key-very-long-and-secure";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";
const DEFAULT_INDEX_FILE: &str = "index.html";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BIND_ADDR {value:?} is not a socket address: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("CORS_ORIGIN {0:?} is not a valid header value")]
    CorsOrigin(String),
}

// Runtime settings, read from the environment (and `.env`, if present)
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub session_secret: String,
    pub cors_origin: HeaderValue,
    pub index_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unset or blank keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let bind = get("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind
            .parse()
            .map_err(|source| ConfigError::BindAddr { value: bind, source })?;

        let origin = get("CORS_ORIGIN", DEFAULT_CORS_ORIGIN);
        let cors_origin =
            HeaderValue::from_str(&origin).map_err(|_| ConfigError::CorsOrigin(origin))?;

        Ok(Self {
            bind_addr,
            session_secret: get("SESSION_SECRET", DEFAULT_SESSION_SECRET),
            cors_origin,
            index_file: PathBuf::from(get("INDEX_FILE", DEFAULT_INDEX_FILE)),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            session_secret: DEFAULT_SESSION_SECRET.to_string(),
            cors_origin: HeaderValue::from_static(DEFAULT_CORS_ORIGIN),
            index_file: PathBuf::from(DEFAULT_INDEX_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.session_secret, DEFAULT_SESSION_SECRET);
        assert_eq!(config.cors_origin, "http://localhost:8080");
        assert_eq!(config.index_file, PathBuf::from("index.html"));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("SESSION_SECRET", "another-secret"),
            ("CORS_ORIGIN", "http://localhost:3000"),
            ("INDEX_FILE", " "),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(config.session_secret, "another-secret");
        assert_eq!(config.cors_origin, "http://localhost:3000");
        assert_eq!(config.index_file, PathBuf::from("index.html"));
    }

    #[test]
    fn bad_bind_addr_is_rejected() {
        let err = Config::from_lookup(lookup(&[("BIND_ADDR", "not-an-addr")])).unwrap_err();
        assert!(matches!(err, ConfigError::BindAddr { .. }));
    }
}
