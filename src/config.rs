//! Runtime configuration, read from the environment (and `.env` when present).

use std::env;
use std::net::SocketAddr;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the catalog REST API, e.g. `http://localhost:8080`
    pub api_base_url: String,
    /// Origin the image proxy fetches from
    pub asset_base_url: String,
    pub bind_addr: SocketAddr,
    /// Default filter directive when `RUST_LOG` is unset
    pub log_level: String,
    pub templates_glob: String,
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("API")
            .unwrap_or_else(|| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        let asset_base_url = lookup("ASSET_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| api_base_url.clone());

        let raw_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3000".to_string());
        let bind_addr = raw_addr
            .parse()
            .with_context(|| format!("invalid BIND_ADDR `{}`", raw_addr))?;

        Ok(Self {
            api_base_url,
            asset_base_url,
            bind_addr,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            templates_glob: lookup("TEMPLATES").unwrap_or_else(|| "public/**/*.html".to_string()),
            static_dir: lookup("STATIC_DIR").unwrap_or_else(|| "public/static".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.asset_base_url, "http://localhost:8080");
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.templates_glob, "public/**/*.html");
        assert_eq!(config.static_dir, "public/static");
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = Config::from_lookup(lookup_from(&[
            ("API", "https://api.example.com/v1/"),
            ("ASSET_URL", "https://cdn.example.com/"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://api.example.com/v1");
        assert_eq!(config.asset_base_url, "https://cdn.example.com");
    }

    #[test]
    fn test_invalid_bind_addr() {
        let err = Config::from_lookup(lookup_from(&[("BIND_ADDR", "not-an-addr")])).unwrap_err();
        assert!(err.to_string().contains("BIND_ADDR"));
    }
}
