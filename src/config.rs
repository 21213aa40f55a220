use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        WebConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_upload_mb: 50,
        }
    }
}

impl WebConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".config")
        .join("copyrighter")
        .join("config.toml")
}

pub fn load_config() -> Config {
    let path = config_path();
    if !path.exists() {
        return Config::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(content) => parse_config(&content),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read config, using defaults");
            Config::default()
        }
    }
}

fn parse_config(content: &str) -> Config {
    toml::from_str(content).unwrap_or_else(|e| {
        warn!(error = %e, "invalid config, using defaults");
        Config::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_partial_web_section() {
        let cfg = parse_config("[web]\nport = 9000\n");
        assert_eq!(cfg.web.port, 9000);
        assert_eq!(cfg.web.host, "127.0.0.1");
        assert_eq!(cfg.web.max_upload_mb, 50);
    }

    #[test]
    fn test_parse_config_empty_and_invalid() {
        assert_eq!(parse_config("").web.port, 8000);
        assert_eq!(parse_config("web = 3").web.port, 8000);
    }

    #[test]
    fn test_max_upload_bytes() {
        let web = WebConfig {
            max_upload_mb: 2,
            ..Default::default()
        };
        assert_eq!(web.max_upload_bytes(), 2 * 1024 * 1024);
    }
}
