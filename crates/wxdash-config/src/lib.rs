use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable carrying the provider credential
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Environment variable naming the TOML config file
pub const CONFIG_PATH_ENV: &str = "WXDASH_CONFIG";

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_PROXY_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub proxy_url: Option<String>,
    pub history_path: Option<PathBuf>,
    pub location: Option<LocationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub server: Option<ServerConfig>,
    pub upstream: Option<UpstreamConfig>,
    pub dashboard: Option<DashboardConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No API key configured; set OPENWEATHER_API_KEY or [upstream].api_key")]
    MissingApiKey,
    #[error("Invalid URL {0}: {1}")]
    InvalidUrl(String, url::ParseError),
}

impl AppConfig {
    /// Load configuration from WXDASH_CONFIG path (TOML) if present, with reasonable defaults
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load from an explicit path; a missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let cfg = if path.exists() {
            let s = fs::read_to_string(path)?;
            toml::from_str::<AppConfig>(&s)?
        } else {
            AppConfig::default()
        };
        Ok(cfg)
    }

    /// Get HTTP bind address (default 0.0.0.0:5000)
    pub fn http_bind(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
    }

    /// Provider base URL
    pub fn upstream_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .upstream
            .as_ref()
            .and_then(|u| u.base_url.clone())
            .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());
        parse_url(raw)
    }

    /// Provider credential: environment first, then the config file
    pub fn api_key(&self) -> Result<String, ConfigError> {
        self.resolve_api_key(std::env::var(API_KEY_ENV).ok())
    }

    pub fn resolve_api_key(&self, from_env: Option<String>) -> Result<String, ConfigError> {
        from_env
            .or_else(|| self.upstream.as_ref().and_then(|u| u.api_key.clone()))
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Where the dashboard reaches the proxy (default http://localhost:5000)
    pub fn proxy_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .dashboard
            .as_ref()
            .and_then(|d| d.proxy_url.clone())
            .unwrap_or_else(|| DEFAULT_PROXY_URL.to_string());
        parse_url(raw)
    }

    /// Fixed position reported by the dashboard's geolocator, if any
    pub fn location(&self) -> Option<LocationConfig> {
        self.dashboard.as_ref().and_then(|d| d.location)
    }

    /// History file path; defaults to the platform data directory
    pub fn history_path(&self) -> PathBuf {
        self.dashboard
            .as_ref()
            .and_then(|d| d.history_path.clone())
            .or_else(|| {
                ProjectDirs::from("dev", "wxdash", "wxdash")
                    .map(|dirs| dirs.data_dir().join("history.json"))
            })
            .unwrap_or_else(|| PathBuf::from("wxdash-history.json"))
    }
}

fn parse_url(raw: String) -> Result<Url, ConfigError> {
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(raw, e))
}
