//! Client configuration
//!
//! Settings are merged from built-in defaults, an optional `admin.toml` file
//! in the working directory, and `ADMIN_*` environment variables, in that
//! order of precedence.

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

/// Base URL used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Name of the optional configuration file
pub const CONFIG_FILE: &str = "admin.toml";

/// Admin client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Base URL of the portfolio API, without trailing slash
    pub api_url: String,
    /// Location of the client-side storage file
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    /// Per-request timeout; requests never time out when unset
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl AdminConfig {
    /// Load the configuration from `admin.toml` and the environment
    ///
    /// # Environment Variables
    /// - `ADMIN_API_URL`: API base URL (default: "http://localhost:8000")
    /// - `ADMIN_STORAGE_PATH`: storage file (default: `<config dir>/portfolio-admin/storage.json`)
    /// - `ADMIN_REQUEST_TIMEOUT_SECS`: request timeout in seconds (default: none)
    pub fn from_env() -> ConfigResult<Self> {
        Self::load(Path::new(CONFIG_FILE))
    }

    /// Load the configuration using `file` as the optional TOML source
    pub fn load(file: &Path) -> ConfigResult<Self> {
        let config = Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .add_source(File::from(file).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix("ADMIN").try_parsing(true))
            .build()?;

        let mut settings: AdminConfig = config.try_deserialize()?;
        settings.api_url = settings.api_url.trim_end_matches('/').to_string();
        settings.validate()?;

        Ok(settings)
    }

    /// Configuration pointing at `api_url` with every other setting defaulted
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            storage_path: None,
            request_timeout_secs: None,
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.api_url.clone()));
        }
        reqwest::Url::parse(&self.api_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.api_url, e)))?;
        Ok(())
    }

    /// Resolved path of the client-side storage file
    pub fn storage_path(&self) -> PathBuf {
        self.storage_path.clone().unwrap_or_else(default_storage_path)
    }

    /// Request timeout, if any
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn default_storage_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("portfolio-admin")
        .join("storage.json")
}
