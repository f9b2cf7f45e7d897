//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use serde::Deserialize;
use strum::{Display, EnumString};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served for static assets.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Directory holding `index.html` for the landing page.
    #[serde(default = "default_views_dir")]
    pub views_dir: PathBuf,

    // === Store Configuration ===
    /// Store connection string (`memory://name` or `file://path`).
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Legacy name for the connection string. Only consulted when
    /// `DATABASE_URL` is unset.
    #[serde(default)]
    pub mlab_uri: Option<String>,

    // === Observability ===
    /// Port for the Prometheus scrape endpoint; disabled when unset.
    #[serde(default)]
    pub metrics_port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_port() -> u16 {
    3000
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_views_dir() -> PathBuf {
    PathBuf::from("views")
}

fn default_database_url() -> String {
    "file://data/exercise-track.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            public_dir: default_public_dir(),
            views_dir: default_views_dir(),
            database_url: default_database_url(),
            mlab_uri: None,
            metrics_port: None,
            rust_log: default_log_level(),
            log_format: LogFormat::default(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Build configuration from `(NAME, value)` pairs.
    ///
    /// `DATABASE_URL` wins over `MLAB_URI`; the latter is used only when the
    /// former is absent.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();
        let has_database_url = vars.iter().any(|(k, _)| k.eq_ignore_ascii_case("DATABASE_URL"));

        let mut config: Self = envy::from_iter(vars)?;
        if !has_database_url {
            if let Some(uri) = config.mlab_uri.clone() {
                config.database_url = uri;
            }
        }
        Ok(config)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("PORT must be a non-zero port number".to_string());
        }

        if self.database_url.trim().is_empty() {
            return Err("DATABASE_URL must not be empty".to_string());
        }

        if let Err(e) = self.database_url.parse::<crate::store::StoreUrl>() {
            return Err(format!("DATABASE_URL is invalid: {e}"));
        }

        if self.metrics_port == Some(self.port) {
            return Err("METRICS_PORT must differ from PORT".to_string());
        }

        Ok(())
    }

    /// Path of the landing page.
    pub fn index_page(&self) -> PathBuf {
        self.views_dir.join("index.html")
    }
}
