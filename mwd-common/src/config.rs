//! Bootstrap configuration loading
//!
//! Resolution priority:
//! 1. Command-line arguments (applied by the binary on top of the loaded file)
//! 2. Environment variables (`MWD_CONFIG`, `MWD_DATABASE`, `MWD_PORT`, read by clap)
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! A missing config file is never fatal: the service starts with defaults and
//! logs a warning. A config file that exists but fails to parse is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name of the per-user/system config directory
const APP_DIR: &str = "mwd";

/// Clustering model names accepted by the service, case-insensitive
pub const MODEL_NAMES: [&str; 5] = ["kmeans", "k-means", "agglom", "agglomerative", "spectral"];

/// Conditioning modes accepted by the service, case-insensitive
pub const DATA_TYPE_NAMES: [&str; 4] = ["raw", "unweighted", "weighted", "pca"];

/// Agglomerative linkages accepted by the service, case-insensitive
pub const LINKAGE_NAMES: [&str; 4] = ["complete", "average", "single", "ward"];

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Interface to bind
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// Upper bound on any single request, including clustering and rendering
    pub request_timeout_secs: u64,

    /// Clustering and rendering jobs allowed on blocking threads at once.
    /// Requests beyond this wait for a slot.
    pub max_concurrent_jobs: usize,

    pub logging: LoggingConfig,

    pub clustering: ClusteringConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level directive (trace, debug, info, warn, error or a full EnvFilter string)
    pub level: String,
}

/// Defaults applied when a clustering request omits a query parameter
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub default_k: usize,
    pub default_model: String,
    pub default_data_type: String,
    pub default_linkage: String,

    /// Fixed RNG seed for k-means and spectral initialization.
    /// `None` draws a fresh seed per request.
    pub seed: Option<u64>,

    /// Independent k-means restarts; the lowest-inertia run wins
    pub kmeans_n_init: usize,

    pub kmeans_max_iter: usize,

    /// RBF kernel coefficient for spectral affinity: exp(-gamma * ||a - b||^2)
    pub spectral_gamma: f64,

    /// Largest sample batch a clustering request may cover
    pub max_rows: usize,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            host: "127.0.0.1".to_string(),
            port: 5780,
            request_timeout_secs: 60,
            max_concurrent_jobs: 4,
            logging: LoggingConfig::default(),
            clustering: ClusteringConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            default_k: 4,
            default_model: "agglom".to_string(),
            default_data_type: "pca".to_string(),
            default_linkage: "complete".to_string(),
            seed: None,
            kmeans_n_init: 10,
            kmeans_max_iter: 300,
            spectral_gamma: 1.0,
            max_rows: 20_000,
        }
    }
}

impl TomlConfig {
    /// Parse a config file; every field is optional
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to compiled defaults
    ///
    /// An explicitly requested file must exist. Without one, the platform
    /// config locations are searched and defaults are used if none is found.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            info!("Loading config from {}", path.display());
            return Self::from_file(path);
        }

        match locate_config_file() {
            Some(path) => {
                info!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            None => {
                warn!("No config file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_concurrent_jobs == 0 {
            return Err(Error::Config(
                "max_concurrent_jobs must be at least 1".to_string(),
            ));
        }
        self.clustering.validate()
    }
}

impl ClusteringConfig {
    fn validate(&self) -> Result<()> {
        if self.default_k == 0 {
            return Err(Error::Config("clustering.default_k must be at least 1".to_string()));
        }
        if self.kmeans_n_init == 0 || self.kmeans_max_iter == 0 {
            return Err(Error::Config(
                "clustering.kmeans_n_init and clustering.kmeans_max_iter must be at least 1"
                    .to_string(),
            ));
        }
        if !(self.spectral_gamma.is_finite() && self.spectral_gamma > 0.0) {
            return Err(Error::Config(format!(
                "clustering.spectral_gamma must be a positive number, got {}",
                self.spectral_gamma
            )));
        }
        if self.max_rows == 0 {
            return Err(Error::Config("clustering.max_rows must be at least 1".to_string()));
        }
        check_name("clustering.default_model", &self.default_model, &MODEL_NAMES)?;
        check_name("clustering.default_data_type", &self.default_data_type, &DATA_TYPE_NAMES)?;
        check_name("clustering.default_linkage", &self.default_linkage, &LINKAGE_NAMES)
    }
}

fn check_name(key: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.iter().any(|name| name.eq_ignore_ascii_case(value)) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} must be one of {}, got '{}'",
            key,
            allowed.join(", "),
            value
        )))
    }
}

/// Search the platform config locations for `mwd/config.toml`
///
/// Linux checks `~/.config/mwd/config.toml` then `/etc/mwd/config.toml`;
/// other platforms check only the user config directory.
pub fn locate_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc").join(APP_DIR).join("config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR).join("mwd.db"))
        .unwrap_or_else(|| PathBuf::from("./mwd_data/mwd.db"))
}
