//! # Configuration
//!
//! Settings for the `tread` binary.
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults                                                            │
//! │  2. Config file   (--config PATH, else <config dir>/tread.toml)         │
//! │  3. Environment   TREAD_DB_PATH, TREAD_LOG, TREAD_MAX_CONNECTIONS       │
//! │  4. Validation                                                          │
//! │  5. --db flag     (applied by the caller when opening the database)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example File
//! ```toml
//! [database]
//! path = "/srv/shop/tread.db"
//! max_connections = 4
//!
//! [logging]
//! filter = "info,tread=debug,sqlx=warn"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::error::{AppError, AppResult};

/// Log filter used when neither the config nor the environment sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,tread=debug,sqlx=warn";

const DB_FILE_NAME: &str = "tread.db";
const CONFIG_FILE_NAME: &str = "tread.toml";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "tread", "tread")
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directives. `RUST_LOG` still wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// A missing file is not an error; an explicit `config_path` that
    /// does not exist is treated the same way.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                debug!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                toml::from_str(&contents)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Applies `TREAD_*` overrides from `lookup` (the process environment
    /// in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<()> {
        if let Some(path) = lookup("TREAD_DB_PATH").filter(|p| !p.trim().is_empty()) {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(filter) = lookup("TREAD_LOG").filter(|f| !f.trim().is_empty()) {
            self.logging.filter = filter;
        }

        if let Some(max) = lookup("TREAD_MAX_CONNECTIONS") {
            self.database.max_connections = max.trim().parse().map_err(|_| {
                AppError::Config(format!("TREAD_MAX_CONNECTIONS must be a number, got '{max}'"))
            })?;
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.database.max_connections == 0 {
            return Err(AppError::Config(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        EnvFilter::try_new(&self.logging.filter).map_err(|e| {
            AppError::Config(format!("logging.filter '{}': {}", self.logging.filter, e))
        })?;

        Ok(())
    }

    /// Database file to open: the configured path, else `tread.db` in the
    /// platform data directory.
    pub fn database_path(&self) -> AppResult<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        project_dirs()
            .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
            .ok_or(AppError::NoDataDir)
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}
