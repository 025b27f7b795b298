//! Configuration loading and resolution
//!
//! Every setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`CINEDB_*`)
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is not an error; the remaining tiers still apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ENV_CONFIG: &str = "CINEDB_CONFIG";
pub const ENV_DATABASE: &str = "CINEDB_DATABASE";
pub const ENV_HOST: &str = "CINEDB_HOST";
pub const ENV_PORT: &str = "CINEDB_PORT";
pub const ENV_LOG_LEVEL: &str = "CINEDB_LOG_LEVEL";

/// Built-in defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            database_path: default_data_folder().join("cinedb.db"),
            host: "127.0.0.1".to_string(),
            port: 5001,
            log_level: "info".to_string(),
        }
    }
}

/// Contents of `config.toml`
///
/// ```toml
/// database_path = "/srv/cinedb/cinedb.db"
/// host = "0.0.0.0"
/// port = 8080
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub logging: LoggingConfig,
}

/// Logging section of `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl ServiceConfig {
    /// Resolve every setting across CLI, environment, TOML file and defaults
    pub fn resolve(cli: CliOverrides) -> Result<Self> {
        let config_path = cli
            .config_path
            .clone()
            .or_else(|| env_value(ENV_CONFIG).map(PathBuf::from))
            .or_else(default_config_path);

        let toml = match config_path {
            Some(path) => load_toml_config(&path)?,
            None => None,
        };

        Self::merge(cli, toml.unwrap_or_default())
    }

    /// Merge explicit CLI values and a parsed TOML file over environment and defaults
    pub fn merge(cli: CliOverrides, toml: TomlConfig) -> Result<Self> {
        let defaults = CompiledDefaults::for_current_platform();

        let env_port = match env_value(ENV_PORT) {
            Some(raw) => Some(raw.parse::<u16>().map_err(|_| {
                Error::Config(format!("{} is not a valid port: {}", ENV_PORT, raw))
            })?),
            None => None,
        };

        Ok(Self {
            database_path: cli
                .database_path
                .or_else(|| env_value(ENV_DATABASE).map(PathBuf::from))
                .or(toml.database_path)
                .unwrap_or(defaults.database_path),
            host: cli
                .host
                .or_else(|| env_value(ENV_HOST))
                .or(toml.host)
                .unwrap_or(defaults.host),
            port: cli.port.or(env_port).or(toml.port).unwrap_or(defaults.port),
            log_level: cli
                .log_level
                .or_else(|| env_value(ENV_LOG_LEVEL))
                .or(toml.logging.level)
                .unwrap_or(defaults.log_level),
        })
    }

    /// Socket address string for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load a TOML config file
///
/// Returns `Ok(None)` when the file does not exist. A file that exists but
/// cannot be parsed is a configuration error.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str::<TomlConfig>(&content).map_err(|e| {
        warn!("Failed to parse {}: {}", path.display(), e);
        Error::Config(format!("Invalid config file {}: {}", path.display(), e))
    })?;

    info!("Loaded config file: {}", path.display());
    Ok(Some(config))
}

/// Default configuration file path for the platform
///
/// On Linux the per-user file wins over `/etc/cinedb/config.toml` when both exist.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("cinedb").join("config.toml"));

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/cinedb/config.toml");
        if let Some(path) = &user_config {
            if path.exists() {
                return user_config;
            }
        }
        if system_config.exists() {
            return Some(system_config);
        }
    }

    user_config
}

/// OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/cinedb (or /var/lib/cinedb for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("cinedb"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/cinedb"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/cinedb
        dirs::data_dir()
            .map(|d| d.join("cinedb"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/cinedb"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\cinedb
        dirs::data_local_dir()
            .map(|d| d.join("cinedb"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\cinedb"))
    } else {
        PathBuf::from("./cinedb_data")
    }
}

/// Non-empty environment variable value
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
