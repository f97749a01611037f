//! TOML-based settings persistence.
//!
//! Reads and writes [`AppConfig`] to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\Padlink\config.toml`
//! - Linux:    `~/.config/padlink/config.toml`
//! - macOS:    `~/Library/Application Support/Padlink/config.toml`
//!
//! ```toml
//! [controller]
//! host = "192.168.2.235"
//! port = 8081
//!
//! [app]
//! autostart = true
//! log_level = "info"
//! auto_connect = true
//! auto_connect_delay_ms = 2000
//!
//! [link]
//! handshake_timeout_ms = 5000
//! keepalive_interval_ms = 15000
//! backoff_base_ms = 5000
//! backoff_factor = 1.5
//! backoff_max_exponent = 5
//! backoff_cap_ms = 30000
//! ```
//!
//! Every field has a serde default, so a missing file, a missing section or
//! a missing key all fall back to the values above.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::backoff::BackoffPolicy;
use crate::infrastructure::link::{LinkConfig, CONTROLLER_PORT};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level settings stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub link: LinkSettings,
}

/// Where the controller lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerConfig {
    /// Hostname or IP address of the controller.
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Host application behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    /// Whether the app should start on OS login.  Stored only; registering
    /// with the OS is left to the installer.
    #[serde(default = "default_true")]
    pub autostart: bool,
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Dial the controller automatically at startup.
    #[serde(default = "default_true")]
    pub auto_connect: bool,
    #[serde(default = "default_auto_connect_delay_ms")]
    pub auto_connect_delay_ms: u64,
}

/// Link timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkSettings {
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,
    #[serde(default = "default_keepalive_interval_ms")]
    pub keepalive_interval_ms: u64,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    #[serde(default = "default_backoff_max_exponent")]
    pub backoff_max_exponent: u32,
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_host() -> String {
    "192.168.2.235".to_string()
}
fn default_port() -> u16 {
    CONTROLLER_PORT
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_auto_connect_delay_ms() -> u64 {
    2_000
}
fn default_handshake_timeout_ms() -> u64 {
    5_000
}
fn default_keepalive_interval_ms() -> u64 {
    15_000
}
fn default_backoff_base_ms() -> u64 {
    5_000
}
fn default_backoff_factor() -> f64 {
    1.5
}
fn default_backoff_max_exponent() -> u32 {
    5
}
fn default_backoff_cap_ms() -> u64 {
    30_000
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            autostart: default_true(),
            log_level: default_log_level(),
            auto_connect: default_true(),
            auto_connect_delay_ms: default_auto_connect_delay_ms(),
        }
    }
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            handshake_timeout_ms: default_handshake_timeout_ms(),
            keepalive_interval_ms: default_keepalive_interval_ms(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_factor: default_backoff_factor(),
            backoff_max_exponent: default_backoff_max_exponent(),
            backoff_cap_ms: default_backoff_cap_ms(),
        }
    }
}

impl LinkSettings {
    /// Converts the on-disk millisecond values into a [`LinkConfig`].
    pub fn to_link_config(&self) -> LinkConfig {
        LinkConfig {
            handshake_timeout: Duration::from_millis(self.handshake_timeout_ms),
            keepalive_interval: Duration::from_millis(self.keepalive_interval_ms),
            backoff: BackoffPolicy {
                base: Duration::from_millis(self.backoff_base_ms),
                factor: self.backoff_factor,
                max_exponent: self.backoff_max_exponent,
                cap: Duration::from_millis(self.backoff_cap_ms),
            },
            ..LinkConfig::default()
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads settings from the platform config file.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Persists settings to the platform config file.
///
/// # Errors
///
/// See [`save_config_to`].
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(&config_file_path()?, config)
}

/// Loads settings from `path`, returning `AppConfig::default()` if the file
/// does not exist yet.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Padlink"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("padlink"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Padlink")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
