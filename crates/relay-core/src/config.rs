//! TOML configuration file shared by both relay binaries.
//!
//! The file is optional.  When no explicit path is given, it is looked up in
//! the platform-appropriate config directory:
//! - Windows:  `%APPDATA%\MouseRelay\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/mouse-relay/config.toml` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/MouseRelay/config.toml`
//!
//! The native messaging host is launched by the browser with no way to pass
//! flags, so this file is the main way to tune it.
//!
//! ```toml
//! scroll_divisor = 60
//!
//! [server]
//! bind_address = "localhost"
//! port = 9999
//! restrict_origins = false
//! allowed_origins = ["chrome-extension://abcdefghijklmnopabcdefghijklmnop"]
//! ```
//!
//! Fields annotated with `#[serde(default = "...")]` fall back to their
//! built-in value when absent, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::dispatch::{ScrollDivisor, DEFAULT_SCROLL_DIVISOR};

/// Default WebSocket port the extension connects to.
pub const DEFAULT_PORT: u16 = 9999;

/// Bind address meaning "every loopback interface", IPv4 and IPv6.
pub const LOCALHOST: &str = "localhost";

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

    /// A value parsed but is out of range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration file contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelayFileConfig {
    /// Touch pixels per wheel step.
    #[serde(default = "default_scroll_divisor")]
    pub scroll_divisor: f64,
    /// WebSocket relay settings; ignored by the stdio host.
    #[serde(default)]
    pub server: ServerSection,
}

/// `[server]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    /// IP address to bind, or `localhost` for both `127.0.0.1` and `::1`.
    /// The relay is meant for local use only.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// TCP port for the WebSocket listener.
    #[serde(default = "default_port")]
    pub port: u16,
    /// When `true`, only `allowed_origins` may connect.
    #[serde(default)]
    pub restrict_origins: bool,
    /// Origins accepted when `restrict_origins` is set.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_scroll_divisor() -> f64 {
    DEFAULT_SCROLL_DIVISOR
}
fn default_bind_address() -> String {
    LOCALHOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for RelayFileConfig {
    fn default() -> Self {
        Self {
            scroll_divisor: default_scroll_divisor(),
            server: ServerSection::default(),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            restrict_origins: false,
            allowed_origins: Vec::new(),
        }
    }
}

impl RelayFileConfig {
    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for an unusable scroll divisor.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(content)?;
        cfg.validated_scroll_divisor()?;
        Ok(cfg)
    }

    /// Returns the scroll divisor as a validated [`ScrollDivisor`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if it is zero, negative, or not finite.
    pub fn validated_scroll_divisor(&self) -> Result<ScrollDivisor, ConfigError> {
        ScrollDivisor::new(self.scroll_divisor).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

/// Resolves the full path of the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the configuration.
///
/// With `Some(path)` the file must exist.  With `None` the default location
/// is tried and a missing file (or undeterminable directory) yields
/// [`RelayFileConfig::default()`].
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors, [`ConfigError::Parse`]
/// for malformed TOML, and [`ConfigError::Invalid`] for out-of-range values.
pub fn load_config(explicit: Option<&Path>) -> Result<RelayFileConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_file_path() {
            Ok(path) => path,
            Err(_) => return Ok(RelayFileConfig::default()),
        },
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            debug!("loading config from {}", path.display());
            RelayFileConfig::from_toml_str(&content)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
            Ok(RelayFileConfig::default())
        }
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Resolves the platform config directory for Mouse Relay.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("MouseRelay"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("mouse-relay"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("MouseRelay")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
