//! Viewer configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use droidcast_core::{CaptureConfig, Orientation};

/// Top-level configuration for the viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Bridge daemon connection settings.
    pub network: NetworkConfig,
    /// Presentation settings.
    pub display: DisplayConfig,
    /// Daemon respawn settings.
    pub daemon: DaemonConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Bridge daemon connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Daemon host.
    pub host: String,
    /// Daemon port.
    pub port: u16,
    /// Per-operation I/O deadline in milliseconds. Zero disables the
    /// deadline entirely.
    pub timeout_ms: u64,
}

/// Presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// "portrait" or "landscape".
    pub orientation: String,
    /// Pause between capture cycles in milliseconds.
    pub frame_interval_ms: u64,
}

/// Daemon respawn settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Path to the adb executable.
    pub adb_path: String,
    /// Restart rounds before giving up at startup.
    pub retry_attempts: u32,
    /// Whether to kick the daemon at startup at all.
    pub autostart: bool,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter.
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            display: DisplayConfig::default(),
            daemon: DaemonConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5037,
            timeout_ms: 5000,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 428,
            height: 240,
            orientation: "portrait".into(),
            frame_interval_ms: 500,
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            adb_path: "adb".into(),
            retry_attempts: 3,
            autostart: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading / derived views ──────────────────────────────────────

impl ViewerConfig {
    /// Load from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// The core capture-loop settings this config describes.
    pub fn capture(&self) -> CaptureConfig {
        CaptureConfig {
            host: self.network.host.clone(),
            port: self.network.port,
            io_timeout: match self.network.timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        }
    }

    /// Parsed orientation; anything unrecognized falls back to
    /// portrait.
    pub fn orientation(&self) -> Orientation {
        if self.display.orientation.eq_ignore_ascii_case("landscape") {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
