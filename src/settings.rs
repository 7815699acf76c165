use crate::errors::{LithoError, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.json";

/// Server configuration.
///
/// The defaults reproduce the fixed 0.0.0.0:8000 binding; a `settings.json` only
/// needs to exist to move the listener or tighten the upload limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Listener
    pub host: IpAddr,
    pub port: u16,

    // Upload limits
    pub max_upload_bytes: usize,
    pub max_megapixels: u64,

    /// Forces `debug` level logging regardless of RUST_LOG
    pub debug_logging: bool,

    pub chart: ChartSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,

            max_upload_bytes: 32 * 1024 * 1024,
            max_megapixels: 100,

            debug_logging: false,

            chart: ChartSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub width: u32,
    pub height: u32,
    pub bar_color: [u8; 3],
    /// Integer upscale applied to the 5x7 chart font
    pub text_scale: u32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        // 6.4x4.8in at 200dpi
        Self {
            width: 1280,
            height: 960,
            bar_color: [31, 119, 180],
            text_scale: 3,
        }
    }
}

impl Settings {
    /// Loads `settings.json` from the platform config directory, falling back to defaults.
    pub fn load() -> Self {
        let (settings, error) = Self::load_or_default(Self::default_path().as_deref());
        if let Some(e) = error {
            tracing::warn!(error = %e, "ignoring unreadable settings, using defaults");
        }
        settings
    }

    /// Like [`Settings::load`], but hands back the load error instead of logging it,
    /// for callers that install the tracing subscriber afterwards.
    pub fn load_or_default(path: Option<&Path>) -> (Self, Option<LithoError>) {
        match path {
            Some(path) if path.exists() => match Self::load_from(path) {
                Ok(settings) => (settings, None),
                Err(e) => (Self::default(), Some(e)),
            },
            _ => (Self::default(), None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate(path)?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "lithocolor", "Lithocolor")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |message: &str| LithoError::SettingsError {
            path: path.to_path_buf(),
            message: message.to_string(),
        };
        if self.max_upload_bytes == 0 {
            return Err(invalid("max_upload_bytes must be positive"));
        }
        if self.max_megapixels == 0 {
            return Err(invalid("max_megapixels must be positive"));
        }
        // Smaller charts leave no room for the plot area between the margins
        if self.chart.width < 320 || self.chart.height < 240 {
            return Err(invalid("chart must be at least 320x240"));
        }
        if self.chart.text_scale == 0 {
            return Err(invalid("chart.text_scale must be positive"));
        }
        Ok(())
    }
}
