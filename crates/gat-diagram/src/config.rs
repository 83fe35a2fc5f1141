//! Service configuration.
//!
//! Stored in `~/.gat/diagram.toml`. Partial files are accepted; every missing
//! value falls back to its default.

use std::path::{Path, PathBuf};

use gat_viz::{DEFAULT_COMPONENT_LIBRARY, DEFAULT_UNDEFINED_SYMBOL};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramServiceConfig {
    pub scheduler: SchedulerConfig,
    pub rendering: RenderingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Area-diagram worker threads (0 = one per CPU).
    pub worker_threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Used when a request does not name a component library.
    pub default_component_library: String,

    /// Shown in legends for values that were never computed.
    pub undefined_symbol: String,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            default_component_library: DEFAULT_COMPONENT_LIBRARY.to_string(),
            undefined_symbol: DEFAULT_UNDEFINED_SYMBOL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for hourly rolling JSON logs. Console only when unset.
    pub log_dir: Option<PathBuf>,

    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            level: "info".to_string(),
        }
    }
}

impl DiagramServiceConfig {
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".gat"))
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("diagram.toml"))
    }

    /// Load from the default location, or defaults when there is no file.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| Error::Config("could not determine config directory".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
