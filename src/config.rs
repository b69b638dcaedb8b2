// Settings and on-disk locations. Settings come from a TOML file in the
// config directory; every key is optional.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::BASE_URL;

/// Environment variable overriding the config directory.
pub const HOME_ENV: &str = "SPACE_KRAKEN_HOME";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub api: ApiSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// ANSI colours in the log file.
    pub color: bool,
    /// tracing filter directive, e.g. `info` or `space_kraken=debug`.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            color: true,
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: BASE_URL.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file is created empty, which
    /// yields the defaults. A file that does not parse is an error.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            std::fs::write(path, "")
                .with_context(|| format!("Failed to create settings file {}", path.display()))?;
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse settings file")
    }
}

/// Where the program keeps its files.
#[derive(Debug, Clone)]
pub struct Paths {
    pub dir: PathBuf,
}

impl Paths {
    /// Resolve the config directory: `$SPACE_KRAKEN_HOME`, then the platform
    /// config dir, then `./.space-kraken`.
    pub fn resolve() -> Self {
        let dir = std::env::var_os(HOME_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|d| d.join("space-kraken")))
            .unwrap_or_else(|| PathBuf::from(".space-kraken"));
        Paths { dir }
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Paths { dir: dir.into() }
    }

    /// Create the directory if needed.
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create config directory {}", self.dir.display()))
    }

    pub fn settings_file(&self) -> PathBuf {
        self.dir.join("settings.toml")
    }

    pub fn database_file(&self) -> PathBuf {
        self.dir.join("data.sqlite")
    }

    pub fn log_file(&self) -> PathBuf {
        self.dir.join("latest.log")
    }
}
