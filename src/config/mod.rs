// src/config/mod.rs
//! Display settings: the persisted `{mode, palette}` record and level configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::render::{Calibration, Levels, Palette};

/// Record key for the display mode.
pub const MODE_KEY: &str = "mode";

/// Record key for the palette index.
pub const PALETTE_KEY: &str = "palette";

/// Which waterfall renderer the host shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// The host's flat (2D) waterfall
    Flat,
    /// The 3D relief surface
    #[default]
    Relief,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Flat => "flat",
            DisplayMode::Relief => "relief",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Flat => DisplayMode::Relief,
            DisplayMode::Relief => DisplayMode::Flat,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "flat" | "0" => Ok(DisplayMode::Flat),
            "relief" | "1" => Ok(DisplayMode::Relief),
            other => Err(Error::InvalidMode(other.to_string())),
        }
    }
}

/// How the dB window is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Derive the window from each incoming row
    pub automatic: bool,
    pub low_db: f32,
    pub high_db: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        let levels = Levels::default();
        Self {
            automatic: true,
            low_db: levels.low_db,
            high_db: levels.high_db,
        }
    }
}

impl LevelConfig {
    /// Window to use for `row` under this configuration.
    pub fn resolve(&self, row: &[f32], calibration: &Calibration) -> Levels {
        if self.automatic {
            Levels::automatic(row, calibration.offset_db())
        } else {
            Levels::new(self.low_db, self.high_db)
        }
    }
}

/// Everything the relief display reads from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: DisplayMode,
    pub palette: Palette,
    pub levels: LevelConfig,
}

impl Settings {
    /// The flat key/value record the host persists.
    pub fn record(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (MODE_KEY.to_string(), self.mode.as_str().to_string()),
            (PALETTE_KEY.to_string(), self.palette.index().to_string()),
        ])
    }

    /// Restore from a record. Missing keys keep their current value.
    pub fn apply_record(&mut self, record: &BTreeMap<String, String>) -> Result<()> {
        if let Some(mode) = record.get(MODE_KEY) {
            self.mode = mode.parse()?;
        }
        if let Some(palette) = record.get(PALETTE_KEY) {
            self.palette = palette.parse()?;
        }
        Ok(())
    }

    /// Read settings from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::SettingsIo {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|e| Error::SettingsFormat(e.to_string()))
    }

    /// Write settings as TOML, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let io_err = |source| Error::SettingsIo {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents =
            toml::to_string_pretty(self).map_err(|e| Error::SettingsFormat(e.to_string()))?;
        fs::write(path, contents).map_err(io_err)?;
        debug!("saved settings to {}", path.display());
        Ok(())
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("ignoring settings file: {err}");
                Self::default()
            }
        }
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<()> {
        let path = config_path().ok_or_else(|| Error::SettingsIo {
            path: PathBuf::from("config.toml"),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no home directory for settings",
            ),
        })?;
        self.save_to(&path)
    }
}

/// `config.toml` inside the platform config directory.
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "spectral-relief").map(|dirs| dirs.config_dir().join("config.toml"))
}
