use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::date_key::DateKey;
use crate::error::{DaybookError, Result};
use crate::store::{DEFAULT_STREAK_LOOKBACK, export_file_name};

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("daybook")
}

fn default_streak_lookback() -> u32 {
    DEFAULT_STREAK_LOOKBACK
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DaybookConfig {
    pub data_directory: PathBuf,
    pub debug_logging: bool,
    /// Days the streak scan may walk back before giving up.
    #[serde(default = "default_streak_lookback")]
    pub streak_lookback_days: u32,
    /// Where exports are written. Falls back to the data directory.
    pub export_directory: Option<PathBuf>,
}

impl Default for DaybookConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_dir(),
            debug_logging: false,
            streak_lookback_days: DEFAULT_STREAK_LOOKBACK,
            export_directory: None,
        }
    }
}

impl DaybookConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("daybook")
            .join("config.toml")
    }

    /// Load from the default location; missing or broken files give defaults.
    pub fn load() -> Self {
        let path = Self::default_path();
        match Self::load_from(&path) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let config: Self = toml::from_str(&text).map_err(|e| DaybookError::Config(e.to_string()))?;
        config.validate()?;
        Ok(Some(config))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self).map_err(|e| DaybookError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.streak_lookback_days == 0 {
            return Err(DaybookError::Config("streak_lookback_days must be at least 1".into()));
        }
        Ok(())
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_directory.join("planner.json")
    }

    pub fn export_directory(&self) -> &Path {
        self.export_directory.as_deref().unwrap_or(&self.data_directory)
    }

    pub fn export_path(&self, date: DateKey) -> PathBuf {
        self.export_directory().join(export_file_name(date))
    }

    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_directory)?;
        std::fs::create_dir_all(self.export_directory())?;
        Ok(())
    }
}
