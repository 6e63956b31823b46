use crate::favorites::FAVORITES_KEY;
use crate::healer::{DEFAULT_HEAL_BATCH_SIZE, DEFAULT_THUMBNAIL_API};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
  #[serde(default = "AppConfig::default_data_dir")]
  pub data_dir: PathBuf,
  #[serde(default = "AppConfig::default_database_file")]
  pub database_file: String,
  #[serde(default = "AppConfig::default_favorites_key")]
  pub favorites_key: String,
  #[serde(default)]
  pub healer: HealerConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HealerConfig {
  #[serde(default = "HealerConfig::default_batch_size")]
  pub batch_size: usize,
  #[serde(default = "HealerConfig::default_api_base")]
  pub api_base: String,
  #[serde(default = "HealerConfig::default_timeout_seconds")]
  pub timeout_seconds: u64,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      data_dir: Self::default_data_dir(),
      database_file: Self::default_database_file(),
      favorites_key: Self::default_favorites_key(),
      healer: HealerConfig::default(),
    }
  }
}

impl Default for HealerConfig {
  fn default() -> Self {
    Self {
      batch_size: Self::default_batch_size(),
      api_base: Self::default_api_base(),
      timeout_seconds: Self::default_timeout_seconds(),
    }
  }
}

impl HealerConfig {
  const fn default_batch_size() -> usize {
    DEFAULT_HEAL_BATCH_SIZE
  }

  fn default_api_base() -> String {
    DEFAULT_THUMBNAIL_API.to_string()
  }

  const fn default_timeout_seconds() -> u64 {
    30
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_seconds.max(1))
  }
}

impl AppConfig {
  fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
  }

  fn default_database_file() -> String {
    "fashion_muse.db".to_string()
  }

  fn default_favorites_key() -> String {
    FAVORITES_KEY.to_string()
  }

  /// Reads a TOML file. A missing file yields the defaults.
  pub fn load(path: &Path) -> Result<Self, String> {
    if !path.exists() {
      log::debug!("No config at {}, using defaults", path.display());
      return Ok(Self::default());
    }
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    Self::from_toml(&text).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
  }

  pub fn from_toml(text: &str) -> Result<Self, String> {
    toml::from_str(text).map_err(|e| e.to_string())
  }

  pub fn db_path(&self) -> PathBuf {
    self.data_dir.join(&self.database_file)
  }
}
