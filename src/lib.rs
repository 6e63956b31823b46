pub mod catalog;
pub mod config;
pub mod database;
pub mod favorites;
pub mod grouping;
pub mod healer;
pub mod search;
pub mod source;
pub mod store;

use chrono::Utc;
use config::AppConfig;
use database::{heal_candidates, init_database, open_database, require_admin, update_remote_url, AdminSession};
use favorites::{FavoritesStore, SqliteStorage};
use healer::{run_auto_healer, HealReport, RobloxThumbnails};
use source::{CatalogSource, DatabaseSource, JsonDirectorySource};
use std::path::PathBuf;
use store::{CatalogStore, RawCatalog};

pub use catalog::{parse_item_name, CatalogItem, ItemType, MusicTrack};
pub use favorites::FavoritesStorage;
pub use grouping::{group_eye_variants, group_texture_variants, PresetGroup, TextureGroup, VariantKey};
pub use search::{filter, SearchQuery, Tab, TabResults};

pub(crate) fn now_iso() -> String {
  Utc::now().to_rfc3339()
}

/// Installs the env_logger sink at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
  let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}

#[derive(Clone)]
pub struct AppState {
  pub config: AppConfig,
  pub db_path: PathBuf,
}

impl AppState {
  pub fn open(config: AppConfig) -> Result<Self, String> {
    let db_path = config.db_path();
    init_database(&db_path)?;
    Ok(Self { config, db_path })
  }

  pub fn favorites(&self) -> Result<FavoritesStore<SqliteStorage>, String> {
    let connection = open_database(&self.db_path)?;
    Ok(FavoritesStore::with_key(
      SqliteStorage::new(connection),
      &self.config.favorites_key,
    ))
  }

  /// Static JSON files plus whatever the admin surface stored in the database.
  pub fn load_catalog(&self) -> Result<CatalogStore, String> {
    let data_dir = &self.config.data_dir;
    let mut raw = if data_dir.join(source::MUSIC_FILE).exists() {
      JsonDirectorySource::new(data_dir).load()?
    } else {
      log::warn!("No static catalog under {}", data_dir.display());
      RawCatalog::default()
    };

    let stored = DatabaseSource::new(&self.db_path).load()?;
    raw.facebase_records = stored.facebase_records;
    raw.avatar_records = stored.avatar_records;
    raw.texture_records = stored.texture_records;

    Ok(CatalogStore::build(raw))
  }

  /// Writes repaired URLs back, so it needs the same sign-in as other catalog changes.
  pub fn heal_thumbnails(&self, session: &AdminSession) -> Result<HealReport, String> {
    require_admin(session)?;
    let connection = open_database(&self.db_path)?;
    let candidates = heal_candidates(&connection)?;
    let service = RobloxThumbnails::new(&self.config.healer.api_base, self.config.healer.timeout())?;

    Ok(run_auto_healer(
      &candidates,
      &service,
      self.config.healer.batch_size,
      |candidate, url| update_remote_url(&connection, candidate.item_type, &candidate.id, url),
    ))
  }
}
