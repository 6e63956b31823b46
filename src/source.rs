use crate::catalog::{CategoryCatalog, ItemType, MusicTrack, FACEBASES_PATH, ITEMS_PATH, TEXTURES_PATH};
use crate::database::{list_catalog_records, open_database};
use crate::store::RawCatalog;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub const MUSIC_FILE: &str = "music.json";

/// Hands over every raw collection in one load.
pub trait CatalogSource {
  fn load(&self) -> Result<RawCatalog, String>;
}

fn read_json<T: DeserializeOwned>(path: &Path, resource_name: &str) -> Result<T, String> {
  let body = fs::read_to_string(path).map_err(|e| {
    log::error!("Error loading {} from {}: {}", resource_name, path.display(), e);
    format!("Could not read {} from {}: {}", resource_name, path.display(), e)
  })?;

  let parsed = serde_json::from_str(&body).map_err(|e| {
    log::error!("Invalid JSON in {}: {}", resource_name, e);
    format!("Invalid JSON format in {}: {}", resource_name, e)
  })?;

  log::debug!("{} loaded successfully", resource_name);
  Ok(parsed)
}

/// Static layout: one JSON list of file basenames per asset folder plus `music.json`.
pub struct JsonDirectorySource {
  root: PathBuf,
}

impl JsonDirectorySource {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  fn path(&self, relative: &str) -> PathBuf {
    self.root.join(relative)
  }
}

impl CatalogSource for JsonDirectorySource {
  fn load(&self) -> Result<RawCatalog, String> {
    let facebase_names: Vec<String> =
      read_json(&self.path(&format!("{}/facebases.json", FACEBASES_PATH)), "Facebases")?;
    let item_names: Vec<String> = read_json(&self.path(&format!("{}/items.json", ITEMS_PATH)), "Items")?;
    let texture_names: Vec<String> =
      read_json(&self.path(&format!("{}/textures.json", TEXTURES_PATH)), "Textures")?;
    let music_tracks: Vec<MusicTrack> = read_json(&self.path(MUSIC_FILE), "Music")?;

    let categories_path = self.path(&format!("{}/categories.json", FACEBASES_PATH));
    let categories = if categories_path.exists() {
      Some(read_json::<CategoryCatalog>(&categories_path, "Categories")?)
    } else {
      log::warn!("No category metadata at {}", categories_path.display());
      None
    };

    Ok(RawCatalog {
      facebase_names,
      item_names,
      texture_names,
      music_tracks,
      categories,
      ..RawCatalog::default()
    })
  }
}

/// Catalog entries stored by the admin surface. Music and categories only ship as static files.
pub struct DatabaseSource {
  db_path: PathBuf,
}

impl DatabaseSource {
  pub fn new(db_path: impl Into<PathBuf>) -> Self {
    Self {
      db_path: db_path.into(),
    }
  }
}

impl CatalogSource for DatabaseSource {
  fn load(&self) -> Result<RawCatalog, String> {
    let connection = open_database(&self.db_path)?;
    Ok(RawCatalog {
      facebase_records: list_catalog_records(&connection, ItemType::FacePreset)?,
      avatar_records: list_catalog_records(&connection, ItemType::AvatarPiece)?,
      texture_records: list_catalog_records(&connection, ItemType::Texture)?,
      ..RawCatalog::default()
    })
  }
}
