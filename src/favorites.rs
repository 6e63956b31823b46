use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{BTreeSet, HashMap};

pub const FAVORITES_KEY: &str = "fashion_muse_favorites";

/// String-keyed blob store backing the favorites set.
pub trait FavoritesStorage {
  fn get_item(&self, key: &str) -> Result<Option<String>, String>;
  fn set_item(&mut self, key: &str, value: &str) -> Result<(), String>;
}

#[derive(Default, Debug, Clone)]
pub struct MemoryStorage {
  items: HashMap<String, String>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_item(key: &str, value: &str) -> Self {
    let mut storage = Self::default();
    storage.items.insert(key.to_string(), value.to_string());
    storage
  }

  pub fn raw(&self, key: &str) -> Option<&str> {
    self.items.get(key).map(String::as_str)
  }
}

impl FavoritesStorage for MemoryStorage {
  fn get_item(&self, key: &str) -> Result<Option<String>, String> {
    Ok(self.items.get(key).cloned())
  }

  fn set_item(&mut self, key: &str, value: &str) -> Result<(), String> {
    self.items.insert(key.to_string(), value.to_string());
    Ok(())
  }
}

/// Blob store over the `key_value` table of the application database.
pub struct SqliteStorage {
  connection: Connection,
}

impl SqliteStorage {
  pub fn new(connection: Connection) -> Self {
    Self { connection }
  }
}

impl FavoritesStorage for SqliteStorage {
  fn get_item(&self, key: &str) -> Result<Option<String>, String> {
    self
      .connection
      .query_row(
        "SELECT value FROM key_value WHERE key = ?1 LIMIT 1",
        params![key],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| e.to_string())
  }

  fn set_item(&mut self, key: &str, value: &str) -> Result<(), String> {
    self
      .connection
      .execute(
        "INSERT INTO key_value (key, value, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET
           value = excluded.value,
           updated_at = excluded.updated_at",
        params![key, value, crate::now_iso()],
      )
      .map_err(|e| e.to_string())?;
    Ok(())
  }
}

pub struct FavoritesStore<S: FavoritesStorage> {
  storage: S,
  key: String,
}

impl<S: FavoritesStorage> FavoritesStore<S> {
  pub fn new(storage: S) -> Self {
    Self::with_key(storage, FAVORITES_KEY)
  }

  pub fn with_key(storage: S, key: &str) -> Self {
    Self {
      storage,
      key: key.to_string(),
    }
  }

  pub fn storage(&self) -> &S {
    &self.storage
  }

  /// Current set, read fresh from storage. Any failure reads as empty.
  pub fn favorites(&self) -> BTreeSet<String> {
    let stored = match self.storage.get_item(&self.key) {
      Ok(stored) => stored,
      Err(error) => {
        log::error!("Error loading favorites: {}", error);
        return BTreeSet::new();
      }
    };

    let Some(raw) = stored.filter(|raw| !raw.trim().is_empty()) else {
      return BTreeSet::new();
    };

    match serde_json::from_str::<Vec<String>>(&raw) {
      Ok(ids) => ids.into_iter().collect(),
      Err(error) => {
        log::error!("Error parsing favorites: {}", error);
        BTreeSet::new()
      }
    }
  }

  pub fn is_favorite(&self, id: &str) -> bool {
    self.favorites().contains(id)
  }

  /// Flips `primary_id` and carries every related id along with it.
  ///
  /// Only `primary_id` decides the direction: when it is already a member every
  /// related id is removed, otherwise every related id is added. Related ids
  /// default to `[primary_id]`. Returns the new state of `primary_id`.
  pub fn toggle(&mut self, primary_id: &str, related_ids: Option<&[String]>) -> bool {
    let mut favorites = self.favorites();
    let fallback = [primary_id.to_string()];
    let ids_to_toggle = related_ids.unwrap_or(&fallback);

    let is_now_favorite = if favorites.contains(primary_id) {
      for id in ids_to_toggle {
        favorites.remove(id);
      }
      false
    } else {
      for id in ids_to_toggle {
        favorites.insert(id.clone());
      }
      true
    };

    self.persist(&favorites);
    is_now_favorite
  }

  fn persist(&mut self, favorites: &BTreeSet<String>) {
    let serialized = match serde_json::to_string(&favorites.iter().collect::<Vec<_>>()) {
      Ok(serialized) => serialized,
      Err(error) => {
        log::error!("Error serializing favorites: {}", error);
        return;
      }
    };
    if let Err(error) = self.storage.set_item(&self.key, &serialized) {
      log::error!("Error saving favorites: {}", error);
    }
  }
}
