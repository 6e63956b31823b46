use crate::catalog::{CatalogRecord, ItemType};
use crate::healer::HealCandidate;
use crate::now_iso;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use uuid::Uuid;

const MIGRATION_SQL_0001: &str = include_str!("../migrations/0001_initial.sql");

/// Placeholder the admin form submits when the thumbnail could not be previewed.
pub const HEAL_LATER_SENTINEL: &str = "FORCE_Heal_Me_Later";

/// Who is signed in. Any present user may use the admin surface.
#[derive(Clone, Debug, Default)]
pub struct AdminSession {
  pub user: Option<String>,
}

impl AdminSession {
  pub fn signed_in(user: &str) -> Self {
    Self {
      user: Some(user.to_string()),
    }
  }

  pub fn is_signed_in(&self) -> bool {
    self
      .user
      .as_deref()
      .map_or(false, |user| !user.trim().is_empty())
  }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddCatalogEntryInput {
  pub item_type: ItemType,
  #[serde(default)]
  pub roblox_id: String,
  pub name: String,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default)]
  pub base_name: Option<String>,
  #[serde(default)]
  pub remote_url: Option<String>,
}

pub fn init_database(db_path: &Path) -> Result<(), String> {
  if let Some(parent) = db_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(|e| e.to_string())?;
  }

  let connection = Connection::open(db_path).map_err(|e| e.to_string())?;
  connection
    .execute_batch(MIGRATION_SQL_0001)
    .map_err(|e| e.to_string())?;
  Ok(())
}

pub fn open_database(db_path: &Path) -> Result<Connection, String> {
  Connection::open(db_path).map_err(|e| e.to_string())
}

pub fn require_admin(session: &AdminSession) -> Result<(), String> {
  if !session.is_signed_in() {
    return Err("Admin sign-in is required for catalog changes.".to_string());
  }
  Ok(())
}

fn catalog_collection(item_type: ItemType) -> Result<&'static str, String> {
  if item_type == ItemType::MusicTrack {
    return Err("Music tracks are not stored in the catalog database.".to_string());
  }
  Ok(item_type.collection())
}

fn non_empty(value: Option<&str>) -> Option<String> {
  value
    .map(str::trim)
    .filter(|value| !value.is_empty())
    .map(str::to_string)
}

pub fn add_catalog_entry(
  connection: &Connection,
  session: &AdminSession,
  input: &AddCatalogEntryInput,
) -> Result<CatalogRecord, String> {
  require_admin(session)?;
  let collection = catalog_collection(input.item_type)?;

  let name = input.name.trim().to_string();
  if name.is_empty() {
    return Err("Catalog entry name is required.".to_string());
  }

  let roblox_id = non_empty(Some(input.roblox_id.as_str()));
  let id = roblox_id
    .clone()
    .unwrap_or_else(|| Uuid::new_v4().to_string());
  let remote_url = non_empty(input.remote_url.as_deref()).filter(|url| url != HEAL_LATER_SENTINEL);
  let category = non_empty(input.category.as_deref());
  let base_name = non_empty(input.base_name.as_deref());
  let now = now_iso();

  connection
    .execute(
      "INSERT INTO catalog_entries (
         collection, id, roblox_id, name, category, base_name, item_type,
         remote_url, search_name, date_added, last_healed
       )
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, NULL)
       ON CONFLICT(collection, id) DO UPDATE SET
         roblox_id = excluded.roblox_id,
         name = excluded.name,
         category = excluded.category,
         base_name = excluded.base_name,
         remote_url = excluded.remote_url,
         search_name = excluded.search_name",
      params![
        collection,
        id,
        roblox_id,
        name,
        category,
        base_name,
        input.item_type.label(),
        remote_url,
        name.to_lowercase(),
        now
      ],
    )
    .map_err(|e| e.to_string())?;

  log::info!("Saved {} entry {} ({})", input.item_type.label(), name, id);

  Ok(CatalogRecord {
    id,
    roblox_id,
    name,
    category,
    item_type: Some(input.item_type.label().to_string()),
    remote_url,
    base_name,
    date_added: Some(now),
  })
}

pub fn delete_catalog_entry(
  connection: &Connection,
  session: &AdminSession,
  item_type: ItemType,
  id: &str,
) -> Result<bool, String> {
  require_admin(session)?;
  let collection = catalog_collection(item_type)?;
  let removed = connection
    .execute(
      "DELETE FROM catalog_entries WHERE collection = ?1 AND id = ?2",
      params![collection, id.trim()],
    )
    .map_err(|e| e.to_string())?;
  Ok(removed > 0)
}

pub fn list_catalog_records(connection: &Connection, item_type: ItemType) -> Result<Vec<CatalogRecord>, String> {
  let collection = catalog_collection(item_type)?;
  let mut statement = connection
    .prepare(
      "SELECT id, roblox_id, name, category, item_type, remote_url, base_name, date_added
       FROM catalog_entries
       WHERE collection = ?1
       ORDER BY date_added, rowid",
    )
    .map_err(|e| e.to_string())?;

  let rows = statement
    .query_map(params![collection], |row| {
      Ok(CatalogRecord {
        id: row.get(0)?,
        roblox_id: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        item_type: row.get(4)?,
        remote_url: row.get(5)?,
        base_name: row.get(6)?,
        date_added: row.get(7)?,
      })
    })
    .map_err(|e| e.to_string())?;

  let mut records = Vec::new();
  for row in rows {
    records.push(row.map_err(|e| e.to_string())?);
  }

  Ok(records)
}

pub fn find_remote_url(connection: &Connection, item_type: ItemType, id: &str) -> Result<Option<String>, String> {
  let collection = catalog_collection(item_type)?;
  let found: Option<Option<String>> = connection
    .query_row(
      "SELECT remote_url FROM catalog_entries WHERE collection = ?1 AND id = ?2 LIMIT 1",
      params![collection, id],
      |row| row.get(0),
    )
    .optional()
    .map_err(|e| e.to_string())?;
  Ok(found.flatten())
}

/// Stores a repaired thumbnail URL and stamps when it was healed.
pub fn update_remote_url(connection: &Connection, item_type: ItemType, id: &str, url: &str) -> Result<(), String> {
  let collection = catalog_collection(item_type)?;
  let updated = connection
    .execute(
      "UPDATE catalog_entries
       SET remote_url = ?1, last_healed = ?2
       WHERE collection = ?3 AND id = ?4",
      params![url, now_iso(), collection, id],
    )
    .map_err(|e| e.to_string())?;

  if updated == 0 {
    return Err(format!("Catalog entry not found: {}/{}", collection, id));
  }
  Ok(())
}

pub fn heal_candidates(connection: &Connection) -> Result<Vec<HealCandidate>, String> {
  let mut statement = connection
    .prepare(
      "SELECT item_type, id, roblox_id, name, remote_url
       FROM catalog_entries
       WHERE roblox_id IS NOT NULL AND roblox_id != ''
       ORDER BY collection, rowid",
    )
    .map_err(|e| e.to_string())?;

  let rows = statement
    .query_map([], |row| {
      Ok((
        row.get::<usize, String>(0)?,
        row.get::<usize, String>(1)?,
        row.get::<usize, String>(2)?,
        row.get::<usize, String>(3)?,
        row.get::<usize, Option<String>>(4)?,
      ))
    })
    .map_err(|e| e.to_string())?;

  let mut candidates = Vec::new();
  for row in rows {
    let (item_type, id, code, name, remote_url) = row.map_err(|e| e.to_string())?;
    let Some(item_type) = ItemType::from_label(&item_type) else {
      log::warn!("Skipping entry {} with unknown type '{}'", id, item_type);
      continue;
    };
    candidates.push(HealCandidate {
      item_type,
      id,
      code,
      name,
      remote_url,
    });
  }

  Ok(candidates)
}

pub fn count_catalog_entries(connection: &Connection) -> Result<i64, String> {
  connection
    .query_row("SELECT COUNT(*) FROM catalog_entries", [], |row| row.get(0))
    .map_err(|e| e.to_string())
}

/// Content hash over every entry in a stable order. Equal hashes mean nothing to reload.
pub fn catalog_state_hash(connection: &Connection) -> Result<String, String> {
  let mut statement = connection
    .prepare(
      "SELECT collection, id, COALESCE(roblox_id, ''), name, COALESCE(category, ''),
              COALESCE(base_name, ''), COALESCE(remote_url, '')
       FROM catalog_entries
       ORDER BY collection, id",
    )
    .map_err(|e| e.to_string())?;

  let mut rows = statement.query([]).map_err(|e| e.to_string())?;
  let mut hasher = Sha256::new();

  while let Some(row) = rows.next().map_err(|e| e.to_string())? {
    let mut line = String::new();
    for index in 0..7 {
      let value: String = row.get(index).map_err(|e| e.to_string())?;
      if index > 0 {
        line.push('|');
      }
      line.push_str(&value);
    }
    line.push('\n');
    hasher.update(line.as_bytes());
  }

  Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn memory_database() -> Connection {
    let connection = Connection::open_in_memory().unwrap();
    connection.execute_batch(MIGRATION_SQL_0001).unwrap();
    connection
  }

  fn input(item_type: ItemType, roblox_id: &str, name: &str) -> AddCatalogEntryInput {
    AddCatalogEntryInput {
      item_type,
      roblox_id: roblox_id.to_string(),
      name: name.to_string(),
      category: Some("S".to_string()),
      base_name: None,
      remote_url: Some(HEAL_LATER_SENTINEL.to_string()),
    }
  }

  #[test]
  fn rejects_changes_without_a_user() {
    let connection = memory_database();
    let result = add_catalog_entry(&connection, &AdminSession::default(), &input(ItemType::Texture, "1", "Peacock"));
    assert!(result.is_err());
    assert_eq!(count_catalog_entries(&connection).unwrap(), 0);
  }

  #[test]
  fn stores_sentinel_url_as_missing() {
    let connection = memory_database();
    let session = AdminSession::signed_in("admin@example.com");
    let record = add_catalog_entry(&connection, &session, &input(ItemType::Texture, "55", "Peacock")).unwrap();
    assert_eq!(record.id, "55");
    assert_eq!(record.remote_url, None);
    assert_eq!(find_remote_url(&connection, ItemType::Texture, "55").unwrap(), None);

    let candidates = heal_candidates(&connection).unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].item_type, ItemType::Texture);
  }

  #[test]
  fn generates_id_without_code_and_rejects_music() {
    let connection = memory_database();
    let session = AdminSession::signed_in("admin");
    let record = add_catalog_entry(&connection, &session, &input(ItemType::AvatarPiece, " ", "Bag")).unwrap();
    assert!(Uuid::parse_str(&record.id).is_ok());
    assert!(add_catalog_entry(&connection, &session, &input(ItemType::MusicTrack, "1", "Song")).is_err());
    assert!(add_catalog_entry(&connection, &session, &input(ItemType::Texture, "1", "  ")).is_err());
  }

  #[test]
  fn hash_changes_with_content() {
    let connection = memory_database();
    let session = AdminSession::signed_in("admin");
    let empty = catalog_state_hash(&connection).unwrap();
    add_catalog_entry(&connection, &session, &input(ItemType::Texture, "7", "Peacock")).unwrap();
    let one = catalog_state_hash(&connection).unwrap();
    assert_ne!(empty, one);
    assert_eq!(one, catalog_state_hash(&connection).unwrap());

    update_remote_url(&connection, ItemType::Texture, "7", "https://tr.rbxcdn.com/new").unwrap();
    assert_ne!(one, catalog_state_hash(&connection).unwrap());
    assert!(update_remote_url(&connection, ItemType::Texture, "8", "x").is_err());
  }

  #[test]
  fn deletes_entries() {
    let connection = memory_database();
    let session = AdminSession::signed_in("admin");
    add_catalog_entry(&connection, &session, &input(ItemType::FacePreset, "9", "Bronze")).unwrap();
    assert!(delete_catalog_entry(&connection, &session, ItemType::FacePreset, "9").unwrap());
    assert!(!delete_catalog_entry(&connection, &session, ItemType::FacePreset, "9").unwrap());
    assert!(list_catalog_records(&connection, ItemType::FacePreset).unwrap().is_empty());
  }
}
