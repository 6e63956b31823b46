use fashion_muse::catalog::ItemType;
use fashion_muse::config::AppConfig;
use fashion_muse::database::{add_catalog_entry, open_database, AddCatalogEntryInput, AdminSession};
use fashion_muse::favorites::{FavoritesStore, SqliteStorage};
use fashion_muse::search::{FavoriteRecord, TabResults};
use fashion_muse::source::{CatalogSource, JsonDirectorySource};
use fashion_muse::store::CatalogStore;
use fashion_muse::{filter, AppState, SearchQuery, Tab};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_json(root: &Path, relative: &str, value: serde_json::Value) {
  let path = root.join(relative);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, serde_json::to_string(&value).unwrap()).unwrap();
}

fn seed_static_catalog(root: &Path) {
  write_json(
    root,
    "photos/facebases/facebases.json",
    json!(["Brazil-Bronze_101", "Brazil-Bronze-X_102", "Chile-Gold-X_103"]),
  );
  write_json(
    root,
    "photos/facebases/categories.json",
    json!({
      "countries": [{ "name": "Brazil", "iso": "BR" }],
      "others": [{ "name": "Drag", "flag": "photos/app/drag.png" }]
    }),
  );
  write_json(root, "photos/items/items.json", json!(["Hair-Nicki SL Black_14507337010"]));
  write_json(
    root,
    "photos/textures/textures.json",
    json!(["S-Peacock Blue_201", "T-Peacock Red_202", "M-Milan Blue_203", "S-Solo_204"]),
  );
  write_json(
    root,
    "music.json",
    json!([
      { "id": "301", "title": "Runway Walk", "artist": "DJ Muse", "category": "Runway & Pageant", "pitch": 0 },
      { "id": "302", "title": "Lofi Rain", "category": "Chill & LoFi", "markers": ["rain"] }
    ]),
  );
}

fn config_for(root: &Path) -> AppConfig {
  AppConfig::from_toml(&format!("data_dir = {:?}", root.display().to_string())).unwrap()
}

#[test]
fn loads_and_groups_static_catalog() {
  let dir = tempdir().unwrap();
  seed_static_catalog(dir.path());

  let raw = JsonDirectorySource::new(dir.path()).load().unwrap();
  let store = CatalogStore::build(raw);

  assert_eq!(store.facebase_items.len(), 3);
  // Chile Gold only has an X variant, so it never surfaces.
  assert_eq!(store.facebase_groups.len(), 1);
  assert_eq!(store.texture_groups.len(), 3);
  assert_eq!(store.texture_groups[0].variants.len(), 2);
  assert!(store.categories.flag_lookup().contains_key("BRAZIL"));
  assert_eq!(store.music_tracks.len(), 2);
}

#[test]
fn missing_resource_names_the_file() {
  let dir = tempdir().unwrap();
  seed_static_catalog(dir.path());
  fs::remove_file(dir.path().join("photos/items/items.json")).unwrap();

  let error = JsonDirectorySource::new(dir.path()).load().unwrap_err();
  assert!(error.contains("Items"), "{}", error);
}

#[test]
fn favorites_survive_reopening_the_database() {
  let dir = tempdir().unwrap();
  let state = AppState::open(config_for(dir.path())).unwrap();

  {
    let mut favorites = state.favorites().unwrap();
    let group = vec!["a".to_string(), "b".to_string()];
    assert!(favorites.toggle("a", Some(&group)));
  }

  let reopened = FavoritesStore::with_key(
    SqliteStorage::new(open_database(&state.db_path).unwrap()),
    &state.config.favorites_key,
  );
  assert!(reopened.is_favorite("a"));
  assert!(reopened.is_favorite("b"));
}

#[test]
fn admin_entries_join_static_catalog_and_favorites_view() {
  let dir = tempdir().unwrap();
  seed_static_catalog(dir.path());
  let state = AppState::open(config_for(dir.path())).unwrap();

  let connection = open_database(&state.db_path).unwrap();
  add_catalog_entry(
    &connection,
    &AdminSession::signed_in("admin"),
    &AddCatalogEntryInput {
      item_type: ItemType::Texture,
      roblox_id: "205".to_string(),
      name: "Peacock Green".to_string(),
      category: Some("s".to_string()),
      base_name: Some("Peacock".to_string()),
      remote_url: None,
    },
  )
  .unwrap();

  let mut catalog = state.load_catalog().unwrap();
  assert!(catalog.mark_tab_initialized(Tab::Textures));
  let peacock = &catalog.texture_groups[0];
  assert_eq!(peacock.variants.len(), 3);
  assert!(peacock.variants[2].image_source.contains("assetId=205"));

  let mut favorites = state.favorites().unwrap();
  favorites.toggle(&peacock.main_variant.id.clone(), Some(&peacock.related_ids()));
  favorites.toggle("301", None);

  let results = filter(&catalog, &favorites, Tab::Favorites, &SearchQuery::new("", "all"));
  let TabResults::Favorites(entries) = results else {
    panic!("expected favorites results");
  };
  assert_eq!(entries.len(), 4);
  assert!(entries[..3].iter().all(|entry| entry.source == ItemType::Texture));
  assert!(matches!(entries[3].record, FavoriteRecord::Track(track) if track.title == "Runway Walk"));

  let searched = filter(&catalog, &favorites, Tab::Favorites, &SearchQuery::new("green", "all"));
  assert_eq!(searched.len(), 1);
}

#[test]
fn stored_entry_with_static_code_keeps_ids_unique() {
  let dir = tempdir().unwrap();
  seed_static_catalog(dir.path());
  let state = AppState::open(config_for(dir.path())).unwrap();

  let connection = open_database(&state.db_path).unwrap();
  add_catalog_entry(
    &connection,
    &AdminSession::signed_in("admin"),
    &AddCatalogEntryInput {
      item_type: ItemType::Texture,
      roblox_id: "201".to_string(),
      name: "Peacock Blue".to_string(),
      category: Some("S".to_string()),
      base_name: Some("Peacock".to_string()),
      remote_url: Some("https://tr.rbxcdn.com/peacock-blue".to_string()),
    },
  )
  .unwrap();

  let catalog = state.load_catalog().unwrap();
  let matching = catalog.texture_items.iter().filter(|item| item.id == "201").count();
  assert_eq!(matching, 1);
  assert_eq!(catalog.texture_items[0].image_source, "https://tr.rbxcdn.com/peacock-blue");

  let peacock = &catalog.texture_groups[0];
  assert_eq!(peacock.main_variant.id, "201");
  assert_eq!(peacock.variants.len(), 2);

  let mut favorites = state.favorites().unwrap();
  favorites.toggle("201", None);
  let results = filter(&catalog, &favorites, Tab::Favorites, &SearchQuery::new("", "all"));
  assert_eq!(results.len(), 1);
}

#[test]
fn healing_requires_a_signed_in_admin() {
  let dir = tempdir().unwrap();
  let state = AppState::open(config_for(dir.path())).unwrap();

  let error = state.heal_thumbnails(&AdminSession::default()).unwrap_err();
  assert!(error.contains("sign-in"), "{}", error);

  let blank = AdminSession { user: Some("  ".to_string()) };
  assert!(state.heal_thumbnails(&blank).is_err());
}

#[test]
fn tab_results_serialize_for_the_ui() {
  let dir = tempdir().unwrap();
  seed_static_catalog(dir.path());
  let state = AppState::open(config_for(dir.path())).unwrap();
  let catalog = state.load_catalog().unwrap();
  let favorites = state.favorites().unwrap();

  let results = filter(&catalog, &favorites, Tab::FacePresets, &SearchQuery::new("bronze", "Brazil"));
  let value = serde_json::to_value(&results).unwrap();
  assert_eq!(value["tab"], "facebases");
  assert_eq!(value["results"][0]["baseDisplayName"], "Bronze");
  assert_eq!(value["results"][0]["variants"]["X"]["codeId"], "102");
}
