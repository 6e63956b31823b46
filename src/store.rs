use crate::catalog::{
  parse_item_name, record_to_item, CatalogItem, CatalogRecord, CategoryCatalog, ItemType, MusicTrack,
};
use crate::grouping::{group_eye_variants, group_texture_variants, PresetGroup, TextureGroup};
use crate::search::Tab;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Plain records as the data source hands them over, before any parsing.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawCatalog {
  #[serde(default)]
  pub facebase_names: Vec<String>,
  #[serde(default)]
  pub item_names: Vec<String>,
  #[serde(default)]
  pub texture_names: Vec<String>,
  #[serde(default)]
  pub facebase_records: Vec<CatalogRecord>,
  #[serde(default)]
  pub avatar_records: Vec<CatalogRecord>,
  #[serde(default)]
  pub texture_records: Vec<CatalogRecord>,
  #[serde(default)]
  pub music_tracks: Vec<MusicTrack>,
  #[serde(default)]
  pub categories: Option<CategoryCatalog>,
}

#[derive(Clone, Debug, Default)]
pub struct CatalogStore {
  pub facebase_items: Vec<CatalogItem>,
  pub facebase_groups: Vec<PresetGroup>,
  pub categories: CategoryCatalog,
  pub avatar_items: Vec<CatalogItem>,
  pub texture_items: Vec<CatalogItem>,
  pub texture_groups: Vec<TextureGroup>,
  pub music_tracks: Vec<MusicTrack>,
  loaded: bool,
  initialized_tabs: BTreeSet<Tab>,
}

/// Static names first, then stored records. A record whose id is already
/// listed takes over that slot so ids stay unique per catalog.
fn collect_items(names: &[String], records: &[CatalogRecord], item_type: ItemType) -> Vec<CatalogItem> {
  let mut items: Vec<CatalogItem> = names
    .iter()
    .map(|name| name.trim())
    .filter(|name| !name.is_empty())
    .map(|name| parse_item_name(name, item_type))
    .collect();
  let mut positions: HashMap<String, usize> = HashMap::new();
  for (index, item) in items.iter().enumerate() {
    positions.entry(item.id.clone()).or_insert(index);
  }

  for record in records {
    let item = record_to_item(record, item_type);
    match positions.get(&item.id) {
      Some(&index) => {
        log::debug!("Stored {} entry {} replaces the static one", item_type.label(), item.id);
        items[index] = item;
      }
      None => {
        positions.insert(item.id.clone(), items.len());
        items.push(item);
      }
    }
  }
  items
}

impl CatalogStore {
  pub fn build(raw: RawCatalog) -> Self {
    let facebase_items = collect_items(&raw.facebase_names, &raw.facebase_records, ItemType::FacePreset);
    let avatar_items = collect_items(&raw.item_names, &raw.avatar_records, ItemType::AvatarPiece);
    let texture_items = collect_items(&raw.texture_names, &raw.texture_records, ItemType::Texture);

    let facebase_groups = group_eye_variants(&facebase_items);
    let texture_groups = group_texture_variants(&texture_items);

    log::info!(
      "Catalog loaded. Facebases: {} ({} groups), Avatars: {}, Textures: {} ({} groups), Music: {}",
      facebase_items.len(),
      facebase_groups.len(),
      avatar_items.len(),
      texture_items.len(),
      texture_groups.len(),
      raw.music_tracks.len()
    );

    Self {
      facebase_items,
      facebase_groups,
      categories: raw.categories.unwrap_or_default(),
      avatar_items,
      texture_items,
      texture_groups,
      music_tracks: raw.music_tracks,
      loaded: true,
      initialized_tabs: BTreeSet::new(),
    }
  }

  /// Rebuilds every collection from a fresh payload. Tab flags start over.
  pub fn replace(&mut self, raw: RawCatalog) {
    *self = Self::build(raw);
  }

  pub fn is_loaded(&self) -> bool {
    self.loaded
  }

  /// Returns true the first time a tab is marked.
  pub fn mark_tab_initialized(&mut self, tab: Tab) -> bool {
    self.initialized_tabs.insert(tab)
  }

  pub fn is_tab_initialized(&self, tab: Tab) -> bool {
    self.initialized_tabs.contains(&tab)
  }

  pub fn items_of(&self, item_type: ItemType) -> &[CatalogItem] {
    match item_type {
      ItemType::Texture => &self.texture_items,
      ItemType::FacePreset => &self.facebase_items,
      ItemType::AvatarPiece => &self.avatar_items,
      ItemType::MusicTrack => &[],
    }
  }

  pub fn avatar_categories(&self) -> Vec<String> {
    let categories: BTreeSet<String> = self
      .avatar_items
      .iter()
      .map(|item| item.group.clone())
      .filter(|group| !group.is_empty())
      .collect();
    categories.into_iter().collect()
  }

  pub fn music_categories(&self) -> Vec<String> {
    let categories: BTreeSet<String> = self
      .music_tracks
      .iter()
      .filter_map(|track| track.category.clone())
      .filter(|category| !category.is_empty())
      .collect();
    categories.into_iter().collect()
  }

  /// Preset group holding `id`, used to expand a favorited face preset back to its card.
  pub fn preset_group_for(&self, id: &str) -> Option<&PresetGroup> {
    self.facebase_groups.iter().find(|group| group.contains_id(id))
  }
}
