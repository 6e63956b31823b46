use crate::catalog::{CatalogItem, ItemType, MusicTrack};
use crate::favorites::{FavoritesStorage, FavoritesStore};
use crate::grouping::{PresetGroup, TextureGroup};
use crate::store::CatalogStore;
use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;

pub const ALL_CATEGORIES: &str = "all";

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
  #[serde(rename = "facebases")]
  FacePresets,
  Avatar,
  Textures,
  Music,
  Favorites,
}

impl Tab {
  pub fn key(self) -> &'static str {
    match self {
      Tab::FacePresets => "facebases",
      Tab::Avatar => "avatar",
      Tab::Textures => "textures",
      Tab::Music => "music",
      Tab::Favorites => "favorites",
    }
  }
}

impl FromStr for Tab {
  type Err = String;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value.trim().to_lowercase().as_str() {
      "facebases" | "facebase" => Ok(Tab::FacePresets),
      "avatar" => Ok(Tab::Avatar),
      "textures" | "texture" => Ok(Tab::Textures),
      "music" => Ok(Tab::Music),
      "favorites" => Ok(Tab::Favorites),
      other => Err(format!("Unknown tab '{}'.", other)),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SearchQuery {
  text: String,
  category: Option<String>,
}

impl SearchQuery {
  pub fn new(query: &str, category: &str) -> Self {
    let category = category.trim();
    Self {
      text: query.trim().to_lowercase(),
      category: if category.is_empty() || category == ALL_CATEGORIES {
        None
      } else {
        Some(category.to_string())
      },
    }
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn category(&self) -> Option<&str> {
    self.category.as_deref()
  }

  fn matches_text<'f>(&self, mut fields: impl Iterator<Item = &'f str>) -> bool {
    self.text.is_empty() || fields.any(|field| field.to_lowercase().contains(&self.text))
  }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(untagged)]
pub enum FavoriteRecord<'a> {
  Item(&'a CatalogItem),
  Track(&'a MusicTrack),
}

/// One favorited record, tagged with the catalog it came from.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct FavoriteEntry<'a> {
  pub source: ItemType,
  pub record: FavoriteRecord<'a>,
}

impl<'a> FavoriteEntry<'a> {
  pub fn id(&self) -> &'a str {
    match self.record {
      FavoriteRecord::Item(item) if item.id.is_empty() => &item.code_id,
      FavoriteRecord::Item(item) => &item.id,
      FavoriteRecord::Track(track) => &track.id,
    }
  }

  fn text_fields(&self) -> Vec<&'a str> {
    match self.record {
      FavoriteRecord::Item(item) => vec![item.display_name.as_str(), item.group.as_str()],
      FavoriteRecord::Track(track) => {
        let mut fields = vec![track.title.as_str()];
        if let Some(artist) = track.artist.as_deref() {
          fields.push(artist);
        }
        fields
      }
    }
  }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "tab", content = "results", rename_all = "lowercase")]
pub enum TabResults<'a> {
  #[serde(rename = "facebases")]
  FacePresets(Vec<&'a PresetGroup>),
  Avatar(Vec<&'a CatalogItem>),
  Textures(Vec<&'a TextureGroup>),
  Music(Vec<&'a MusicTrack>),
  Favorites(Vec<FavoriteEntry<'a>>),
}

impl TabResults<'_> {
  pub fn len(&self) -> usize {
    match self {
      TabResults::FacePresets(groups) => groups.len(),
      TabResults::Avatar(items) => items.len(),
      TabResults::Textures(groups) => groups.len(),
      TabResults::Music(tracks) => tracks.len(),
      TabResults::Favorites(entries) => entries.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

pub fn filter_presets<'a>(groups: &'a [PresetGroup], query: &SearchQuery) -> Vec<&'a PresetGroup> {
  let category = query.category().map(str::to_uppercase);
  groups
    .iter()
    .filter(|group| category.as_deref().map_or(true, |category| group.group == category))
    .filter(|group| {
      query.matches_text([group.base_display_name.as_str(), group.group.as_str()].into_iter())
    })
    .collect()
}

pub fn filter_avatar<'a>(items: &'a [CatalogItem], query: &SearchQuery) -> Vec<&'a CatalogItem> {
  items
    .iter()
    .filter(|item| {
      query
        .category()
        .map_or(true, |category| item.group.eq_ignore_ascii_case(category))
    })
    .filter(|item| query.matches_text([item.group.as_str(), item.display_name.as_str()].into_iter()))
    .collect()
}

pub fn filter_textures<'a>(groups: &'a [TextureGroup], query: &SearchQuery) -> Vec<&'a TextureGroup> {
  groups
    .iter()
    .filter(|group| !group.variants.is_empty())
    .filter(|group| {
      query.category().map_or(true, |category| {
        group
          .variants
          .iter()
          .any(|variant| variant.group.eq_ignore_ascii_case(category))
      })
    })
    .filter(|group| {
      let variant_fields = group
        .variants
        .iter()
        .flat_map(|variant| [variant.group.as_str(), variant.display_name.as_str()]);
      query.matches_text(std::iter::once(group.base_name.as_str()).chain(variant_fields))
    })
    .collect()
}

pub fn filter_music<'a>(tracks: &'a [MusicTrack], query: &SearchQuery) -> Vec<&'a MusicTrack> {
  tracks
    .iter()
    .filter(|track| {
      query
        .category()
        .map_or(true, |category| track.category.as_deref() == Some(category))
    })
    .filter(|track| {
      let corpus = format!(
        "{} {} {}",
        track.title,
        track.artist.as_deref().unwrap_or_default(),
        track.markers.join(" ")
      );
      query.matches_text(std::iter::once(corpus.as_str()))
    })
    .collect()
}

/// Flat list of every record across the four catalogs, each tagged with its source.
pub fn merged_entries(store: &CatalogStore) -> Vec<FavoriteEntry<'_>> {
  let mut entries = Vec::new();
  for item_type in ItemType::ALL {
    if item_type == ItemType::MusicTrack {
      entries.extend(store.music_tracks.iter().map(|track| FavoriteEntry {
        source: item_type,
        record: FavoriteRecord::Track(track),
      }));
    } else {
      entries.extend(store.items_of(item_type).iter().map(|item| FavoriteEntry {
        source: item_type,
        record: FavoriteRecord::Item(item),
      }));
    }
  }
  entries
}

pub fn filter_favorites<'a>(
  store: &'a CatalogStore,
  favorites: &BTreeSet<String>,
  query: &SearchQuery,
) -> Vec<FavoriteEntry<'a>> {
  merged_entries(store)
    .into_iter()
    .filter(|entry| !entry.id().is_empty() && favorites.contains(entry.id()))
    .filter(|entry| query.matches_text(entry.text_fields().into_iter()))
    .collect()
}

pub fn filter<'a, S: FavoritesStorage>(
  store: &'a CatalogStore,
  favorites: &FavoritesStore<S>,
  tab: Tab,
  query: &SearchQuery,
) -> TabResults<'a> {
  match tab {
    Tab::FacePresets => TabResults::FacePresets(filter_presets(&store.facebase_groups, query)),
    Tab::Avatar => TabResults::Avatar(filter_avatar(&store.avatar_items, query)),
    Tab::Textures => TabResults::Textures(filter_textures(&store.texture_groups, query)),
    Tab::Music => TabResults::Music(filter_music(&store.music_tracks, query)),
    Tab::Favorites => {
      TabResults::Favorites(filter_favorites(store, &favorites.favorites(), query))
    }
  }
}
