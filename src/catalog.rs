use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const TEXTURES_PATH: &str = "photos/textures";
pub const FACEBASES_PATH: &str = "photos/facebases";
pub const ITEMS_PATH: &str = "photos/items";
pub const FALLBACK_IMAGE: &str = "photos/app/logo.svg";
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemType {
  #[serde(rename = "texture")]
  Texture,
  #[serde(rename = "facebase")]
  FacePreset,
  #[serde(rename = "avatar")]
  AvatarPiece,
  #[serde(rename = "music")]
  MusicTrack,
}

impl ItemType {
  pub const ALL: [ItemType; 4] = [
    ItemType::FacePreset,
    ItemType::AvatarPiece,
    ItemType::Texture,
    ItemType::MusicTrack,
  ];

  pub fn label(self) -> &'static str {
    match self {
      ItemType::Texture => "texture",
      ItemType::FacePreset => "facebase",
      ItemType::AvatarPiece => "avatar",
      ItemType::MusicTrack => "music",
    }
  }

  /// Document collection holding records of this type.
  pub fn collection(self) -> &'static str {
    match self {
      ItemType::Texture => "textures",
      ItemType::FacePreset => "facebases",
      ItemType::AvatarPiece => "avatar",
      ItemType::MusicTrack => "music",
    }
  }

  pub fn asset_dir(self) -> &'static str {
    match self {
      ItemType::Texture => TEXTURES_PATH,
      ItemType::FacePreset => FACEBASES_PATH,
      ItemType::AvatarPiece | ItemType::MusicTrack => ITEMS_PATH,
    }
  }

  pub fn from_label(value: &str) -> Option<ItemType> {
    match value.trim().to_lowercase().as_str() {
      "texture" | "textures" => Some(ItemType::Texture),
      "facebase" | "facebases" => Some(ItemType::FacePreset),
      "avatar" => Some(ItemType::AvatarPiece),
      "music" => Some(ItemType::MusicTrack),
      _ => None,
    }
  }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
  pub id: String,
  pub group: String,
  pub display_name: String,
  pub code_id: String,
  pub image_source: String,
  pub item_type: ItemType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub base_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MusicTrack {
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub artist: Option<String>,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default)]
  pub markers: Vec<String>,
  #[serde(default)]
  pub pitch: Option<f64>,
}

impl MusicTrack {
  pub fn has_pitch(&self) -> bool {
    matches!(self.pitch, Some(pitch) if pitch != 0.0)
  }
}

/// A row of the document store, as the admin form writes it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub roblox_id: Option<String>,
  pub name: String,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default, rename = "type")]
  pub item_type: Option<String>,
  #[serde(default)]
  pub remote_url: Option<String>,
  #[serde(default)]
  pub base_name: Option<String>,
  #[serde(default)]
  pub date_added: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CountryCategory {
  pub name: String,
  pub iso: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OtherCategory {
  pub name: String,
  pub flag: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct CategoryCatalog {
  #[serde(default)]
  pub countries: Vec<CountryCategory>,
  #[serde(default)]
  pub others: Vec<OtherCategory>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FlagBadge {
  Emoji { emoji: String, name: String },
  Image { path: String, name: String },
}

impl CategoryCatalog {
  pub fn country_names(&self) -> Vec<String> {
    self.countries.iter().map(|country| country.name.clone()).collect()
  }

  /// Badge per category, keyed by the uppercased name the parser assigns as group.
  pub fn flag_lookup(&self) -> HashMap<String, FlagBadge> {
    let mut lookup = HashMap::new();
    for country in &self.countries {
      if let Some(iso) = country.iso.as_deref().filter(|iso| !iso.trim().is_empty()) {
        lookup.insert(
          country.name.to_uppercase(),
          FlagBadge::Emoji {
            emoji: flag_emoji(iso),
            name: country.name.clone(),
          },
        );
      }
    }
    for other in &self.others {
      if let Some(flag) = other.flag.as_deref().filter(|flag| !flag.trim().is_empty()) {
        lookup.insert(
          other.name.to_uppercase(),
          FlagBadge::Image {
            path: flag.to_string(),
            name: other.name.clone(),
          },
        );
      }
    }
    lookup
  }
}

pub fn flag_emoji(country_code: &str) -> String {
  country_code
    .trim()
    .to_uppercase()
    .chars()
    .filter(|c| c.is_ascii_uppercase())
    .filter_map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
    .collect()
}

pub fn texture_kind_label(code: &str) -> String {
  match code {
    "M" => "Mesh (M)".to_string(),
    "T" => "Translucid (T)".to_string(),
    "S" => "Solid (S)".to_string(),
    other => other.to_string(),
  }
}

pub fn is_numeric_code(value: &str) -> bool {
  !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// Splits `Label_12345` into the label and its trailing numeric code.
/// Only the last underscore counts, and only when a numeric token follows it.
pub fn split_code_suffix(raw_name: &str) -> (&str, &str) {
  if let Some(index) = raw_name.rfind('_') {
    let maybe_code = raw_name[index + 1..].trim();
    if is_numeric_code(maybe_code) {
      return (&raw_name[..index], maybe_code);
    }
  }
  (raw_name, "")
}

fn spaced(text: &str) -> String {
  text.replace(['-', '_'], " ")
}

pub fn parse_item_name(raw_name: &str, item_type: ItemType) -> CatalogItem {
  let (label, code_id) = split_code_suffix(raw_name);

  let (group, display_name) = match item_type {
    ItemType::Texture => {
      let mut parts = label.split('-');
      let group = parts.next().unwrap_or_default().to_string();
      let rest: Vec<&str> = parts.collect();
      (group, spaced(&rest.join("-")))
    }
    _ => {
      let group = match label.split('-').next() {
        Some(first) if !first.is_empty() => first.to_string(),
        _ => UNCATEGORIZED.to_string(),
      };
      let prefix = format!("{}-", group);
      let remainder = label.strip_prefix(prefix.as_str()).unwrap_or(label);
      (group, spaced(remainder))
    }
  };

  let id = if item_type == ItemType::Texture && !code_id.is_empty() {
    code_id.to_string()
  } else {
    raw_name.to_string()
  };

  CatalogItem {
    id,
    group: group.to_uppercase(),
    display_name,
    code_id: code_id.to_string(),
    image_source: format!("{}/{}.webp", item_type.asset_dir(), raw_name),
    item_type,
    base_name: None,
  }
}

pub fn roblox_thumbnail_url(asset_id: &str) -> String {
  if !is_numeric_code(asset_id.trim()) {
    return FALLBACK_IMAGE.to_string();
  }
  format!(
    "https://www.roblox.com/asset-thumbnail/image?assetId={}&width=420&height=420&format=png",
    asset_id.trim()
  )
}

pub fn record_to_item(record: &CatalogRecord, item_type: ItemType) -> CatalogItem {
  let code_id = record
    .roblox_id
    .as_deref()
    .map(str::trim)
    .filter(|code| is_numeric_code(code))
    .unwrap_or_default()
    .to_string();

  let id = if record.id.trim().is_empty() {
    code_id.clone()
  } else {
    record.id.trim().to_string()
  };

  let group = record
    .category
    .as_deref()
    .map(str::trim)
    .filter(|category| !category.is_empty())
    .unwrap_or(UNCATEGORIZED)
    .to_uppercase();

  let image_source = match record.remote_url.as_deref().filter(|url| !url.trim().is_empty()) {
    Some(url) => url.to_string(),
    None => roblox_thumbnail_url(&code_id),
  };

  CatalogItem {
    id,
    group,
    display_name: record.name.trim().to_string(),
    code_id,
    image_source,
    item_type,
    base_name: record
      .base_name
      .as_deref()
      .map(str::trim)
      .filter(|name| !name.is_empty())
      .map(str::to_string),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_trailing_numeric_code() {
    let item = parse_item_name("A-B_12345", ItemType::AvatarPiece);
    assert_eq!(item.code_id, "12345");
    assert_eq!(split_code_suffix("A-B_12345"), ("A-B", "12345"));
    assert_eq!(item.group, "A");
    assert_eq!(item.display_name, "B");
  }

  #[test]
  fn non_numeric_suffix_keeps_whole_label() {
    assert_eq!(split_code_suffix("A-B_notanumber"), ("A-B_notanumber", ""));
    let item = parse_item_name("A-B_notanumber", ItemType::AvatarPiece);
    assert_eq!(item.code_id, "");
    assert_eq!(item.display_name, "B notanumber");
    assert_eq!(item.id, "A-B_notanumber");
  }

  #[test]
  fn only_the_last_underscore_is_considered() {
    let item = parse_item_name("S-Old_Town 2 Blue_998877", ItemType::Texture);
    assert_eq!(item.code_id, "998877");
    assert_eq!(item.group, "S");
    assert_eq!(item.display_name, "Old Town 2 Blue");
    assert_eq!(item.id, "998877");
  }

  #[test]
  fn texture_without_code_uses_raw_name_as_id() {
    let item = parse_item_name("M-Milan-Night Red", ItemType::Texture);
    assert_eq!(item.id, "M-Milan-Night Red");
    assert_eq!(item.group, "M");
    assert_eq!(item.display_name, "Milan Night Red");
    assert_eq!(item.image_source, "photos/textures/M-Milan-Night Red.webp");
  }

  #[test]
  fn face_preset_keeps_full_name_as_id() {
    let item = parse_item_name("Brazil-Natural_X_12345", ItemType::FacePreset);
    assert_eq!(item.id, "Brazil-Natural_X_12345");
    assert_eq!(item.group, "BRAZIL");
    assert_eq!(item.display_name, "Natural X");
    assert_eq!(item.code_id, "12345");
    assert_eq!(item.image_source, "photos/facebases/Brazil-Natural_X_12345.webp");
  }

  #[test]
  fn empty_name_degrades_without_panicking() {
    let item = parse_item_name("", ItemType::FacePreset);
    assert_eq!(item.group, UNCATEGORIZED.to_uppercase());
    assert_eq!(item.display_name, "");
    assert_eq!(item.code_id, "");

    let texture = parse_item_name("", ItemType::Texture);
    assert_eq!(texture.group, "");
    assert_eq!(texture.id, "");
  }

  #[test]
  fn record_falls_back_to_thumbnail_redirect() {
    let record = CatalogRecord {
      id: String::new(),
      roblox_id: Some("4455".to_string()),
      name: "Peacock".to_string(),
      category: Some("s".to_string()),
      ..CatalogRecord::default()
    };
    let item = record_to_item(&record, ItemType::Texture);
    assert_eq!(item.id, "4455");
    assert_eq!(item.group, "S");
    assert!(item.image_source.contains("assetId=4455"));
    assert_eq!(roblox_thumbnail_url("abc"), FALLBACK_IMAGE);
  }

  #[test]
  fn builds_flag_lookup_from_iso_and_paths() {
    let categories = CategoryCatalog {
      countries: vec![CountryCategory {
        name: "Brazil".to_string(),
        iso: Some("br".to_string()),
      }],
      others: vec![OtherCategory {
        name: "Drag".to_string(),
        flag: Some("photos/app/drag.png".to_string()),
      }],
    };
    let lookup = categories.flag_lookup();
    assert_eq!(
      lookup.get("BRAZIL"),
      Some(&FlagBadge::Emoji {
        emoji: "\u{1F1E7}\u{1F1F7}".to_string(),
        name: "Brazil".to_string()
      })
    );
    assert!(matches!(lookup.get("DRAG"), Some(FlagBadge::Image { .. })));
    assert_eq!(flag_emoji(""), "");
  }
}
