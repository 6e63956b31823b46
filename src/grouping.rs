use crate::catalog::CatalogItem;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextureGroup {
  pub group: String,
  pub base_name: String,
  pub main_variant: CatalogItem,
  pub variants: Vec<CatalogItem>,
}

impl TextureGroup {
  /// Count shown on the "N+" badge of a collapsed card.
  pub fn other_variants_count(&self) -> usize {
    self.variants.len().saturating_sub(1)
  }

  pub fn has_picker(&self) -> bool {
    self.variants.len() > 1
  }

  pub fn related_ids(&self) -> Vec<String> {
    self.variants.iter().map(|variant| variant.id.clone()).collect()
  }

  /// Last word of the display name, e.g. "Red" for "Geneve Red".
  pub fn variant_label(item: &CatalogItem) -> &str {
    item
      .display_name
      .rsplit(' ')
      .next()
      .filter(|word| !word.is_empty())
      .unwrap_or(item.display_name.as_str())
  }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariantKey {
  #[serde(rename = "default")]
  Default,
  X,
  S,
}

impl VariantKey {
  fn from_suffix(letter: char) -> Option<VariantKey> {
    match letter.to_ascii_uppercase() {
      'X' => Some(VariantKey::X),
      'S' => Some(VariantKey::S),
      _ => None,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      VariantKey::Default => "default",
      VariantKey::X => "X",
      VariantKey::S => "S",
    }
  }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresetGroup {
  pub group: String,
  pub base_display_name: String,
  pub default_item: CatalogItem,
  pub variants: BTreeMap<VariantKey, CatalogItem>,
}

impl PresetGroup {
  /// Every id of the group, default first. Heart buttons toggle this whole list.
  pub fn related_ids(&self) -> Vec<String> {
    self.variants.values().map(|item| item.id.clone()).collect()
  }

  pub fn variant(&self, key: VariantKey) -> Option<&CatalogItem> {
    self.variants.get(&key)
  }

  pub fn contains_id(&self, id: &str) -> bool {
    self.variants.values().any(|item| item.id == id)
  }
}

fn kind_family(group: &str) -> &str {
  match group {
    "S" | "T" => "ST",
    other => other,
  }
}

/// Base name of a texture: the known one, or the display name minus its last word.
fn texture_base_name(item: &CatalogItem) -> String {
  if let Some(base_name) = item.base_name.as_deref().filter(|name| !name.trim().is_empty()) {
    return base_name.trim().to_string();
  }

  let mut parts: Vec<&str> = item.display_name.split(' ').collect();
  if parts.len() > 1 {
    parts.pop();
  }
  parts.join(" ").trim().to_string()
}

pub fn group_texture_variants(items: &[CatalogItem]) -> Vec<TextureGroup> {
  let mut groups: Vec<TextureGroup> = Vec::new();
  let mut index_by_key: HashMap<String, usize> = HashMap::new();

  for item in items {
    let base_name = texture_base_name(item);
    let key = format!("{}-{}", kind_family(&item.group), base_name.to_lowercase());

    match index_by_key.get(&key) {
      Some(&index) => groups[index].variants.push(item.clone()),
      None => {
        index_by_key.insert(key, groups.len());
        groups.push(TextureGroup {
          group: item.group.clone(),
          base_name,
          main_variant: item.clone(),
          variants: vec![item.clone()],
        });
      }
    }
  }

  groups
}

/// Splits "Bronze X" into ("Bronze", X). Names without a known suffix are the default.
fn split_eye_suffix(display_name: &str) -> (String, VariantKey) {
  let mut chars = display_name.chars().rev();
  if let (Some(letter), Some(' ')) = (chars.next(), chars.next()) {
    if let Some(key) = VariantKey::from_suffix(letter) {
      let stem = &display_name[..display_name.len() - letter.len_utf8() - 1];
      return (stem.trim().to_string(), key);
    }
  }
  (display_name.to_string(), VariantKey::Default)
}

pub fn group_eye_variants(items: &[CatalogItem]) -> Vec<PresetGroup> {
  struct Pending {
    group: String,
    base_display_name: String,
    default_item: Option<CatalogItem>,
    variants: BTreeMap<VariantKey, CatalogItem>,
  }

  let mut pending: Vec<Pending> = Vec::new();
  let mut index_by_key: HashMap<(String, String), usize> = HashMap::new();

  for item in items {
    let (base_display_name, key) = split_eye_suffix(&item.display_name);
    let group_key = (item.group.clone(), base_display_name.clone());

    let index = *index_by_key.entry(group_key).or_insert_with(|| {
      pending.push(Pending {
        group: item.group.clone(),
        base_display_name,
        default_item: None,
        variants: BTreeMap::new(),
      });
      pending.len() - 1
    });

    let entry = &mut pending[index];
    entry.variants.insert(key, item.clone());
    if key == VariantKey::Default {
      entry.default_item = Some(item.clone());
    }
  }

  pending
    .into_iter()
    .filter_map(|entry| {
      let Some(default_item) = entry.default_item else {
        log::debug!(
          "Dropping preset group {}-{} without a default variant",
          entry.group,
          entry.base_display_name
        );
        return None;
      };
      Some(PresetGroup {
        group: entry.group,
        base_display_name: entry.base_display_name,
        default_item,
        variants: entry.variants,
      })
    })
    .collect()
}

/// Sorted kind codes present across every variant, for the category filter.
pub fn texture_categories(groups: &[TextureGroup]) -> Vec<String> {
  let categories: BTreeSet<String> = groups
    .iter()
    .flat_map(|group| group.variants.iter())
    .map(|variant| variant.group.clone())
    .filter(|group| !group.is_empty())
    .collect();
  categories.into_iter().collect()
}
