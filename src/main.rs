use clap::{Parser, Subcommand};
use fashion_muse::catalog::{texture_kind_label, CatalogItem, ItemType, MusicTrack};
use fashion_muse::config::AppConfig;
use fashion_muse::database::{
  add_catalog_entry, catalog_state_hash, count_catalog_entries, delete_catalog_entry, open_database,
  AddCatalogEntryInput, AdminSession,
};
use fashion_muse::search::{FavoriteRecord, TabResults};
use fashion_muse::{filter, init_logging, AppState, SearchQuery, Tab};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fashion-muse", about = "Browse and curate the Fashion Muse asset catalog")]
struct Cli {
  /// TOML configuration file.
  #[arg(long, default_value = "fashion_muse.toml")]
  config: PathBuf,
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Show what one tab displays for a query.
  List {
    #[arg(long, default_value = "textures")]
    tab: Tab,
    #[arg(long, default_value = "")]
    query: String,
    #[arg(long, default_value = "all")]
    category: String,
    #[arg(long)]
    json: bool,
  },
  /// Toggle a favorite. Pass every id of a variant group with --related.
  Favorite {
    id: String,
    #[arg(long = "related")]
    related: Vec<String>,
  },
  /// Print the stored favorite ids.
  Favorites,
  /// Add a catalog entry.
  Add {
    #[arg(long = "type")]
    item_type: String,
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    code: String,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    base_name: Option<String>,
    #[arg(long)]
    url: Option<String>,
    #[arg(long, env = "FASHION_MUSE_USER")]
    user: Option<String>,
  },
  /// Remove a catalog entry.
  Remove {
    #[arg(long = "type")]
    item_type: String,
    #[arg(long)]
    id: String,
    #[arg(long, env = "FASHION_MUSE_USER")]
    user: Option<String>,
  },
  /// Re-resolve broken thumbnail URLs.
  Heal {
    #[arg(long, env = "FASHION_MUSE_USER")]
    user: Option<String>,
  },
  /// Print the content hash of the stored catalog.
  Hash,
}

fn parse_item_type(value: &str) -> Result<ItemType, String> {
  ItemType::from_label(value).ok_or_else(|| format!("Unknown item type '{}'.", value))
}

fn describe_item(item: &CatalogItem) -> String {
  let code = if item.code_id.is_empty() { "-" } else { item.code_id.as_str() };
  format!("{:<10} {:<14} {:<32} {}", item.item_type.label(), item.group, item.display_name, code)
}

fn describe_track(track: &MusicTrack) -> String {
  format!(
    "{:<10} {:<14} {:<32} {}{}",
    "music",
    track.category.as_deref().unwrap_or("Uncategorized"),
    track.title,
    track.id,
    if track.has_pitch() { " [PITCH]" } else { "" }
  )
}

fn print_results(results: &TabResults<'_>) {
  match results {
    TabResults::FacePresets(groups) => {
      for group in groups {
        let variants: Vec<&str> = group.variants.keys().map(|key| key.label()).collect();
        println!("{}  [{}]", describe_item(&group.default_item), variants.join(","));
      }
    }
    TabResults::Avatar(items) => {
      for item in items {
        println!("{}", describe_item(item));
      }
    }
    TabResults::Textures(groups) => {
      for group in groups {
        let badge = match group.other_variants_count() {
          0 => String::new(),
          count => format!("  {}+", count),
        };
        println!(
          "{:<16} {:<32} {}{}",
          texture_kind_label(&group.group),
          group.base_name,
          group.main_variant.id,
          badge
        );
      }
    }
    TabResults::Music(tracks) => {
      for track in tracks {
        println!("{}", describe_track(track));
      }
    }
    TabResults::Favorites(entries) => {
      for entry in entries {
        match entry.record {
          FavoriteRecord::Item(item) => println!("{}", describe_item(item)),
          FavoriteRecord::Track(track) => println!("{}", describe_track(track)),
        }
      }
    }
  }
  if results.is_empty() {
    println!("No results found.");
  }
}

fn run(cli: Cli) -> Result<(), String> {
  let config = AppConfig::load(&cli.config)?;
  let state = AppState::open(config)?;

  match cli.command {
    Command::List {
      tab,
      query,
      category,
      json,
    } => {
      let mut catalog = state.load_catalog()?;
      catalog.mark_tab_initialized(tab);
      let favorites = state.favorites()?;
      let results = filter(&catalog, &favorites, tab, &SearchQuery::new(&query, &category));
      if json {
        println!(
          "{}",
          serde_json::to_string_pretty(&results).map_err(|e| e.to_string())?
        );
      } else {
        print_results(&results);
      }
    }
    Command::Favorite { id, related } => {
      let mut favorites = state.favorites()?;
      let related = if related.is_empty() { None } else { Some(related) };
      let is_favorite = favorites.toggle(&id, related.as_deref());
      println!("{} {}", if is_favorite { "Added" } else { "Removed" }, id);
    }
    Command::Favorites => {
      for id in state.favorites()?.favorites() {
        println!("{}", id);
      }
    }
    Command::Add {
      item_type,
      name,
      code,
      category,
      base_name,
      url,
      user,
    } => {
      let connection = open_database(&state.db_path)?;
      let input = AddCatalogEntryInput {
        item_type: parse_item_type(&item_type)?,
        roblox_id: code,
        name,
        category,
        base_name,
        remote_url: url,
      };
      let record = add_catalog_entry(&connection, &AdminSession { user }, &input)?;
      println!("Saved {} ({})", record.name, record.id);
    }
    Command::Remove { item_type, id, user } => {
      let connection = open_database(&state.db_path)?;
      let removed = delete_catalog_entry(&connection, &AdminSession { user }, parse_item_type(&item_type)?, &id)?;
      println!("{}", if removed { "Removed" } else { "Nothing to remove" });
    }
    Command::Heal { user } => {
      let report = state.heal_thumbnails(&AdminSession { user })?;
      println!(
        "Checked {}, broken {}, repaired {}, failed {}",
        report.checked, report.broken, report.repaired, report.failed
      );
    }
    Command::Hash => {
      let connection = open_database(&state.db_path)?;
      println!(
        "{} ({} entries)",
        catalog_state_hash(&connection)?,
        count_catalog_entries(&connection)?
      );
    }
  }

  Ok(())
}

fn main() -> ExitCode {
  init_logging();
  match run(Cli::parse()) {
    Ok(()) => ExitCode::SUCCESS,
    Err(error) => {
      log::error!("{}", error);
      eprintln!("{}", error);
      ExitCode::FAILURE
    }
  }
}
