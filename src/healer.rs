use crate::catalog::ItemType;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

pub const DEFAULT_THUMBNAIL_API: &str = "https://thumbnails.roblox.com";
pub const DEFAULT_HEAL_BATCH_SIZE: usize = 5;

/// Resolves asset codes to thumbnail URLs and probes whether a URL still loads.
pub trait ThumbnailService {
  fn is_reachable(&self, url: &str) -> bool;
  fn resolve(&self, code: &str) -> Result<Option<String>, String>;
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealCandidate {
  pub item_type: ItemType,
  pub id: String,
  pub code: String,
  pub name: String,
  pub remote_url: Option<String>,
}

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealReport {
  pub checked: usize,
  pub broken: usize,
  pub repaired: usize,
  pub failed: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Inspection {
  Healthy,
  Skipped,
  Replacement(String),
  Unresolved,
  Failed(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThumbnailEntry {
  state: Option<String>,
  image_url: Option<String>,
}

#[derive(Deserialize)]
struct ThumbnailPayload {
  #[serde(default)]
  data: Vec<ThumbnailEntry>,
}

/// First completed image URL of a thumbnails API response.
pub fn parse_thumbnail_payload(body: &str) -> Result<Option<String>, String> {
  let payload: ThumbnailPayload = serde_json::from_str(body).map_err(|e| e.to_string())?;
  Ok(
    payload
      .data
      .into_iter()
      .next()
      .filter(|entry| entry.state.as_deref() == Some("Completed"))
      .and_then(|entry| entry.image_url)
      .filter(|url| !url.trim().is_empty()),
  )
}

pub struct RobloxThumbnails {
  client: Client,
  api_base: String,
}

impl RobloxThumbnails {
  pub fn new(api_base: &str, timeout: Duration) -> Result<Self, String> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| e.to_string())?;
    Ok(Self {
      client,
      api_base: api_base.trim_end_matches('/').to_string(),
    })
  }

  fn assets_url(&self, code: &str) -> String {
    format!(
      "{}/v1/assets?assetIds={}&size=420x420&format=Png&isCircular=false",
      self.api_base, code
    )
  }
}

impl ThumbnailService for RobloxThumbnails {
  fn is_reachable(&self, url: &str) -> bool {
    match self.client.get(url).header(USER_AGENT, "fashion-muse").send() {
      Ok(response) => response.status().is_success(),
      Err(error) => {
        log::debug!("Thumbnail probe failed for {}: {}", url, error);
        false
      }
    }
  }

  fn resolve(&self, code: &str) -> Result<Option<String>, String> {
    if code.trim().is_empty() {
      return Ok(None);
    }

    let response = self
      .client
      .get(self.assets_url(code.trim()))
      .header(USER_AGENT, "fashion-muse")
      .header(ACCEPT, "application/json")
      .send()
      .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
      return Err(format!(
        "Thumbnail request for {} failed with status {}",
        code,
        response.status()
      ));
    }

    let body = response.text().map_err(|e| e.to_string())?;
    parse_thumbnail_payload(&body)
  }
}

fn inspect<S: ThumbnailService>(candidate: &HealCandidate, service: &S) -> Inspection {
  if candidate.code.trim().is_empty() {
    return Inspection::Skipped;
  }

  if let Some(url) = candidate.remote_url.as_deref() {
    if service.is_reachable(url) {
      return Inspection::Healthy;
    }
  }

  match service.resolve(&candidate.code) {
    Ok(Some(url)) if candidate.remote_url.as_deref() != Some(url.as_str()) => Inspection::Replacement(url),
    Ok(_) => Inspection::Unresolved,
    Err(error) => Inspection::Failed(error),
  }
}

/// Checks candidates in fixed-size batches and repairs broken thumbnails.
///
/// Every candidate of a batch is inspected on its own thread; the next batch
/// starts only after the whole batch finished. `on_repair` runs on the calling
/// thread for each replacement URL. Per-item failures are logged and counted.
pub fn run_auto_healer<S, F>(
  candidates: &[HealCandidate],
  service: &S,
  batch_size: usize,
  mut on_repair: F,
) -> HealReport
where
  S: ThumbnailService + Sync,
  F: FnMut(&HealCandidate, &str) -> Result<(), String>,
{
  let mut report = HealReport::default();
  if candidates.is_empty() {
    return report;
  }

  log::info!("Auto-heal: checking {} thumbnails", candidates.len());

  for batch in candidates.chunks(batch_size.max(1)) {
    let inspections: Vec<Inspection> = thread::scope(|scope| {
      let handles: Vec<_> = batch
        .iter()
        .map(|candidate| scope.spawn(move || inspect(candidate, service)))
        .collect();
      handles
        .into_iter()
        .map(|handle| {
          handle
            .join()
            .unwrap_or_else(|_| Inspection::Failed("thumbnail check panicked".to_string()))
        })
        .collect()
    });

    for (candidate, inspection) in batch.iter().zip(inspections) {
      report.checked += 1;
      match inspection {
        Inspection::Healthy | Inspection::Skipped => {}
        Inspection::Unresolved => {
          report.broken += 1;
          log::warn!("Broken thumbnail for {} ({}), no replacement found", candidate.name, candidate.id);
        }
        Inspection::Failed(error) => {
          report.broken += 1;
          report.failed += 1;
          log::error!("Failed to heal {} ({}): {}", candidate.name, candidate.id, error);
        }
        Inspection::Replacement(url) => {
          report.broken += 1;
          match on_repair(candidate, &url) {
            Ok(()) => {
              report.repaired += 1;
              log::info!("Repaired {} -> {}", candidate.name, url);
            }
            Err(error) => {
              report.failed += 1;
              log::error!("Failed to store repaired URL for {}: {}", candidate.name, error);
            }
          }
        }
      }
    }
  }

  if report.repaired > 0 {
    log::info!("Auto-heal complete. Repaired {} broken images.", report.repaired);
  } else {
    log::info!("Auto-heal complete. All images look healthy.");
  }

  report
}
