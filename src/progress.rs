//! Progress store: one record per (scenario, prompt), persisted as a whole
//! snapshot after every mutation.
//!
//! The store owns its `ProgressData` exclusively. Storage is injected through
//! `SnapshotStorage` so tests run against `MemoryStorage` instead of disk.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::{ProgressData, UserResponse};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
  #[error("snapshot slot poisoned")]
  Poisoned,
}

/// Durable slot holding one serialized `ProgressData`.
pub trait SnapshotStorage: Send + Sync {
  /// `Ok(None)` when nothing has been saved yet.
  fn load(&self) -> Result<Option<ProgressData>, StorageError>;
  /// Replace any previous snapshot with `data`.
  fn save(&self, data: &ProgressData) -> Result<(), StorageError>;
  fn describe(&self) -> String;
}

/// JSON file on disk. Writes land in a temp file next to the target and are
/// renamed over it, so readers only ever see a complete snapshot.
///
/// Saves are synchronous `std::fs` calls made while the caller holds the
/// store's write lock. Snapshots are a few KB for one learner.
pub struct FileStorage {
  path: PathBuf,
}

impl FileStorage {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl SnapshotStorage for FileStorage {
  fn load(&self) -> Result<Option<ProgressData>, StorageError> {
    if !self.path.exists() {
      return Ok(None);
    }
    let reader = BufReader::new(File::open(&self.path)?);
    Ok(Some(serde_json::from_reader(reader)?))
  }

  fn save(&self, data: &ProgressData) -> Result<(), StorageError> {
    let parent_dir = match self.path.parent() {
      Some(p) if !p.as_os_str().is_empty() => p,
      _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
      let mut writer = BufWriter::new(temp_file.as_file());
      serde_json::to_writer_pretty(&mut writer, data)?;
      writer.flush()?;
    }
    temp_file.persist(&self.path).map_err(|e| e.error)?;
    Ok(())
  }

  fn describe(&self) -> String {
    format!("file:{}", self.path.display())
  }
}

/// In-memory slot. Keeps the serialized form so loads go through serde like the file backend.
#[derive(Default)]
pub struct MemoryStorage {
  slot: Mutex<Option<String>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  /// Seed the slot with raw text, e.g. a corrupted snapshot.
  pub fn with_raw(raw: impl Into<String>) -> Self {
    Self { slot: Mutex::new(Some(raw.into())) }
  }
}

impl SnapshotStorage for MemoryStorage {
  fn load(&self) -> Result<Option<ProgressData>, StorageError> {
    let slot = self.slot.lock().map_err(|_| StorageError::Poisoned)?;
    match slot.as_deref() {
      Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
      None => Ok(None),
    }
  }

  fn save(&self, data: &ProgressData) -> Result<(), StorageError> {
    let raw = serde_json::to_string(data)?;
    *self.slot.lock().map_err(|_| StorageError::Poisoned)? = Some(raw);
    Ok(())
  }

  fn describe(&self) -> String {
    "memory".into()
  }
}

/// Latest score and attempt count for a scenario.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
pub struct ScenarioProgress {
  pub score: Option<u8>,
  pub attempts: u32,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
  pub completed_count: usize,
  pub response_count: usize,
  pub total_score: u32,
  pub average_score: f64,
}

pub struct ProgressStore {
  data: ProgressData,
  storage: Box<dyn SnapshotStorage>,
}

impl ProgressStore {
  /// Load the last snapshot; any failure falls back to an empty store.
  #[instrument(level = "info", skip_all, fields(storage = %storage.describe()))]
  pub fn open(storage: Box<dyn SnapshotStorage>) -> Self {
    let data = match storage.load() {
      Ok(Some(mut data)) => {
        let summed = data.sum_scores();
        if summed != data.total_score {
          warn!(target: "progress", stored = data.total_score, summed, "Snapshot total score drifted; recomputing");
          data.total_score = summed;
        }
        info!(target: "progress", responses = data.responses.len(), completed = data.completed_scenarios.len(), "Loaded progress snapshot");
        data
      }
      Ok(None) => {
        info!(target: "progress", "No progress snapshot yet; starting empty");
        ProgressData::default()
      }
      Err(e) => {
        warn!(target: "progress", error = %e, "Failed to load progress snapshot; starting empty");
        ProgressData::default()
      }
    };
    Self { data, storage }
  }

  pub fn data(&self) -> &ProgressData {
    &self.data
  }

  /// Upsert by (scenario, prompt) and persist. Returns the stored record.
  #[instrument(level = "info", skip(self, response), fields(scenario_id = %response.scenario_id, prompt_id = %response.prompt_id, score = response.score))]
  pub fn record_response(&mut self, response: UserResponse) -> UserResponse {
    let existing = self
      .data
      .responses
      .iter_mut()
      .find(|r| r.scenario_id == response.scenario_id && r.prompt_id == response.prompt_id);

    let stored = match existing {
      Some(slot) => {
        let attempts = slot.attempts + 1;
        *slot = UserResponse { attempts, ..response };
        slot.clone()
      }
      None => {
        let fresh = UserResponse { attempts: 1, ..response };
        self.data.responses.push(fresh.clone());
        fresh
      }
    };

    if !self.data.completed_scenarios.contains(&stored.scenario_id) {
      self.data.completed_scenarios.push(stored.scenario_id.clone());
    }
    self.data.total_score = self.data.sum_scores();

    debug!(target: "progress", attempts = stored.attempts, total_score = self.data.total_score, "Response recorded");
    self.persist();
    stored
  }

  /// First record for the scenario, whichever prompt it belongs to.
  pub fn query(&self, scenario_id: &str) -> ScenarioProgress {
    self
      .data
      .responses
      .iter()
      .find(|r| r.scenario_id == scenario_id)
      .map(|r| ScenarioProgress { score: Some(r.score), attempts: r.attempts })
      .unwrap_or_default()
  }

  pub fn query_prompt(&self, scenario_id: &str, prompt_id: &str) -> ScenarioProgress {
    self
      .data
      .responses
      .iter()
      .find(|r| r.scenario_id == scenario_id && r.prompt_id == prompt_id)
      .map(|r| ScenarioProgress { score: Some(r.score), attempts: r.attempts })
      .unwrap_or_default()
  }

  pub fn is_completed(&self, scenario_id: &str) -> bool {
    self.data.completed_scenarios.iter().any(|id| id == scenario_id)
  }

  pub fn aggregate(&self) -> Aggregate {
    let response_count = self.data.responses.len();
    let average_score = if response_count == 0 {
      0.0
    } else {
      self.data.total_score as f64 / response_count as f64
    };
    Aggregate {
      completed_count: self.data.completed_scenarios.len(),
      response_count,
      total_score: self.data.total_score,
      average_score,
    }
  }

  #[instrument(level = "info", skip(self))]
  pub fn reset(&mut self) {
    self.data = ProgressData::default();
    info!(target: "progress", "Progress reset");
    self.persist();
  }

  fn persist(&self) {
    if let Err(e) = self.storage.save(&self.data) {
      error!(target: "progress", storage = %self.storage.describe(), error = %e, "Failed to persist progress snapshot");
    }
  }
}
