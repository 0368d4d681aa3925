//! Application state: scenario catalog, progress store, and speech capability.
//!
//! This module owns:
//!   - the read-only catalog (config scenarios + built-in seeds)
//!   - the progress store behind a single lock, so mutations never interleave
//!   - the speech capability (OpenAI transcription or unavailable)

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::openai::OpenAI;
use crate::progress::{FileStorage, ProgressStore, SnapshotStorage};
use crate::speech::SpeechCapability;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub progress: Arc<RwLock<ProgressStore>>,
    pub speech: SpeechCapability,
}

impl AppState {
    /// Build state from env: load config, build the catalog, open progress, init speech.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Self {
        let cfg = AppConfig::from_env();

        let speech = match OpenAI::from_env() {
            Some(oa) if cfg.speech.enabled => {
                info!(target: "deutsch_ueben", base_url = %oa.base_url, transcribe_model = %oa.transcribe_model, locale = %cfg.speech.locale, "Speech recognition enabled.");
                SpeechCapability::Available { transcriber: Arc::new(oa), locale: cfg.speech.locale.clone() }
            }
            Some(_) => {
                info!(target: "deutsch_ueben", "Speech recognition disabled by config. Manual text entry only.");
                SpeechCapability::Unavailable
            }
            None => {
                info!(target: "deutsch_ueben", "Speech recognition disabled (no OPENAI_API_KEY). Manual text entry only.");
                SpeechCapability::Unavailable
            }
        };

        let storage = FileStorage::new(cfg.storage.path.clone());
        Self::new(Catalog::build(cfg.scenarios), Box::new(storage), speech)
    }

    pub fn new(catalog: Catalog, storage: Box<dyn SnapshotStorage>, speech: SpeechCapability) -> Self {
        Self {
            catalog: Arc::new(catalog),
            progress: Arc::new(RwLock::new(ProgressStore::open(storage))),
            speech,
        }
    }
}
