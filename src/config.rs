//! Loading app configuration (storage, speech, extra scenarios) from TOML.
//!
//! Env variables take precedence over the file for single values:
//!   PROGRESS_PATH  -> storage.path
//!   SPEECH_LOCALE  -> speech.locale

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Scenario;

pub const DEFAULT_PROGRESS_PATH: &str = "./data/deutsch-ueben-progress.json";
pub const DEFAULT_SPEECH_LOCALE: &str = "de-DE";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub storage: StorageCfg,
  #[serde(default)]
  pub speech: SpeechCfg,
  #[serde(default)]
  pub scenarios: Vec<Scenario>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageCfg {
  #[serde(default = "default_progress_path")]
  pub path: PathBuf,
}

impl Default for StorageCfg {
  fn default() -> Self {
    Self { path: default_progress_path() }
  }
}

fn default_progress_path() -> PathBuf {
  PathBuf::from(DEFAULT_PROGRESS_PATH)
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpeechCfg {
  /// Recognition locale hint, e.g. "de-DE".
  #[serde(default = "default_locale")]
  pub locale: String,
  /// Set to false to force manual text entry even when a key is present.
  #[serde(default = "default_true")]
  pub enabled: bool,
}

impl Default for SpeechCfg {
  fn default() -> Self {
    Self { locale: default_locale(), enabled: true }
  }
}

fn default_locale() -> String {
  DEFAULT_SPEECH_LOCALE.into()
}

fn default_true() -> bool {
  true
}

impl AppConfig {
  pub fn parse(s: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(s)
  }

  /// File config (if any) with env overrides applied.
  pub fn from_env() -> Self {
    let mut cfg = load_app_config_from_env().unwrap_or_default();
    if let Ok(p) = std::env::var("PROGRESS_PATH") {
      if !p.trim().is_empty() {
        cfg.storage.path = PathBuf::from(p);
      }
    }
    if let Ok(l) = std::env::var("SPEECH_LOCALE") {
      if !l.trim().is_empty() {
        cfg.speech.locale = l;
      }
    }
    cfg
  }
}

/// Attempt to load `AppConfig` from APP_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("APP_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match AppConfig::parse(&s) {
      Ok(cfg) => {
        info!(target: "deutsch_ueben", %path, scenarios = cfg.scenarios.len(), "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "deutsch_ueben", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "deutsch_ueben", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Difficulty, Formality};

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = AppConfig::parse("").unwrap();
    assert_eq!(cfg.storage.path, PathBuf::from(DEFAULT_PROGRESS_PATH));
    assert_eq!(cfg.speech.locale, "de-DE");
    assert!(cfg.speech.enabled);
    assert!(cfg.scenarios.is_empty());
  }

  #[test]
  fn parses_storage_speech_and_scenarios() {
    let raw = r#"
[storage]
path = "/tmp/progress.json"

[speech]
locale = "de-AT"
enabled = false

[[scenarios]]
id = "meeting"
title = "Im Meeting"
titleEn = "In a meeting"
icon = "📅"
difficulty = "Fortgeschritten"
formality = "Sie"
context = "Ihre Chefin eröffnet das Meeting."

[[scenarios.prompts]]
id = "opinion"
german = "Was ist Ihre Meinung dazu?"
english = "What is your opinion on this?"
keywords = ["meinung", "vorschlag"]
suggestedResponse = "Meiner Meinung nach ist der Vorschlag gut."
"#;
    let cfg = AppConfig::parse(raw).unwrap();
    assert_eq!(cfg.storage.path, PathBuf::from("/tmp/progress.json"));
    assert_eq!(cfg.speech.locale, "de-AT");
    assert!(!cfg.speech.enabled);

    let sc = &cfg.scenarios[0];
    assert_eq!(sc.difficulty, Difficulty::Advanced);
    assert_eq!(sc.formality, Formality::Formal);
    assert_eq!(sc.context_en, "");
    assert_eq!(sc.prompts[0].keywords, vec!["meinung", "vorschlag"]);
  }

  #[test]
  fn rejects_unknown_formality() {
    let raw = r#"
[[scenarios]]
id = "x"
title = "x"
titleEn = "x"
difficulty = "Anfänger"
formality = "Ihr"
context = "x"
prompts = []
"#;
    assert!(AppConfig::parse(raw).is_err());
  }
}
