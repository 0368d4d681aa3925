//! Minimal OpenAI-compatible transcription client.
//!
//! We only call `/audio/transcriptions` and read back the `text` field.
//! Calls are instrumented and log model name, latency, and sizes (not contents).
//!
//! NOTE: We never log the API key.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{error, info, instrument};

use crate::speech::{SpeechError, Transcriber};

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub transcribe_model: String,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
  #[serde(default)]
  text: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    if api_key.trim().is_empty() {
      return None;
    }
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let transcribe_model =
      std::env::var("OPENAI_TRANSCRIBE_MODEL").unwrap_or_else(|_| "whisper-1".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, transcribe_model })
  }
}

/// "de-DE" -> "de". The endpoint takes ISO-639-1 codes.
pub fn language_from_locale(locale: &str) -> &str {
  locale.split(['-', '_']).next().unwrap_or(locale)
}

/// File extension the endpoint uses to sniff the container format.
pub fn extension_for_mime(mime: &str) -> &'static str {
  let base = mime.split(';').next().unwrap_or(mime).trim();
  match base {
    "audio/webm" => "webm",
    "audio/ogg" => "ogg",
    "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
    "audio/mpeg" | "audio/mp3" => "mp3",
    "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
    _ => "webm",
  }
}

#[async_trait]
impl Transcriber for OpenAI {
  fn name(&self) -> &str {
    &self.transcribe_model
  }

  #[instrument(level = "info", skip(self, audio), fields(model = %self.transcribe_model, audio_len = audio.len(), %mime, %locale))]
  async fn transcribe(&self, audio: Vec<u8>, mime: &str, locale: &str) -> Result<String, SpeechError> {
    let url = format!("{}/audio/transcriptions", self.base_url);
    let file = Part::bytes(audio)
      .file_name(format!("speech.{}", extension_for_mime(mime)))
      .mime_str(mime)
      .map_err(|e| SpeechError::Backend(e.to_string()))?;
    let form = Form::new()
      .text("model", self.transcribe_model.clone())
      .text("language", language_from_locale(locale).to_string())
      .text("response_format", "json")
      .part("file", file);

    let start = std::time::Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "deutsch-ueben-backend/0.1")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .multipart(form)
      .send().await
      .map_err(|e| SpeechError::Backend(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      error!(elapsed = ?start.elapsed(), %status, "Transcription request failed");
      return Err(SpeechError::Backend(format!("OpenAI HTTP {}: {}", status, msg)));
    }

    let body: TranscriptionResponse = res.json().await.map_err(|e| SpeechError::Backend(e.to_string()))?;
    info!(elapsed = ?start.elapsed(), text_len = body.text.len(), "Transcription received");
    Ok(body.text)
  }
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn locale_maps_to_language() {
    assert_eq!(language_from_locale("de-DE"), "de");
    assert_eq!(language_from_locale("de_AT"), "de");
    assert_eq!(language_from_locale("de"), "de");
  }

  #[test]
  fn mime_maps_to_extension() {
    assert_eq!(extension_for_mime("audio/webm;codecs=opus"), "webm");
    assert_eq!(extension_for_mime("audio/x-wav"), "wav");
    assert_eq!(extension_for_mime("application/octet-stream"), "webm");
  }

  #[test]
  fn error_body_is_unwrapped() {
    let body = r#"{"error":{"message":"Invalid file format.","type":"invalid_request_error"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Invalid file format."));
    assert_eq!(extract_openai_error("<html>"), None);
  }
}
