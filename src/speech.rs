//! Speech-recognition capability.
//!
//! The core never talks to a platform API directly. It sees either an
//! available capability (a `Transcriber` plus a locale hint) or an
//! unavailable one, in which case clients fall back to typing.
//! Each recognition session yields exactly one outcome: a final transcript or an error.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SpeechError {
  #[error("speech recognition is not available; please type your response")]
  Unsupported,
  #[error("audio payload is not valid base64: {0}")]
  InvalidAudio(#[from] base64::DecodeError),
  #[error("audio payload is empty")]
  EmptyAudio,
  #[error("no speech was recognized")]
  NoSpeech,
  #[error("speech recognition failed: {0}")]
  Backend(String),
}

impl SpeechError {
  pub fn status(&self) -> StatusCode {
    match self {
      SpeechError::Unsupported => StatusCode::SERVICE_UNAVAILABLE,
      SpeechError::InvalidAudio(_) | SpeechError::EmptyAudio => StatusCode::BAD_REQUEST,
      SpeechError::NoSpeech => StatusCode::UNPROCESSABLE_ENTITY,
      SpeechError::Backend(_) => StatusCode::BAD_GATEWAY,
    }
  }

  pub fn code(&self) -> &'static str {
    match self {
      SpeechError::Unsupported => "speech_unsupported",
      SpeechError::InvalidAudio(_) | SpeechError::EmptyAudio => "invalid_audio",
      SpeechError::NoSpeech => "no_speech",
      SpeechError::Backend(_) => "speech_failed",
    }
  }
}

/// Turns recorded audio into final text.
#[async_trait]
pub trait Transcriber: Send + Sync {
  fn name(&self) -> &str;
  async fn transcribe(&self, audio: Vec<u8>, mime: &str, locale: &str) -> Result<String, SpeechError>;
}

#[derive(Clone)]
pub enum SpeechCapability {
  Available { transcriber: Arc<dyn Transcriber>, locale: String },
  Unavailable,
}

/// Final transcript of one recognition session.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recognition {
  pub session_id: String,
  pub transcript: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CapabilityInfo {
  pub available: bool,
  pub locale: Option<String>,
  pub backend: Option<String>,
}

impl SpeechCapability {
  pub fn info(&self) -> CapabilityInfo {
    match self {
      SpeechCapability::Available { transcriber, locale } => CapabilityInfo {
        available: true,
        locale: Some(locale.clone()),
        backend: Some(transcriber.name().to_string()),
      },
      SpeechCapability::Unavailable => CapabilityInfo { available: false, locale: None, backend: None },
    }
  }

  /// Run one recognition session over base64-encoded audio.
  #[instrument(level = "info", skip(self, audio_base64), fields(audio_b64_len = audio_base64.len(), %mime))]
  pub async fn recognize(&self, audio_base64: &str, mime: &str) -> Result<Recognition, SpeechError> {
    let (transcriber, locale) = match self {
      SpeechCapability::Available { transcriber, locale } => (transcriber, locale),
      SpeechCapability::Unavailable => {
        warn!(target: "speech", "Recognition requested but capability is unavailable");
        return Err(SpeechError::Unsupported);
      }
    };

    let audio = STANDARD.decode(audio_base64.trim())?;
    if audio.is_empty() {
      return Err(SpeechError::EmptyAudio);
    }

    let session_id = Uuid::new_v4().to_string();
    let start = std::time::Instant::now();
    let result = transcriber.transcribe(audio, mime, locale).await;
    let elapsed = start.elapsed();

    match result {
      Ok(text) => {
        let transcript = text.trim().to_string();
        if transcript.is_empty() {
          warn!(target: "speech", %session_id, ?elapsed, "Recognition finished without speech");
          return Err(SpeechError::NoSpeech);
        }
        info!(target: "speech", %session_id, ?elapsed, transcript_len = transcript.len(), "Recognition finished");
        Ok(Recognition { session_id, transcript })
      }
      Err(e) => {
        warn!(target: "speech", %session_id, ?elapsed, error = %e, "Recognition failed");
        Err(e)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct FakeTranscriber {
    reply: Result<&'static str, &'static str>,
  }

  #[async_trait]
  impl Transcriber for FakeTranscriber {
    fn name(&self) -> &str {
      "fake"
    }
    async fn transcribe(&self, audio: Vec<u8>, _mime: &str, locale: &str) -> Result<String, SpeechError> {
      assert_eq!(locale, "de-DE");
      assert_eq!(audio, b"RIFF");
      self.reply.map(str::to_string).map_err(|e| SpeechError::Backend(e.into()))
    }
  }

  fn available(reply: Result<&'static str, &'static str>) -> SpeechCapability {
    SpeechCapability::Available {
      transcriber: Arc::new(FakeTranscriber { reply }),
      locale: "de-DE".into(),
    }
  }

  fn riff_b64() -> String {
    STANDARD.encode(b"RIFF")
  }

  #[tokio::test]
  async fn unavailable_capability_reports_unsupported() {
    let err = SpeechCapability::Unavailable.recognize(&riff_b64(), "audio/webm").await.unwrap_err();
    assert!(matches!(err, SpeechError::Unsupported));
    assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(!SpeechCapability::Unavailable.info().available);
  }

  #[tokio::test]
  async fn final_transcript_is_trimmed() {
    let cap = available(Ok("  Guten Morgen zusammen \n"));
    let rec = cap.recognize(&riff_b64(), "audio/webm").await.unwrap();
    assert_eq!(rec.transcript, "Guten Morgen zusammen");
    assert!(!rec.session_id.is_empty());
    assert_eq!(cap.info().backend.as_deref(), Some("fake"));
  }

  #[tokio::test]
  async fn silence_and_backend_errors_surface() {
    let err = available(Ok("   ")).recognize(&riff_b64(), "audio/webm").await.unwrap_err();
    assert!(matches!(err, SpeechError::NoSpeech));

    let err = available(Err("denied")).recognize(&riff_b64(), "audio/webm").await.unwrap_err();
    assert_eq!(err.code(), "speech_failed");
  }

  #[tokio::test]
  async fn bad_audio_is_rejected_before_transcription() {
    let err = available(Ok("x")).recognize("###", "audio/webm").await.unwrap_err();
    assert!(matches!(err, SpeechError::InvalidAudio(_)));
    let err = available(Ok("x")).recognize("", "audio/webm").await.unwrap_err();
    assert!(matches!(err, SpeechError::EmptyAudio));
  }
}
