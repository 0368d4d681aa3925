//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Difficulty, FeedbackData, Formality, Scenario};
use crate::feedback::ScoreLabel;
use crate::progress::Aggregate;
use crate::speech::{CapabilityInfo, Recognition};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListScenarios {
        #[serde(default)]
        difficulty: Option<Difficulty>,
    },
    SubmitResponse {
        #[serde(rename = "scenarioId")]
        scenario_id: String,
        #[serde(rename = "promptId", default)]
        prompt_id: Option<String>,
        response: String,
    },
    GetProgress,
    ResetProgress,
    Transcribe {
        #[serde(rename = "audioBase64")]
        audio_base64: String,
        mime: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Scenarios {
        scenarios: Vec<ScenarioSummary>,
    },
    Feedback {
        #[serde(flatten)]
        result: FeedbackOut,
    },
    Progress {
        #[serde(flatten)]
        overview: ProgressOut,
    },
    Transcript {
        #[serde(flatten)]
        recognition: Recognition,
    },
    SpeechUnsupported {
        message: String,
    },
    Error {
        code: String,
        message: String,
    },
}

/// Card-sized view of a scenario for the selection screen.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub id: String,
    pub title: String,
    pub title_en: String,
    pub description: String,
    pub icon: String,
    pub difficulty: Difficulty,
    pub formality: Formality,
    pub prompt_count: usize,
    pub completed: bool,
    pub latest_score: Option<u8>,
}

pub fn to_summary(s: &Scenario, completed: bool, latest_score: Option<u8>) -> ScenarioSummary {
    ScenarioSummary {
        id: s.id.clone(),
        title: s.title.clone(),
        title_en: s.title_en.clone(),
        description: s.description.clone(),
        icon: s.icon.clone(),
        difficulty: s.difficulty,
        formality: s.formality,
        prompt_count: s.prompts.len(),
        completed,
        latest_score,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct ScenarioQuery {
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub difficulty: Option<Difficulty>,
    /// Scenario the learner just finished; not picked again if avoidable.
    pub after: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackIn {
    pub scenario_id: String,
    #[serde(default)]
    pub prompt_id: Option<String>,
    pub response: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackOut {
    pub scenario_id: String,
    pub prompt_id: String,
    #[serde(flatten)]
    pub feedback: FeedbackData,
    pub label: ScoreLabel,
    pub attempts: u32,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioProgressOut {
    pub scenario_id: String,
    pub title: String,
    pub icon: String,
    pub completed: bool,
    pub score: Option<u8>,
    pub attempts: u32,
    pub label: Option<ScoreLabel>,
    pub prompts: Vec<PromptProgressOut>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptProgressOut {
    pub prompt_id: String,
    pub score: Option<u8>,
    pub attempts: u32,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOut {
    pub total_scenarios: usize,
    #[serde(flatten)]
    pub aggregate: Aggregate,
    pub scenarios: Vec<ScenarioProgressOut>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeIn {
    pub audio_base64: String,
    pub mime: String,
}

#[derive(Serialize)]
pub struct SpeechOut {
    #[serde(flatten)]
    pub info: CapabilityInfo,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
