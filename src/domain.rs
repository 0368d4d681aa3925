//! Domain models: scenarios and prompts (static catalog), scored responses,
//! ephemeral feedback, and the persisted progress snapshot.

use serde::{Deserialize, Serialize};

/// Difficulty tier shown on the scenario card.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Difficulty {
  #[serde(rename = "Anfänger", alias = "beginner")]
  Beginner,
  #[serde(rename = "Fortgeschritten", alias = "advanced")]
  Advanced,
}

/// Which address convention the scenario practices.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Formality {
  #[serde(rename = "Sie", alias = "formal")]
  Formal,
  #[serde(rename = "Du", alias = "informal")]
  Informal,
}

impl Formality {
  pub fn as_str(&self) -> &'static str {
    match self {
      Formality::Formal => "Sie",
      Formality::Informal => "Du",
    }
  }
}

/// A single conversational turn the learner answers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
  pub id: String,
  pub german: String,
  pub english: String,
  #[serde(default)]
  pub keywords: Vec<String>,
  pub suggested_response: String,
}

/// A workplace situation bundling one or more prompts. Never mutated after load.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
  pub id: String,
  pub title: String,
  pub title_en: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub icon: String,
  pub difficulty: Difficulty,
  pub formality: Formality,
  pub context: String,
  #[serde(default)]
  pub context_en: String,
  pub prompts: Vec<Prompt>,
}

impl Scenario {
  pub fn prompt(&self, prompt_id: &str) -> Option<&Prompt> {
    self.prompts.iter().find(|p| p.id == prompt_id)
  }

  pub fn first_prompt(&self) -> Option<&Prompt> {
    self.prompts.first()
  }
}

/// One persisted answer per (scenario, prompt).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
  pub scenario_id: String,
  pub prompt_id: String,
  pub response: String,
  pub score: u8,
  /// Unix epoch milliseconds.
  pub timestamp: u64,
  #[serde(default)]
  pub attempts: u32,
}

/// Result of scoring a single response. Only `score` is ever persisted.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackData {
  pub score: u8,
  pub what_worked_well: Vec<String>,
  pub areas_to_improve: String,
  pub suggested_response: String,
}

/// Full progress snapshot, persisted as one unit.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressData {
  #[serde(default)]
  pub completed_scenarios: Vec<String>,
  #[serde(default)]
  pub responses: Vec<UserResponse>,
  #[serde(default)]
  pub total_score: u32,
}

impl ProgressData {
  pub fn sum_scores(&self) -> u32 {
    self.responses.iter().map(|r| r.score as u32).sum()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn enums_use_german_wire_names() {
    assert_eq!(serde_json::to_string(&Formality::Formal).unwrap(), "\"Sie\"");
    assert_eq!(serde_json::to_string(&Difficulty::Beginner).unwrap(), "\"Anfänger\"");
    let f: Formality = serde_json::from_str("\"informal\"").unwrap();
    assert_eq!(f, Formality::Informal);
  }

  #[test]
  fn snapshot_uses_camel_case_fields() {
    let data = ProgressData {
      completed_scenarios: vec!["small-talk".into()],
      responses: vec![UserResponse {
        scenario_id: "small-talk".into(),
        prompt_id: "p1".into(),
        response: "Hallo".into(),
        score: 2,
        timestamp: 1,
        attempts: 1,
      }],
      total_score: 2,
    };
    let v = serde_json::to_value(&data).unwrap();
    assert_eq!(v["completedScenarios"][0], "small-talk");
    assert_eq!(v["responses"][0]["scenarioId"], "small-talk");
    assert_eq!(v["totalScore"], 2);
  }
}
