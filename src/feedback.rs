//! Heuristic feedback for a learner's German response.
//!
//! Scoring is deterministic and has no failure mode:
//!   - base 1, plus a length bonus and a keyword bonus
//!   - +0.5 when the address convention matches the scenario
//!   - rounded half-up, then capped to 1..=5
//!
//! The qualitative notes come from the raw measurements, not from the final score.

use serde::Serialize;

use crate::domain::{FeedbackData, Formality, Prompt, Scenario};

const INFORMAL_MARKERS: [&str; 3] = ["du", "dir", "dein"];
const FORMAL_MARKERS: [&str; 3] = ["sie", "ihnen", "ihr"];

const NOTE_LENGTH: &str = "Good response length - shows engagement in the conversation";
const NOTE_FALLBACK: &str = "You attempted to respond in German - great start!";

const IMPROVE_DETAIL: &str =
  "Try to give more detailed responses to keep the conversation flowing naturally.";
const IMPROVE_VOCABULARY: &str =
  "Include more topic-relevant vocabulary to make your response more natural.";
const IMPROVE_FORMAL: &str = "Remember to use formal address (Sie) in professional contexts.";
const IMPROVE_INFORMAL: &str =
  "This is an informal context - feel free to use \"du\" with colleagues.";
const IMPROVE_FOLLOW_UP: &str =
  "Consider adding a follow-up question to show interest in the conversation.";

/// Raw measurements taken from a response before any rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurements {
  pub word_count: usize,
  pub matched_keywords: Vec<String>,
  pub uses_formal: bool,
  pub uses_informal: bool,
}

impl Measurements {
  pub fn take(response: &str, prompt: &Prompt) -> Self {
    let normalized = response.to_lowercase();
    let normalized = normalized.trim();

    let word_count = normalized.split_whitespace().count();
    let matched_keywords = prompt
      .keywords
      .iter()
      .filter(|k| normalized.contains(&k.to_lowercase()))
      .cloned()
      .collect();

    Self {
      word_count,
      matched_keywords,
      uses_formal: FORMAL_MARKERS.iter().any(|m| normalized.contains(m)),
      uses_informal: INFORMAL_MARKERS.iter().any(|m| normalized.contains(m)),
    }
  }

  /// Bonus-eligible register. The informal branch does not check for formal markers.
  fn formality_bonus(&self, formality: Formality) -> bool {
    match formality {
      Formality::Formal => self.uses_formal && !self.uses_informal,
      Formality::Informal => self.uses_informal,
    }
  }

  fn formality_correct(&self, formality: Formality) -> bool {
    match formality {
      Formality::Formal => self.uses_formal,
      Formality::Informal => self.uses_informal,
    }
  }

  fn raw_score(&self, formality: Formality) -> f64 {
    let mut score = 1.0;

    if self.word_count >= 10 {
      score += 1.0;
    } else if self.word_count >= 5 {
      score += 0.5;
    }

    score += match self.matched_keywords.len() {
      0 => 0.0,
      1 => 1.0,
      2 => 1.5,
      _ => 2.0,
    };

    if self.formality_bonus(formality) {
      score += 0.5;
    }
    score
  }
}

/// Score a response against the prompt's keywords and the scenario's register.
pub fn generate_feedback(response: &str, prompt: &Prompt, scenario: &Scenario) -> FeedbackData {
  let m = Measurements::take(response, prompt);
  let formality = scenario.formality;

  // Half-up for positive values; the clamp runs after rounding.
  let score = m.raw_score(formality).round().clamp(1.0, 5.0) as u8;

  let formality_correct = m.formality_correct(formality);

  let mut what_worked_well = Vec::new();
  if m.word_count >= 5 {
    what_worked_well.push(NOTE_LENGTH.to_string());
  }
  if !m.matched_keywords.is_empty() {
    let shown: Vec<&str> = m.matched_keywords.iter().take(2).map(String::as_str).collect();
    what_worked_well.push(format!("Used relevant vocabulary: \"{}\"", shown.join("\", \"")));
  }
  if formality_correct {
    what_worked_well.push(format!("Appropriate formality level ({})", formality.as_str()));
  }
  if what_worked_well.is_empty() {
    what_worked_well.push(NOTE_FALLBACK.to_string());
  }

  let areas_to_improve = if m.word_count < 5 {
    IMPROVE_DETAIL
  } else if m.matched_keywords.len() < 2 {
    IMPROVE_VOCABULARY
  } else if !formality_correct && formality == Formality::Formal {
    IMPROVE_FORMAL
  } else if !formality_correct && formality == Formality::Informal {
    IMPROVE_INFORMAL
  } else {
    IMPROVE_FOLLOW_UP
  };

  FeedbackData {
    score,
    what_worked_well,
    areas_to_improve: areas_to_improve.to_string(),
    suggested_response: prompt.suggested_response.clone(),
  }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
  Excellent,
  VeryGood,
  Good,
  Okay,
  NeedsImprovement,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
  Success,
  Warning,
  Destructive,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct ScoreLabel {
  pub tier: ScoreTier,
  pub label: &'static str,
  pub severity: Severity,
}

/// Display label for a score; lower bounds inclusive, checked top-down.
pub fn score_label(score: u8) -> ScoreLabel {
  let (tier, label, severity) = match score {
    5.. => (ScoreTier::Excellent, "Ausgezeichnet!", Severity::Success),
    4 => (ScoreTier::VeryGood, "Sehr gut!", Severity::Success),
    3 => (ScoreTier::Good, "Gut!", Severity::Warning),
    2 => (ScoreTier::Okay, "Okay", Severity::Warning),
    _ => (ScoreTier::NeedsImprovement, "Needs Improvement", Severity::Destructive),
  };
  ScoreLabel { tier, label, severity }
}
