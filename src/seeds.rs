//! Built-in scenario catalog. Guarantees the app is usable without a config file.

use crate::domain::{Difficulty, Formality, Prompt, Scenario};

fn prompt(id: &str, german: &str, english: &str, keywords: &[&str], suggested: &str) -> Prompt {
  Prompt {
    id: id.into(),
    german: german.into(),
    english: english.into(),
    keywords: keywords.iter().map(|k| k.to_string()).collect(),
    suggested_response: suggested.into(),
  }
}

pub fn seed_scenarios() -> Vec<Scenario> {
  vec![
    Scenario {
      id: "small-talk".into(),
      title: "Small Talk mit Kollegen".into(),
      title_en: "Small talk with colleagues".into(),
      description: "Plaudern Sie locker in der Kaffeepause.".into(),
      icon: "☕".into(),
      difficulty: Difficulty::Beginner,
      formality: Formality::Informal,
      context: "Sie sind in der Kaffeepause. Ein Kollege spricht Sie an...".into(),
      context_en: "You are on a coffee break. A colleague starts talking to you...".into(),
      prompts: vec![
        prompt(
          "weekend",
          "Wie war dein Wochenende?",
          "How was your weekend?",
          &["wochenende", "gemacht", "familie", "freunde", "schön", "entspannt"],
          "Mein Wochenende war super! Ich war mit Freunden wandern. Und wie war dein Wochenende?",
        ),
        prompt(
          "plans",
          "Hast du etwas Schönes gemacht?",
          "Did you do anything nice?",
          &["gemacht", "ausflug", "kino", "freunde", "schön"],
          "Ja, ich war am Samstag im Kino und am Sonntag habe ich Freunde getroffen. Und du?",
        ),
      ],
    },
    Scenario {
      id: "explain-task".into(),
      title: "Aufgabe erklären".into(),
      title_en: "Explain a task".into(),
      description: "Erklären Sie einem Teamkollegen einen Arbeitsablauf.".into(),
      icon: "📋".into(),
      difficulty: Difficulty::Advanced,
      formality: Formality::Formal,
      context: "Ihr Teamkollege fragt Sie nach den Details eines Projekts...".into(),
      context_en: "Your teammate asks you about the details of a project...".into(),
      prompts: vec![
        prompt(
          "process",
          "Können Sie mir erklären, wie dieser Prozess funktioniert?",
          "Can you explain to me how this process works?",
          &["projekt", "schritte", "besprechen", "zuerst", "dann", "prozess"],
          "Gerne. Zuerst sammeln wir die Anforderungen, dann besprechen wir die nächsten Schritte im Team.",
        ),
        prompt(
          "priorities",
          "Welche Schritte sind am wichtigsten?",
          "Which steps are the most important?",
          &["wichtig", "schritt", "zuerst", "priorität", "termin"],
          "Am wichtigsten ist der erste Schritt: Wir klären die Priorität und den Termin mit Ihnen.",
        ),
      ],
    },
    Scenario {
      id: "answer-question".into(),
      title: "Frage beantworten".into(),
      title_en: "Answer a question".into(),
      description: "Berichten Sie Ihrem Manager über den Stand Ihrer Arbeit.".into(),
      icon: "💼".into(),
      difficulty: Difficulty::Advanced,
      formality: Formality::Formal,
      context: "Ihr Manager fragt Sie nach dem Status Ihrer Arbeit...".into(),
      context_en: "Your manager asks you about the status of your work...".into(),
      prompts: vec![
        prompt(
          "status",
          "Wie läuft das Projekt?",
          "How is the project going?",
          &["projekt", "läuft", "fertig", "termin", "plan", "woche"],
          "Das Projekt läuft gut. Wir liegen im Plan und werden bis Ende der Woche fertig sein.",
        ),
        prompt(
          "problems",
          "Gibt es irgendwelche Probleme?",
          "Are there any problems?",
          &["problem", "lösung", "unterstützung", "verzögerung", "klären"],
          "Es gibt eine kleine Verzögerung, aber wir haben bereits eine Lösung. Ich halte Sie auf dem Laufenden.",
        ),
      ],
    },
    Scenario {
      id: "ask-help".into(),
      title: "Um Hilfe bitten".into(),
      title_en: "Ask for help".into(),
      description: "Bitten Sie einen Kollegen um Unterstützung.".into(),
      icon: "🤝".into(),
      difficulty: Difficulty::Beginner,
      formality: Formality::Informal,
      context: "Sie brauchen Unterstützung von einem Kollegen...".into(),
      context_en: "You need support from a colleague...".into(),
      prompts: vec![
        prompt(
          "quick-help",
          "Kannst du mir kurz helfen?",
          "Can you help me for a moment?",
          &["helfen", "hilfe", "danke", "frage", "kurz"],
          "Ja, klar! Ich helfe dir gerne. Was ist deine Frage?",
        ),
        prompt(
          "what-help",
          "Womit brauchst du Hilfe?",
          "What do you need help with?",
          &["hilfe", "bericht", "programm", "verstehe", "erklären"],
          "Ich verstehe das neue Programm noch nicht. Kannst du mir zeigen, wie man den Bericht erstellt?",
        ),
      ],
    },
    Scenario {
      id: "introduce".into(),
      title: "Sich vorstellen".into(),
      title_en: "Introduce yourself".into(),
      description: "Stellen Sie sich an Ihrem ersten Tag dem Team vor.".into(),
      icon: "👋".into(),
      difficulty: Difficulty::Beginner,
      formality: Formality::Formal,
      context: "Es ist Ihr erster Tag im neuen Büro. Sie treffen Ihr Team...".into(),
      context_en: "It is your first day in the new office. You meet your team...".into(),
      prompts: vec![
        prompt(
          "name",
          "Hallo! Wie heißen Sie?",
          "Hello! What is your name?",
          &["heiße", "name", "freut", "neu", "team"],
          "Guten Tag! Ich heiße Anna Schmidt. Es freut mich, Sie kennenzulernen.",
        ),
        prompt(
          "role",
          "Was ist Ihre Rolle hier?",
          "What is your role here?",
          &["arbeite", "rolle", "abteilung", "verantwortlich", "team"],
          "Ich arbeite als Entwicklerin in der IT-Abteilung und bin für das neue Projekt verantwortlich.",
        ),
      ],
    },
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn seed_ids_are_unique_and_non_empty() {
    let scenarios = seed_scenarios();
    let ids: HashSet<_> = scenarios.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids.len(), scenarios.len());
    for s in &scenarios {
      assert!(!s.prompts.is_empty(), "{} has no prompts", s.id);
      let prompt_ids: HashSet<_> = s.prompts.iter().map(|p| p.id.as_str()).collect();
      assert_eq!(prompt_ids.len(), s.prompts.len());
    }
  }

  #[test]
  fn suggested_responses_score_well() {
    for s in seed_scenarios() {
      for p in &s.prompts {
        let fb = crate::feedback::generate_feedback(&p.suggested_response, p, &s);
        assert!(fb.score >= 3, "{}/{} scored {}", s.id, p.id, fb.score);
      }
    }
  }
}
