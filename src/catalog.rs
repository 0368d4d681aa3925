//! Read-only scenario catalog: configured scenarios first, then built-in seeds.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use tracing::{error, info, instrument};

use crate::domain::{Difficulty, Scenario};
use crate::seeds::seed_scenarios;

pub struct Catalog {
  scenarios: Vec<Scenario>,
  by_id: HashMap<String, usize>,
}

impl Catalog {
  /// Build from configured scenarios plus seeds; configured ids win.
  #[instrument(level = "info", skip_all, fields(configured = configured.len()))]
  pub fn build(configured: Vec<Scenario>) -> Self {
    let mut catalog = Self { scenarios: Vec::new(), by_id: HashMap::new() };

    for sc in configured {
      catalog.insert(sc, "config");
    }
    for sc in seed_scenarios() {
      if catalog.by_id.contains_key(&sc.id) {
        continue;
      }
      catalog.insert(sc, "seed");
    }

    let beginner = catalog.scenarios.iter().filter(|s| s.difficulty == Difficulty::Beginner).count();
    info!(target: "deutsch_ueben", total = catalog.scenarios.len(), beginner, advanced = catalog.scenarios.len() - beginner, "Scenario catalog ready");
    catalog
  }

  fn insert(&mut self, sc: Scenario, source: &'static str) {
    if sc.id.trim().is_empty() {
      error!(target: "deutsch_ueben", %source, "Skipping scenario: empty id");
      return;
    }
    if self.by_id.contains_key(&sc.id) {
      error!(target: "deutsch_ueben", id = %sc.id, %source, "Skipping scenario: duplicate id");
      return;
    }
    if sc.prompts.is_empty() {
      error!(target: "deutsch_ueben", id = %sc.id, %source, "Skipping scenario: no prompts");
      return;
    }
    let mut seen = HashSet::new();
    if !sc.prompts.iter().all(|p| seen.insert(p.id.as_str())) {
      error!(target: "deutsch_ueben", id = %sc.id, %source, "Skipping scenario: duplicate prompt ids");
      return;
    }
    self.by_id.insert(sc.id.clone(), self.scenarios.len());
    self.scenarios.push(sc);
  }

  pub fn all(&self) -> &[Scenario] {
    &self.scenarios
  }

  pub fn len(&self) -> usize {
    self.scenarios.len()
  }

  pub fn get(&self, id: &str) -> Option<&Scenario> {
    self.by_id.get(id).map(|&i| &self.scenarios[i])
  }

  pub fn by_difficulty(&self, difficulty: Option<Difficulty>) -> Vec<&Scenario> {
    self
      .scenarios
      .iter()
      .filter(|s| difficulty.map_or(true, |d| s.difficulty == d))
      .collect()
  }

  /// Random pick, preferring scenarios not yet completed and never repeating
  /// `exclude` when an alternative exists.
  pub fn pick_next<F>(&self, difficulty: Option<Difficulty>, exclude: Option<&str>, is_completed: F) -> Option<&Scenario>
  where
    F: Fn(&str) -> bool,
  {
    let pool = self.by_difficulty(difficulty);
    let others: Vec<&Scenario> = pool
      .iter()
      .copied()
      .filter(|s| Some(s.id.as_str()) != exclude)
      .collect();
    let candidates = if others.is_empty() { pool } else { others };

    let fresh: Vec<&Scenario> = candidates.iter().copied().filter(|s| !is_completed(&s.id)).collect();
    let mut rng = rand::thread_rng();
    if fresh.is_empty() {
      candidates.choose(&mut rng).copied()
    } else {
      fresh.choose(&mut rng).copied()
    }
  }
}
