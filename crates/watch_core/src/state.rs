use std::collections::BTreeMap;

use crate::summary::{Outcome, RunSummary, TargetOutcome};

/// Last accepted observation for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    pub fingerprint: String,
    pub extract: Option<String>,
}

impl Baseline {
    pub fn new(fingerprint: impl Into<String>, extract: Option<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            extract,
        }
    }
}

/// Per-run watch state: the baselines loaded from storage plus what this run decided.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WatchState {
    baselines: BTreeMap<String, Baseline>,
    outcomes: Vec<TargetOutcome>,
    dirty: bool,
}

impl WatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_baselines(baselines: BTreeMap<String, Baseline>) -> Self {
        Self {
            baselines,
            ..Self::default()
        }
    }

    pub fn baseline(&self, key: &str) -> Option<&Baseline> {
        self.baselines.get(key)
    }

    pub fn baselines(&self) -> &BTreeMap<String, Baseline> {
        &self.baselines
    }

    /// True once a baseline was added or replaced and the state needs saving.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn view(&self) -> RunSummary {
        RunSummary {
            outcomes: self.outcomes.clone(),
        }
    }

    /// Puts back a baseline whose change was never delivered.
    pub fn restore_baseline(&mut self, key: &str, baseline: Baseline) {
        self.baselines.insert(key.to_string(), baseline);
    }

    pub(crate) fn replace_baseline(&mut self, key: &str, baseline: Baseline) -> Option<Baseline> {
        self.dirty = true;
        self.baselines.insert(key.to_string(), baseline)
    }

    pub(crate) fn record(&mut self, key: &str, outcome: Outcome) {
        self.outcomes.push(TargetOutcome {
            target_key: key.to_string(),
            outcome,
        });
    }
}
