use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing matched; state left alone to avoid false positives.
    EmptyExtract,
    /// No baseline existed; one was recorded without notifying.
    FirstRun,
    Unchanged,
    /// Fingerprint differs from the baseline; a notification is due.
    Changed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    pub target_key: String,
    pub outcome: Outcome,
}

/// Result of one run, in decision order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub outcomes: Vec<TargetOutcome>,
}

impl RunSummary {
    pub fn keys_with(&self, outcome: Outcome) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.outcome == outcome)
            .map(|o| o.target_key.as_str())
            .collect()
    }

    pub fn changed_count(&self) -> usize {
        self.keys_with(Outcome::Changed).len()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups = [
            ("Updated and notified", Outcome::Changed),
            ("Initialized", Outcome::FirstRun),
            ("Skipped (empty extract)", Outcome::EmptyExtract),
        ];
        let mut parts: Vec<String> = groups
            .iter()
            .filter_map(|(label, outcome)| {
                let keys = self.keys_with(*outcome);
                (!keys.is_empty()).then(|| format!("{label}: {}", keys.join(", ")))
            })
            .collect();

        if parts.is_empty() {
            return write!(f, "No change.");
        }
        let unchanged = self.keys_with(Outcome::Unchanged);
        if !unchanged.is_empty() {
            parts.push(format!("No change: {}", unchanged.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}
