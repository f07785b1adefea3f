/// What one fetch of a target produced, ready for a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub target_key: String,
    pub url: String,
    /// Canonical keyword-relevant extract; may be empty.
    pub extract: String,
    /// Digest of `extract`.
    pub fingerprint: String,
}
