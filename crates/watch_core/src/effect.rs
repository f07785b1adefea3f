#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Tell the user that a target's relevant content changed.
    Notify(Change),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub target_key: String,
    pub url: String,
    pub extract: String,
    /// Extract from the replaced baseline, when it was stored.
    pub previous_extract: Option<String>,
}
