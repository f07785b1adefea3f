use watch_core::Change;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub subject: String,
    pub body: String,
}

/// Plain-text mail for one detected change. `observed_at` is an RFC 3339 timestamp.
pub fn compose_notification(change: &Change, subject: &str, observed_at: &str) -> NotificationEvent {
    let mut body = format!(
        "Detected an update on a watched page.\n\nURL: {url}\nObserved: {observed_at}\n\n--- current ---\n{current}\n",
        url = change.url,
        current = change.extract.trim_end(),
    );
    if let Some(previous) = change.previous_extract.as_deref() {
        body.push_str("\n--- previous ---\n");
        body.push_str(previous.trim_end());
        body.push('\n');
    }

    NotificationEvent {
        subject: subject.to_string(),
        body,
    }
}
